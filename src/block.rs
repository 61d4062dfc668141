//! Fixed-size sample blocks and the pool they are borrowed from.
//!
//! A block is handed around as a [`BlockHandle`], a move-only token. Whoever
//! holds the handle owns the block; giving it to the next stage or back to the
//! pool consumes it, so a block can never be aliased by two stages.

use alloc::boxed::Box;
use alloc::vec;

use crate::BLOCK_SIZE;

/// One channel worth of samples for one block period.
pub type Block = [f32; BLOCK_SIZE];

/// Ownership token for one block of a [`BlockPool`].
#[derive(Debug, PartialEq, Eq)]
pub struct BlockHandle {
    index: usize,
}

impl BlockHandle {
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Pool of `N` blocks allocated once up front.
#[derive(Debug)]
pub struct BlockPool<const N: usize> {
    blocks: Box<[Block]>,
    in_use: [bool; N],
}

impl<const N: usize> Default for BlockPool<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> BlockPool<N> {
    pub fn new() -> Self {
        Self {
            blocks: vec![[0.0; BLOCK_SIZE]; N].into_boxed_slice(),
            in_use: [false; N],
        }
    }

    /// Takes a free block out of the pool. Contents are whatever the previous
    /// owner left behind.
    pub fn acquire(&mut self) -> Option<BlockHandle> {
        let index = self.in_use.iter().position(|used| !used)?;
        self.in_use[index] = true;

        Some(BlockHandle { index })
    }

    /// Returns a block to the pool.
    pub fn release(&mut self, handle: BlockHandle) {
        debug_assert!(self.in_use[handle.index], "block released twice");
        self.in_use[handle.index] = false;
    }

    pub fn available(&self) -> usize {
        self.in_use.iter().filter(|used| !**used).count()
    }

    pub fn capacity(&self) -> usize {
        N
    }

    #[inline]
    pub fn get(&self, handle: &BlockHandle) -> &Block {
        &self.blocks[handle.index]
    }

    #[inline]
    pub fn get_mut(&mut self, handle: &BlockHandle) -> &mut Block {
        &mut self.blocks[handle.index]
    }

    /// Mutable access to both blocks of a stereo pair.
    #[inline]
    pub fn pair_mut(
        &mut self,
        left: &BlockHandle,
        right: &BlockHandle,
    ) -> (&mut Block, &mut Block) {
        // Two live handles never share an index.
        debug_assert_ne!(left.index, right.index);

        if left.index < right.index {
            let (head, tail) = self.blocks.split_at_mut(right.index);
            (&mut head[left.index], &mut tail[0])
        } else {
            let (head, tail) = self.blocks.split_at_mut(left.index);
            (&mut tail[0], &mut head[right.index])
        }
    }
}
