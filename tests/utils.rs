//! Tests for the utilities

use approx::assert_abs_diff_eq;

use ampsim_dsp::fft::{Complex32, FftEngine};
use ampsim_dsp::utils::delay_line::DelayLine;
use ampsim_dsp::utils::interleave;
use ampsim_dsp::{SampleRate, FFT_LENGTH};

#[test]
fn delay_line_delays_by_exact_samples() {
    let mut line = DelayLine::<16>::new();
    line.set_delay(5);

    let output: Vec<f32> = (1..=10).map(|n| line.process(n as f32)).collect();

    assert_eq!(output, [0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);

    line.set_delay(100);
    assert_eq!(line.delay(), line.max_delay());
    line.set_delay(0);
    assert_eq!(line.delay(), 1);
}

#[test]
fn sample_rate_conversions() {
    let sample_rate = SampleRate::new(48000.0);

    assert_abs_diff_eq!(sample_rate.samples_to_ms(480), 10.0, epsilon = 1e-4);
    assert_eq!(sample_rate.ms_to_samples(20.0), 960);
    assert_eq!(sample_rate.ms_to_samples(-3.0), 0);
    assert_eq!(SampleRate::default().ms_to_samples(20.0), 882);
}

#[test]
fn fft_round_trip_scales_by_length() {
    let mut fft = FftEngine::new(FFT_LENGTH);
    let mut buffer = vec![Complex32::default(); FFT_LENGTH];
    interleave(&[1.0, 2.0], &[3.0, 4.0], &mut buffer);
    assert_eq!(buffer[1], Complex32::new(2.0, 4.0));

    fft.forward(&mut buffer);
    fft.inverse(&mut buffer);

    assert_abs_diff_eq!(buffer[0].re, FFT_LENGTH as f32, epsilon = 1e-3);
    assert_abs_diff_eq!(buffer[1].im, 4.0 * FFT_LENGTH as f32, epsilon = 1e-3);
    assert_abs_diff_eq!(buffer[2].re, 0.0, epsilon = 1e-3);
}
