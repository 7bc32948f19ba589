//! FFT substrate.
//!
//! Provides the two FFT operations the rest of the pipeline needs: a
//! windowed real-input FFT used by the range stage and the AoA analyzer,
//! and a plain complex FFT used by the micro track's Doppler analysis.
//! There is no dedicated real-FFT crate in play here, so a real-valued
//! signal is FFT'd by packing it into a complex buffer with a zero
//! imaginary part and running the ordinary complex transform (the same
//! technique this codebase uses elsewhere for spectral analysis).

use rustfft::num_complex::Complex32;
use rustfft::{Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

use crate::error::{DetectorError, Result};

fn is_supported_len(n: usize) -> bool {
    n > 0 && n.is_power_of_two()
}

/// Hamming window, used by the range stage.
pub fn hamming_window(n: usize) -> Vec<f32> {
    if n <= 1 {
        return vec![1.0; n];
    }
    (0..n)
        .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f32 / (n - 1) as f32).cos())
        .collect()
}

/// Hanning window, used by the AoA analyzer's per-antenna spectra.
pub fn hanning_window(n: usize) -> Vec<f32> {
    if n <= 1 {
        return vec![1.0; n];
    }
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f32 / (n - 1) as f32).cos())
        .collect()
}

/// Windowed real FFT plus a plain complex FFT, both precomputed once at
/// allocation for fixed lengths.
pub struct FftProcessor {
    range_fft: Arc<dyn Fft<f32>>,
    doppler_fft: Arc<dyn Fft<f32>>,
    range_len: usize,
    doppler_len: usize,
    range_window: Vec<f32>,
    scratch: Vec<Complex32>,
}

impl FftProcessor {
    /// `range_len` is samples per chirp (N); `doppler_len` is the micro
    /// track's Doppler FFT size (M).
    pub fn new(range_len: usize, doppler_len: usize) -> Result<Self> {
        if !is_supported_len(range_len) {
            return Err(DetectorError::FftLen(range_len));
        }
        if !is_supported_len(doppler_len) {
            return Err(DetectorError::FftLen(doppler_len));
        }

        let mut planner = FftPlanner::new();
        let range_fft = planner.plan_fft_forward(range_len);
        let doppler_fft = planner.plan_fft_forward(doppler_len);
        let scratch_len = range_len.max(doppler_len);

        Ok(Self {
            range_fft,
            doppler_fft,
            range_len,
            doppler_len,
            range_window: hamming_window(range_len),
            scratch: vec![Complex32::new(0.0, 0.0); scratch_len],
        })
    }

    pub fn range_len(&self) -> usize {
        self.range_len
    }

    pub fn doppler_len(&self) -> usize {
        self.doppler_len
    }

    /// Windowed real FFT of one chirp's real samples. Writes the first
    /// `N/2` complex bins (DC through Nyquist, exclusive) into `out`.
    pub fn range_fft(&mut self, samples: &[f32], out: &mut [Complex32]) {
        debug_assert_eq!(samples.len(), self.range_len);
        debug_assert!(out.len() >= self.range_len / 2);

        let buf = &mut self.scratch[..self.range_len];
        for (dst, (&s, &w)) in buf.iter_mut().zip(samples.iter().zip(&self.range_window)) {
            *dst = Complex32::new(s * w, 0.0);
        }
        self.range_fft.process(buf);
        out[..self.range_len / 2].copy_from_slice(&buf[..self.range_len / 2]);
    }

    /// Complex Doppler FFT over a slow-time column, in place.
    pub fn doppler_fft(&mut self, column: &mut [Complex32]) {
        debug_assert_eq!(column.len(), self.doppler_len);
        self.doppler_fft.process(column);
    }

    /// Generic windowed real FFT at an arbitrary window, used by the AoA
    /// analyzer (Hanning rather than Hamming). `window` and `samples` must
    /// be the same length as `range_len`.
    pub fn windowed_fft(&mut self, samples: &[f32], window: &[f32], out: &mut [Complex32]) {
        debug_assert_eq!(samples.len(), self.range_len);
        debug_assert_eq!(window.len(), self.range_len);

        let buf = &mut self.scratch[..self.range_len];
        for (dst, (&s, &w)) in buf.iter_mut().zip(samples.iter().zip(window)) {
            *dst = Complex32::new(s * w, 0.0);
        }
        self.range_fft.process(buf);
        out[..self.range_len].copy_from_slice(buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_power_of_two() {
        assert!(FftProcessor::new(100, 128).is_err());
        assert!(FftProcessor::new(128, 100).is_err());
    }

    #[test]
    fn dc_bin_captures_constant_input() {
        let mut fft = FftProcessor::new(128, 128).unwrap();
        let samples = vec![1.0f32; 128];
        let mut out = vec![Complex32::new(0.0, 0.0); 64];
        fft.range_fft(&samples, &mut out);
        // A constant input times the Hamming window still peaks at DC.
        let dc_mag = out[0].norm();
        for bin in out.iter().skip(1) {
            assert!(bin.norm() <= dc_mag);
        }
    }

    #[test]
    fn hamming_window_is_symmetric() {
        let w = hamming_window(16);
        for i in 0..16 {
            assert!((w[i] - w[15 - i]).abs() < 1e-6);
        }
    }

    #[test]
    fn hanning_window_endpoints_near_zero() {
        let w = hanning_window(64);
        assert!(w[0] < 1e-3);
        assert!(w[63] < 1e-3);
    }
}
