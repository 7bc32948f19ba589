//! Single-target range + angle-of-arrival estimation.
//!
//! A standalone diagnostic utility sharing the frame layout and FFT
//! substrate of the main detector but evaluated independently: 16-chirp
//! coherent averaging per antenna, a Hanning-windowed complex FFT (the
//! input here genuinely is complex I/Q, unlike the range stage's real
//! samples), three-antenna power-averaged peak search, and a two-baseline
//! phase-difference angle estimate.

use rustfft::num_complex::Complex32;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

use crate::config::Config;
use crate::constants::{
    AOA_MAX_RANGE_M, AOA_MIN_POWER_DB, AOA_MIN_RANGE_M, ANT_SPACING_M, NUM_CHIRPS_PER_FRAME,
    NUM_RX_ANTENNAS, RADAR_CARRIER_FREQ_HZ, SPEED_OF_LIGHT_MPS,
};
use crate::fft::hanning_window;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AoaResult {
    pub range_m: f32,
    pub elevation_deg: f32,
    pub azimuth_deg: f32,
    pub peak_power_db: f32,
    pub peak_bin: i32,
    pub valid: bool,
}

impl Default for AoaResult {
    fn default() -> Self {
        Self {
            range_m: 0.0,
            elevation_deg: 0.0,
            azimuth_deg: 0.0,
            peak_power_db: f32::NEG_INFINITY,
            peak_bin: -1,
            valid: false,
        }
    }
}

pub struct AoaAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    n: usize,
    window: Vec<f32>,
}

impl AoaAnalyzer {
    pub fn new(num_samples_per_chirp: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            fft: planner.plan_fft_forward(num_samples_per_chirp),
            n: num_samples_per_chirp,
            window: hanning_window(num_samples_per_chirp),
        }
    }

    /// `frame` is `[chirp][sample][antenna][I,Q]` interleaved floats, one
    /// full frame (`NUM_CHIRPS_PER_FRAME` chirps, `NUM_RX_ANTENNAS`
    /// antennas, `n` samples).
    pub fn compute(&mut self, frame: &[f32], cfg: &Config) -> AoaResult {
        let n = self.n;
        let stride_antenna = 2;
        let stride_sample = stride_antenna * NUM_RX_ANTENNAS;
        let stride_chirp = stride_sample * n;

        debug_assert!(frame.len() >= stride_chirp * NUM_CHIRPS_PER_FRAME);

        // Coherent average across chirps, per antenna, per sample.
        let mut spectra: [Vec<Complex32>; NUM_RX_ANTENNAS] =
            std::array::from_fn(|_| vec![Complex32::new(0.0, 0.0); n]);

        for ant in 0..NUM_RX_ANTENNAS {
            let buf = &mut spectra[ant];
            for s in 0..n {
                let mut acc = Complex32::new(0.0, 0.0);
                for c in 0..NUM_CHIRPS_PER_FRAME {
                    let base = c * stride_chirp + s * stride_sample + ant * stride_antenna;
                    acc += Complex32::new(frame[base], frame[base + 1]);
                }
                buf[s] = acc / NUM_CHIRPS_PER_FRAME as f32;
            }

            let mean: Complex32 = buf.iter().copied().sum::<Complex32>() / n as f32;
            for (v, w) in buf.iter_mut().zip(&self.window) {
                *v = (*v - mean) * *w;
            }
            self.fft.process(buf);
        }

        let range_resolution = cfg.range_resolution_m();
        let mut peak_bin = 0usize;
        let mut peak_power = f32::NEG_INFINITY;

        for k in 1..n / 2 {
            let d = k as f32 * range_resolution;
            if !(AOA_MIN_RANGE_M..=AOA_MAX_RANGE_M).contains(&d) {
                continue;
            }
            let power: f32 = spectra.iter().map(|s| s[k].norm_sqr()).sum::<f32>()
                / NUM_RX_ANTENNAS as f32;
            if power > peak_power {
                peak_power = power;
                peak_bin = k;
            }
        }

        if peak_bin == 0 || !peak_power.is_finite() {
            return AoaResult::default();
        }

        let peak_power_db = 10.0 * peak_power.max(1e-20).log10();
        if peak_power_db < AOA_MIN_POWER_DB {
            return AoaResult {
                peak_power_db,
                peak_bin: peak_bin as i32,
                ..AoaResult::default()
            };
        }

        let range_m = peak_bin as f32 * range_resolution;
        let dphi_x = (spectra[0][peak_bin] * spectra[2][peak_bin].conj()).arg();
        let dphi_y = (spectra[1][peak_bin] * spectra[2][peak_bin].conj()).arg();

        let lambda = SPEED_OF_LIGHT_MPS / RADAR_CARRIER_FREQ_HZ;
        let scale = lambda / (2.0 * std::f32::consts::PI * ANT_SPACING_M);
        let u = scale * dphi_x;
        let v = scale * dphi_y;

        let sin_theta = u.hypot(v).min(1.0);
        let elevation_deg = sin_theta.asin().to_degrees();
        let azimuth_deg = v.atan2(u).to_degrees();

        AoaResult {
            range_m,
            elevation_deg,
            azimuth_deg,
            peak_power_db,
            peak_bin: peak_bin as i32,
            valid: true,
        }
    }
}
