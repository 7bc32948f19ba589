//! Per-range-bin FIR filter banks.
//!
//! Both banks instantiate one filter per range bin and run it on the
//! slow-time sequence of that bin's spectral value, independently for the
//! real and imaginary parts. Internal history buffers persist across
//! frames; `reset` clears them. This uses a plain shift-register direct
//! form rather than the reference's block-oriented CMSIS state layout —
//! the two are numerically equivalent per-sample, and nothing here runs
//! under a hard real-time budget that would make the `O(taps)` shift cost
//! matter.

use rustfft::num_complex::Complex32;

use crate::constants::DECIMATION_FACTOR;

/// A single real-valued FIR, direct form, newest sample first.
#[derive(Clone)]
struct Fir {
    coeffs: &'static [f32],
    history: Vec<f32>,
}

impl Fir {
    fn new(coeffs: &'static [f32]) -> Self {
        Self {
            coeffs,
            history: vec![0.0; coeffs.len()],
        }
    }

    fn process(&mut self, x: f32) -> f32 {
        for i in (1..self.history.len()).rev() {
            self.history[i] = self.history[i - 1];
        }
        self.history[0] = x;
        self.coeffs
            .iter()
            .zip(&self.history)
            .map(|(c, h)| c * h)
            .sum()
    }

    fn reset(&mut self) {
        self.history.iter_mut().for_each(|v| *v = 0.0);
    }
}

/// One 65-tap band-pass FIR pair (real, imaginary) per range bin, used by
/// the macro pre-filter.
pub struct BandpassBank {
    re: Vec<Fir>,
    im: Vec<Fir>,
}

impl BandpassBank {
    pub fn new(num_bins: usize) -> Self {
        Self {
            re: (0..num_bins)
                .map(|_| Fir::new(&crate::constants::BANDPASS_COEFFS))
                .collect(),
            im: (0..num_bins)
                .map(|_| Fir::new(&crate::constants::BANDPASS_COEFFS))
                .collect(),
        }
    }

    /// Filter `spectrum` in place into `out`, one sample per bin.
    pub fn process(&mut self, spectrum: &[Complex32], out: &mut [Complex32]) {
        let n = self.re.len().min(spectrum.len()).min(out.len());
        for k in 0..n {
            let re = self.re[k].process(spectrum[k].re);
            let im = self.im[k].process(spectrum[k].im);
            out[k] = Complex32::new(re, im);
        }
    }

    pub fn reset(&mut self) {
        self.re.iter_mut().for_each(Fir::reset);
        self.im.iter_mut().for_each(Fir::reset);
    }
}

/// One 129-tap decimating low-pass FIR pair (real, imaginary) per range
/// bin, factor 8: consumes 8 new samples, produces one decimated sample.
pub struct DecimationBank {
    re: Vec<Fir>,
    im: Vec<Fir>,
}

impl DecimationBank {
    pub fn new(num_bins: usize) -> Self {
        Self {
            re: (0..num_bins)
                .map(|_| Fir::new(&crate::constants::DECIMATION_COEFFS))
                .collect(),
            im: (0..num_bins)
                .map(|_| Fir::new(&crate::constants::DECIMATION_COEFFS))
                .collect(),
        }
    }

    /// Run the decimator for bin `k` over the `DECIMATION_FACTOR`
    /// accumulated raw samples, oldest first, returning one decimated
    /// complex sample.
    pub fn process_bin(&mut self, k: usize, block: &[Complex32; DECIMATION_FACTOR]) -> Complex32 {
        let mut re_out = 0.0;
        let mut im_out = 0.0;
        for sample in block {
            re_out = self.re[k].process(sample.re);
            im_out = self.im[k].process(sample.im);
        }
        Complex32::new(re_out, im_out)
    }

    pub fn reset(&mut self) {
        self.re.iter_mut().for_each(Fir::reset);
        self.im.iter_mut().for_each(Fir::reset);
    }
}
