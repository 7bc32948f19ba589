//! Detector configuration.
//!
//! `Config` mirrors the plain, `Copy`-able settings struct pattern used
//! throughout this crate's DSP layer: a flat struct of tunables, a
//! `Default` impl that matches the reference's `init_config` defaults, and
//! `serde` derives so a host application can persist/restore it.

use serde::{Deserialize, Serialize};

/// Presence reporting mode, gating which tracks may promote the state
/// machine and emit events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresenceMode {
    /// Only the macro (gross-motion) track runs; micro detector is inert.
    MacroOnly,
    /// Only the micro (breathing) track runs; macro comparisons never emit.
    MicroOnly,
    /// Micro track is armed only once a macro event has dropped.
    MicroIfMacro,
    /// Both tracks may independently promote; macro wins ties.
    MicroAndMacro,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Sweep bandwidth in Hz; sets range resolution `Δd = c / (2B)`.
    pub bandwidth_hz: f32,
    /// Samples captured per chirp. Must be a power of two.
    pub num_samples_per_chirp: usize,
    /// Chirp period in seconds, used by the AoA range law.
    pub chirp_period_s: f32,
    /// ADC sample rate in Hz, used by the AoA range law.
    pub sample_rate_hz: f32,

    /// Enable the decimating low-pass pre-filter feeding the micro track.
    pub micro_fft_decimation_enabled: bool,
    /// Rows in the micro history ring / length of the Doppler FFT.
    pub micro_fft_size: usize,

    pub macro_threshold: f32,
    pub micro_threshold: f32,

    pub min_range_bin: usize,
    pub max_range_bin: usize,

    pub macro_compare_interval_ms: u64,
    pub macro_movement_validity_ms: u64,
    pub micro_movement_validity_ms: u64,
    pub macro_movement_confirmations: u32,
    pub macro_trigger_range: usize,

    pub mode: PresenceMode,

    pub macro_fft_bandpass_filter_enabled: bool,

    /// Number of low (non-DC) Doppler bins summed into the micro score.
    pub micro_movement_compare_idx: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bandwidth_hz: 460.0e6,
            num_samples_per_chirp: 128,
            chirp_period_s: 6.9e-5,
            sample_rate_hz: 2_352_941.0,
            micro_fft_decimation_enabled: false,
            micro_fft_size: 128,
            macro_threshold: 1.0,
            micro_threshold: 25.0,
            min_range_bin: 1,
            max_range_bin: 5,
            macro_compare_interval_ms: 250,
            macro_movement_validity_ms: 1000,
            micro_movement_validity_ms: 4000,
            macro_movement_confirmations: 0,
            macro_trigger_range: 1,
            mode: PresenceMode::MicroIfMacro,
            macro_fft_bandpass_filter_enabled: false,
            micro_movement_compare_idx: 5,
        }
    }
}

impl Config {
    /// Range resolution in meters: `Δd = c / (2B)`.
    pub fn range_resolution_m(&self) -> f32 {
        crate::constants::SPEED_OF_LIGHT_MPS / (2.0 * self.bandwidth_hz)
    }

    /// `floor(5.0 / Δd)`, the hard ceiling on any range-bin index.
    pub fn max_range_limit_idx(&self) -> usize {
        (crate::constants::MAX_RANGE_LIMIT_M / self.range_resolution_m()).floor() as usize
    }

    /// Highest range-bin index any buffer needs to hold: the 5 m hard
    /// limit intersected with the half-spectrum produced by the range FFT.
    pub(crate) fn range_bin_limit(&self) -> usize {
        let macro_fft_size = self.num_samples_per_chirp / 2;
        self.max_range_limit_idx().min(macro_fft_size.saturating_sub(1))
    }

    /// Clamp `min_range_bin`/`max_range_bin` in place against the current
    /// FFT size and the 5 m hard limit. Mirrors the silent clamping done by
    /// `set_config` in the reference implementation.
    pub(crate) fn clamp_range_bins(&mut self) {
        let limit = self.range_bin_limit();
        if self.max_range_bin > limit {
            log::debug!(
                "clamping max_range_bin {} -> {limit}",
                self.max_range_bin
            );
            self.max_range_bin = limit;
        }
        if self.min_range_bin > self.max_range_bin {
            log::debug!(
                "clamping min_range_bin {} -> {}",
                self.min_range_bin, self.max_range_bin
            );
            self.min_range_bin = self.max_range_bin;
        }
    }
}
