//! Top-level presence detector: wires the range stage, filter banks,
//! history ring, macro/micro tracks, and the presence state machine
//! together behind the public `process_frame` entry point.

use rustfft::num_complex::Complex32;

use crate::config::{Config, PresenceMode};
use crate::constants::BANDPASS_DELAY_MS;
use crate::error::Result;
use crate::fft::FftProcessor;
use crate::filters::{BandpassBank, DecimationBank};
use crate::history_ring::{DecimationCarry, HistoryRing};
use crate::macro_detector::MacroDetector;
use crate::micro_detector::MicroDetector;
use crate::state::{Event, PresenceState};

pub struct PresenceDetector {
    config: Config,
    num_bins: usize,

    fft: FftProcessor,
    bandpass: BandpassBank,
    decimation_bank: DecimationBank,
    decimation_carry: DecimationCarry,
    history_ring: HistoryRing,
    macro_detector: MacroDetector,
    micro_detector: MicroDetector,

    raw_spectrum: Vec<Complex32>,
    bandpass_spectrum: Vec<Complex32>,
    decimated_row: Vec<Complex32>,

    state: PresenceState,
    last_reported_macro_idx: i32,
    last_reported_micro_idx: i32,
    last_reported_idx: i32,
    bandpass_initial_time_ms: u64,

    callback: Option<Box<dyn FnMut(&Event)>>,
}

impl PresenceDetector {
    /// Validate FFT sizes, allocate every buffer from `config`, and leave
    /// filter coefficients precomputed. No reallocation happens after this
    /// point; `process_frame` never grows a buffer.
    pub fn alloc(mut config: Config) -> Result<Self> {
        config.clamp_range_bins();

        let macro_fft_size = config.num_samples_per_chirp / 2;
        let num_bins = config.range_bin_limit() + 1;

        let fft = FftProcessor::new(config.num_samples_per_chirp, config.micro_fft_size)?;

        log::debug!(
            "alloc: N={} micro_fft_size={} num_bins={} mode={:?}",
            config.num_samples_per_chirp,
            config.micro_fft_size,
            num_bins,
            config.mode
        );

        Ok(Self {
            macro_detector: MacroDetector::new(num_bins),
            micro_detector: MicroDetector::new(num_bins, config.micro_fft_size, config.min_range_bin),
            bandpass: BandpassBank::new(num_bins),
            decimation_bank: DecimationBank::new(num_bins),
            decimation_carry: DecimationCarry::new(num_bins),
            history_ring: HistoryRing::new(config.micro_fft_size, num_bins),
            raw_spectrum: vec![Complex32::new(0.0, 0.0); macro_fft_size],
            bandpass_spectrum: vec![Complex32::new(0.0, 0.0); num_bins],
            decimated_row: vec![Complex32::new(0.0, 0.0); num_bins],
            fft,
            state: PresenceState::Absence,
            last_reported_macro_idx: -1,
            last_reported_micro_idx: -1,
            last_reported_idx: -1,
            bandpass_initial_time_ms: 0,
            callback: None,
            num_bins,
            config,
        })
    }

    pub fn get_config(&self) -> Config {
        self.config
    }

    /// Copy in a new configuration. Rejects an increase in `micro_fft_size`
    /// above the value passed at `alloc` (the Doppler FFT plan and history
    /// ring are sized once); silently clamps range bins.
    pub fn set_config(&mut self, mut new_config: Config) -> Result<()> {
        if new_config.micro_fft_size > self.history_ring.rows() {
            log::warn!(
                "rejecting set_config: micro_fft_size {} exceeds allocation-time {}",
                new_config.micro_fft_size,
                self.history_ring.rows()
            );
            return Err(crate::error::DetectorError::FftLen(new_config.micro_fft_size));
        }
        new_config.clamp_range_bins();
        self.config = new_config;
        Ok(())
    }

    /// Clear-on-read inspection of the running macro score maximum.
    pub fn get_max_macro(&mut self) -> Option<(f32, i32)> {
        self.macro_detector.take_max()
    }

    /// Clear-on-read inspection of the running micro score maximum.
    pub fn get_max_micro(&mut self) -> Option<(f32, i32)> {
        self.micro_detector.take_max()
    }

    pub fn get_bin_length(&self) -> f32 {
        self.config.range_resolution_m()
    }

    pub fn set_callback(&mut self, callback: Option<Box<dyn FnMut(&Event)>>) {
        self.callback = callback;
    }

    /// Clear state without freeing buffers.
    pub fn reset(&mut self) {
        self.macro_detector.reset();
        self.micro_detector.reset(self.config.min_range_bin);
        self.history_ring.reset();
        self.decimation_carry.reset();
        self.bandpass.reset();
        self.decimation_bank.reset();
        self.state = PresenceState::Absence;
        self.last_reported_macro_idx = -1;
        self.last_reported_micro_idx = -1;
        self.last_reported_idx = -1;
        self.bandpass_initial_time_ms = 0;
        log::debug!("detector reset");
    }

    pub fn state(&self) -> PresenceState {
        self.state
    }

    fn emit(&mut self, event: Event) {
        if let Some(cb) = self.callback.as_mut() {
            cb(&event);
        }
    }

    fn switch_to_absence(&mut self, time_ms: u64) {
        self.state = PresenceState::Absence;
        self.last_reported_micro_idx = -1;
        self.last_reported_idx = -1;
        self.micro_detector.clear_all_calculated();
        self.emit(Event {
            timestamp_ms: time_ms,
            range_bin: -1,
            state: PresenceState::Absence,
        });
    }

    /// Run the full pipeline for one frame: range FFT, optional band-pass,
    /// macro comparison, history-ring update (optionally decimated), and
    /// the micro track, emitting at most one state-changing event.
    pub fn process_frame(&mut self, real_samples: &[f32], time_ms: u64) -> Result<()> {
        if real_samples.len() != self.fft.range_len() {
            return Err(crate::error::DetectorError::Dsp(format!(
                "expected {} samples, got {}",
                self.fft.range_len(),
                real_samples.len()
            )));
        }

        if self.bandpass_initial_time_ms == 0 {
            self.bandpass.reset();
            self.bandpass_initial_time_ms = time_ms + BANDPASS_DELAY_MS;
            log::trace!("bandpass warm-up deadline set to {}", self.bandpass_initial_time_ms);
        }
        let bandpass_warm = time_ms >= self.bandpass_initial_time_ms;

        self.fft.range_fft(real_samples, &mut self.raw_spectrum);
        // Copy so downstream code can borrow `self` mutably without a
        // conflicting borrow on `self.raw_spectrum`.
        let raw: Vec<Complex32> = self.raw_spectrum[..self.num_bins].to_vec();

        let macro_input: Vec<Complex32> = if self.config.macro_fft_bandpass_filter_enabled {
            self.bandpass.process(&raw, &mut self.bandpass_spectrum[..self.num_bins]);
            self.bandpass_spectrum[..self.num_bins].to_vec()
        } else {
            raw.clone()
        };

        let mut event_fired = false;

        let run_macro = self.config.mode != PresenceMode::MicroOnly;
        if run_macro {
            let already_present = self.state != PresenceState::Absence;
            let (macro_idx, _outcome) = self.macro_detector.process(
                &macro_input,
                time_ms,
                &self.config,
                self.config.macro_fft_bandpass_filter_enabled,
                already_present,
                bandpass_warm,
            );

            if macro_idx != self.last_reported_macro_idx {
                let previous_reported = self.last_reported_macro_idx;
                if macro_idx >= 0 {
                    let ts = self.macro_detector.detect_timestamp(macro_idx as usize);
                    self.state = PresenceState::MacroPresence;
                    self.last_reported_idx = macro_idx;
                    self.emit(Event {
                        timestamp_ms: ts.saturating_sub(self.config.macro_movement_validity_ms),
                        range_bin: macro_idx,
                        state: PresenceState::MacroPresence,
                    });
                    event_fired = true;
                } else {
                    match self.config.mode {
                        PresenceMode::MacroOnly => {
                            self.switch_to_absence(time_ms);
                            event_fired = true;
                        }
                        _ => {
                            self.micro_detector
                                .arm_from(previous_reported, &self.config, time_ms);
                            self.micro_detector.reset_scan_index(self.config.min_range_bin);
                            self.state = PresenceState::MicroPresence;
                            self.last_reported_micro_idx = -1;
                        }
                    }
                }
                self.last_reported_macro_idx = macro_idx;
            }
        }

        // History ring always accumulates the raw (un-filtered) spectrum,
        // regardless of mode, optionally through the decimation bank.
        if self.config.micro_fft_decimation_enabled {
            if self.decimation_carry.push(&raw) {
                for k in 0..self.num_bins {
                    let mut block = [Complex32::new(0.0, 0.0); crate::constants::DECIMATION_FACTOR];
                    self.decimation_carry.column(k, &mut block);
                    self.decimated_row[k] = self.decimation_bank.process_bin(k, &block);
                }
                self.history_ring.push_row(&self.decimated_row);
            }
        } else {
            self.history_ring.push_row(&raw);
        }

        let run_micro = match self.config.mode {
            PresenceMode::MacroOnly => false,
            PresenceMode::MicroIfMacro => {
                !matches!(self.state, PresenceState::Absence | PresenceState::MacroPresence)
            }
            _ => true,
        };

        if run_micro {
            self.micro_detector
                .scan_one_column(&self.history_ring, &mut self.fft, &self.config, time_ms);

            if !event_fired {
                let macro_det = &self.macro_detector;
                let micro_idx = self.micro_detector.select_reported_bin(
                    &self.config,
                    time_ms,
                    self.config.micro_fft_decimation_enabled,
                    self.last_reported_idx,
                    |k| macro_det.is_hot(k, time_ms),
                );

                if micro_idx != self.last_reported_micro_idx {
                    self.last_reported_micro_idx = micro_idx;
                    if micro_idx >= 0 {
                        let ts = self.micro_detector.detect_timestamp(micro_idx as usize);
                        self.state = PresenceState::MicroPresence;
                        self.last_reported_idx = micro_idx;
                        self.emit(Event {
                            timestamp_ms: ts.saturating_sub(self.config.micro_movement_validity_ms),
                            range_bin: micro_idx,
                            state: PresenceState::MicroPresence,
                        });
                    } else if self.state == PresenceState::MicroPresence
                        && self.micro_detector.all_calculated()
                    {
                        self.switch_to_absence(time_ms);
                    }
                }
            }
        }

        Ok(())
    }
}
