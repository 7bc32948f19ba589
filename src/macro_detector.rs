//! Macro-movement detector: frame-to-frame differencing on (optionally
//! band-passed) range spectra.

use rustfft::num_complex::Complex32;

use crate::config::Config;

/// Outcome of a single `process` call, describing whether the compare
/// window was open this frame. Exposed so tests (and the Open Question
/// this resolves) can observe a skipped-vs-too-soon-vs-evaluated window,
/// rather than that distinction being silently swallowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOutcome {
    /// Not due yet; `last_macro_compare` untouched.
    TooSoon,
    /// The gap since the last comparison exceeded `2 * compare_interval`;
    /// the comparison for this interval is dropped and the baseline is
    /// refreshed from the current frame.
    Skipped,
    /// The comparison ran normally.
    Evaluated,
}

pub struct MacroDetector {
    num_bins: usize,
    last_compare: Vec<Complex32>,
    last_compare_init: bool,
    last_compare_ms: u64,
    hit_count: u32,
    detect_timestamps: Vec<u64>,
    detect_confidences: Vec<f32>,
    max_macro: f32,
    max_macro_idx: i32,
    current_idx: i32,
}

impl MacroDetector {
    pub fn new(num_bins: usize) -> Self {
        Self {
            num_bins,
            last_compare: vec![Complex32::new(0.0, 0.0); num_bins],
            last_compare_init: false,
            last_compare_ms: 0,
            hit_count: 0,
            detect_timestamps: vec![0; num_bins],
            detect_confidences: vec![0.0; num_bins],
            max_macro: 0.0,
            max_macro_idx: -1,
            current_idx: -1,
        }
    }

    /// Evaluate the macro track for this frame. `already_present` is
    /// whether the state machine is currently out of `Absence`. `warm` is
    /// whether the bandpass warm-up deadline has passed; until it has, the
    /// whole block is skipped with no state mutation at all, mirroring the
    /// original's single outer `if (time_ms > bandpass_initial_time_ms)`
    /// guard around the entire macro stage. Returns the reported macro bin
    /// (`-1` for none) and whether the compare window was actually
    /// evaluated.
    pub fn process(
        &mut self,
        cur: &[Complex32],
        time_ms: u64,
        cfg: &Config,
        bandpass_enabled: bool,
        already_present: bool,
        warm: bool,
    ) -> (i32, CompareOutcome) {
        if !warm {
            return (self.current_idx, CompareOutcome::TooSoon);
        }

        if !self.last_compare_init {
            self.last_compare[..self.num_bins].copy_from_slice(&cur[..self.num_bins]);
            self.last_compare_init = true;
            self.last_compare_ms = time_ms;
            return (self.current_idx, CompareOutcome::TooSoon);
        }

        let lower = self.last_compare_ms + cfg.macro_compare_interval_ms;
        let upper = self.last_compare_ms + 2 * cfg.macro_compare_interval_ms;

        if time_ms < lower {
            return (self.current_idx, CompareOutcome::TooSoon);
        }

        if time_ms > upper {
            log::trace!("macro compare window missed at t={time_ms}, refreshing baseline");
            self.last_compare[..self.num_bins].copy_from_slice(&cur[..self.num_bins]);
            self.last_compare_ms = time_ms;
            self.hit_count = 0;
            self.recompute_current_idx(cfg, time_ms, already_present);
            return (self.current_idx, CompareOutcome::Skipped);
        }

        let mut any_hit = false;
        for k in cfg.min_range_bin..=cfg.max_range_bin {
            let diff = cur[k] - self.last_compare[k];
            let mut score = diff.norm() * (0.2 * (k as f32 + 1.0));
            if bandpass_enabled {
                score *= 0.5 / 0.45;
            }
            if score >= self.max_macro {
                self.max_macro = score;
                self.max_macro_idx = k as i32;
            }
            if score >= cfg.macro_threshold {
                self.detect_timestamps[k] = time_ms + cfg.macro_movement_validity_ms;
                self.detect_confidences[k] = score - cfg.macro_threshold;
                any_hit = true;
            }
        }

        if any_hit {
            self.hit_count += 1;
        } else {
            self.hit_count = 0;
        }
        self.last_compare[..self.num_bins].copy_from_slice(&cur[..self.num_bins]);
        self.last_compare_ms = time_ms;

        self.recompute_current_idx(cfg, time_ms, already_present);

        (self.current_idx, CompareOutcome::Evaluated)
    }

    /// Re-derive `current_idx` from the confirmation counter and the live
    /// per-bin validity timestamps. Shared between the normal `Evaluated`
    /// path and the `Skipped` path, which also resets progress toward
    /// `macro_movement_confirmations`.
    fn recompute_current_idx(&mut self, cfg: &Config, time_ms: u64, already_present: bool) {
        if self.hit_count >= cfg.macro_movement_confirmations {
            let hot_count = (cfg.min_range_bin..=cfg.max_range_bin)
                .filter(|&k| time_ms <= self.detect_timestamps[k])
                .count();
            if hot_count >= cfg.macro_trigger_range || already_present {
                self.current_idx = (cfg.min_range_bin..=cfg.max_range_bin)
                    .find(|&k| time_ms <= self.detect_timestamps[k])
                    .map(|k| k as i32)
                    .unwrap_or(-1);
            } else {
                self.current_idx = -1;
            }
        }
    }

    /// Whether bin `k` currently carries a live macro detection.
    pub fn is_hot(&self, k: usize, time_ms: u64) -> bool {
        time_ms <= self.detect_timestamps[k]
    }

    /// Expiry timestamp last recorded for bin `k` (0 if never hit).
    pub fn detect_timestamp(&self, k: usize) -> u64 {
        self.detect_timestamps[k]
    }

    /// Clear-on-read inspection of the running maximum macro score.
    pub fn take_max(&mut self) -> Option<(f32, i32)> {
        if self.max_macro_idx < 0 {
            return None;
        }
        let result = (self.max_macro, self.max_macro_idx);
        self.max_macro = 0.0;
        self.max_macro_idx = -1;
        Some(result)
    }

    pub fn reset(&mut self) {
        self.last_compare.iter_mut().for_each(|c| *c = Complex32::new(0.0, 0.0));
        self.last_compare_init = false;
        self.last_compare_ms = 0;
        self.hit_count = 0;
        self.detect_timestamps.iter_mut().for_each(|t| *t = 0);
        self.detect_confidences.iter_mut().for_each(|c| *c = 0.0);
        self.max_macro = 0.0;
        self.max_macro_idx = -1;
        self.current_idx = -1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn cfg() -> Config {
        Config {
            macro_compare_interval_ms: 250,
            macro_movement_validity_ms: 1000,
            macro_threshold: 1.0,
            macro_movement_confirmations: 0,
            macro_trigger_range: 1,
            min_range_bin: 1,
            max_range_bin: 5,
            ..Config::default()
        }
    }

    #[test]
    fn identical_frames_never_hit() {
        let cfg = cfg();
        let mut det = MacroDetector::new(8);
        let spectrum = vec![Complex32::new(0.3, 0.1); 8];
        let (idx0, o0) = det.process(&spectrum, 0, &cfg, false, false, true);
        assert_eq!(idx0, -1);
        assert_eq!(o0, CompareOutcome::TooSoon);
        let (idx1, o1) = det.process(&spectrum, 250, &cfg, false, false, true);
        assert_eq!(idx1, -1);
        assert_eq!(o1, CompareOutcome::Evaluated);
    }

    #[test]
    fn strong_diff_triggers_hit() {
        let cfg = cfg();
        let mut det = MacroDetector::new(8);
        let quiet = vec![Complex32::new(0.0, 0.0); 8];
        let mut loud = quiet.clone();
        loud[5] = Complex32::new(50.0, 0.0);

        det.process(&quiet, 0, &cfg, false, false, true);
        let (idx, outcome) = det.process(&loud, 250, &cfg, false, false, true);
        assert_eq!(outcome, CompareOutcome::Evaluated);
        assert_eq!(idx, 5);
    }

    #[test]
    fn window_skip_beyond_double_interval_refreshes_baseline() {
        let cfg = cfg();
        let mut det = MacroDetector::new(8);
        let quiet = vec![Complex32::new(0.0, 0.0); 8];
        det.process(&quiet, 0, &cfg, false, false, true);
        let (_, outcome) = det.process(&quiet, 10_000, &cfg, false, false, true);
        assert_eq!(outcome, CompareOutcome::Skipped);
    }

    #[test]
    fn take_max_clears_on_read() {
        let cfg = cfg();
        let mut det = MacroDetector::new(8);
        let quiet = vec![Complex32::new(0.0, 0.0); 8];
        let mut loud = quiet.clone();
        loud[5] = Complex32::new(50.0, 0.0);
        det.process(&quiet, 0, &cfg, false, false, true);
        det.process(&loud, 250, &cfg, false, false, true);
        assert!(det.take_max().is_some());
        assert!(det.take_max().is_none());
    }

    #[test]
    fn not_warm_yet_mutates_nothing() {
        let cfg = cfg();
        let mut det = MacroDetector::new(8);
        let quiet = vec![Complex32::new(0.0, 0.0); 8];
        let mut loud = quiet.clone();
        loud[5] = Complex32::new(50.0, 0.0);

        // Not warm: even a strong differing frame must not bootstrap the
        // baseline, advance hit_count, or touch the max-score tracker.
        let (idx0, o0) = det.process(&quiet, 0, &cfg, false, false, false);
        assert_eq!(idx0, -1);
        assert_eq!(o0, CompareOutcome::TooSoon);
        let (idx1, o1) = det.process(&loud, 250, &cfg, false, false, false);
        assert_eq!(idx1, -1);
        assert_eq!(o1, CompareOutcome::TooSoon);
        assert!(det.take_max().is_none());

        // Once warm, the baseline has still never been bootstrapped, so
        // the very next call is a fresh TooSoon bootstrap, not an Evaluated
        // comparison against the earlier (should-have-been-ignored) frame.
        let (idx2, o2) = det.process(&loud, 500, &cfg, false, false, true);
        assert_eq!(idx2, -1);
        assert_eq!(o2, CompareOutcome::TooSoon);
    }

    #[test]
    fn skip_beyond_double_interval_resets_hit_count_with_confirmations() {
        let mut cfg = cfg();
        cfg.macro_movement_confirmations = 2;
        let mut det = MacroDetector::new(8);
        let quiet = vec![Complex32::new(0.0, 0.0); 8];
        let mut loud = quiet.clone();
        loud[5] = Complex32::new(50.0, 0.0);

        det.process(&quiet, 0, &cfg, false, false, true);
        // One hit: hit_count -> 1, short of the confirmation threshold.
        let (idx, outcome) = det.process(&loud, 250, &cfg, false, false, true);
        assert_eq!(outcome, CompareOutcome::Evaluated);
        assert_eq!(idx, -1);

        // A long gap forces Skipped, which must wipe hit_count back to 0.
        let (idx, outcome) = det.process(&loud, 100_000, &cfg, false, false, true);
        assert_eq!(outcome, CompareOutcome::Skipped);
        assert_eq!(idx, -1);

        // A single further hit must not be enough to confirm, since the
        // skip should have reset progress rather than leaving it at 1/2.
        let mut loud2 = loud.clone();
        loud2[5] = Complex32::new(0.0, 0.0);
        let (idx, outcome) = det.process(&loud2, 100_250, &cfg, false, false, true);
        assert_eq!(outcome, CompareOutcome::Evaluated);
        assert_eq!(idx, -1, "a single post-skip hit must not confirm when confirmations=2");
    }
}
