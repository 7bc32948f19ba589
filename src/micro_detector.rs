//! Micro-movement (breathing) detector: round-robin per-bin Doppler scan
//! over the slow-time history ring.

use rustfft::num_complex::Complex32;

use crate::config::Config;
use crate::fft::FftProcessor;
use crate::history_ring::HistoryRing;

pub struct MicroDetector {
    detect_timestamps: Vec<u64>,
    detect_distances: Vec<f32>,
    max_micro: f32,
    max_micro_idx: i32,
    col_idx: usize,
    all_calculated: bool,
    scratch: Vec<Complex32>,
}

impl MicroDetector {
    pub fn new(num_bins: usize, ring_rows: usize, min_range_bin: usize) -> Self {
        Self {
            detect_timestamps: vec![0; num_bins],
            detect_distances: vec![0.0; num_bins],
            max_micro: 0.0,
            max_micro_idx: -1,
            col_idx: min_range_bin,
            all_calculated: false,
            scratch: vec![Complex32::new(0.0, 0.0); ring_rows],
        }
    }

    /// Process one range bin's slow-time column, round-robin, once the
    /// ring has completed at least one lap. No-op otherwise.
    pub fn scan_one_column(
        &mut self,
        ring: &HistoryRing,
        fft: &mut FftProcessor,
        cfg: &Config,
        time_ms: u64,
    ) {
        if !ring.is_full() {
            return;
        }

        let col = self.col_idx;
        ring.read_column(col, &mut self.scratch);

        let n = self.scratch.len() as f32;
        let mean: Complex32 = self.scratch.iter().copied().sum::<Complex32>() / n;
        for v in self.scratch.iter_mut() {
            *v -= mean;
        }

        fft.doppler_fft(&mut self.scratch);

        let top = cfg.micro_movement_compare_idx.min(self.scratch.len().saturating_sub(1));
        let score: f32 = self.scratch[1..=top].iter().map(|c| c.norm()).sum();

        if score > self.max_micro {
            self.max_micro = score;
            self.max_micro_idx = col as i32;
        }
        if score >= cfg.micro_threshold {
            self.detect_timestamps[col] = time_ms + cfg.micro_movement_validity_ms;
            self.detect_distances[col] = score - cfg.micro_threshold;
        }

        self.col_idx += 1;
        if self.col_idx > cfg.max_range_bin {
            self.col_idx = cfg.min_range_bin;
            self.all_calculated = true;
        }
    }

    pub fn is_hot(&self, k: usize, time_ms: u64) -> bool {
        time_ms <= self.detect_timestamps[k]
    }

    pub fn all_calculated(&self) -> bool {
        self.all_calculated
    }

    pub fn clear_all_calculated(&mut self) {
        self.all_calculated = false;
    }

    /// Expiry timestamp last recorded for bin `k` (0 if never hit).
    pub fn detect_timestamp(&self, k: usize) -> u64 {
        self.detect_timestamps[k]
    }

    /// Select the bin to report this frame. `macro_is_hot` answers whether
    /// a given bin currently carries a live macro detection.
    pub fn select_reported_bin(
        &self,
        cfg: &Config,
        time_ms: u64,
        decimation_enabled: bool,
        last_reported_idx: i32,
        macro_is_hot: impl Fn(usize) -> bool,
    ) -> i32 {
        if !decimation_enabled {
            return (cfg.min_range_bin..=cfg.max_range_bin)
                .find(|&k| self.is_hot(k, time_ms))
                .map(|k| k as i32)
                .unwrap_or(-1);
        }

        if last_reported_idx >= 0 {
            let lri = last_reported_idx as usize;
            let newer_macro = (lri + 1..=cfg.max_range_bin).find(|&k| macro_is_hot(k));
            if let Some(k) = newer_macro {
                return k as i32;
            }
            if self.is_hot(lri, time_ms) {
                return last_reported_idx;
            }
        } else if let Some(k) = (cfg.min_range_bin..=cfg.max_range_bin).find(|&k| macro_is_hot(k))
        {
            return k as i32;
        }

        if self.all_calculated {
            let base_ts = if last_reported_idx >= 0 {
                self.detect_timestamps[last_reported_idx as usize]
            } else {
                0
            };
            let mut best: Option<(usize, f32)> = None;
            for k in cfg.min_range_bin..=cfg.max_range_bin {
                if self.detect_timestamps[k] > base_ts + 2000 {
                    let d = self.detect_distances[k];
                    if best.map_or(true, |(_, bd)| d > bd) {
                        best = Some((k, d));
                    }
                }
            }
            if let Some((k, _)) = best {
                return k as i32;
            }
        }

        -1
    }

    pub fn take_max(&mut self) -> Option<(f32, i32)> {
        if self.max_micro_idx < 0 {
            return None;
        }
        let result = (self.max_micro, self.max_micro_idx);
        self.max_micro = 0.0;
        self.max_micro_idx = -1;
        Some(result)
    }

    pub fn reset(&mut self, min_range_bin: usize) {
        self.detect_timestamps.iter_mut().for_each(|t| *t = 0);
        self.detect_distances.iter_mut().for_each(|d| *d = 0.0);
        self.max_micro = 0.0;
        self.max_micro_idx = -1;
        self.col_idx = min_range_bin;
        self.all_calculated = false;
    }

    pub fn reset_scan_index(&mut self, min_range_bin: usize) {
        self.col_idx = min_range_bin;
    }

    /// Arm every bin from `from_bin` onward as currently hot, used when the
    /// macro track drops into `MICRO_IF_MACRO`/`MICRO_AND_MACRO` hand-off.
    pub fn arm_from(&mut self, from_bin: i32, cfg: &Config, time_ms: u64) {
        for k in cfg.min_range_bin..=cfg.max_range_bin {
            self.detect_timestamps[k] = if k as i32 >= from_bin {
                time_ms + cfg.micro_movement_validity_ms
            } else {
                0
            };
        }
    }
}
