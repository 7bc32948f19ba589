//! Slow-time history ring for the micro track.
//!
//! Modeled as a struct owning a `rows × cols` complex matrix plus a write
//! index and a "lapped at least once" flag, mutated only through indexed
//! access (never through aliased handles or a pointer graph), per the
//! cyclic-ring design note. A second small matrix accumulates raw spectra
//! between decimated writes when decimation is enabled.

use rustfft::num_complex::Complex32;

use crate::constants::DECIMATION_FACTOR;

/// `rows × cols` matrix of complex range spectra, written one row per
/// micro-track update and read back one column at a time.
pub struct HistoryRing {
    rows: usize,
    cols: usize,
    data: Vec<Complex32>,
    write_row: usize,
    full: bool,
}

impl HistoryRing {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![Complex32::new(0.0, 0.0); rows * cols],
            write_row: 0,
            full: false,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_full(&self) -> bool {
        self.full
    }

    pub fn write_row_idx(&self) -> usize {
        self.write_row
    }

    fn row_mut(&mut self, row: usize) -> &mut [Complex32] {
        let start = row * self.cols;
        &mut self.data[start..start + self.cols]
    }

    fn row(&self, row: usize) -> &[Complex32] {
        let start = row * self.cols;
        &self.data[start..start + self.cols]
    }

    /// Write a full range spectrum as the next row, advancing the write
    /// index and setting the "full" flag once one full lap completes.
    pub fn push_row(&mut self, spectrum: &[Complex32]) {
        debug_assert!(spectrum.len() >= self.cols);
        let row = self.write_row;
        let cols = self.cols;
        self.row_mut(row).copy_from_slice(&spectrum[..cols]);
        self.write_row = (self.write_row + 1) % self.rows;
        if self.write_row == 0 {
            self.full = true;
        }
    }

    /// Read column `col` starting at the oldest row (the current write
    /// row) and proceeding cyclically for `rows` entries.
    pub fn read_column(&self, col: usize, out: &mut [Complex32]) {
        debug_assert_eq!(out.len(), self.rows);
        for (i, slot) in out.iter_mut().enumerate() {
            let row = (self.write_row + i) % self.rows;
            *slot = self.row(row)[col];
        }
    }

    pub fn reset(&mut self) {
        self.data.iter_mut().for_each(|c| *c = Complex32::new(0.0, 0.0));
        self.write_row = 0;
        self.full = false;
    }
}

/// Side buffer accumulating `DECIMATION_FACTOR` raw spectra between
/// decimated writes into the `HistoryRing`.
pub struct DecimationCarry {
    cols: usize,
    data: Vec<Complex32>,
    count: usize,
}

impl DecimationCarry {
    pub fn new(cols: usize) -> Self {
        Self {
            cols,
            data: vec![Complex32::new(0.0, 0.0); DECIMATION_FACTOR * cols],
            count: 0,
        }
    }

    fn row_mut(&mut self, row: usize) -> &mut [Complex32] {
        let start = row * self.cols;
        &mut self.data[start..start + self.cols]
    }

    /// Accumulate a raw spectrum. Returns `true` once `DECIMATION_FACTOR`
    /// spectra have been collected (ready to decimate); the counter then
    /// wraps back to zero.
    pub fn push(&mut self, spectrum: &[Complex32]) -> bool {
        debug_assert!(spectrum.len() >= self.cols);
        let row = self.count;
        let cols = self.cols;
        self.row_mut(row).copy_from_slice(&spectrum[..cols]);
        self.count += 1;
        if self.count == DECIMATION_FACTOR {
            self.count = 0;
            true
        } else {
            false
        }
    }

    /// Gather the `DECIMATION_FACTOR` accumulated samples for bin `col`,
    /// oldest first.
    pub fn column(&self, col: usize, out: &mut [Complex32; DECIMATION_FACTOR]) {
        for (i, slot) in out.iter_mut().enumerate() {
            let start = i * self.cols;
            *slot = self.data[start + col];
        }
    }

    pub fn reset(&mut self) {
        self.data.iter_mut().for_each(|c| *c = Complex32::new(0.0, 0.0));
        self.count = 0;
    }
}
