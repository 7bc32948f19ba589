//! Error Types
//!
//! Typed failure modes for the presence detector. Mirrors the status-code
//! contract of the reference implementation (`OK` / `MEM_ERROR` /
//! `FFT_LEN_ERROR` / `IFX_DSP_ERROR`) as a `Result`-returning API instead of
//! an out-parameter status code.

use thiserror::Error;

/// Failure modes surfaced by allocation, reconfiguration, and per-frame
/// processing.
#[derive(Debug, Error)]
pub enum DetectorError {
    /// Buffer allocation failed during `alloc`.
    #[error("allocation failed")]
    Mem,

    /// `num_samples_per_chirp` or `micro_fft_size` is not a supported FFT
    /// length (must be a power of two within the planner's supported range).
    #[error("unsupported FFT length: {0}")]
    FftLen(usize),

    /// The FFT backend rejected an operation during `process_frame`.
    #[error("DSP backend error: {0}")]
    Dsp(String),
}

pub type Result<T> = std::result::Result<T, DetectorError>;
