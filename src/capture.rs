//! Binary capture replay format.
//!
//! Test/demo infrastructure only; `PresenceDetector` never depends on this.
//! Format: `{magic="RADR", u16 version, u16 sample_bytes, u32 frame_index,
//! u32 sample_count}` followed by `sample_count` little-endian `u16`
//! samples.

use std::io::{self, Read};

use crate::frame::ingest_sample;

const MAGIC: &[u8; 4] = b"RADR";

#[derive(Debug, Clone, PartialEq)]
pub struct CapturedFrame {
    pub frame_index: u32,
    pub samples: Vec<f32>,
}

/// Reads consecutive capture frames from any `Read` source.
pub struct CaptureReader<R: Read> {
    inner: R,
}

impl<R: Read> CaptureReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Read the next frame, or `Ok(None)` at clean end-of-stream.
    pub fn next_frame(&mut self) -> io::Result<Option<CapturedFrame>> {
        let mut magic = [0u8; 4];
        match self.inner.read_exact(&mut magic) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e),
        }
        if &magic != MAGIC {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "bad capture magic"));
        }

        let version = read_u16(&mut self.inner)?;
        let sample_bytes = read_u16(&mut self.inner)?;
        let frame_index = read_u32(&mut self.inner)?;
        let sample_count = read_u32(&mut self.inner)?;

        if version != 1 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unsupported capture version {version}"),
            ));
        }
        if sample_bytes != 2 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unsupported sample width {sample_bytes}"),
            ));
        }

        let mut samples = Vec::with_capacity(sample_count as usize);
        for _ in 0..sample_count {
            let raw = read_u16(&mut self.inner)?;
            samples.push(ingest_sample(raw));
        }

        Ok(Some(CapturedFrame {
            frame_index,
            samples,
        }))
    }
}

fn read_u16<R: Read>(r: &mut R) -> io::Result<u16> {
    let mut buf = [0u8; 2];
    r.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

fn read_u32<R: Read>(r: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}
