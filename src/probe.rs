// In: src/probe.rs

//! The probe orchestrator: open with a full scan, validate, report, close.
//!
//! Probing is idempotent and side-effect free; the session it opens lives
//! only for the duration of the call and is dropped on every path out.

use std::path::Path;

use crate::error::Mp3Error;
use crate::session::{DecodeSession, Scan};

/// Fixed-shape description of a validated MP3 stream.
///
/// All four fields are strictly positive on success. The all-sentinel record
/// (every field [`StreamInfo::SENTINEL`]) is what the foreign boundary hands
/// out on failure; mixed validity never occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamInfo {
    /// Per-channel sample count (total decoded samples / channels).
    pub samples: i32,
    pub channels: i32,
    pub sample_rate_hz: i32,
    pub bitrate_kbps: i32,
}

impl StreamInfo {
    /// Field value denoting "no valid value".
    pub const SENTINEL: i32 = -1;

    /// The all-sentinel failure record.
    pub fn invalid() -> Self {
        Self {
            samples: Self::SENTINEL,
            channels: Self::SENTINEL,
            sample_rate_hz: Self::SENTINEL,
            bitrate_kbps: Self::SENTINEL,
        }
    }
}

/// Probes an in-memory MP3 buffer.
pub fn probe_buffer(data: &[u8]) -> Result<StreamInfo, Mp3Error> {
    let session = DecodeSession::open_buffer(data, Scan::Full)?;
    describe(&session)
}

/// Probes an MP3 file on disk.
pub fn probe_file(path: &Path) -> Result<StreamInfo, Mp3Error> {
    let session = DecodeSession::open_file(path, Scan::Full)?;
    describe(&session)
}

fn describe(session: &DecodeSession) -> Result<StreamInfo, Mp3Error> {
    session.validate_metadata()?;

    // A full scan always populates the total; the fallback only guards the
    // type-level Option.
    let interleaved = session.total_samples().unwrap_or(0);
    let per_channel = interleaved / session.channels() as u64;

    Ok(StreamInfo {
        samples: saturating_i32(per_channel),
        channels: saturating_i32(session.channels() as u64),
        sample_rate_hz: saturating_i32(session.sample_rate() as u64),
        bitrate_kbps: saturating_i32(session.bitrate_kbps() as u64),
    })
}

fn saturating_i32(v: u64) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata;

    #[test]
    fn test_probe_valid_stream() {
        let frames = 12;
        let data = testdata::silent_stream(frames);
        let info = probe_buffer(&data).unwrap();
        assert_eq!(info.samples, (frames * testdata::FRAME_SAMPLES) as i32);
        assert_eq!(info.channels, testdata::TEST_CHANNELS as i32);
        assert_eq!(info.sample_rate_hz, testdata::TEST_HZ as i32);
        assert_eq!(info.bitrate_kbps, testdata::TEST_BITRATE_KBPS as i32);
        assert!(info.samples > 0 && info.channels > 0);
    }

    #[test]
    fn test_probe_empty_buffer_fails() {
        assert!(matches!(probe_buffer(&[]), Err(Mp3Error::Open(_))));
    }

    #[test]
    fn test_probe_garbage_fails() {
        let garbage: Vec<u8> = (0..4096).map(|i| (i % 251) as u8).collect();
        assert!(probe_buffer(&garbage).is_err());
    }

    #[test]
    fn test_probe_missing_file_fails() {
        assert!(probe_file(Path::new("/no/such/file.mp3")).is_err());
    }

    #[test]
    fn test_probe_is_deterministic() {
        let data = testdata::silent_stream(7);
        let a = probe_buffer(&data).unwrap();
        let b = probe_buffer(&data).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_record_is_all_sentinel() {
        let inv = StreamInfo::invalid();
        assert_eq!(inv.samples, -1);
        assert_eq!(inv.channels, -1);
        assert_eq!(inv.sample_rate_hz, -1);
        assert_eq!(inv.bitrate_kbps, -1);
    }
}
