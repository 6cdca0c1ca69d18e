// In: src/decode.rs

//! The windowed-decode orchestrator and the whole-buffer fallback.
//!
//! The windowed path opens without scanning (total duration is not needed),
//! optionally seeks, clamps the read to the caller's capacity and requested
//! length, and maps the outcome per the boundary contract. The bulk path
//! skips sessions entirely and leans on the engine's single-shot load.

use std::path::Path;

use crate::engine;
use crate::error::Mp3Error;
use crate::session::{DecodeSession, Scan};

/// The sample window requested by a caller, in per-channel samples.
/// Zero means "unset": start from the beginning / read to capacity.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowSpec {
    pub start: u64,
    pub length: u64,
}

/// Decodes a window of interleaved samples from an in-memory buffer into
/// `out`, returning the count actually written.
pub fn decode_buffer_window(
    data: &[u8],
    out: &mut [f32],
    window: WindowSpec,
) -> Result<usize, Mp3Error> {
    let session = DecodeSession::open_buffer(data, Scan::Skip)?;
    run_window(session, out, window)
}

/// Decodes a window of interleaved samples from a file into `out`.
pub fn decode_file_window(
    path: &Path,
    out: &mut [f32],
    window: WindowSpec,
) -> Result<usize, Mp3Error> {
    let session = DecodeSession::open_file(path, Scan::Skip)?;
    run_window(session, out, window)
}

fn run_window(
    mut session: DecodeSession,
    out: &mut [f32],
    window: WindowSpec,
) -> Result<usize, Mp3Error> {
    session.validate_metadata()?;
    let channels = session.channels() as u64;

    if window.start != 0 {
        session.seek(window.start * channels)?;
    }

    // The windowing clamp: never more than the caller's storage, never more
    // than the caller explicitly asked for.
    let mut max_read = out.len();
    if window.length != 0 {
        let requested = window.length.saturating_mul(channels);
        if requested < max_read as u64 {
            max_read = requested as usize;
        }
    }

    let read = session.read_into(&mut out[..max_read]);

    // Short of the ceiling *and* the engine flagged a fault: surface the raw
    // code. Short with no fault is simply end-of-stream.
    if read != max_read && session.last_error() != 0 {
        return Err(Mp3Error::Engine(session.last_error()));
    }
    Ok(read)
}

/// A fully decoded buffer with its stream parameters. Produced by
/// [`decode_bulk_buffer`]; the sample storage is plainly owned by the caller
/// from here on (the C boundary wraps this in a raw-pointer record with an
/// explicit release call).
pub struct BulkDecode {
    pub samples: Vec<f32>,
    pub channels: u32,
    pub sample_rate_hz: u32,
    pub avg_bitrate_kbps: u32,
}

impl From<engine::LoadedBuffer> for BulkDecode {
    fn from(loaded: engine::LoadedBuffer) -> Self {
        Self {
            samples: loaded.samples,
            channels: loaded.channels,
            sample_rate_hz: loaded.sample_rate,
            avg_bitrate_kbps: loaded.avg_bitrate_kbps,
        }
    }
}

/// Decodes an entire in-memory buffer in one call via the engine's
/// single-shot load primitive. No windowing, no seeking.
pub fn decode_bulk_buffer(data: &[u8]) -> Result<BulkDecode, Mp3Error> {
    engine::load_buffer(data).map(BulkDecode::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata;

    const INTERLEAVED_PER_FRAME: usize = testdata::FRAME_SAMPLES * testdata::TEST_CHANNELS;

    #[test]
    fn test_full_read_stops_at_end_of_stream() {
        let frames = 8;
        let data = testdata::silent_stream(frames);
        let total = frames * INTERLEAVED_PER_FRAME;
        let mut out = vec![0.0f32; total + 4096];
        let read = decode_buffer_window(&data, &mut out, WindowSpec::default()).unwrap();
        assert_eq!(read, total);
    }

    #[test]
    fn test_capacity_clamps_read() {
        let data = testdata::silent_stream(8);
        let mut out = vec![0.0f32; 1000];
        let read = decode_buffer_window(&data, &mut out, WindowSpec::default()).unwrap();
        assert_eq!(read, 1000);
    }

    #[test]
    fn test_length_clamps_below_capacity() {
        let data = testdata::silent_stream(8);
        let mut out = vec![0.0f32; 8 * INTERLEAVED_PER_FRAME];
        let window = WindowSpec {
            start: 0,
            length: 100,
        };
        let read = decode_buffer_window(&data, &mut out, window).unwrap();
        assert_eq!(read, 100 * testdata::TEST_CHANNELS);
    }

    #[test]
    fn test_length_beyond_capacity_is_ignored() {
        let data = testdata::silent_stream(4);
        let mut out = vec![0.0f32; 512];
        let window = WindowSpec {
            start: 0,
            length: u64::MAX / 4,
        };
        let read = decode_buffer_window(&data, &mut out, window).unwrap();
        assert_eq!(read, 512);
    }

    #[test]
    fn test_start_offsets_the_window() {
        let frames = 8;
        let data = testdata::silent_stream(frames);
        let mut out = vec![0.0f32; frames * INTERLEAVED_PER_FRAME];
        let window = WindowSpec {
            start: ((frames - 1) * testdata::FRAME_SAMPLES) as u64,
            length: 0,
        };
        let read = decode_buffer_window(&data, &mut out, window).unwrap();
        assert_eq!(read, INTERLEAVED_PER_FRAME);
    }

    #[test]
    fn test_start_at_exact_end_reads_zero() {
        let frames = 4;
        let data = testdata::silent_stream(frames);
        let mut out = vec![0.0f32; 256];
        let window = WindowSpec {
            start: (frames * testdata::FRAME_SAMPLES) as u64,
            length: 0,
        };
        let read = decode_buffer_window(&data, &mut out, window).unwrap();
        assert_eq!(read, 0);
    }

    #[test]
    fn test_mid_stream_corruption_surfaces_engine_code() {
        let data = testdata::corrupt_tail_stream(3);
        let mut out = vec![0.0f32; 10 * INTERLEAVED_PER_FRAME];
        let err = decode_buffer_window(&data, &mut out, WindowSpec::default()).unwrap_err();
        assert!(matches!(err, Mp3Error::Engine(crate::engine::E_DECODE)));
        assert_eq!(err.boundary_code(), crate::engine::E_DECODE);
    }

    #[test]
    fn test_start_past_end_is_a_seek_error() {
        let data = testdata::silent_stream(3);
        let mut out = vec![0.0f32; 128];
        let window = WindowSpec {
            start: (100 * testdata::FRAME_SAMPLES) as u64,
            length: 0,
        };
        let err = decode_buffer_window(&data, &mut out, window).unwrap_err();
        assert!(matches!(err, Mp3Error::Seek(_)));
        assert_eq!(err.boundary_code(), crate::error::CODE_SEEK_FAILED);
    }

    #[test]
    fn test_garbage_input_is_an_open_error() {
        let mut out = vec![0.0f32; 128];
        let err = decode_buffer_window(&[0u8; 256], &mut out, WindowSpec::default()).unwrap_err();
        assert_eq!(err.boundary_code(), crate::error::CODE_OPEN_FAILED);
    }

    #[test]
    fn test_windowed_decode_is_deterministic() {
        let data = testdata::silent_stream(5);
        let window = WindowSpec {
            start: 300,
            length: 700,
        };
        let mut a = vec![0.0f32; 4096];
        let mut b = vec![0.0f32; 4096];
        let ra = decode_buffer_window(&data, &mut a, window).unwrap();
        let rb = decode_buffer_window(&data, &mut b, window).unwrap();
        assert_eq!(ra, rb);
        assert_eq!(a, b);
    }

    #[test]
    fn test_bulk_decode_returns_whole_stream() {
        let frames = 6;
        let data = testdata::silent_stream(frames);
        let bulk = decode_bulk_buffer(&data).unwrap();
        assert_eq!(bulk.samples.len(), frames * INTERLEAVED_PER_FRAME);
        assert_eq!(bulk.channels, testdata::TEST_CHANNELS as u32);
        assert_eq!(bulk.sample_rate_hz, testdata::TEST_HZ);
        assert_eq!(bulk.avg_bitrate_kbps, testdata::TEST_BITRATE_KBPS);
    }

    #[test]
    fn test_bulk_decode_rejects_garbage() {
        assert!(decode_bulk_buffer(&[1u8, 2, 3, 4]).is_err());
    }

    #[test]
    fn test_probe_and_bulk_agree_on_totals() {
        let data = testdata::silent_stream(9);
        let info = crate::probe::probe_buffer(&data).unwrap();
        let bulk = decode_bulk_buffer(&data).unwrap();
        assert_eq!(
            info.samples as usize * info.channels as usize,
            bulk.samples.len()
        );
    }
}
