// In: src/session.rs

//! The decode session: one engine handle, bound to one input source, for the
//! duration of one orchestrator call.
//!
//! A session is created by `open_buffer`/`open_file`, mutated by `seek` and
//! `read_into`, and closed when it is dropped. Ownership makes the open/close
//! pairing structural: every exit path out of an orchestrator (success,
//! validation failure, seek failure, short read) drops the session exactly
//! once, so an engine handle can neither leak nor be closed twice.

use std::path::Path;

use log::debug;

use crate::engine::{BlockOutcome, EngineStream, E_DECODE};
use crate::error::Mp3Error;

/// Whether opening the session walks the whole stream up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scan {
    /// Decode every frame at open to learn the exact total sample count and
    /// the stream-wide average bitrate. Used by the probe path; the scan
    /// consumes the stream, so a fully scanned session is not read from.
    Full,
    /// Stop after the first decodable block. Faster; total duration stays
    /// unknown. Used by the windowed-decode path.
    Skip,
}

/// An open decode session. Field meanings follow the probe record: counts are
/// interleaved samples unless stated otherwise.
pub struct DecodeSession {
    stream: EngineStream,
    channels: u32,
    sample_rate: u32,
    bitrate_kbps: u32,
    /// Total interleaved samples in the stream; known only after a full scan.
    total_samples: Option<u64>,
    /// Decoded samples pulled from the engine but not yet handed to a reader.
    pending: Vec<f32>,
    pending_offset: usize,
    /// Interleaved read cursor.
    cursor: u64,
    last_error: i32,
}

impl DecodeSession {
    /// Opens a session over an in-memory buffer.
    pub fn open_buffer(data: &[u8], scan: Scan) -> Result<Self, Mp3Error> {
        Self::from_stream(EngineStream::open_buffer(data)?, scan)
    }

    /// Opens a session over a file on disk.
    pub fn open_file(path: &Path, scan: Scan) -> Result<Self, Mp3Error> {
        Self::from_stream(EngineStream::open_file(path)?, scan)
    }

    fn from_stream(mut stream: EngineStream, scan: Scan) -> Result<Self, Mp3Error> {
        let channels = stream.channels();
        let sample_rate = stream.sample_rate();

        // The first block both proves the stream is decodable and seeds the
        // bitrate estimate for the no-scan path.
        let first = loop {
            match stream.next_block() {
                BlockOutcome::Block(block) => break block,
                BlockOutcome::Corrupt => continue,
                BlockOutcome::End => {
                    return Err(Mp3Error::Open("no decodable audio frames".to_string()))
                }
            }
        };

        let mut session = Self {
            stream,
            channels,
            sample_rate,
            bitrate_kbps: 0,
            total_samples: None,
            pending: first.samples,
            pending_offset: 0,
            cursor: 0,
            last_error: 0,
        };

        let mut compressed_total = first.compressed_bytes as u64;
        let mut interleaved_total = session.pending.len() as u64;

        if scan == Scan::Full {
            loop {
                match session.stream.next_block() {
                    BlockOutcome::Block(block) => {
                        compressed_total += block.compressed_bytes as u64;
                        interleaved_total += block.samples.len() as u64;
                    }
                    BlockOutcome::Corrupt => session.last_error = E_DECODE,
                    BlockOutcome::End => break,
                }
            }
            session.total_samples = Some(interleaved_total);
        }

        let frames = if channels == 0 {
            0
        } else {
            interleaved_total / channels as u64
        };
        session.bitrate_kbps =
            crate::engine::average_bitrate_kbps(compressed_total, frames, sample_rate);

        debug!(
            "session open: scan={scan:?} channels={} hz={} bitrate={}kbps total={:?}",
            session.channels, session.sample_rate, session.bitrate_kbps, session.total_samples
        );
        Ok(session)
    }

    pub fn channels(&self) -> u32 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn bitrate_kbps(&self) -> u32 {
        self.bitrate_kbps
    }

    /// Total interleaved samples; `None` unless opened with [`Scan::Full`].
    pub fn total_samples(&self) -> Option<u64> {
        self.total_samples
    }

    /// Engine error code recorded during the most recent read, 0 if none.
    pub fn last_error(&self) -> i32 {
        self.last_error
    }

    /// Current read cursor, in interleaved samples from the stream start.
    pub fn position(&self) -> u64 {
        self.cursor
    }

    /// Checks the all-or-nothing metadata contract: channel count, sample
    /// rate, and bitrate must all be nonzero even when the open succeeded.
    pub fn validate_metadata(&self) -> Result<(), Mp3Error> {
        if self.channels == 0 || self.sample_rate == 0 || self.bitrate_kbps == 0 {
            return Err(Mp3Error::InvalidMetadata {
                channels: self.channels,
                hz: self.sample_rate,
                bitrate_kbps: self.bitrate_kbps,
            });
        }
        Ok(())
    }

    /// Positions the read cursor at `target`, an offset in interleaved sample
    /// space. The engine lands on a frame boundary at or before the target;
    /// the remainder is decoded and discarded so the next read starts exactly
    /// at `target`. An offset of exactly the stream total is valid: the seek
    /// succeeds and the next read returns 0. Only offsets past the end fail.
    pub fn seek(&mut self, target: u64) -> Result<(), Mp3Error> {
        if self.channels == 0 {
            return Err(Mp3Error::Seek(target));
        }
        let target_frame = target / self.channels as u64;
        // The engine refuses timestamps at or past its final packet, but a
        // request for the very end of the stream must still succeed. When the
        // engine cannot land at or before the target, walk forward from the
        // start instead and let the skip loop settle whether the offset is
        // reachable.
        let landed = match self.stream.seek_to_frame(target_frame) {
            Ok(landed) if landed <= target_frame => landed,
            Ok(_) | Err(_) => self
                .stream
                .seek_to_frame(0)
                .map_err(|_| Mp3Error::Seek(target))?,
        };

        self.pending.clear();
        self.pending_offset = 0;

        let mut to_skip = target - landed * self.channels as u64;
        while to_skip > 0 {
            match self.stream.next_block() {
                BlockOutcome::Block(block) => {
                    if (block.samples.len() as u64) <= to_skip {
                        to_skip -= block.samples.len() as u64;
                    } else {
                        self.pending = block.samples;
                        self.pending_offset = to_skip as usize;
                        to_skip = 0;
                    }
                }
                BlockOutcome::Corrupt => {
                    self.last_error = E_DECODE;
                }
                BlockOutcome::End => {
                    debug!("seek past end of stream (target {target})");
                    return Err(Mp3Error::Seek(target));
                }
            }
        }

        self.cursor = target;
        Ok(())
    }

    /// Reads up to `out.len()` interleaved samples into `out`, returning the
    /// count actually written. A count short of `out.len()` means end of
    /// stream unless [`last_error`](Self::last_error) is nonzero.
    pub fn read_into(&mut self, out: &mut [f32]) -> usize {
        let mut written = 0;

        while written < out.len() {
            let avail = self.pending.len() - self.pending_offset;
            if avail > 0 {
                let take = avail.min(out.len() - written);
                let src = &self.pending[self.pending_offset..self.pending_offset + take];
                out[written..written + take].copy_from_slice(src);
                self.pending_offset += take;
                written += take;
                continue;
            }

            match self.stream.next_block() {
                BlockOutcome::Block(block) => {
                    self.pending = block.samples;
                    self.pending_offset = 0;
                }
                BlockOutcome::Corrupt => {
                    self.last_error = E_DECODE;
                }
                BlockOutcome::End => break,
            }
        }

        self.cursor += written as u64;
        written
    }
}
