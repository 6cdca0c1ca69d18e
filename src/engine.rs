// In: src/engine.rs

//! The boundary to the external MP3 decoding engine.
//!
//! All bitstream parsing, Huffman decoding, and synthesis filtering is
//! delegated to symphonia; this module adapts its probe/format/decoder API to
//! the narrow contract the rest of the crate relies on: open a source, pull
//! the next block of interleaved f32 samples, seek to a frame, and a
//! single-shot whole-buffer load. Nothing above this file touches symphonia.

use std::io::Cursor;
use std::path::Path;

use log::{debug, warn};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as EngineFault;
use symphonia::core::formats::{FormatOptions, FormatReader, SeekMode, SeekTo};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::Mp3Error;

//==================================================================================
// 1. Engine Error-Code Vocabulary
//==================================================================================
// The foreign host's error table hard-codes the classic minimp3 codes, so the
// raw-code channel of the windowed read keeps speaking them.

/// Parameter error.
pub const E_PARAM: i32 = -1;
/// Memory allocation error.
pub const E_MEMORY: i32 = -2;
/// IO error.
pub const E_IOERROR: i32 = -3;
/// User error.
pub const E_USER: i32 = -4;
/// Mid-stream decoding error (corrupted frame).
pub const E_DECODE: i32 = -5;

//==================================================================================
// 2. Streaming Primitives
//==================================================================================

/// One decoded block of interleaved samples, together with the compressed size
/// it was produced from (needed for average-bitrate accounting).
pub struct Block {
    pub samples: Vec<f32>,
    pub compressed_bytes: usize,
}

/// Outcome of pulling the next block from the engine.
pub enum BlockOutcome {
    /// A block of samples was decoded.
    Block(Block),
    /// A frame was present but could not be decoded (mid-stream corruption).
    /// The stream remains readable; callers decide whether to record or skip.
    Corrupt,
    /// No more audio data in the source.
    End,
}

/// An open engine handle: one source, one format reader, one decoder.
///
/// Dropping the handle closes the engine; there is no explicit close call to
/// forget or to double-invoke.
pub struct EngineStream {
    reader: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    channels: u32,
    sample_rate: u32,
}

impl EngineStream {
    /// Opens an in-memory MP3 buffer.
    pub fn open_buffer(data: &[u8]) -> Result<Self, Mp3Error> {
        let mss = MediaSourceStream::new(Box::new(Cursor::new(data.to_vec())), Default::default());
        let mut hint = Hint::new();
        hint.with_extension("mp3");
        Self::open(mss, hint)
    }

    /// Opens an MP3 file. The whole file is *not* read up front; the engine
    /// streams from it.
    pub fn open_file(path: &Path) -> Result<Self, Mp3Error> {
        let file = std::fs::File::open(path)?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());
        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|s| s.to_str()) {
            hint.with_extension(ext);
        }
        Self::open(mss, hint)
    }

    fn open(mss: MediaSourceStream, hint: Hint) -> Result<Self, Mp3Error> {
        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| Mp3Error::Open(e.to_string()))?;
        let reader = probed.format;

        let track = reader
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| Mp3Error::Open("no supported audio track found".to_string()))?;
        let track_id = track.id;

        // Zero metadata is not an open failure here: the orchestrators
        // validate it explicitly, exactly like the legacy wrapper did.
        let channels = track
            .codec_params
            .channels
            .map(|c| c.count() as u32)
            .unwrap_or(0);
        let sample_rate = track.codec_params.sample_rate.unwrap_or(0);

        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| Mp3Error::Open(e.to_string()))?;

        debug!(
            "engine open: track={} channels={} hz={}",
            track_id, channels, sample_rate
        );

        Ok(Self {
            reader,
            decoder,
            track_id,
            channels,
            sample_rate,
        })
    }

    pub fn channels(&self) -> u32 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Pulls and decodes the next block of interleaved samples.
    pub fn next_block(&mut self) -> BlockOutcome {
        loop {
            let packet = match self.reader.next_packet() {
                Ok(packet) => packet,
                Err(EngineFault::IoError(ref err))
                    if err.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    return BlockOutcome::End;
                }
                Err(err) => {
                    warn!("engine read fault: {err}");
                    return BlockOutcome::End;
                }
            };

            if packet.track_id() != self.track_id {
                continue;
            }
            let compressed_bytes = packet.buf().len();

            match self.decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                    buf.copy_interleaved_ref(decoded);
                    return BlockOutcome::Block(Block {
                        samples: buf.samples().to_vec(),
                        compressed_bytes,
                    });
                }
                Err(EngineFault::DecodeError(err)) => {
                    warn!("corrupt frame: {err}");
                    return BlockOutcome::Corrupt;
                }
                Err(EngineFault::ResetRequired) => {
                    self.decoder.reset();
                    return BlockOutcome::Corrupt;
                }
                Err(err) => {
                    warn!("engine decode fault: {err}");
                    return BlockOutcome::End;
                }
            }
        }
    }

    /// Seeks the engine to the given per-channel frame index. Returns the
    /// frame index the engine actually landed on, which is never past the
    /// request; the caller discards the difference.
    pub fn seek_to_frame(&mut self, frame: u64) -> Result<u64, Mp3Error> {
        let seeked = self
            .reader
            .seek(
                SeekMode::Accurate,
                SeekTo::TimeStamp {
                    ts: frame,
                    track_id: self.track_id,
                },
            )
            .map_err(|e| {
                debug!("engine seek to frame {frame} failed: {e}");
                Mp3Error::Seek(frame)
            })?;
        // The decoder carries inter-frame state (bit reservoir, overlap); it
        // must not survive a reposition of the packet stream.
        self.decoder.reset();
        Ok(seeked.actual_ts)
    }
}

//==================================================================================
// 3. Single-Shot Buffer Load
//==================================================================================

/// A fully decoded stream, produced by [`load_buffer`] in one call.
pub struct LoadedBuffer {
    pub samples: Vec<f32>,
    pub channels: u32,
    pub sample_rate: u32,
    pub avg_bitrate_kbps: u32,
}

/// Decodes an entire in-memory buffer in one call. No windowing, no seeking:
/// callers that want the whole stream and can tolerate one large allocation.
pub fn load_buffer(data: &[u8]) -> Result<LoadedBuffer, Mp3Error> {
    let mut stream = EngineStream::open_buffer(data)?;
    let channels = stream.channels();
    let sample_rate = stream.sample_rate();

    let mut samples = Vec::new();
    let mut compressed_total: u64 = 0;
    loop {
        match stream.next_block() {
            BlockOutcome::Block(block) => {
                compressed_total += block.compressed_bytes as u64;
                samples.extend_from_slice(&block.samples);
            }
            BlockOutcome::Corrupt => continue,
            BlockOutcome::End => break,
        }
    }

    let frames = if channels == 0 {
        0
    } else {
        samples.len() as u64 / channels as u64
    };
    let avg_bitrate_kbps = average_bitrate_kbps(compressed_total, frames, sample_rate);

    Ok(LoadedBuffer {
        samples,
        channels,
        sample_rate,
        avg_bitrate_kbps,
    })
}

//==================================================================================
// 4. Bitrate Accounting
//==================================================================================

/// Average bitrate in kbps, rounded to the nearest integer, for `bytes` of
/// compressed data covering `frames` per-channel frames at `hz`.
pub(crate) fn average_bitrate_kbps(bytes: u64, frames: u64, hz: u32) -> u32 {
    if frames == 0 || hz == 0 {
        return 0;
    }
    let bits_per_second = (bytes as f64 * 8.0 * hz as f64) / frames as f64;
    (bits_per_second / 1000.0).round() as u32
}
