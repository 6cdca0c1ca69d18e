// In: src/error.rs

//! This module defines the single, unified error type for the entire fastmp3 library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.
//!
//! Rust callers get the full taxonomy; the C ABI in `ffi` collapses it back to
//! the legacy numeric codes via [`Mp3Error::boundary_code`] so the foreign host
//! observes exactly the values it always has.

use thiserror::Error;

/// Numeric code returned across the C boundary when the input cannot be opened
/// as an MP3 stream, or when it opens with zero metadata. The two cases are
/// deliberately not distinguished at the boundary (legacy contract); use the
/// enum variants on the Rust side when the distinction matters.
pub const CODE_OPEN_FAILED: i32 = -100;

/// Numeric code returned across the C boundary when a requested start offset
/// could not be honored.
pub const CODE_SEEK_FAILED: i32 = -200;

#[derive(Error, Debug)]
pub enum Mp3Error {
    // =========================================================================
    // === High-Level, Semantic Errors (Specific to our library's logic)
    // =========================================================================
    /// The input is not a parseable MP3 container: no decodable frame was found.
    #[error("could not open MP3 stream: {0}")]
    Open(String),

    /// The container opened, but reported zero channels, sample rate, or
    /// bitrate. Malformed headers can parse "successfully" with zero metadata,
    /// so this is validated explicitly after every open.
    #[error("MP3 stream opened with invalid metadata (channels={channels}, hz={hz}, bitrate_kbps={bitrate_kbps})")]
    InvalidMetadata {
        channels: u32,
        hz: u32,
        bitrate_kbps: u32,
    },

    /// The engine could not position the stream at the requested interleaved
    /// sample offset (typically: offset beyond the end of the stream).
    #[error("could not seek to interleaved sample offset {0}")]
    Seek(u64),

    /// A read fell short of the requested count and the engine reported a
    /// nonzero error code. The code is surfaced raw across the boundary.
    #[error("decoder reported error code {0} after a short read")]
    Engine(i32),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the underlying I/O subsystem (e.g., file not found).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Mp3Error {
    /// Maps the error to the numeric code observed by the foreign host.
    ///
    /// `Open`, `InvalidMetadata` and `Io` all collapse to [`CODE_OPEN_FAILED`];
    /// this conflation is a compatibility requirement, not an oversight.
    pub fn boundary_code(&self) -> i32 {
        match self {
            Mp3Error::Open(_) | Mp3Error::InvalidMetadata { .. } | Mp3Error::Io(_) => {
                CODE_OPEN_FAILED
            }
            Mp3Error::Seek(_) => CODE_SEEK_FAILED,
            Mp3Error::Engine(code) => *code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_codes_preserve_legacy_values() {
        assert_eq!(Mp3Error::Open("x".into()).boundary_code(), -100);
        assert_eq!(
            Mp3Error::InvalidMetadata {
                channels: 0,
                hz: 44100,
                bitrate_kbps: 128
            }
            .boundary_code(),
            -100
        );
        assert_eq!(Mp3Error::Seek(4096).boundary_code(), -200);
        assert_eq!(Mp3Error::Engine(-5).boundary_code(), -5);
        let io = Mp3Error::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(io.boundary_code(), -100);
    }
}
