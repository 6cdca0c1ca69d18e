//! This file is the root of the `fastmp3` Rust crate.
//!
//! Its responsibilities are strictly limited to:
//! 1.  Declaring all the top-level modules of the library (`session`, `probe`,
//!     `decode`, ...) so the Rust compiler knows they exist.
//! 2.  Re-exporting the safe, typed API surface for Rust callers linking the
//!     rlib. The flat C ABI for foreign hosts lives in `ffi` and is only
//!     meaningful when the crate is built as a cdylib.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//==================================================================================
// 1. Module Declarations
//==================================================================================
pub mod bits;
pub mod decode;
pub mod engine;
pub mod error;
pub mod ffi;
pub mod probe;
pub mod session;

#[cfg(test)]
pub(crate) mod testdata;

//==================================================================================
// 2. Public Rust API
//==================================================================================
pub use bits::{unpack_bits, unpack_bits_into};
pub use decode::{
    decode_buffer_window, decode_bulk_buffer, decode_file_window, BulkDecode, WindowSpec,
};
pub use error::Mp3Error;
pub use probe::{probe_buffer, probe_file, StreamInfo};
pub use session::{DecodeSession, Scan};
