// In: src/ffi/c_api.rs

//! C ABI entry points for the foreign host (historically Python/ctypes).
//!
//! Contract, preserved from the legacy wrapper:
//! - probe failures return the all-sentinel record `{-1,-1,-1,-1}`;
//! - windowed decode returns a nonnegative sample count, `-100` when the
//!   input cannot be opened or has zero metadata, `-200` when the start
//!   offset cannot be honored, or the raw engine code after a faulted short
//!   read;
//! - `unpackbits` returns 0 on success.
//!
//! Every entry point guards its pointers, catches panics, and fails by
//! return value.

use std::ffi::CStr;
use std::os::raw::{c_char, c_int, c_long};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;

use log::debug;

use crate::bits;
use crate::decode::{self, WindowSpec};
use crate::engine::E_PARAM;
use crate::error::CODE_OPEN_FAILED;
use crate::ffi::init_logging;
use crate::probe;
use crate::probe::StreamInfo;

//==================================================================================
// I. Boundary Records
//==================================================================================

/// Probe result as the host sees it. Matches the legacy `mp3_info` layout.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mp3Info {
    pub samples: c_int,
    pub channels: c_int,
    pub hz: c_int,
    pub bitrate_kbps: c_int,
}

impl Mp3Info {
    fn invalid() -> Self {
        Self {
            samples: StreamInfo::SENTINEL,
            channels: StreamInfo::SENTINEL,
            hz: StreamInfo::SENTINEL,
            bitrate_kbps: StreamInfo::SENTINEL,
        }
    }
}

impl From<StreamInfo> for Mp3Info {
    fn from(info: StreamInfo) -> Self {
        Self {
            samples: info.samples,
            channels: info.channels,
            hz: info.sample_rate_hz,
            bitrate_kbps: info.bitrate_kbps,
        }
    }
}

/// Whole-stream decode result with ownership of `buffer` transferred to the
/// host. Must be released exactly once via [`mp3_bulk_result_free`]; a failed
/// (null-buffer) result may be passed to the release call harmlessly.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Mp3BulkResult {
    pub buffer: *mut f32,
    pub samples: usize,
    pub channels: c_int,
    pub hz: c_int,
    pub avg_bitrate_kbps: c_int,
}

impl Mp3BulkResult {
    fn invalid() -> Self {
        Self {
            buffer: std::ptr::null_mut(),
            samples: 0,
            channels: 0,
            hz: 0,
            avg_bitrate_kbps: 0,
        }
    }
}

fn saturating_c_int(v: usize) -> c_int {
    c_int::try_from(v).unwrap_or(c_int::MAX)
}

fn window_from_raw(start: c_long, length: c_long) -> WindowSpec {
    // Negative values have never been meaningful here; treat them as unset.
    WindowSpec {
        start: start.max(0) as u64,
        length: length.max(0) as u64,
    }
}

/// # Safety
/// `path` must be a valid, NUL-terminated C string.
unsafe fn path_from_raw<'a>(path: *const c_char) -> Option<&'a Path> {
    if path.is_null() {
        return None;
    }
    CStr::from_ptr(path).to_str().ok().map(Path::new)
}

//==================================================================================
// II. Probe
//==================================================================================

/// Probes an MP3 buffer. Returns the all-sentinel record on any failure.
///
/// # Safety
/// `input` must point to `input_size` readable bytes (or be null).
#[no_mangle]
pub unsafe extern "C" fn mp3_probe_buffer(input: *const u8, input_size: c_int) -> Mp3Info {
    init_logging();
    catch_unwind(AssertUnwindSafe(|| {
        if input.is_null() || input_size <= 0 {
            return Mp3Info::invalid();
        }
        let data = std::slice::from_raw_parts(input, input_size as usize);
        match probe::probe_buffer(data) {
            Ok(info) => Mp3Info::from(info),
            Err(err) => {
                debug!("probe_buffer failed: {err}");
                Mp3Info::invalid()
            }
        }
    }))
    .unwrap_or_else(|_| Mp3Info::invalid())
}

/// Probes an MP3 file. Returns the all-sentinel record on any failure.
///
/// # Safety
/// `path` must be a valid, NUL-terminated C string (or null).
#[no_mangle]
pub unsafe extern "C" fn mp3_probe_file(path: *const c_char) -> Mp3Info {
    init_logging();
    catch_unwind(AssertUnwindSafe(|| {
        let path = match path_from_raw(path) {
            Some(p) => p,
            None => return Mp3Info::invalid(),
        };
        match probe::probe_file(path) {
            Ok(info) => Mp3Info::from(info),
            Err(err) => {
                debug!("probe_file failed: {err}");
                Mp3Info::invalid()
            }
        }
    }))
    .unwrap_or_else(|_| Mp3Info::invalid())
}

//==================================================================================
// III. Windowed Decode
//==================================================================================

/// Decodes up to `output_size` interleaved f32 samples from an MP3 buffer,
/// starting at per-channel sample `start`, at most `length` per-channel
/// samples (0 = no limit). Returns the count written or a negative code.
///
/// # Safety
/// `input` must point to `input_size` readable bytes; `output` must point to
/// `output_size` writable f32 slots.
#[no_mangle]
pub unsafe extern "C" fn mp3_decode_buffer(
    input: *const u8,
    input_size: c_int,
    output: *mut f32,
    output_size: c_int,
    start: c_long,
    length: c_long,
) -> c_int {
    init_logging();
    catch_unwind(AssertUnwindSafe(|| {
        if input.is_null() || input_size <= 0 || output.is_null() || output_size < 0 {
            return CODE_OPEN_FAILED;
        }
        let data = std::slice::from_raw_parts(input, input_size as usize);
        let out = std::slice::from_raw_parts_mut(output, output_size as usize);
        match decode::decode_buffer_window(data, out, window_from_raw(start, length)) {
            Ok(read) => saturating_c_int(read),
            Err(err) => {
                debug!("decode_buffer failed: {err}");
                err.boundary_code()
            }
        }
    }))
    .unwrap_or(CODE_OPEN_FAILED)
}

/// File variant of [`mp3_decode_buffer`].
///
/// # Safety
/// `path` must be a valid, NUL-terminated C string; `output` must point to
/// `output_size` writable f32 slots.
#[no_mangle]
pub unsafe extern "C" fn mp3_decode_file(
    path: *const c_char,
    output: *mut f32,
    output_size: c_int,
    start: c_long,
    length: c_long,
) -> c_int {
    init_logging();
    catch_unwind(AssertUnwindSafe(|| {
        let path = match path_from_raw(path) {
            Some(p) => p,
            None => return CODE_OPEN_FAILED,
        };
        if output.is_null() || output_size < 0 {
            return CODE_OPEN_FAILED;
        }
        let out = std::slice::from_raw_parts_mut(output, output_size as usize);
        match decode::decode_file_window(path, out, window_from_raw(start, length)) {
            Ok(read) => saturating_c_int(read),
            Err(err) => {
                debug!("decode_file failed: {err}");
                err.boundary_code()
            }
        }
    }))
    .unwrap_or(CODE_OPEN_FAILED)
}

//==================================================================================
// IV. Bulk Decode Fallback
//==================================================================================

/// Decodes an entire buffer and copies every produced sample into `output`.
/// Returns the interleaved sample count, or 0 on failure. The caller must
/// size `output` for the whole stream (probe first); no capacity check is
/// performed.
///
/// # Safety
/// `input` must point to `input_size` readable bytes; `output` must have room
/// for every sample the stream decodes to.
#[no_mangle]
pub unsafe extern "C" fn mp3_decode_bulk(
    input: *const u8,
    input_size: c_int,
    output: *mut f32,
) -> c_long {
    init_logging();
    catch_unwind(AssertUnwindSafe(|| {
        if input.is_null() || input_size <= 0 || output.is_null() {
            return 0;
        }
        let data = std::slice::from_raw_parts(input, input_size as usize);
        match decode::decode_bulk_buffer(data) {
            Ok(bulk) => {
                let out = std::slice::from_raw_parts_mut(output, bulk.samples.len());
                out.copy_from_slice(&bulk.samples);
                bulk.samples.len() as c_long
            }
            Err(err) => {
                debug!("decode_bulk failed: {err}");
                0
            }
        }
    }))
    .unwrap_or(0)
}

/// Decodes an entire buffer and hands the sample storage itself to the host.
/// The result must be released exactly once via [`mp3_bulk_result_free`]. On
/// failure the returned record has a null `buffer` and zeroed fields.
///
/// # Safety
/// `input` must point to `input_size` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn mp3_decode_bulk_owned(
    input: *const u8,
    input_size: c_int,
) -> Mp3BulkResult {
    init_logging();
    catch_unwind(AssertUnwindSafe(|| {
        if input.is_null() || input_size <= 0 {
            return Mp3BulkResult::invalid();
        }
        let data = std::slice::from_raw_parts(input, input_size as usize);
        match decode::decode_bulk_buffer(data) {
            Ok(bulk) => {
                let boxed = bulk.samples.into_boxed_slice();
                let samples = boxed.len();
                Mp3BulkResult {
                    buffer: Box::into_raw(boxed) as *mut f32,
                    samples,
                    channels: saturating_c_int(bulk.channels as usize),
                    hz: saturating_c_int(bulk.sample_rate_hz as usize),
                    avg_bitrate_kbps: saturating_c_int(bulk.avg_bitrate_kbps as usize),
                }
            }
            Err(err) => {
                debug!("decode_bulk_owned failed: {err}");
                Mp3BulkResult::invalid()
            }
        }
    }))
    .unwrap_or_else(|_| Mp3BulkResult::invalid())
}

/// Releases the storage owned by a [`Mp3BulkResult`]. Passing a failed
/// (null-buffer) result is a no-op; releasing the same result twice is
/// undefined, exactly as with the allocator it replaces.
///
/// # Safety
/// `result` must come from [`mp3_decode_bulk_owned`] and must not have been
/// released before.
#[no_mangle]
pub unsafe extern "C" fn mp3_bulk_result_free(result: Mp3BulkResult) {
    if result.buffer.is_null() {
        return;
    }
    let slice = std::ptr::slice_from_raw_parts_mut(result.buffer, result.samples);
    drop(Box::from_raw(slice));
}

//==================================================================================
// V. Bit Unpacker
//==================================================================================

/// Unpacks `src_size` bytes into `8 * src_size` bytes of 0/1 values,
/// most-significant bit first. Returns 0 on success, the engine parameter
/// code on null pointers.
///
/// # Safety
/// `src` must point to `src_size` readable bytes; `dst` must point to
/// `8 * src_size` writable bytes.
#[no_mangle]
pub unsafe extern "C" fn unpackbits(src: *const u8, src_size: c_int, dst: *mut u8) -> c_int {
    init_logging();
    catch_unwind(AssertUnwindSafe(|| {
        if src.is_null() || dst.is_null() || src_size < 0 {
            return E_PARAM;
        }
        let src = std::slice::from_raw_parts(src, src_size as usize);
        let dst = std::slice::from_raw_parts_mut(dst, src.len() * 8);
        bits::unpack_bits_into(src, dst);
        0
    }))
    .unwrap_or(E_PARAM)
}

//==================================================================================
// VI. Unit Tests
//==================================================================================
