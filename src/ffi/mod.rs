// In: src/ffi/mod.rs

//! The foreign-function boundary of the cdylib.
//!
//! Everything the host sees crosses this module: flat buffers, fixed-size
//! `#[repr(C)]` records, and numeric return codes. No panic may escape an
//! entry point and no operation fails by aborting the process.

pub mod c_api;

use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Lazily wires `log` to the environment on the first boundary call. The
/// library never configures logging when linked as an rlib; a Rust host owns
/// its own logger.
pub(crate) fn init_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or("warn"),
        )
        .is_test(false)
        .try_init();
    });
}
