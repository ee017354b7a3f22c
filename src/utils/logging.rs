//! Logger setup plus module-gated logging macros.
//!
//! A module opts into the macros by declaring its own switch:
//! ```ignore
//! const ENABLE_LOGS: bool = true;
//!
//! use crate::{log_debug, log_info, log_warn, log_error};
//!
//! log_info!("cycle {} finished", cycle_id);
//! ```
//! Flipping the const to `false` silences that module without touching
//! `RUST_LOG`.

use log::LevelFilter;

/// Install `env_logger` once. `RUST_LOG` still overrides the default filter.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    let default_level = if crate::config::debug_enabled() {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let _ = env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .try_init();
}

/// Emit at `$level` when the calling module's `ENABLE_LOGS` is set.
#[doc(hidden)]
#[macro_export]
macro_rules! log_gated {
    ($level:ident, $($arg:tt)+) => {
        if ENABLE_LOGS {
            ::log::log!(::log::Level::$level, $($arg)+);
        }
    };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)+) => { $crate::log_gated!(Debug, $($arg)+) };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)+) => { $crate::log_gated!(Info, $($arg)+) };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)+) => { $crate::log_gated!(Warn, $($arg)+) };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)+) => { $crate::log_gated!(Error, $($arg)+) };
}
