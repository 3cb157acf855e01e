//! Logging setup
//!
//! The crate logs through `tracing`. Applications that do not install their
//! own subscriber can call [`init_tracing`] once at startup.

use tracing_subscriber::{fmt, EnvFilter};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info";

/// Install a formatting subscriber filtered by `RUST_LOG`.
///
/// Returns `false` when a global subscriber was already installed, which
/// makes repeated calls harmless.
pub fn init_tracing() -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    fmt().with_env_filter(filter).with_target(true).try_init().is_ok()
}
