//! # Logging
//!
//! Installs a `tracing` subscriber for hosts that do not bring their own.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "rqes_ui=debug,rqes_core=debug";

/// Install a fmt subscriber filtered by `RUST_LOG`, or [`DEFAULT_FILTER`]
/// when unset. Does nothing unless `print_logs` is set.
///
/// Returns `true` if this call installed the subscriber. Later calls, or a
/// subscriber installed by the host, leave the existing one in place.
pub fn init(print_logs: bool) -> bool {
    if !print_logs {
        return false;
    }
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).try_init().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled() {
        assert!(!init(false));
    }
}
