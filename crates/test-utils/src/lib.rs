//! # Test Utilities for RQES UI
//!
//! A scriptable signing service, an in-memory document store and sample
//! data for testing workflows without a real QTSP.
//!
//! This crate is for use by the RQES UI workspace's tests and is not
//! intended to be used directly.

pub mod sample;
pub mod service;
pub mod store;

use std::sync::Once;

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

// initialise tracing once for all tests
static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// # Panics
///
/// Panics if the tracing subscriber cannot be set.
pub fn init_tracer() {
    INIT.call_once(|| {
        let subscriber = FmtSubscriber::builder().with_max_level(Level::ERROR).finish();
        tracing::subscriber::set_global_default(subscriber).expect("subscriber set");
    });
}
