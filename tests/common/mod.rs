//! Shared test utilities

use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize tracing once for the whole test binary
///
/// Honors `RUST_LOG`; output goes through the test writer so it interleaves
/// with `cargo test` capture.
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .init();
    });
}
