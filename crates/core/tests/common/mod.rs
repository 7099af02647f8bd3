//! Shared helpers for integration tests

use std::sync::Once;

static INIT_LOGGING: Once = Once::new();

/// Initialize test logging from `TRECEVAL_TEST_LOG`, then `RUST_LOG`, else "error"
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let log_level = std::env::var("TRECEVAL_TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "error".to_string());

        tracing_subscriber::fmt()
            .with_env_filter(log_level)
            .with_test_writer()
            .try_init()
            .ok();
    });
}
