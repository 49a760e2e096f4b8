pub mod builders;

use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Install a test subscriber once per test binary.
///
/// Graph and pipeline events are captured at `debug` by default and shown
/// only for failing tests. `NEUROFORGE_LOG` takes a full filter directive,
/// e.g. `NEUROFORGE_LOG=neuroforge::ir::schedule=trace`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("NEUROFORGE_LOG")
            .unwrap_or_else(|_| EnvFilter::new("warn,neuroforge=debug"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .init();
    });
}
