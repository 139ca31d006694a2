//! Runs `rspec` suites one example at a time.

use rspec::{block::Suite, ConfigurationBuilder, Logger, Runner};
use std::sync::Arc;

/// Runs a suite serially so examples sharing one Bevy `App` never interleave
/// their updates. A failing example exits the test binary with an error.
pub fn run_serial<T>(suite: &Suite<T>)
where
    T: Clone + Send + Sync + std::fmt::Debug,
{
    let config = ConfigurationBuilder::default()
        .parallel(false)
        .exit_on_failure(true)
        .build()
        .unwrap_or_else(|e| panic!("rspec configuration failed: {e}"));
    let logger = Arc::new(Logger::new(std::io::stdout()));
    Runner::new(config, vec![logger]).run(suite);
}
