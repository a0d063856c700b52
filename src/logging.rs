//! Diagnostic logging setup.
//!
//! Results go to stdout and user-facing messages go through
//! `cli::output`; `tracing` diagnostics always go to stderr so they can
//! be enabled without corrupting piped output.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (e.g. `cryptkit=debug`).
pub const LOG_ENV: &str = "CRYPTKIT_LOG";

/// Install the global subscriber.  Safe to call more than once; later
/// calls are ignored.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
