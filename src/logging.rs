//! Logging configuration and initialization

use tracing::{debug, trace};

/// Filter directive for a `-v` count, falling back to the configured level.
pub fn log_level(verbose: u8, configured: &str) -> String {
    match verbose {
        0 => configured.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Initialize tracing for the binary. Logs go to stderr so they never mix
/// with stream data written to stdout.
pub fn init_logging(verbose: u8, configured: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(log_level(verbose, configured))
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2) // Show target module for -vv and above
        .with_thread_ids(verbose >= 3)
        .with_line_number(verbose >= 3)
        .init();

    debug!("streamio started with verbosity level: {}", verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());
}
