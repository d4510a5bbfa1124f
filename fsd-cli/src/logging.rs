//! Tracing subscriber setup.
//!
//! Logs go to stderr so tables and JSON on stdout stay clean. The level
//! defaults to `info` and is overridden by `RUST_LOG`.

use tracing_subscriber::EnvFilter;

pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
