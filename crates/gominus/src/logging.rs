//! Log output setup
//!
//! The library crates only emit `tracing` events; nothing is printed until a
//! subscriber is installed.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directives, e.g. `gominus_compiler=trace`
pub const LOG_ENV: &str = "GOMINUS_LOG";

/// Install a stderr fmt subscriber filtered by `GOMINUS_LOG` (default `warn`).
///
/// Returns `false` when a global subscriber was already set; calling this
/// more than once is harmless.
pub fn init_logging() -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice() {
        init_logging();
        assert!(!init_logging());
    }
}
