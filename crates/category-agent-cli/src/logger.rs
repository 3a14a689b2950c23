//! Logging initialisation via tracing-subscriber.
//!
//! Logs go to stderr so that `classify --json` output stays parseable.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `-v` / `-q` take precedence over `RUST_LOG`; without either flag
/// `RUST_LOG` is honoured and `warn` is the fallback.
pub fn init(verbose: bool, quiet: bool) {
    let level = level_for(verbose, quiet);
    let filter = if verbose || quiet {
        EnvFilter::new(level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };

    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
    {
        eprintln!("failed to set up logging: {e}");
    }
}

fn level_for(verbose: bool, quiet: bool) -> &'static str {
    match (verbose, quiet) {
        (true, _) => "debug",
        (false, true) => "error",
        (false, false) => "warn",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_flags() {
        assert_eq!(level_for(false, false), "warn");
        assert_eq!(level_for(true, false), "debug");
        assert_eq!(level_for(false, true), "error");
        assert_eq!(level_for(true, true), "debug");
    }
}
