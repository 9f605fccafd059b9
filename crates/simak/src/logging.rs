//! Diagnostics for the `simak` command.
//!
//! Tables, cards and notices are command output and go to stdout. Diagnostics
//! emitted through `tracing` go to stderr, so `simak list -f json | jq` stays
//! clean at any verbosity.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// How much the register reports about its own work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Errors only (`-q`).
    Quiet,
    /// Saves, logins, migrations.
    #[default]
    Normal,
    /// Staging, routing and storage decisions (`-v`).
    Verbose,
    /// Everything, including the HTTP client of the assistant (`-vv`).
    Trace,
}

impl Verbosity {
    /// Resolve the `-q` flag and the number of `-v` flags. `-q` wins.
    #[must_use]
    pub fn from_flags(quiet: bool, verbose: u8) -> Self {
        match (quiet, verbose) {
            (true, _) => Self::Quiet,
            (false, 0) => Self::Normal,
            (false, 1) => Self::Verbose,
            (false, _) => Self::Trace,
        }
    }

    /// Filter directives used when `RUST_LOG` is not set.
    ///
    /// Dependencies stay at `warn` until `-vv`, where the HTTP stack behind
    /// the assistant is opened up to `debug`.
    #[must_use]
    pub fn directives(self) -> String {
        let (deps, own) = match self {
            Self::Quiet => ("error", "error"),
            Self::Normal => ("warn", "info"),
            Self::Verbose => ("warn", "debug"),
            Self::Trace => ("debug", "trace"),
        };
        format!("{deps},simak={own}")
    }
}

/// Install the stderr subscriber. `RUST_LOG` replaces the directives chosen
/// by `verbosity`. Later calls keep the first subscriber.
///
/// ```no_run
/// use simak::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::from_flags(false, 1));
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directives()));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .without_time()
                .with_writer(std::io::stderr)
                .with_target(verbosity >= Verbosity::Verbose),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_flags() {
        assert_eq!(Verbosity::from_flags(true, 2), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, 0), Verbosity::Normal);
        assert_eq!(Verbosity::from_flags(false, 1), Verbosity::Verbose);
        assert_eq!(Verbosity::from_flags(false, 5), Verbosity::Trace);
    }

    #[test]
    fn test_directives() {
        assert_eq!(Verbosity::Quiet.directives(), "error,simak=error");
        assert_eq!(Verbosity::Normal.directives(), "warn,simak=info");
        assert_eq!(Verbosity::Verbose.directives(), "warn,simak=debug");
        assert_eq!(Verbosity::Trace.directives(), "debug,simak=trace");
    }

    #[test]
    fn test_directives_parse() {
        for verbosity in [
            Verbosity::Quiet,
            Verbosity::Normal,
            Verbosity::Verbose,
            Verbosity::Trace,
        ] {
            assert!(EnvFilter::try_new(verbosity.directives()).is_ok());
        }
    }

    #[test]
    fn test_init_logging_is_repeatable() {
        init_logging(Verbosity::Quiet);
        init_logging(Verbosity::Trace);
    }
}
