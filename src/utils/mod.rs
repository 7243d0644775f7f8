//! Utilities: logging setup (verbosity flags -> tracing filter) and env flag parsing.
//!
//! Key items:
//!   init_logging / derive_level
//!   env_flag

/// Logging helpers.
///
/// Everything goes to stderr: in `serve` mode stdout carries MCP frames.
pub mod logging {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::filter::LevelFilter;

    #[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
    pub enum LogLevel {
        Error = 0,
        Info = 1,
        Debug = 2,
        Trace = 3,
    }

    impl LogLevel {
        pub fn as_filter(&self) -> LevelFilter {
            match self {
                LogLevel::Error => LevelFilter::ERROR,
                LogLevel::Info => LevelFilter::INFO,
                LogLevel::Debug => LevelFilter::DEBUG,
                LogLevel::Trace => LevelFilter::TRACE,
            }
        }
    }

    pub fn derive_level(verbose: u8, quiet: bool) -> LogLevel {
        if quiet {
            return LogLevel::Error;
        }
        match verbose {
            0 => LogLevel::Info,
            1 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    /// Build the filter: `RUST_LOG` wins when set, otherwise the flag-derived level.
    pub fn build_filter(level: LogLevel) -> EnvFilter {
        EnvFilter::builder()
            .with_default_directive(level.as_filter().into())
            .from_env_lossy()
    }

    /// Escape codes only when stderr is a terminal and NO_COLOR is unset.
    pub fn ansi_enabled(stderr_is_terminal: bool, no_color: bool) -> bool {
        stderr_is_terminal && !no_color
    }

    pub fn init_logging(level: LogLevel) {
        use std::io::IsTerminal;

        let ansi = ansi_enabled(
            std::io::stderr().is_terminal(),
            std::env::var_os("NO_COLOR").is_some(),
        );
        // try_init: a second call (tests, embedding) keeps the first subscriber.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(build_filter(level))
            .with_writer(std::io::stderr)
            .with_ansi(ansi)
            .with_target(false)
            .try_init();
    }
}

pub use logging::{derive_level, init_logging};

/// Interpret an environment variable as a boolean switch (1/true/yes/on).
pub fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| parse_flag(&v))
        .unwrap_or(false)
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::logging::*;
    use super::parse_flag;

    #[test]
    fn quiet_beats_verbose() {
        assert_eq!(derive_level(3, true), LogLevel::Error);
    }

    #[test]
    fn verbosity_steps() {
        assert_eq!(derive_level(0, false), LogLevel::Info);
        assert_eq!(derive_level(1, false), LogLevel::Debug);
        assert_eq!(derive_level(2, false), LogLevel::Trace);
        assert_eq!(derive_level(9, false), LogLevel::Trace);
    }

    #[test]
    fn level_maps_to_filter() {
        assert_eq!(LogLevel::Debug.as_filter(), tracing::level_filters::LevelFilter::DEBUG);
    }

    #[test]
    fn ansi_only_on_a_color_terminal() {
        assert!(ansi_enabled(true, false));
        assert!(!ansi_enabled(false, false));
        assert!(!ansi_enabled(true, true));
    }

    #[test]
    fn flag_values() {
        for v in ["1", "true", "TRUE", " yes ", "on"] {
            assert!(parse_flag(v), "{v}");
        }
        for v in ["", "0", "false", "off", "nope"] {
            assert!(!parse_flag(v), "{v}");
        }
    }
}
