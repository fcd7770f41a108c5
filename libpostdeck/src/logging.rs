//! Diagnostics for the composer and its front ends
//!
//! Everything goes to stderr so `deck-compose` can keep stdout for the
//! assembled post. The requested level applies to the postdeck crates only;
//! dependencies such as tokio stay at `warn` unless `RUST_LOG` says otherwise.
//!
//! ```no_run
//! use libpostdeck::logging::{LogFormat, LoggingConfig};
//!
//! LoggingConfig::new(LogFormat::Json, "info".to_string(), false).init();
//! ```

use std::str::FromStr;

use tracing_subscriber::EnvFilter;

/// Crates whose spans and events follow the requested level
const POSTDECK_TARGETS: &[&str] = &["libpostdeck", "deck_compose"];

/// Level for everything outside [`POSTDECK_TARGETS`]
const DEPENDENCY_LEVEL: &str = "warn";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact lines without timestamps, for a terminal
    Text,
    /// One JSON object per event
    Json,
    /// Multi-line with source locations
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            other => Err(format!(
                "Invalid log format: '{}'. Valid options: text, json, pretty",
                other
            )),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
            LogFormat::Pretty => "pretty",
        };
        f.write_str(name)
    }
}

pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: String,
    /// Forces `debug` for the postdeck crates
    pub verbose: bool,
}

impl LoggingConfig {
    pub fn new(format: LogFormat, level: String, verbose: bool) -> Self {
        Self {
            format,
            level,
            verbose,
        }
    }

    /// Read format and level from `POSTDECK_LOG_FORMAT` / `POSTDECK_LOG_LEVEL`
    pub fn from_env(verbose: bool) -> Self {
        let format = std::env::var("POSTDECK_LOG_FORMAT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(LogFormat::Text);

        let level = std::env::var("POSTDECK_LOG_LEVEL").unwrap_or_else(|_| "warn".to_string());

        Self::new(format, level, verbose)
    }

    /// Filter directives used when `RUST_LOG` is not set
    ///
    /// A level that already contains directives (`=` or `,`) is passed
    /// through untouched.
    pub fn directives(&self) -> String {
        let level = if self.verbose { "debug" } else { self.level.trim() };
        if level.contains('=') || level.contains(',') {
            return level.to_string();
        }

        let base = match level {
            "error" | "off" => level,
            _ => DEPENDENCY_LEVEL,
        };
        let mut directives = base.to_string();
        for target in POSTDECK_TARGETS {
            directives.push_str(&format!(",{}={}", target, level));
        }
        directives
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.directives()))
    }

    /// Install the global subscriber
    ///
    /// # Panics
    ///
    /// Panics if a global subscriber is already set.
    pub fn init(&self) {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(self.filter())
            .with_writer(std::io::stderr);

        match self.format {
            LogFormat::Json => builder
                .json()
                .flatten_event(true)
                .with_current_span(true)
                .with_target(true)
                .init(),
            LogFormat::Pretty => builder
                .pretty()
                .with_file(true)
                .with_line_number(true)
                .init(),
            LogFormat::Text => builder.compact().without_time().with_target(false).init(),
        }
    }
}

/// [`LoggingConfig::from_env`] without `--verbose`
pub fn init_default() {
    LoggingConfig::from_env(false).init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn config(level: &str, verbose: bool) -> LoggingConfig {
        LoggingConfig::new(LogFormat::Text, level.to_string(), verbose)
    }

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert_eq!("Json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("PRETTY".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml"
            .parse::<LogFormat>()
            .unwrap_err()
            .contains("Invalid log format: 'xml'"));
    }

    #[test]
    fn test_log_format_display() {
        assert_eq!(LogFormat::Json.to_string(), "json");
    }

    #[test]
    fn test_directives_scope_level_to_postdeck_crates() {
        assert_eq!(
            config("info", false).directives(),
            "warn,libpostdeck=info,deck_compose=info"
        );
    }

    #[test]
    fn test_directives_verbose_overrides_level() {
        assert_eq!(
            config("error", true).directives(),
            "warn,libpostdeck=debug,deck_compose=debug"
        );
    }

    #[test]
    fn test_directives_quieter_than_dependencies() {
        assert_eq!(
            config("error", false).directives(),
            "error,libpostdeck=error,deck_compose=error"
        );
    }

    #[test]
    fn test_directives_passed_through() {
        assert_eq!(
            config("libpostdeck::service=trace", false).directives(),
            "libpostdeck::service=trace"
        );
    }

    #[test]
    #[serial]
    fn test_from_env() {
        std::env::set_var("POSTDECK_LOG_FORMAT", "json");
        std::env::set_var("POSTDECK_LOG_LEVEL", "debug");
        let config = LoggingConfig::from_env(true);
        std::env::remove_var("POSTDECK_LOG_FORMAT");
        std::env::remove_var("POSTDECK_LOG_LEVEL");

        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.level, "debug");
        assert!(config.verbose);
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        std::env::remove_var("POSTDECK_LOG_FORMAT");
        std::env::remove_var("POSTDECK_LOG_LEVEL");
        let config = LoggingConfig::from_env(false);
        assert_eq!(config.format, LogFormat::Text);
        assert_eq!(config.level, "warn");
    }
}
