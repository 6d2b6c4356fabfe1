//! Logging setup using `tracing` and `tracing-subscriber`.
//!
//! - `warn`: skipped input, cancelled runs
//! - `info`: stage completion and summary counts
//! - `debug`: per-level lattice detail, written tables

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Multi-line human-readable output.
    Pretty,
    /// Single-line output.
    #[default]
    Compact,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: LevelFilter,
    pub format: LogFormat,
    /// Let `RUST_LOG` override `level` when set.
    pub use_env_filter: bool,
    pub with_ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::WARN,
            format: LogFormat::default(),
            use_env_filter: true,
            with_ansi: true,
        }
    }
}

impl LogConfig {
    /// 0 = warn, 1 (`-v`) = info, 2 = debug, 3+ = trace.
    #[must_use]
    pub fn from_verbosity(verbosity: u8) -> Self {
        let level = match verbosity {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        };
        Self {
            level,
            use_env_filter: verbosity == 0,
            ..Self::default()
        }
    }

    fn filter(&self) -> EnvFilter {
        if self.use_env_filter {
            if let Ok(filter) = EnvFilter::try_from_default_env() {
                return filter;
            }
        }
        EnvFilter::default().add_directive(self.level.into())
    }
}

/// Install the global subscriber. Logs go to stderr so stdout stays clean for summaries.
pub fn init_logging(config: &LogConfig) -> crate::Result<()> {
    let base = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(config.with_ansi)
        .with_target(false);

    let registry = tracing_subscriber::registry().with(config.filter());
    match config.format {
        LogFormat::Pretty => registry.with(base.pretty()).try_init()?,
        LogFormat::Compact => registry.with(base.compact()).try_init()?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_verbosity() {
        assert_eq!(LogConfig::from_verbosity(0).level, LevelFilter::WARN);
        assert_eq!(LogConfig::from_verbosity(1).level, LevelFilter::INFO);
        assert_eq!(LogConfig::from_verbosity(2).level, LevelFilter::DEBUG);
        assert_eq!(LogConfig::from_verbosity(7).level, LevelFilter::TRACE);
        assert!(LogConfig::from_verbosity(0).use_env_filter);
        assert!(!LogConfig::from_verbosity(1).use_env_filter);
    }
}
