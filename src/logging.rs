use clap::ValueEnum;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Crates whose chatter is capped at `warn` unless `RUST_LOG` says otherwise.
/// At `trace` every streamed token is already logged by this crate.
const QUIET_DEPS: &[&str] = &["hyper", "hyper_util", "reqwest", "h2"];

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Filter directives for `--log-level` when `RUST_LOG` is unset.
    pub fn directives(self) -> String {
        let mut out = self.as_str().to_string();
        for dep in QUIET_DEPS {
            out.push_str(&format!(",{dep}=warn"));
        }
        out
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Install the global `fmt` subscriber writing to stderr, so spoken output on
/// stdout stays clean. `RUST_LOG` replaces the `--log-level` directives.
pub fn init(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.directives()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(level >= LogLevel::Debug)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_to_level_filter() {
        assert_eq!(LevelFilter::from(LogLevel::Debug), LevelFilter::DEBUG);
        assert_eq!(LevelFilter::from(LogLevel::default()), LevelFilter::WARN);
    }

    #[test]
    fn http_stack_is_capped() {
        assert_eq!(
            LogLevel::Trace.directives(),
            "trace,hyper=warn,hyper_util=warn,reqwest=warn,h2=warn"
        );
    }

    #[test]
    fn directives_parse() {
        let filter = EnvFilter::new(LogLevel::Info.directives());
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }
}
