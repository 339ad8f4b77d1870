use std::env;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_LOG_LEVEL: &str = "spidergen=info";
pub const VERBOSE_LOG_LEVEL: &str = "spidergen=debug";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: LogFormat::Text,
        }
    }
}

impl LogConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(level) = var("RUST_LOG").or_else(|| var("SPIDERGEN_LOG_LEVEL")) {
            config.level = level;
        }

        if let Some(format) = var("SPIDERGEN_LOG_FORMAT") {
            config.format = match format.to_lowercase().as_str() {
                "text" | "plain" => LogFormat::Text,
                "json" => LogFormat::Json,
                _ => {
                    eprintln!(
                        "Warning: Invalid SPIDERGEN_LOG_FORMAT value '{}', using default text",
                        format
                    );
                    LogFormat::Text
                }
            };
        }

        config
    }

    pub fn verbose(mut self) -> Self {
        self.level = VERBOSE_LOG_LEVEL.to_string();
        self
    }

    /// Installs the global subscriber. Logs go to stderr so rendered code on stdout stays clean.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_new(&self.level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr);

        let _ = match self.format {
            LogFormat::Text => builder.try_init(),
            LogFormat::Json => builder.json().try_init(),
        };
    }
}
