//! Tracing initialization for connector services.

use std::{env, fmt, str::FromStr};
use tracing_subscriber::{
    fmt::{self as subscriber_fmt, format::FmtSpan},
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter,
};

/// Output format of the fmt layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line, for log shippers
    Json,
    /// Multi-line human-readable output
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Json => write!(f, "json"),
            LogFormat::Pretty => write!(f, "pretty"),
        }
    }
}

/// Configuration for tracing initialization
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Service name for log attribution
    pub service_name: String,
    /// Environment (dev, staging, prod)
    pub environment: String,
    pub format: LogFormat,
    /// Filter directives used when `RUST_LOG` is unset (e.g. "info,conhub_connectors=debug")
    pub level: String,
    /// Whether to log span open/close events
    pub log_spans: bool,
    /// Whether to include file/line in logs
    pub include_location: bool,
}

impl TracingConfig {
    /// Config for a service, read from `ENVIRONMENT`, `LOG_FORMAT`,
    /// `RUST_LOG`, `LOG_SPANS` and `LOG_LOCATION`.
    pub fn from_env(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()),
            format: env::var("LOG_FORMAT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(LogFormat::Pretty),
            level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            log_spans: env::var("LOG_SPANS").map(|v| v == "true").unwrap_or(false),
            include_location: env::var("LOG_LOCATION").map(|v| v == "true").unwrap_or(true),
        }
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_spans(mut self) -> Self {
        self.log_spans = true;
        self
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.level))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn try_init_tracing(config: &TracingConfig) -> Result<(), TryInitError> {
    let span_events = if config.log_spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    match config.format {
        LogFormat::Json => {
            let layer = subscriber_fmt::layer()
                .json()
                .with_span_events(span_events)
                .with_current_span(true)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_target(true);

            tracing_subscriber::registry()
                .with(config.filter())
                .with(layer)
                .try_init()?;
        }
        LogFormat::Pretty => {
            let layer = subscriber_fmt::layer()
                .pretty()
                .with_span_events(span_events)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_target(true);

            tracing_subscriber::registry()
                .with(config.filter())
                .with(layer)
                .try_init()?;
        }
    }

    tracing::info!(
        service = %config.service_name,
        environment = %config.environment,
        format = %config.format,
        "Tracing initialized"
    );
    Ok(())
}

/// Install the global subscriber, ignoring an already-installed one.
pub fn init_tracing(config: TracingConfig) {
    if let Err(e) = try_init_tracing(&config) {
        tracing::warn!("Tracing already initialized: {}", e);
    }
}

/// Quick initialization from environment variables for a service
pub fn init_tracing_for(service_name: &str) {
    init_tracing(TracingConfig::from_env(service_name));
}
