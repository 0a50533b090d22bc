use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::{FormatTime, Uptime};
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampFormat {
    /// Whole seconds since the Unix epoch.
    Unix,
    /// Time since the subscriber was installed.
    Uptime,
    None,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown timestamp format '{0}' (expected unix, uptime or none)")]
pub struct UnknownTimestampFormat(pub String);

impl FromStr for TimestampFormat {
    type Err = UnknownTimestampFormat;
    fn from_str(s: &str) -> Result<TimestampFormat, UnknownTimestampFormat> {
        match s {
            "unix" => Ok(TimestampFormat::Unix),
            "uptime" => Ok(TimestampFormat::Uptime),
            "none" => Ok(TimestampFormat::None),
            _ => Err(UnknownTimestampFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Used when RUST_LOG is unset or invalid.
    pub default_filter: String,
    pub timestamps: TimestampFormat,
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> LogConfig {
        LogConfig {
            default_filter: "info".to_string(),
            timestamps: TimestampFormat::Unix,
            with_target: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum LogError {
    #[error("bad log filter: {0}")]
    Filter(#[from] ParseError),
    #[error("cannot install log subscriber: {0}")]
    Install(#[from] TryInitError),
}

struct UnixSeconds;

impl FormatTime for UnixSeconds {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        let seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        write!(w, "{}", seconds)
    }
}

/// Installs the process-wide subscriber.  Call once, at the top of `main`.
pub fn init(config: &LogConfig) -> Result<(), LogError> {
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.default_filter))?;
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(config.with_target)
        .with_thread_names(true);

    let registry = tracing_subscriber::registry().with(filter_layer);
    match config.timestamps {
        TimestampFormat::Unix => registry.with(fmt_layer.with_timer(UnixSeconds)).try_init()?,
        TimestampFormat::Uptime => registry
            .with(fmt_layer.with_timer(Uptime::default()))
            .try_init()?,
        TimestampFormat::None => registry.with(fmt_layer.without_time()).try_init()?,
    }
    Ok(())
}

#[test]
fn test_parse_timestamp_format() {
    assert_eq!("unix".parse::<TimestampFormat>(), Ok(TimestampFormat::Unix));
    assert_eq!("uptime".parse::<TimestampFormat>(), Ok(TimestampFormat::Uptime));
    assert_eq!("none".parse::<TimestampFormat>(), Ok(TimestampFormat::None));
    assert_eq!(
        "rfc3339".parse::<TimestampFormat>(),
        Err(UnknownTimestampFormat("rfc3339".to_string()))
    );
}

#[test]
fn test_unix_seconds() {
    let mut out = String::new();
    UnixSeconds
        .format_time(&mut Writer::new(&mut out))
        .expect("writing to a String cannot fail");
    let seconds: u64 = out.parse().expect("timestamp should be a number");
    // 2021-12-01T00:00:00Z
    assert!(seconds > 1_638_316_800);
}

#[test]
fn test_init_only_once() {
    let config = LogConfig {
        timestamps: TimestampFormat::None,
        ..LogConfig::default()
    };
    // A bad default only matters when RUST_LOG does not override it.
    if std::env::var_os("RUST_LOG").is_none() {
        let bad = LogConfig {
            default_filter: "aoc2021=loudly".to_string(),
            ..config.clone()
        };
        assert!(matches!(init(&bad), Err(LogError::Filter(_))));
    }
    let _ = init(&config);
    assert!(matches!(init(&config), Err(LogError::Install(_))));
}
