use std::env;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::logging::{LogConfig, TimestampFormat, UnknownTimestampFormat};

const INPUT_DIR_VAR: &str = "AOC_INPUT_DIR";
const TIMESTAMPS_VAR: &str = "AOC_LOG_TIMESTAMPS";
const DEFAULT_INPUT_DIR: &str = "inputs";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("AOC_LOG_TIMESTAMPS: {0}")]
    Timestamps(#[from] UnknownTimestampFormat),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub input_dir: PathBuf,
    pub log: LogConfig,
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        Config::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from whatever `lookup` returns for each
    /// variable name; unset variables take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let input_dir = lookup(INPUT_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_DIR));
        let timestamps = match lookup(TIMESTAMPS_VAR) {
            Some(s) => s.parse::<TimestampFormat>()?,
            None => TimestampFormat::Unix,
        };
        Ok(Config {
            input_dir,
            log: LogConfig {
                timestamps,
                ..LogConfig::default()
            },
        })
    }

    pub fn day(&self, day: &str) -> DayInputs {
        DayInputs {
            dir: self.input_dir.join(day),
        }
    }
}

/// Where one day's input files live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayInputs {
    dir: PathBuf,
}

impl DayInputs {
    pub fn example(&self) -> PathBuf {
        self.dir.join("example-input.dat")
    }

    pub fn puzzle(&self) -> PathBuf {
        self.dir.join("puzzle-input.dat")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[test]
fn test_defaults() {
    let config = Config::from_lookup(|_| None).expect("defaults are valid");
    assert_eq!(config.input_dir, PathBuf::from("inputs"));
    assert_eq!(config.log, LogConfig::default());
    assert_eq!(config.log.timestamps, TimestampFormat::Unix);
}

#[test]
fn test_overrides() {
    let config = Config::from_lookup(|name| match name {
        "AOC_INPUT_DIR" => Some("/tmp/aoc".to_string()),
        "AOC_LOG_TIMESTAMPS" => Some("none".to_string()),
        _ => None,
    })
    .expect("valid settings");
    assert_eq!(config.input_dir, PathBuf::from("/tmp/aoc"));
    assert_eq!(config.log.timestamps, TimestampFormat::None);
    assert_eq!(
        config.day("day11").puzzle(),
        PathBuf::from("/tmp/aoc/day11/puzzle-input.dat")
    );
    assert_eq!(config.day("day11").dir(), Path::new("/tmp/aoc/day11"));
    assert_eq!(
        config.day("day11").example(),
        PathBuf::from("/tmp/aoc/day11/example-input.dat")
    );
}

#[test]
fn test_bad_timestamps() {
    let result = Config::from_lookup(|name| match name {
        "AOC_LOG_TIMESTAMPS" => Some("sometimes".to_string()),
        _ => None,
    });
    assert_eq!(
        result,
        Err(ConfigError::Timestamps(UnknownTimestampFormat(
            "sometimes".to_string()
        )))
    );
}
