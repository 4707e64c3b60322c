use std::path::PathBuf;
use std::str::FromStr;

use attention_algo::AttentionConfig;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq)]
pub struct FileLogSettings {
    pub dir: PathBuf,
    pub prefix: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub attention: AttentionConfig,
    pub enabled: bool,
    pub log_level: String,
    pub file_logs: Option<FileLogSettings>,
    /// Variables that were set but could not be parsed; defaults were used instead
    pub rejected: Vec<ConfigError>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut rejected = Vec::new();
        let mut attention = AttentionConfig::default();

        if let Some(v) = parse_var(&lookup, "ATTENTION_INTERVAL_MS", &mut rejected) {
            attention.sampler.interval_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "ATTENTION_HISTORY_SIZE", &mut rejected) {
            attention.scoring.history_size = v;
        }
        if let Some(v) = parse_var(&lookup, "ATTENTION_FACE_RATE_THRESHOLD", &mut rejected) {
            attention.scoring.face_rate_threshold = v;
        }
        if let Some(v) = parse_var(&lookup, "ATTENTION_MOTION_THRESHOLD", &mut rejected) {
            attention.scoring.motion_threshold = v;
        }
        if let Some(v) = parse_var(&lookup, "ATTENTION_DISTRACTION_DELAY_MS", &mut rejected) {
            attention.debounce.distraction_delay_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "ATTENTION_OFF_CENTER_THRESHOLD", &mut rejected) {
            attention.estimator.off_center_threshold = v;
        }

        let enabled = match lookup("ATTENTION_ENABLED") {
            None => true,
            Some(value) => match value.trim() {
                "true" | "1" => true,
                "false" | "0" => false,
                _ => {
                    rejected.push(ConfigError::InvalidEnv {
                        var: "ATTENTION_ENABLED",
                        value,
                    });
                    true
                }
            },
        };

        let log_level = lookup("RUST_LOG").unwrap_or_else(|| "info".to_string());

        let file_logs = lookup("ENABLE_FILE_LOGS")
            .filter(|v| v == "true" || v == "1")
            .map(|_| FileLogSettings {
                dir: PathBuf::from(lookup("LOG_DIR").unwrap_or_else(|| "./logs".to_string())),
                prefix: "attention.log".to_string(),
            });

        Self {
            attention,
            enabled,
            log_level,
            file_logs,
            rejected,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.attention.validate()?;
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, var: &'static str, rejected: &mut Vec<ConfigError>) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(var)?;
    match value.trim().parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            rejected.push(ConfigError::InvalidEnv { var, value });
            None
        }
    }
}
