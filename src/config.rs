use crate::catalog::{Attribution, ReportType};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: Api,
    #[serde(default)]
    pub report: Report,
    #[serde(default)]
    pub polling: Polling,
    #[serde(default)]
    pub download: Download,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Api {
    pub base_url: String,
    pub timeout_seconds: u64,
    /// Retries of 429 and 5xx responses, on top of the first attempt.
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub verify_token: bool,
}
impl Default for Api {
    fn default() -> Self {
        Self {
            base_url: "https://api-metrika.yandex.net/management/v1".into(),
            timeout_seconds: 30,
            max_retries: 3,
            retry_backoff_ms: 3000,
            verify_token: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Report {
    pub report_type: ReportType,
    pub attribution: Attribution,
    pub date1: String,
    pub date2: String,
    pub ensure_required_metrics: bool,
}
impl Default for Report {
    fn default() -> Self {
        Self {
            report_type: ReportType::Visits,
            attribution: Attribution::Last,
            date1: "7daysAgo".into(),
            date2: "today".into(),
            ensure_required_metrics: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Polling {
    pub poll_delay_ms: u64,
    pub processing_delay_ms: u64,
    /// 0 polls until a terminal status.
    pub max_polls: u32,
}
impl Default for Polling {
    fn default() -> Self {
        Self {
            poll_delay_ms: 1000,
            processing_delay_ms: 10_000,
            max_polls: 0,
        }
    }
}
impl Polling {
    pub fn poll_delay(&self) -> Duration {
        Duration::from_millis(self.poll_delay_ms)
    }

    pub fn processing_delay(&self) -> Duration {
        Duration::from_millis(self.processing_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Download {
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
}
impl Default for Download {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay_ms: 10_000,
        }
    }
}
impl Download {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Output {
    pub dir: String,
    pub print_summary: bool,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            dir: ".".into(),
            print_summary: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub path: String,
    pub remember: bool,
}
impl Default for Settings {
    fn default() -> Self {
        Self {
            path: "settings.json".into(),
            remember: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub dir: String,
    pub file_prefix: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: true,
            dir: "logs".into(),
            file_prefix: "metrika.log".into(),
        }
    }
}
