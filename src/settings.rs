//! Last-used credentials, stored as JSON next to the tool.

use crate::util::{ensure_dir, mask_secret};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::info;

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub counter_id: String,
    #[serde(default)]
    pub login: String,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("token", &mask_secret(&self.token))
            .field("counter_id", &self.counter_id)
            .field("login", &self.login)
            .finish()
    }
}

impl Settings {
    /// Missing file yields empty settings.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings: {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&raw)
            .with_context(|| format!("parsing settings: {}", path.display()))?;
        info!("settings loaded from {}", path.display());
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_dir(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("writing settings: {}", path.display()))?;
        info!("settings saved to {}", path.display());
        Ok(())
    }

    /// Non-empty values from `other` replace ours.
    pub fn merged_with(&self, other: &Settings) -> Settings {
        let pick = |new: &str, old: &str| {
            if new.trim().is_empty() {
                old.to_string()
            } else {
                new.trim().to_string()
            }
        };
        Settings {
            token: pick(&other.token, &self.token),
            counter_id: pick(&other.counter_id, &self.counter_id),
            login: pick(&other.login, &self.login),
        }
    }
}
