use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

use crate::audio::DEFAULT_VOLUME_PERCENT;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AmbientSettings {
    /// Playback volume in percent, `0..=100`.
    pub volume: f32,
}

impl Default for AmbientSettings {
    fn default() -> Self {
        Self {
            volume: DEFAULT_VOLUME_PERCENT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    /// Root of the session/task API.
    pub api_base_url: String,
    pub ambient: AmbientSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000/api".into(),
            ambient: AmbientSettings::default(),
        }
    }
}

pub struct ConfigStore {
    path: PathBuf,
    data: RwLock<AppConfig>,
}

impl ConfigStore {
    /// Loads the config file at `path`, falling back to defaults when the
    /// file is missing or unreadable as JSON.
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            AppConfig::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn config(&self) -> AppConfig {
        self.data.read().unwrap().clone()
    }

    pub fn update(&self, config: AppConfig) -> Result<()> {
        {
            let mut guard = self.data.write().unwrap();
            *guard = config;
            self.persist(&guard)?;
        }
        Ok(())
    }

    fn persist(&self, data: &AppConfig) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write config to {}", self.path.display()))
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)?;
        let data: AppConfig = serde_json::from_str(&contents)?;
        let mut guard = self.data.write().unwrap();
        *guard = data;
        Ok(())
    }
}
