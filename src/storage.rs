use crate::config::Settings;
use crate::constants::CONFIG_DIR_NAME;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const SETTINGS_FILE: &str = "config.yaml";
const SESSION_FILE: &str = "session.yaml";

/// Bearer token persisted between runs
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    /// Server the token was issued by; a token is never sent to another one
    pub api_url: String,
    pub saved_at: DateTime<Utc>,
}

/// Manages the config directory: settings file and persisted session
pub struct Storage {
    config_dir: PathBuf,
}

impl Storage {
    pub fn new() -> Self {
        let config_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_DIR_NAME);
        Storage { config_dir }
    }

    /// Storage rooted at an explicit directory
    pub fn at(config_dir: impl Into<PathBuf>) -> Self {
        Storage {
            config_dir: config_dir.into(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Ensure config directory exists
    fn ensure_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Settings file, if one was written
    pub fn load_settings(&self) -> Result<Option<Settings>> {
        let path = self.config_dir.join(SETTINGS_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let settings = serde_yaml::from_str::<Settings>(&content)?;
        Ok(Some(settings))
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        self.ensure_dir()?;
        let content = serde_yaml::to_string(settings)?;
        fs::write(self.config_dir.join(SETTINGS_FILE), content)?;
        Ok(())
    }

    /// Token saved for `api_url`. A file that cannot be parsed counts as no session.
    pub fn load_session(&self, api_url: &str) -> Option<StoredSession> {
        let path = self.config_dir.join(SESSION_FILE);
        let content = fs::read_to_string(path).ok()?;
        let session = serde_yaml::from_str::<StoredSession>(&content).ok()?;
        (session.api_url == api_url && !session.token.is_empty()).then_some(session)
    }

    pub fn save_session(&self, token: &str, api_url: &str) -> Result<()> {
        self.ensure_dir()?;
        let session = StoredSession {
            token: token.to_string(),
            api_url: api_url.to_string(),
            saved_at: Utc::now(),
        };
        let content = serde_yaml::to_string(&session)?;
        fs::write(self.config_dir.join(SESSION_FILE), content)?;
        Ok(())
    }

    pub fn clear_session(&self) -> Result<()> {
        let path = self.config_dir.join(SESSION_FILE);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

impl Default for Storage {
    fn default() -> Self {
        Self::new()
    }
}
