//! Runtime settings
//!
//! Resolution order: built-in defaults, then `config.yaml` in the config
//! directory, then `.env` / process environment.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};
use crate::models::CommissionConfig;
use crate::storage::Storage;

pub const ENV_API_URL: &str = "MANDADOS_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "MANDADOS_TIMEOUT_SECS";
pub const ENV_COMMISSION_RATE: &str = "MANDADOS_COMMISSION_RATE";
pub const ENV_SERVICE_FEE: &str = "MANDADOS_SERVICE_FEE";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the marketplace service, without the `/api` suffix
    pub api_url: String,
    /// Upper bound for any single request
    pub timeout_secs: u64,
    /// Commission used for order previews outside admin sessions
    pub commission: CommissionConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            api_url: String::from(DEFAULT_API_URL),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            commission: CommissionConfig::default(),
        }
    }
}

impl Settings {
    /// Load from disk and environment
    pub fn load(storage: &Storage) -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut settings = storage.load_settings()?.unwrap_or_default();
        settings.apply_overrides(|key| env::var(key).ok())?;
        Ok(settings)
    }

    /// Write the built-in defaults on first run. Environment overrides are
    /// per-process and never reach the file.
    pub fn write_defaults_if_missing(storage: &Storage) -> Result<bool> {
        if storage.load_settings()?.is_some() {
            return Ok(false);
        }
        storage.save_settings(&Settings::default())?;
        Ok(true)
    }

    /// Apply overrides from a key lookup (the process environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL) {
            self.api_url = url;
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, ENV_TIMEOUT_SECS)? {
            self.timeout_secs = secs;
        }
        if let Some(rate) = parse_var::<f64, _>(&lookup, ENV_COMMISSION_RATE)? {
            self.commission.commission_rate = rate;
        }
        if let Some(fee) = parse_var::<f64, _>(&lookup, ENV_SERVICE_FEE)? {
            self.commission.service_fee = fee;
        }

        self.api_url = self.api_url.trim_end_matches('/').to_string();
        if self.timeout_secs == 0 {
            anyhow::bail!("{} must be greater than zero", ENV_TIMEOUT_SECS);
        }
        self.commission
            .validate()
            .map_err(|e| anyhow::anyhow!("invalid commission settings: {}", e))?;
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("invalid {}: {:?}", key, raw)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_overrides_apply() {
        let mut settings = Settings::default();
        settings
            .apply_overrides(lookup(&[
                (ENV_API_URL, "https://api.example.mx/"),
                (ENV_TIMEOUT_SECS, "5"),
                (ENV_COMMISSION_RATE, "0.2"),
            ]))
            .unwrap();
        assert_eq!(settings.api_url, "https://api.example.mx");
        assert_eq!(settings.timeout(), Duration::from_secs(5));
        assert_eq!(settings.commission.commission_rate, 0.2);
        assert_eq!(settings.commission.service_fee, 15.0);
    }

    #[test]
    fn test_bad_values_are_rejected() {
        let mut settings = Settings::default();
        assert!(settings.apply_overrides(lookup(&[(ENV_TIMEOUT_SECS, "soon")])).is_err());

        let mut settings = Settings::default();
        assert!(settings.apply_overrides(lookup(&[(ENV_TIMEOUT_SECS, "0")])).is_err());

        let mut settings = Settings::default();
        assert!(settings.apply_overrides(lookup(&[(ENV_COMMISSION_RATE, "2")])).is_err());
    }

    #[test]
    fn test_first_run_file_holds_defaults_only() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::at(dir.path());

        let mut running = Settings::default();
        running
            .apply_overrides(lookup(&[(ENV_API_URL, "https://staging.example.mx"), (ENV_COMMISSION_RATE, "0.2")]))
            .unwrap();
        assert!(Settings::write_defaults_if_missing(&storage).unwrap());

        let saved = storage.load_settings().unwrap().unwrap();
        assert_eq!(saved, Settings::default());
        assert_ne!(saved, running);

        // An existing file is left alone
        let mut edited = Settings::default();
        edited.timeout_secs = 9;
        storage.save_settings(&edited).unwrap();
        assert!(!Settings::write_defaults_if_missing(&storage).unwrap());
        assert_eq!(storage.load_settings().unwrap().unwrap().timeout_secs, 9);
    }
}
