use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_FIXER_URL: &str = "http://data.fixer.io/api";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FixerProviderConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for FixerProviderConfig {
    fn default() -> Self {
        FixerProviderConfig {
            base_url: DEFAULT_FIXER_URL.to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub fixer: FixerProviderConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Currency every stored rate is relative to.
    pub base: String,
    /// Currencies to sync and refresh.
    pub currencies: Vec<String>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    pub data_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "fxc", "fxc")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("org", "fxc", "fxc")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        let config = config.validated()?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Normalizes the currency list and checks the base currency.
    fn validated(mut self) -> Result<Self> {
        self.base = self.base.trim().to_string();
        if self.base.is_empty() {
            bail!("Base currency must not be empty");
        }

        let mut currencies: Vec<String> = Vec::with_capacity(self.currencies.len() + 1);
        for code in self.currencies.iter().map(|c| c.trim()) {
            if !code.is_empty() && !currencies.iter().any(|c| c == code) {
                currencies.push(code.to_string());
            }
        }
        if !currencies.contains(&self.base) {
            debug!("Adding base currency {} to the currency list", self.base);
            currencies.insert(0, self.base.clone());
        }
        self.currencies = currencies;
        Ok(self)
    }

    /// The API key, when one is configured and not blank.
    pub fn api_key(&self) -> Option<&str> {
        self.providers
            .fixer
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}
