use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::consts::{
    DEFAULT_BASE_URL, DEFAULT_SEARCH_DEBOUNCE_MS, DEFAULT_THUMBNAIL_CACHE_LIMIT,
    DEFAULT_WORKER_THREADS,
};
use crate::error::{ImaceError, Result};
use crate::pagination::PageSize;

/// Client settings read from `config.toml`. Every field is optional in the
/// file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend root, without a trailing slash.
    pub base_url: String,
    pub default_page_size: PageSize,
    pub search_debounce_ms: u64,
    pub worker_threads: usize,
    pub thumbnail_cache_limit: usize,
    /// Remember recent searches across restarts.
    pub persist_recent_searches: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            default_page_size: PageSize::default(),
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE_MS,
            worker_threads: DEFAULT_WORKER_THREADS,
            thumbnail_cache_limit: DEFAULT_THUMBNAIL_CACHE_LIMIT,
            persist_recent_searches: true,
        }
    }
}

impl ClientConfig {
    /// `<config_dir>/imace/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("imace").join("config.toml"))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let mut config: Self =
            toml::from_str(text).map_err(|e| ImaceError::Config(e.to_string()))?;
        config.normalize();
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ImaceError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&text)?;
        info!(path = %path.display(), "Config loaded");
        Ok(config)
    }

    /// Load from `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) if p.exists() => Self::load(p),
            _ => {
                debug!("No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    fn normalize(&mut self) {
        while self.base_url.ends_with('/') {
            self.base_url.pop();
        }
        self.worker_threads = self.worker_threads.max(1);
    }
}
