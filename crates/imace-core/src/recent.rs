use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::RECENT_SEARCH_LIMIT;
use crate::error::{ImaceError, Result};

#[derive(Debug, Default, Serialize, Deserialize)]
struct RecentFile {
    #[serde(default)]
    searches: Vec<String>,
}

/// Most-recent-first, de-duplicated list of past queries.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecentSearches {
    entries: Vec<String>,
    path: Option<PathBuf>,
}

impl RecentSearches {
    /// In-memory list that is never written anywhere.
    pub fn new() -> Self {
        Self::default()
    }

    /// `<data_local_dir>/imace/recent_searches.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_local_dir().map(|d| d.join("imace").join("recent_searches.toml"))
    }

    /// Read the list backing `path`. A missing file is an empty list; the
    /// path is remembered for `save`.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut entries = if path.exists() {
            let text = std::fs::read_to_string(&path)?;
            let file: RecentFile =
                toml::from_str(&text).map_err(|e| ImaceError::Config(e.to_string()))?;
            file.searches
        } else {
            Vec::new()
        };
        dedup_in_order(&mut entries);
        entries.truncate(RECENT_SEARCH_LIMIT);
        Ok(Self {
            entries,
            path: Some(path),
        })
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Move `query` to the front. Returns `true` if the list changed.
    pub fn record(&mut self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() {
            return false;
        }
        if self.entries.first().map(String::as_str) == Some(query) {
            return false;
        }
        self.entries.retain(|e| e != query);
        self.entries.insert(0, query.to_string());
        self.entries.truncate(RECENT_SEARCH_LIMIT);
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Write to the backing file. No-op for in-memory lists.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = RecentFile {
            searches: self.entries.clone(),
        };
        let text = toml::to_string_pretty(&file).map_err(|e| ImaceError::Config(e.to_string()))?;
        std::fs::write(path, text)?;
        debug!(path = %path.display(), count = self.entries.len(), "Recent searches saved");
        Ok(())
    }
}

fn dedup_in_order(entries: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    entries.retain(|e| seen.insert(e.clone()));
}
