//! TOML configuration for `packctl`.
//!
//! Every section is optional; missing keys fall back to defaults, and CLI
//! flags override whatever the file says.

use std::path::{Path, PathBuf};

use packpoint_engine::{
    DEFAULT_HISTORY_LIMIT, DEFAULT_LINK_SCHEME, DEFAULT_MAX_ATTEMPTS, PackNodeConfig,
};
use packpoint_store::DEFAULT_PAGE_SIZE;
use packpoint_types::RecordId;
use serde::Deserialize;

/// Top-level configuration, parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Record store backend.
    pub store: StoreSection,
    /// Bootstrap pointer identity and deep links.
    pub bootstrap: BootstrapSection,
    /// History listing.
    pub history: HistorySection,
    /// Pointer update tuning.
    pub pointer: PointerSection,
    /// Logging configuration.
    pub log: LogSection,
}

/// `[store]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// Backend type: `"fjall"` (default) or `"memory"`.
    pub backend: String,
    /// Directory holding the fjall database.
    pub data_dir: PathBuf,
}

impl Default for StoreSection {
    fn default() -> Self {
        let data_dir = dirs::home_dir()
            .map(|h| h.join(".packpoint"))
            .unwrap_or_else(|| PathBuf::from(".packpoint"));
        Self {
            backend: "fjall".to_string(),
            data_dir,
        }
    }
}

/// `[bootstrap]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BootstrapSection {
    /// Fixed identity of the bootstrap record.
    pub record: String,
    /// Container name advertised in bootstrap links.
    pub container: String,
    /// URL scheme of bootstrap links.
    pub link_scheme: String,
}

impl Default for BootstrapSection {
    fn default() -> Self {
        Self {
            record: "bootstrap-main".to_string(),
            container: "default".to_string(),
            link_scheme: DEFAULT_LINK_SCHEME.to_string(),
        }
    }
}

/// `[history]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HistorySection {
    /// Maximum number of packs listed (and considered on recompute).
    pub limit: usize,
    /// Records per query page.
    pub page_size: usize,
}

impl Default for HistorySection {
    fn default() -> Self {
        Self {
            limit: DEFAULT_HISTORY_LIMIT,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// `[pointer]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PointerSection {
    /// Save attempts before a contended pointer update gives up.
    pub max_attempts: u32,
}

impl Default for PointerSection {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// `[log]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Log level filter (e.g. `"info"`, `"debug"`, `"warn"`).
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl CliConfig {
    /// Load config from a TOML file, or use defaults if no path given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => {
                let content = std::fs::read_to_string(p)?;
                let config: CliConfig = toml::from_str(&content)?;
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// Parse config from a TOML string (used in tests).
    #[cfg(test)]
    pub fn from_toml(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Whether the store lives only in memory for this process.
    pub fn memory_mode(&self) -> bool {
        self.store.backend == "memory"
    }

    /// Engine configuration derived from the file.
    pub fn node_config(&self) -> PackNodeConfig {
        PackNodeConfig {
            bootstrap_record: RecordId::new(self.bootstrap.record.clone()),
            container: self.bootstrap.container.clone(),
            link_scheme: self.bootstrap.link_scheme.clone(),
            history_page_size: self.history.page_size,
            history_limit: self.history.limit,
            pointer_max_attempts: self.pointer.max_attempts,
        }
    }
}
