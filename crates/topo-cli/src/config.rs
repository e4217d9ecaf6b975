//! CLI configuration
//!
//! Values come from an optional TOML file; command-line flags override them.
//!
//! ```toml
//! db_path = ".topo/store.db"
//! supplier_account = "0"
//! log_profile = "development"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// File looked up in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "topo.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub db_path: PathBuf,
    pub supplier_account: String,
    pub log_profile: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(".topo/store.db"),
            supplier_account: "0".to_string(),
            log_profile: "development".to_string(),
        }
    }
}

impl CliConfig {
    /// Load configuration
    ///
    /// An explicit path must exist. Without one, `topo.toml` is read if
    /// present and defaults are used otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, Box<dyn std::error::Error>> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read config {}: {}", path.display(), e))?;
        Self::parse(&text).map_err(|e| format!("invalid config {}: {}", path.display(), e).into())
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Apply flag values on top of the loaded configuration
    pub fn with_overrides(mut self, db: Option<PathBuf>, supplier_account: Option<String>) -> Self {
        if let Some(db) = db {
            self.db_path = db;
        }
        if let Some(account) = supplier_account {
            self.supplier_account = account;
        }
        self
    }
}
