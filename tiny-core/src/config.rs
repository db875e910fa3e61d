use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

use crate::progress;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Parsing(#[from] serde_json::Error),
}

/// Whether progress lines are printed while building.
///
/// Warnings and errors are always reported; this only controls the
/// informational "folder created", "file copied" style output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Verbose,
}

impl Verbosity {
    pub fn is_verbose(self) -> bool {
        matches!(self, Verbosity::Verbose)
    }
}

impl From<bool> for Verbosity {
    fn from(verbose: bool) -> Self {
        if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Quiet
        }
    }
}

/// Site-wide settings read from `config.json`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SiteConfig {
    pub base_url: String,
}

impl SiteConfig {
    /// Strict read: any IO or parse failure is returned to the caller.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        let config: SiteConfig = serde_json::from_str(&data)?;

        Ok(config)
    }

    /// Reads the config, falling back to the default on any failure.
    pub fn load<P: AsRef<Path>>(path: P, verbosity: Verbosity) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            warn!(
                "Config file '{}' does not exist, using an empty base URL",
                path.display()
            );
            return Self::default();
        }

        match Self::read(path) {
            Ok(config) => {
                progress!(
                    verbosity,
                    "Loaded config '{}' (base_url = '{}')",
                    path.display(),
                    config.base_url
                );
                config
            }
            Err(e) => {
                error!(
                    "Could not load config '{}': {}. Using an empty base URL",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }
}
