//! The link registry: an ordered map of short-link keys to their definitions,
//! read from `url.json`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::Verbosity;
use crate::progress;

/// Key that renders to the top of the output tree instead of a subdirectory.
pub const ROOT_KEY: &str = "index";

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("could not read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("'{}' is not a valid JSON file: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("entry '{key}' in '{}' is not a valid link definition: {source}", .path.display())]
    Entry {
        path: PathBuf,
        key: String,
        source: serde_json::Error,
    },
}

/// A link as written in the registry file. Every field is optional on the
/// wire; `url` is only enforced when the entry is resolved.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl LinkDefinition {
    /// Fills in defaults for `key`. Returns `None` when there is no url.
    pub fn resolve(&self, key: &str) -> Option<LinkEntry> {
        let url = self.url.clone()?;

        Some(LinkEntry {
            key: key.to_string(),
            url,
            title: self.title.clone().unwrap_or_else(|| key.to_string()),
            description: self.description.clone().unwrap_or_else(|| key.to_string()),
            image: self.image.clone().unwrap_or_default(),
        })
    }
}

/// A fully resolved link, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry {
    pub key: String,
    pub url: String,
    pub title: String,
    pub description: String,
    pub image: String,
}

impl LinkEntry {
    pub fn is_root(&self) -> bool {
        self.key == ROOT_KEY
    }
}

/// Link definitions in the order they appear in the source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkRegistry {
    entries: Vec<(String, LinkDefinition)>,
}

impl LinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&data).map_err(|e| e.with_path(path))
    }

    /// Reads the registry and, when verbose, echoes its contents.
    pub fn load<P: AsRef<Path>>(path: P, verbosity: Verbosity) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let registry = Self::read(path)?;

        if verbosity.is_verbose() {
            let pretty = serde_json::to_string_pretty(&registry.to_json())
                .unwrap_or_else(|_| String::from("{}"));
            progress!(verbosity, "Contents of {}:\n{}", path.display(), pretty);
        }

        Ok(registry)
    }

    pub fn parse(data: &str) -> Result<Self, RegistryError> {
        let object: Map<String, Value> =
            serde_json::from_str(data).map_err(|source| RegistryError::Parse {
                path: PathBuf::new(),
                source,
            })?;

        let mut registry = Self::new();
        for (key, value) in object {
            let definition = serde_json::from_value(value).map_err(|source| {
                RegistryError::Entry {
                    path: PathBuf::new(),
                    key: key.clone(),
                    source,
                }
            })?;
            registry.insert(key, definition);
        }

        Ok(registry)
    }

    /// Adds a definition, replacing any existing one with the same key in place.
    pub fn insert<K: Into<String>>(&mut self, key: K, definition: LinkDefinition) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = definition,
            None => self.entries.push((key, definition)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&LinkDefinition> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, definition)| definition)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LinkDefinition)> {
        self.entries.iter().map(|(k, d)| (k.as_str(), d))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn to_json(&self) -> Map<String, Value> {
        self.entries
            .iter()
            .map(|(key, definition)| {
                let value = serde_json::to_value(definition).unwrap_or(Value::Null);
                (key.clone(), value)
            })
            .collect()
    }
}

impl RegistryError {
    fn with_path(self, path: &Path) -> Self {
        let path = path.to_path_buf();
        match self {
            RegistryError::Io { source, .. } => RegistryError::Io { path, source },
            RegistryError::Parse { source, .. } => RegistryError::Parse { path, source },
            RegistryError::Entry { key, source, .. } => RegistryError::Entry { path, key, source },
        }
    }
}
