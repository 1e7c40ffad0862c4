//! Environments and their variable sets.
//!
//! An environment is a named, ordered list of key/value variables used to
//! parameterize request templates. The store loads environments from a JSON
//! file and looks them up by name on behalf of the entry points.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// A single key/value variable within an environment.
///
/// Keys are unique within one environment. Order is preserved for display;
/// resolution does not depend on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub key: String,
    pub value: String,
}

impl Variable {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A named environment: an ordered set of variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Environment {
    pub name: String,

    #[serde(default)]
    pub variables: Vec<Variable>,
}

/// Errors that can occur while loading or querying the environment store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read environments file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse environments file '{path}': {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// In-memory store of environments, loaded once from a JSON file.
///
/// The file holds a JSON array of environment objects:
///
/// ```json
/// [
///   {"name": "staging", "variables": [{"key": "base", "value": "https://staging.example.com"}]}
/// ]
/// ```
#[derive(Debug, Clone, Default)]
pub struct EnvironmentStore {
    environments: Vec<Environment>,
}

impl EnvironmentStore {
    pub fn new(environments: Vec<Environment>) -> Self {
        Self { environments }
    }

    /// Load the store from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let environments: Vec<Environment> =
            serde_json::from_str(&contents).map_err(|source| StoreError::Parse {
                path: path.display().to_string(),
                source,
            })?;

        debug!(
            path = %path.display(),
            environments = environments.len(),
            "Loaded environment store"
        );

        Ok(Self { environments })
    }

    /// Look up an environment by name. Returns `None` when no environment
    /// with that name exists.
    pub fn lookup(&self, name: &str) -> Option<&Environment> {
        self.environments.iter().find(|e| e.name == name)
    }

    /// Names of all environments in the store, in file order.
    pub fn names(&self) -> Vec<&str> {
        self.environments.iter().map(|e| e.name.as_str()).collect()
    }
}
