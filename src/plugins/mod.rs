//! Native plugins
//!
//! Plugins are resolved by identifier from a [`PluginCatalog`] of factory
//! functions, then instantiated and started once by the [`PluginManager`].
//!
//! ```text
//! identifier → catalog factory → Arc<dyn Plugin> → start(api)
//! ```

pub mod builtin;
mod catalog;
mod manager;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::{EditorApi, Locale};

pub use catalog::{PluginCatalog, PluginFactory};
pub use manager::PluginManager;

/// A natively loaded extension
pub trait Plugin: Send + Sync {
    /// Called once, right after loading, with the shared API
    fn start(&self, api: Arc<dyn EditorApi>);

    /// Display name in the given locale
    fn name(&self, locale: &Locale) -> String;
}

impl fmt::Debug for dyn Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("name", &self.name(&Locale::default()))
            .finish()
    }
}

/// What loading an already-loaded identifier does
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Do nothing and report that nothing was loaded
    #[default]
    Ignore,
    /// Fail with [`PluginLoadError::AlreadyLoaded`]
    Error,
}

/// Failure reported by a plugin factory
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FactoryError {
    #[error("{0}")]
    Failed(String),
    #[error("{0}")]
    Denied(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PluginLoadError {
    #[error("Plugin '{id}' not found")]
    NotFound { id: String },

    #[error("Plugin '{id}' could not be instantiated: {reason}")]
    InstantiationFailed { id: String, reason: String },

    #[error("Access to plugin '{id}' denied: {reason}")]
    AccessDenied { id: String, reason: String },

    #[error("'{id}' is not a plugin")]
    TypeMismatch { id: String },

    #[error("Plugin '{id}' is already loaded")]
    AlreadyLoaded { id: String },
}

impl PluginLoadError {
    /// Identifier the failed load was for
    pub fn id(&self) -> &str {
        match self {
            Self::NotFound { id }
            | Self::InstantiationFailed { id, .. }
            | Self::AccessDenied { id, .. }
            | Self::TypeMismatch { id }
            | Self::AlreadyLoaded { id } => id,
        }
    }
}
