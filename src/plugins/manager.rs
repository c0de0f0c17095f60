//! Plugin loading and identity tracking

use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::Mutex;

use super::{DuplicatePolicy, FactoryError, Plugin, PluginCatalog, PluginLoadError};
use crate::api::EditorApi;
use crate::util::panic_message;

#[derive(Default)]
struct Loaded {
    ids: HashSet<String>,
    plugins: Vec<(String, Arc<dyn Plugin>)>,
}

/// Loads plugins by identifier, at most once each, for the process lifetime
pub struct PluginManager {
    catalog: PluginCatalog,
    policy: DuplicatePolicy,
    loaded: Mutex<Loaded>,
}

impl PluginManager {
    pub fn new(catalog: PluginCatalog) -> Self {
        Self {
            catalog,
            policy: DuplicatePolicy::default(),
            loaded: Mutex::new(Loaded::default()),
        }
    }

    pub fn with_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    pub fn catalog(&self) -> &PluginCatalog {
        &self.catalog
    }

    /// Load and start the plugin registered under `id`
    ///
    /// Returns `Ok(None)` when `id` is already loaded and the policy is
    /// [`DuplicatePolicy::Ignore`]. The plugin is started after the manager's
    /// lock is released.
    pub fn load(
        &self,
        id: &str,
        api: Arc<dyn EditorApi>,
    ) -> Result<Option<Arc<dyn Plugin>>, PluginLoadError> {
        let factory = self
            .catalog
            .get(id)
            .ok_or_else(|| PluginLoadError::NotFound { id: id.to_string() })?;

        let plugin = {
            let mut loaded = self.loaded.lock();
            if loaded.ids.contains(id) {
                return match self.policy {
                    DuplicatePolicy::Ignore => {
                        tracing::debug!("Plugin '{}' already loaded, ignoring", id);
                        Ok(None)
                    }
                    DuplicatePolicy::Error => {
                        Err(PluginLoadError::AlreadyLoaded { id: id.to_string() })
                    }
                };
            }

            let produced = catch_unwind(AssertUnwindSafe(|| factory())).map_err(|payload| {
                PluginLoadError::InstantiationFailed {
                    id: id.to_string(),
                    reason: panic_message(payload.as_ref()),
                }
            })?;

            let instance = produced.map_err(|e| match e {
                FactoryError::Failed(reason) => PluginLoadError::InstantiationFailed {
                    id: id.to_string(),
                    reason,
                },
                FactoryError::Denied(reason) => PluginLoadError::AccessDenied {
                    id: id.to_string(),
                    reason,
                },
            })?;

            let plugin = *instance
                .downcast::<Arc<dyn Plugin>>()
                .map_err(|_| PluginLoadError::TypeMismatch { id: id.to_string() })?;

            loaded.ids.insert(id.to_string());
            loaded.plugins.push((id.to_string(), plugin.clone()));
            plugin
        };

        tracing::info!("Starting plugin '{}'", id);
        // A plugin that panics while starting stays recorded as loaded
        catch_unwind(AssertUnwindSafe(|| plugin.start(api))).map_err(|payload| {
            let reason = panic_message(payload.as_ref());
            tracing::error!("Plugin '{}' panicked while starting: {}", id, reason);
            PluginLoadError::InstantiationFailed {
                id: id.to_string(),
                reason,
            }
        })?;
        Ok(Some(plugin))
    }

    pub fn is_loaded(&self, id: &str) -> bool {
        self.loaded.lock().ids.contains(id)
    }

    /// Active plugin instances in load order
    pub fn plugins(&self) -> Vec<Arc<dyn Plugin>> {
        self.loaded
            .lock()
            .plugins
            .iter()
            .map(|(_, plugin)| plugin.clone())
            .collect()
    }

    /// Loaded identifiers in load order
    pub fn loaded_ids(&self) -> Vec<String> {
        self.loaded
            .lock()
            .plugins
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }
}
