//! Named plugin factories

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use super::builtin::{DatePlugin, FindPlugin};
use super::{FactoryError, Plugin};

/// Builds one plugin instance
///
/// The produced value must be an `Arc<dyn Plugin>`; anything else is rejected
/// at load time.
pub type PluginFactory =
    Box<dyn Fn() -> Result<Box<dyn Any + Send + Sync>, FactoryError> + Send + Sync>;

/// Identifier → factory table
#[derive(Default)]
pub struct PluginCatalog {
    factories: HashMap<String, PluginFactory>,
}

impl PluginCatalog {
    /// An empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding the bundled plugins
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.register_plugin::<DatePlugin>(DatePlugin::ID);
        catalog.register_plugin::<FindPlugin>(FindPlugin::ID);
        catalog
    }

    /// Register a raw factory, replacing any previous one for `id`
    pub fn register<F>(&mut self, id: &str, factory: F)
    where
        F: Fn() -> Result<Box<dyn Any + Send + Sync>, FactoryError> + Send + Sync + 'static,
    {
        if self.factories.insert(id.to_string(), Box::new(factory)).is_some() {
            tracing::warn!("Replaced plugin factory for '{}'", id);
        } else {
            tracing::debug!("Registered plugin factory for '{}'", id);
        }
    }

    /// Register a plugin type built with its `Default` constructor
    pub fn register_plugin<P>(&mut self, id: &str)
    where
        P: Plugin + Default + 'static,
    {
        self.register(id, || {
            let plugin: Arc<dyn Plugin> = Arc::new(P::default());
            Ok(Box::new(plugin) as Box<dyn Any + Send + Sync>)
        });
    }

    pub fn get(&self, id: &str) -> Option<&PluginFactory> {
        self.factories.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// Registered identifiers, sorted
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.factories.keys().cloned().collect();
        ids.sort();
        ids
    }
}
