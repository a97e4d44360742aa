//! Resource type registry and provider resolution
//!
//! Registration happens once, up front: types register under their provides
//! names, hand-written providers bind to those same names. After that the
//! registry is read-only and runs resolve providers from it without
//! coordination.

use crate::error::{Error, Result};
use crate::provider::{InlineActionProvider, Provider};
use crate::resource::{ResourceInstance, ResourceType};
use std::collections::HashMap;
use std::sync::Arc;

/// Instantiates a hand-written provider bound to one (desired-state
/// instance, action name) pair
pub type ProviderFactory = Arc<dyn Fn(ResourceInstance, String) -> Box<dyn Provider> + Send + Sync>;

/// Maps lookup names to resource types and hand-written providers
#[derive(Default)]
pub struct ResourceTypeRegistry {
    types: HashMap<String, Arc<ResourceType>>,
    providers: HashMap<String, ProviderFactory>,
}

impl ResourceTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `ty` under each of its provides names; the last
    /// registration for a given name wins
    pub fn register(&mut self, ty: &Arc<ResourceType>) {
        for name in ty.provides() {
            log::debug!("resource type '{}' provides '{name}'", ty.name());
            self.types.insert(name.clone(), Arc::clone(ty));
        }
    }

    /// Look up the resource type registered under `name`
    pub fn resource_type(&self, name: &str) -> Option<&Arc<ResourceType>> {
        self.types.get(name)
    }

    /// Bind a hand-written provider factory to a lookup name; the last
    /// registration for a given name wins
    pub fn register_provider(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn(ResourceInstance, String) -> Box<dyn Provider> + Send + Sync + 'static,
    ) {
        let name = name.into();
        log::debug!("hand-written provider registered for '{name}'");
        self.providers.insert(name, Arc::new(factory));
    }

    /// Resolve the provider for one action run, taking ownership of the
    /// desired-state instance
    ///
    /// Hand-written providers registered under any of the instance type's
    /// provides names take precedence; otherwise the nearest inline action
    /// body up the ancestry is synthesized into a default provider.
    pub fn resolve_provider(
        &self,
        resource: ResourceInstance,
        action: &str,
    ) -> Result<Box<dyn Provider>> {
        let factory = resource
            .resource_type()
            .provides()
            .iter()
            .find_map(|name| self.providers.get(name))
            .cloned();
        if let Some(factory) = factory {
            return Ok(factory(resource, action.to_string()));
        }

        if let Some(body) = resource.resource_type().find_action(action) {
            return Ok(Box::new(InlineActionProvider::new(
                resource,
                action.to_string(),
                body,
            )));
        }

        Err(Error::NoProviderFound {
            type_name: resource.resource_type().name().to_string(),
            action: action.to_string(),
        })
    }
}
