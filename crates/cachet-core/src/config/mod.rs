pub mod resource;
pub mod service;

pub use resource::{CustomResourcePool, ResourcePool, SizedResourcePool};
pub use service::{CustomConfiguration, ServiceConfiguration, ServiceCreationConfiguration};

use indexmap::IndexMap;

/// Configuration of a single cache.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CacheConfiguration {
    /// Fully qualified key type name, if declared.
    pub key_type: Option<String>,
    /// Fully qualified value type name, if declared.
    pub value_type: Option<String>,
    /// Storage tiers, in declaration order.
    pub resource_pools: Vec<ResourcePool>,
    /// Cache-scoped service configurations, in declaration order.
    pub service_configurations: Vec<ServiceConfiguration>,
}

impl CacheConfiguration {
    /// Creates an empty cache configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a resource pool.
    pub fn with_resource_pool(mut self, pool: impl Into<ResourcePool>) -> Self {
        self.resource_pools.push(pool.into());
        self
    }

    /// Adds a service configuration.
    pub fn with_service(mut self, service: impl Into<ServiceConfiguration>) -> Self {
        self.service_configurations.push(service.into());
        self
    }

    /// Sets the key and value type names.
    pub fn with_types(mut self, key_type: impl Into<String>, value_type: impl Into<String>) -> Self {
        self.key_type = Some(key_type.into());
        self.value_type = Some(value_type.into());
        self
    }
}

/// Root configuration of a cache manager.
///
/// Cache order is insertion order, which keeps exported XML stable.
///
/// # Example
///
/// ```
/// use cachet_core::{CacheConfiguration, Configuration};
///
/// let config = Configuration::new()
///     .with_cache("users", CacheConfiguration::new())
///     .with_cache("orders", CacheConfiguration::new());
///
/// let aliases: Vec<&str> = config.caches().keys().map(String::as_str).collect();
/// assert_eq!(aliases, vec!["users", "orders"]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Configuration {
    service_creation_configurations: Vec<ServiceCreationConfiguration>,
    caches: IndexMap<String, CacheConfiguration>,
}

impl Configuration {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a manager-scoped service configuration.
    pub fn with_service(mut self, service: impl Into<ServiceCreationConfiguration>) -> Self {
        self.service_creation_configurations.push(service.into());
        self
    }

    /// Adds a cache, replacing any cache with the same alias.
    pub fn with_cache(mut self, alias: impl Into<String>, cache: CacheConfiguration) -> Self {
        self.caches.insert(alias.into(), cache);
        self
    }

    /// Returns the manager-scoped service configurations.
    pub fn service_creation_configurations(&self) -> &[ServiceCreationConfiguration] {
        &self.service_creation_configurations
    }

    /// Returns the caches keyed by alias.
    pub fn caches(&self) -> &IndexMap<String, CacheConfiguration> {
        &self.caches
    }

    /// Returns the cache with the given alias.
    pub fn cache(&self, alias: &str) -> Option<&CacheConfiguration> {
        self.caches.get(alias)
    }
}
