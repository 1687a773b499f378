//! Plugin registration and lookup.
//!
//! Plugins are registered explicitly in a [`Plugins`] table. At translator
//! construction the table is turned into an immutable [`ParserRegistry`]
//! keyed by configuration type (for encoding) and by namespace (for
//! decoding).

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use cachet_core::{ResourceType, ServiceType};
use tracing::{debug, warn};

use crate::error::{Result, XmlConfigError};
use crate::plugin::{
    ResourceConfigurationParser, ServiceConfigurationParser, ServiceCreationConfigurationParser,
};
use crate::schema::SchemaSource;

const SERVICE_CREATION: &str = "service creation";
const SERVICE: &str = "service";
const RESOURCE: &str = "resource";

/// Explicit plugin registration table.
///
/// Registration order is preserved: when two plugins declare the same key,
/// the one registered last wins.
///
/// # Example
///
/// ```ignore
/// let mut plugins = Plugins::new();
/// cachet_clustered::register(&mut plugins);
/// let translator = ConfigurationTranslator::new(plugins)?;
/// ```
#[derive(Clone, Default)]
pub struct Plugins {
    service_creation: Vec<Arc<dyn ServiceCreationConfigurationParser>>,
    service: Vec<Arc<dyn ServiceConfigurationParser>>,
    resource: Vec<Arc<dyn ResourceConfigurationParser>>,
}

impl Plugins {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a manager-level service parser.
    pub fn add_service_creation_parser(
        &mut self,
        parser: Arc<dyn ServiceCreationConfigurationParser>,
    ) -> &mut Self {
        self.service_creation.push(parser);
        self
    }

    /// Registers a cache-level service parser.
    pub fn add_service_parser(&mut self, parser: Arc<dyn ServiceConfigurationParser>) -> &mut Self {
        self.service.push(parser);
        self
    }

    /// Registers a resource parser.
    pub fn add_resource_parser(&mut self, parser: Arc<dyn ResourceConfigurationParser>) -> &mut Self {
        self.resource.push(parser);
        self
    }

    /// Registers a manager-level service parser, builder style.
    pub fn with_service_creation_parser(
        mut self,
        parser: impl ServiceCreationConfigurationParser + 'static,
    ) -> Self {
        self.add_service_creation_parser(Arc::new(parser));
        self
    }

    /// Registers a cache-level service parser, builder style.
    pub fn with_service_parser(mut self, parser: impl ServiceConfigurationParser + 'static) -> Self {
        self.add_service_parser(Arc::new(parser));
        self
    }

    /// Registers a resource parser, builder style.
    pub fn with_resource_parser(mut self, parser: impl ResourceConfigurationParser + 'static) -> Self {
        self.add_resource_parser(Arc::new(parser));
        self
    }

    /// Returns the schema fragments of every registered plugin, in registration order.
    pub fn schema_sources(&self) -> Vec<SchemaSource> {
        self.service_creation
            .iter()
            .map(|p| p.xml_schema())
            .chain(self.service.iter().map(|p| p.xml_schema()))
            .chain(self.resource.iter().map(|p| p.xml_schema()))
            .collect()
    }

    /// Returns the total number of registrations.
    pub fn len(&self) -> usize {
        self.service_creation.len() + self.service.len() + self.resource.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Plugins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugins")
            .field("service_creation", &self.service_creation.len())
            .field("service", &self.service.len())
            .field("resource", &self.resource.len())
            .finish()
    }
}

/// Immutable lookup tables built from a [`Plugins`] table.
pub struct ParserRegistry {
    service_creation: HashMap<ServiceType, Arc<dyn ServiceCreationConfigurationParser>>,
    service: HashMap<ServiceType, Arc<dyn ServiceConfigurationParser>>,
    resource: HashMap<ResourceType, Arc<dyn ResourceConfigurationParser>>,
    service_creation_ns: HashMap<String, Arc<dyn ServiceCreationConfigurationParser>>,
    service_ns: HashMap<String, Arc<dyn ServiceConfigurationParser>>,
    resource_ns: HashMap<String, Arc<dyn ResourceConfigurationParser>>,
}

impl ParserRegistry {
    /// Builds the lookup tables.
    ///
    /// With `strict` set, a key declared twice is an error; otherwise the
    /// later registration replaces the earlier one.
    pub fn build(plugins: &Plugins, strict: bool) -> Result<Self> {
        let mut registry = Self {
            service_creation: HashMap::new(),
            service: HashMap::new(),
            resource: HashMap::new(),
            service_creation_ns: HashMap::new(),
            service_ns: HashMap::new(),
            resource_ns: HashMap::new(),
        };

        for parser in &plugins.service_creation {
            let key = parser.service_creation_configuration_type();
            debug!("Registering {} parser for '{}'", SERVICE_CREATION, key);
            register(&mut registry.service_creation, SERVICE_CREATION, key, parser.clone(), strict)?;
            let ns = parser.namespace().to_string();
            register(&mut registry.service_creation_ns, SERVICE_CREATION, ns, parser.clone(), strict)?;
        }

        for parser in &plugins.service {
            let key = parser.service_configuration_type();
            debug!("Registering {} parser for '{}'", SERVICE, key);
            register(&mut registry.service, SERVICE, key, parser.clone(), strict)?;
            let ns = parser.namespace().to_string();
            register(&mut registry.service_ns, SERVICE, ns, parser.clone(), strict)?;
        }

        for parser in &plugins.resource {
            for key in parser.resource_types() {
                debug!("Registering {} parser for '{}'", RESOURCE, key);
                register(&mut registry.resource, RESOURCE, key, parser.clone(), strict)?;
            }
            let ns = parser.namespace().to_string();
            register(&mut registry.resource_ns, RESOURCE, ns, parser.clone(), strict)?;
        }

        Ok(registry)
    }

    /// Returns the parser for a manager-level service type.
    pub fn service_creation_parser(
        &self,
        service_type: &ServiceType,
    ) -> Result<&Arc<dyn ServiceCreationConfigurationParser>> {
        lookup(&self.service_creation, SERVICE_CREATION, service_type)
    }

    /// Returns the parser for a cache-level service type.
    pub fn service_parser(
        &self,
        service_type: &ServiceType,
    ) -> Result<&Arc<dyn ServiceConfigurationParser>> {
        lookup(&self.service, SERVICE, service_type)
    }

    /// Returns the parser for a resource type.
    pub fn resource_parser(
        &self,
        resource_type: &ResourceType,
    ) -> Result<&Arc<dyn ResourceConfigurationParser>> {
        lookup(&self.resource, RESOURCE, resource_type)
    }

    /// Returns the manager-level service parser owning `namespace`.
    pub fn service_creation_parser_for_namespace(
        &self,
        namespace: &str,
    ) -> Result<&Arc<dyn ServiceCreationConfigurationParser>> {
        lookup(&self.service_creation_ns, SERVICE_CREATION, namespace)
    }

    /// Returns the cache-level service parser owning `namespace`.
    pub fn service_parser_for_namespace(
        &self,
        namespace: &str,
    ) -> Result<&Arc<dyn ServiceConfigurationParser>> {
        lookup(&self.service_ns, SERVICE, namespace)
    }

    /// Returns the resource parser owning `namespace`.
    pub fn resource_parser_for_namespace(
        &self,
        namespace: &str,
    ) -> Result<&Arc<dyn ResourceConfigurationParser>> {
        lookup(&self.resource_ns, RESOURCE, namespace)
    }

    /// Returns the number of registered keys per capability
    /// (service creation, service, resource).
    pub fn counts(&self) -> (usize, usize, usize) {
        (
            self.service_creation.len(),
            self.service.len(),
            self.resource.len(),
        )
    }
}

impl fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserRegistry")
            .field("service_creation", &self.service_creation.keys().collect::<Vec<_>>())
            .field("service", &self.service.keys().collect::<Vec<_>>())
            .field("resource", &self.resource.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

fn register<K, V>(
    map: &mut HashMap<K, V>,
    registry: &'static str,
    key: K,
    value: V,
    strict: bool,
) -> Result<()>
where
    K: Eq + Hash + fmt::Display,
{
    let name = key.to_string();
    if map.insert(key, value).is_some() {
        if strict {
            return Err(XmlConfigError::DuplicateRegistration {
                registry,
                key: name,
            });
        }
        warn!(
            "Duplicate {} parser registration for '{}', using the last one registered",
            registry, name
        );
    }
    Ok(())
}

fn lookup<'a, K, Q, V>(map: &'a HashMap<K, V>, registry: &'static str, key: &Q) -> Result<&'a V>
where
    K: Eq + Hash + std::borrow::Borrow<Q>,
    Q: Eq + Hash + fmt::Display + ?Sized,
{
    map.get(key)
        .ok_or_else(|| XmlConfigError::unknown_registration(registry, key.to_string()))
}
