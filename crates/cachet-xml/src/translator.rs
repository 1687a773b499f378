//! The configuration translator.
//!
//! [`ConfigurationTranslator`] aggregates the core schema with every plugin
//! schema, builds the parser registry and then translates in both
//! directions:
//!
//! - decode: validated XML → typed configuration, dispatched by the
//!   namespace of each extension element;
//! - encode: typed configuration → XML, dispatched by service or resource
//!   type.
//!
//! The core vocabulary (`config`, `service`, `cache`, `resources`, `heap`,
//! `offheap`) is handled here; everything else belongs to plugins.

use std::sync::Arc;

use cachet_core::{
    CacheConfiguration, Configuration, MemoryUnit, ResourcePool, ResourceUnit,
    ServiceConfiguration, ServiceCreationConfiguration, SizedResourcePool,
};
use tracing::{debug, info};

use crate::config::TranslatorConfig;
use crate::dom::{Document, Element};
use crate::error::{Result, XmlConfigError};
use crate::registry::{ParserRegistry, Plugins};
use crate::schema::{self, Schema};
use crate::serializer;
use crate::values;

/// Namespace of the core configuration vocabulary.
pub const CORE_NAMESPACE: &str = "urn:cachet:core:1";

/// Bidirectional XML ↔ configuration translator.
///
/// Construction is fail-fast: every schema is loaded and compiled and every
/// plugin registered before the translator is returned. Afterwards the
/// translator is immutable and can be shared across threads.
#[derive(Debug)]
pub struct ConfigurationTranslator {
    schema: Arc<Schema>,
    registry: ParserRegistry,
    config: TranslatorConfig,
}

impl ConfigurationTranslator {
    /// Creates a translator with the default configuration.
    pub fn new(plugins: Plugins) -> Result<Self> {
        Self::with_config(plugins, TranslatorConfig::default())
    }

    /// Creates a translator.
    ///
    /// # Errors
    ///
    /// Fails if a schema cannot be read or compiled, or, with strict
    /// registration, if two plugins declare the same key.
    pub fn with_config(plugins: Plugins, config: TranslatorConfig) -> Result<Self> {
        let mut sources = vec![config.core_schema_source()];
        sources.extend(plugins.schema_sources());

        let schema = schema::compile(&sources)?;
        let registry = ParserRegistry::build(&plugins, config.strict_registration())?;

        let (creation, service, resource) = registry.counts();
        info!(
            "Configuration translator ready: {} schema namespaces, {} service creation, {} service and {} resource parsers",
            schema.target_namespaces().len(),
            creation,
            service,
            resource
        );

        Ok(Self {
            schema,
            registry,
            config,
        })
    }

    /// Returns the aggregated schema.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Returns the parser registry.
    pub fn registry(&self) -> &ParserRegistry {
        &self.registry
    }

    /// Returns the translator configuration.
    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    // ============================================
    // Decoding
    // ============================================

    /// Parses `xml` and validates it against the aggregated schema.
    pub fn parse_document(&self, xml: &str) -> Result<Document> {
        let document = Document::parse(xml)?;
        if let Some(root) = document.root() {
            self.schema.validate(root)?;
        }
        Ok(document)
    }

    /// Decodes a complete `<config>` document.
    pub fn parse_configuration(&self, xml: &str) -> Result<Configuration> {
        let document = self.parse_document(xml)?;
        let root = document
            .root()
            .ok_or_else(|| XmlConfigError::missing_element("config", "null"))?;
        if !is_core(root, "config") {
            return Err(XmlConfigError::unsupported_element(root.tag_name(), None));
        }

        let mut configuration = Configuration::new();
        for child in root.child_elements() {
            if is_core(child, "service") {
                let extension = single_extension(child)?;
                let service = self.decode_service_creation_configuration(extension)?;
                configuration = configuration.with_service(service);
            } else if is_core(child, "cache") {
                let alias = child
                    .attribute("alias")
                    .ok_or_else(|| XmlConfigError::missing_attribute("alias", child.tag_name()))?;
                if configuration.cache(alias).is_some() {
                    return Err(XmlConfigError::DuplicateCacheAlias {
                        alias: alias.to_string(),
                    });
                }
                let cache = self.decode_cache(child)?;
                configuration = configuration.with_cache(alias, cache);
            } else {
                return Err(XmlConfigError::unsupported_element(
                    child.tag_name(),
                    Some(&root.tag_name()),
                ));
            }
        }

        debug!(
            "Decoded configuration with {} services and {} caches",
            configuration.service_creation_configurations().len(),
            configuration.caches().len()
        );
        Ok(configuration)
    }

    /// Decodes a manager-level service fragment with the plugin owning its namespace.
    pub fn decode_service_creation_configuration(
        &self,
        fragment: &Element,
    ) -> Result<ServiceCreationConfiguration> {
        let parser = self
            .registry
            .service_creation_parser_for_namespace(namespace_of(fragment)?)?;
        debug!(
            "Decoding <{}> as {}",
            fragment.tag_name(),
            parser.service_creation_configuration_type()
        );
        parser.parse_service_creation_configuration(fragment)
    }

    /// Decodes a cache-level service fragment with the plugin owning its namespace.
    pub fn decode_service_configuration(&self, fragment: &Element) -> Result<ServiceConfiguration> {
        let parser = self
            .registry
            .service_parser_for_namespace(namespace_of(fragment)?)?;
        debug!(
            "Decoding <{}> as {}",
            fragment.tag_name(),
            parser.service_configuration_type()
        );
        parser.parse_service_configuration(fragment)
    }

    /// Decodes a resource pool fragment, core or extension.
    pub fn decode_resource_pool(&self, fragment: &Element) -> Result<ResourcePool> {
        if fragment.namespace() == Some(CORE_NAMESPACE) {
            return decode_core_pool(fragment);
        }
        let parser = self
            .registry
            .resource_parser_for_namespace(namespace_of(fragment)?)?;
        debug!("Decoding resource <{}>", fragment.tag_name());
        parser.parse_resource_configuration(fragment)
    }

    /// Validates and decodes a standalone manager-level service fragment.
    pub fn service_creation_configuration_from_xml(
        &self,
        xml: &str,
    ) -> Result<ServiceCreationConfiguration> {
        let document = self.parse_document(xml)?;
        let root = root_of(&document)?;
        self.decode_service_creation_configuration(root)
    }

    /// Validates and decodes a standalone cache-level service fragment.
    pub fn service_configuration_from_xml(&self, xml: &str) -> Result<ServiceConfiguration> {
        let document = self.parse_document(xml)?;
        let root = root_of(&document)?;
        self.decode_service_configuration(root)
    }

    /// Validates and decodes a standalone resource pool fragment.
    pub fn resource_pool_from_xml(&self, xml: &str) -> Result<ResourcePool> {
        let document = self.parse_document(xml)?;
        let root = root_of(&document)?;
        self.decode_resource_pool(root)
    }

    fn decode_cache(&self, element: &Element) -> Result<CacheConfiguration> {
        let mut cache = CacheConfiguration::new();
        for child in element.child_elements() {
            if child.namespace() != Some(CORE_NAMESPACE) {
                cache
                    .service_configurations
                    .push(self.decode_service_configuration(child)?);
                continue;
            }
            match child.local_name() {
                "key-type" => cache.key_type = Some(child.text().trim().to_string()),
                "value-type" => cache.value_type = Some(child.text().trim().to_string()),
                "resources" => {
                    for pool in child.child_elements() {
                        cache.resource_pools.push(self.decode_resource_pool(pool)?);
                    }
                }
                _ => {
                    return Err(XmlConfigError::unsupported_element(
                        child.tag_name(),
                        Some(&element.tag_name()),
                    ));
                }
            }
        }
        Ok(cache)
    }

    // ============================================
    // Encoding
    // ============================================

    /// Encodes a manager-level service configuration as an XML fragment.
    ///
    /// Returns an empty string when the plugin produces no fragment.
    pub fn service_creation_configuration_xml(
        &self,
        config: &ServiceCreationConfiguration,
    ) -> Result<String> {
        render(self.encode_service_creation(config)?)
    }

    /// Encodes a cache-level service configuration as an XML fragment.
    pub fn service_configuration_xml(&self, config: &ServiceConfiguration) -> Result<String> {
        render(self.encode_service(config)?)
    }

    /// Encodes a resource pool as an XML fragment.
    pub fn resource_pool_xml(&self, pool: &ResourcePool) -> Result<String> {
        render(self.encode_resource_pool(pool)?)
    }

    /// Encodes every service fragment of `configuration`, newline separated.
    ///
    /// Manager-level services come first, then the services of each cache
    /// in cache order. Empty fragments are skipped.
    pub fn to_xml(&self, configuration: &Configuration) -> Result<String> {
        let mut fragments = Vec::new();
        for config in configuration.service_creation_configurations() {
            fragments.push(self.service_creation_configuration_xml(config)?);
        }
        for cache in configuration.caches().values() {
            for config in &cache.service_configurations {
                fragments.push(self.service_configuration_xml(config)?);
            }
        }
        fragments.retain(|fragment| !fragment.is_empty());
        Ok(fragments.join("\n"))
    }

    /// Encodes `configuration` as a complete `<config>` document.
    pub fn to_configuration_xml(&self, configuration: &Configuration) -> Result<String> {
        let mut root = core_element("config").with_namespace_declaration(None, CORE_NAMESPACE);

        for config in configuration.service_creation_configurations() {
            if let Some(fragment) = self.encode_service_creation(config)? {
                root.push_child(core_element("service").with_child(fragment));
            }
        }

        for (alias, cache) in configuration.caches() {
            let mut element = core_element("cache").with_attribute("alias", alias.as_str());
            if let Some(key_type) = &cache.key_type {
                element.push_child(core_element("key-type").with_text(key_type.as_str()));
            }
            if let Some(value_type) = &cache.value_type {
                element.push_child(core_element("value-type").with_text(value_type.as_str()));
            }
            if !cache.resource_pools.is_empty() {
                let mut resources = core_element("resources");
                for pool in &cache.resource_pools {
                    if let Some(fragment) = self.encode_resource_pool(pool)? {
                        resources.push_child(fragment);
                    }
                }
                element.push_child(resources);
            }
            for config in &cache.service_configurations {
                if let Some(fragment) = self.encode_service(config)? {
                    element.push_child(fragment);
                }
            }
            root.push_child(element);
        }

        serializer::to_string(&root)
    }

    fn encode_service_creation(&self, config: &ServiceCreationConfiguration) -> Result<Option<Element>> {
        let service_type = config.service_type();
        let parser = self.registry.service_creation_parser(&service_type)?;
        debug!("Encoding {} configuration", service_type);
        parser.translate_service_creation_configuration(config)
    }

    fn encode_service(&self, config: &ServiceConfiguration) -> Result<Option<Element>> {
        let service_type = config.service_type();
        let parser = self.registry.service_parser(&service_type)?;
        debug!("Encoding {} configuration", service_type);
        parser.translate_service_configuration(config)
    }

    fn encode_resource_pool(&self, pool: &ResourcePool) -> Result<Option<Element>> {
        match pool {
            ResourcePool::Heap(sized) => Ok(Some(sized_element("heap", sized))),
            ResourcePool::Offheap(sized) => Ok(Some(sized_element("offheap", sized))),
            _ => {
                let resource_type = pool.resource_type();
                let parser = self.registry.resource_parser(&resource_type)?;
                debug!("Encoding {} resource", resource_type);
                parser.translate_resource_configuration(pool)
            }
        }
    }
}

fn decode_core_pool(element: &Element) -> Result<ResourcePool> {
    match element.local_name() {
        "heap" => Ok(ResourcePool::Heap(SizedResourcePool::new(
            values::decode_size(element)?,
            values::decode_resource_unit(element, ResourceUnit::Entries)?,
        ))),
        "offheap" => Ok(ResourcePool::Offheap(SizedResourcePool::new(
            values::decode_size(element)?,
            values::decode_memory_unit(element, MemoryUnit::MB)?,
        ))),
        _ => Err(XmlConfigError::unsupported_element(
            element.tag_name(),
            element.parent_tag(),
        )),
    }
}

fn sized_element(name: &str, pool: &SizedResourcePool) -> Element {
    core_element(name)
        .with_attribute("unit", pool.unit.to_string())
        .with_text(pool.size.to_string())
}

fn core_element(name: &str) -> Element {
    Element::new_ns(CORE_NAMESPACE, None, name)
}

fn is_core(element: &Element, local_name: &str) -> bool {
    element.namespace() == Some(CORE_NAMESPACE) && element.local_name() == local_name
}

fn namespace_of(fragment: &Element) -> Result<&str> {
    fragment
        .namespace()
        .ok_or_else(|| XmlConfigError::unsupported_element(fragment.tag_name(), fragment.parent_tag()))
}

fn root_of(document: &Document) -> Result<&Element> {
    document
        .root()
        .ok_or_else(|| XmlConfigError::missing_element("root", "null"))
}

fn single_extension(service: &Element) -> Result<&Element> {
    let mut children = service.child_elements();
    let first = children
        .next()
        .ok_or_else(|| XmlConfigError::missing_element("service extension", service.tag_name()))?;
    if let Some(extra) = children.next() {
        return Err(XmlConfigError::unsupported_element(
            extra.tag_name(),
            Some(&service.tag_name()),
        ));
    }
    Ok(first)
}

fn render(fragment: Option<Element>) -> Result<String> {
    let document = match fragment {
        Some(root) => Document::with_root(root),
        None => Document::new(),
    };
    serializer::document_to_string(&document)
}
