//! Parser plugin contracts.
//!
//! A plugin owns an XML namespace. It supplies the schema fragment declaring
//! its vocabulary, and decodes and encodes the configuration objects of the
//! capability it is registered for. One plugin type may implement several of
//! these traits; its schema is then aggregated once.
//!
//! # Example
//!
//! ```
//! use cachet_core::{CustomConfiguration, ServiceCreationConfiguration, ServiceType};
//! use cachet_xml::dom::Element;
//! use cachet_xml::{Result, SchemaSource, ServiceCreationConfigurationParser, XmlConfigError};
//!
//! const NS: &str = "urn:acme:audit:1";
//!
//! struct AuditParser;
//!
//! impl ServiceCreationConfigurationParser for AuditParser {
//!     fn xml_schema(&self) -> SchemaSource {
//!         SchemaSource::embedded("acme-audit.xsd", "<xs:schema .../>")
//!     }
//!
//!     fn namespace(&self) -> &str {
//!         NS
//!     }
//!
//!     fn service_creation_configuration_type(&self) -> ServiceType {
//!         ServiceType::new("acme.audit")
//!     }
//!
//!     fn parse_service_creation_configuration(
//!         &self,
//!         fragment: &Element,
//!     ) -> Result<ServiceCreationConfiguration> {
//!         let level = fragment.attribute("level").unwrap_or("info").to_string();
//!         Ok(ServiceCreationConfiguration::Custom(CustomConfiguration::new(
//!             ServiceType::new("acme.audit"),
//!             level,
//!         )))
//!     }
//!
//!     fn translate_service_creation_configuration(
//!         &self,
//!         config: &ServiceCreationConfiguration,
//!     ) -> Result<Option<Element>> {
//!         let ServiceCreationConfiguration::Custom(custom) = config else {
//!             return Err(XmlConfigError::TypeMismatch {
//!                 expected: "audit configuration",
//!                 found: config.kind_name(),
//!             });
//!         };
//!         let level = custom.downcast_ref::<String>().cloned().unwrap_or_default();
//!         Ok(Some(
//!             Element::new_ns(NS, Some("audit"), "audit")
//!                 .with_namespace_declaration(Some("audit"), NS)
//!                 .with_attribute("level", level),
//!         ))
//!     }
//! }
//! ```

use cachet_core::{
    ResourcePool, ResourceType, ServiceConfiguration, ServiceCreationConfiguration, ServiceType,
};

use crate::dom::Element;
use crate::error::Result;
use crate::schema::SchemaSource;

/// Decodes and encodes a manager-level service configuration.
pub trait ServiceCreationConfigurationParser: Send + Sync {
    /// Returns the schema fragment declaring this plugin's vocabulary.
    fn xml_schema(&self) -> SchemaSource;

    /// Returns the XML namespace owned by this plugin.
    fn namespace(&self) -> &str;

    /// Returns the configuration type this plugin is registered under.
    fn service_creation_configuration_type(&self) -> ServiceType;

    /// Decodes a fragment in this plugin's namespace.
    fn parse_service_creation_configuration(
        &self,
        fragment: &Element,
    ) -> Result<ServiceCreationConfiguration>;

    /// Encodes `config` as a fragment rooted in this plugin's namespace.
    ///
    /// Returns `Ok(None)` when the configuration has no XML representation.
    fn translate_service_creation_configuration(
        &self,
        config: &ServiceCreationConfiguration,
    ) -> Result<Option<Element>>;
}

/// Decodes and encodes a cache-level service configuration.
pub trait ServiceConfigurationParser: Send + Sync {
    fn xml_schema(&self) -> SchemaSource;

    fn namespace(&self) -> &str;

    fn service_configuration_type(&self) -> ServiceType;

    fn parse_service_configuration(&self, fragment: &Element) -> Result<ServiceConfiguration>;

    fn translate_service_configuration(
        &self,
        config: &ServiceConfiguration,
    ) -> Result<Option<Element>>;
}

/// Decodes and encodes the resource pools of one or more resource types.
pub trait ResourceConfigurationParser: Send + Sync {
    fn xml_schema(&self) -> SchemaSource;

    fn namespace(&self) -> &str;

    /// Returns every resource type this plugin handles.
    fn resource_types(&self) -> Vec<ResourceType>;

    fn parse_resource_configuration(&self, fragment: &Element) -> Result<ResourcePool>;

    fn translate_resource_configuration(&self, pool: &ResourcePool) -> Result<Option<Element>>;
}
