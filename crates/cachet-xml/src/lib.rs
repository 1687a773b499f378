//! # Cachet XML
//!
//! Bidirectional translation between XML configuration documents and the
//! `cachet-core` configuration model.
//!
//! This crate provides the validating document builder, the pluggable schema
//! aggregator and parser registry, and the [`ConfigurationTranslator`] that
//! decodes XML into typed configuration and encodes it back.
//!
//! ## Features
//!
//! - Owned DOM built on `roxmltree`, serialized with `quick-xml`
//! - XML Schema subset compiler and validator
//! - Plugin traits for manager-level services, cache-level services and
//!   resource pools, each contributing its own schema fragment
//! - Explicit plugin registration with last-wins or strict duplicate handling
//!
//! ## Example
//!
//! ```ignore
//! use cachet_xml::{ConfigurationTranslator, Plugins};
//!
//! let mut plugins = Plugins::new();
//! cachet_clustered::register(&mut plugins);
//!
//! let translator = ConfigurationTranslator::new(plugins)?;
//! let configuration = translator.parse_configuration(&xml)?;
//! let exported = translator.to_configuration_xml(&configuration)?;
//! ```

pub mod config;
pub mod dom;
pub mod error;
pub mod plugin;
pub mod registry;
pub mod schema;
pub mod serializer;
pub mod translator;
pub mod values;

// Re-exports
pub use config::{TranslatorConfig, TranslatorConfigBuilder};
pub use dom::{Document, Element};
pub use error::{Result, XmlConfigError};
pub use plugin::{
    ResourceConfigurationParser, ServiceConfigurationParser, ServiceCreationConfigurationParser,
};
pub use registry::{ParserRegistry, Plugins};
pub use schema::{Schema, SchemaSource};
pub use translator::{CORE_NAMESPACE, ConfigurationTranslator};

// Re-export cachet_core for plugin authors
pub use cachet_core;
