//! Cachet Clustered - Cluster extension plugin
//!
//! This crate teaches the Cachet XML translator the `urn:cachet:clustered:1`
//! vocabulary:
//!
//! - `<tc:cluster>` decodes to a [`ClusteringServiceConfiguration`]
//! - `<tc:clustered-store>` decodes to a [`ClusteredStoreConfiguration`]
//! - `<tc:clustered-dedicated>`, `<tc:clustered-shared>` and `<tc:clustered>`
//!   decode to [`ClusteredResourcePool`]s
//!
//! ## Example
//!
//! ```ignore
//! use cachet_xml::{ConfigurationTranslator, Plugins};
//!
//! let mut plugins = Plugins::new();
//! cachet_clustered::register(&mut plugins);
//! let translator = ConfigurationTranslator::new(plugins)?;
//! ```
//!
//! [`ClusteringServiceConfiguration`]: cachet_core::ClusteringServiceConfiguration
//! [`ClusteredStoreConfiguration`]: cachet_core::ClusteredStoreConfiguration
//! [`ClusteredResourcePool`]: cachet_core::ClusteredResourcePool

pub mod resource_parser;
pub mod service_parser;

use std::sync::Arc;

use cachet_xml::dom::Element;
use cachet_xml::{Plugins, SchemaSource};

pub use resource_parser::ClusteredResourceConfigurationParser;
pub use service_parser::ClusteringServiceConfigurationParser;

/// Namespace of the clustered vocabulary.
pub const NAMESPACE: &str = "urn:cachet:clustered:1";

/// Prefix used when encoding clustered elements.
pub const PREFIX: &str = "tc";

/// Name under which the clustered schema is aggregated.
pub const SCHEMA_NAME: &str = "cachet-clustered.xsd";

const SCHEMA: &str = include_str!("../schema/cachet-clustered.xsd");

/// Returns the schema fragment declaring the clustered vocabulary.
pub fn schema_source() -> SchemaSource {
    SchemaSource::embedded(SCHEMA_NAME, SCHEMA)
}

/// Registers the clustering service, clustered store and clustered
/// resource parsers.
///
/// The service parser is shared between the manager-level and cache-level
/// registrations.
pub fn register(plugins: &mut Plugins) {
    let service = Arc::new(ClusteringServiceConfigurationParser::new());
    plugins
        .add_service_creation_parser(service.clone())
        .add_service_parser(service)
        .add_resource_parser(Arc::new(ClusteredResourceConfigurationParser::new()));
}

/// Returns a fresh table holding only the clustered parsers.
pub fn plugins() -> Plugins {
    let mut plugins = Plugins::new();
    register(&mut plugins);
    plugins
}

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub(crate) fn element(local_name: &str) -> Element {
    Element::new_ns(NAMESPACE, Some(PREFIX), local_name)
}

/// Root of an encoded fragment, carrying the prefix declaration.
pub(crate) fn fragment_root(local_name: &str) -> Element {
    element(local_name).with_namespace_declaration(Some(PREFIX), NAMESPACE)
}

/// Returns whether `child` belongs to the same vocabulary as `parent`.
pub(crate) fn same_namespace(parent: &Element, child: &Element) -> bool {
    child.namespace() == parent.namespace()
}
