//! Clustering service and clustered store parsing.
//!
//! The manager-level `<tc:cluster>` element carries the connection URI, the
//! client timeouts and an optional server-side configuration. The cache-level
//! `<tc:clustered-store>` element carries the store consistency.

use std::time::Duration;

use cachet_core::{
    ClusteredStoreConfiguration, ClusteringServiceConfiguration, Consistency, MemoryUnit, Pool,
    ServerSideConfiguration, ServiceConfiguration, ServiceCreationConfiguration, ServiceType,
    Timeouts,
};
use cachet_xml::dom::Element;
use cachet_xml::values::{self, AmountError};
use cachet_xml::{
    Result, SchemaSource, ServiceConfigurationParser, ServiceCreationConfigurationParser,
    XmlConfigError,
};
use indexmap::IndexMap;
use tracing::debug;

use crate::{NAMESPACE, element, fragment_root, same_namespace, schema_source};

const CLUSTER: &str = "cluster";
const CONNECTION: &str = "connection";
const URL: &str = "url";
const READ_TIMEOUT: &str = "read-timeout";
const WRITE_TIMEOUT: &str = "write-timeout";
const CONNECTION_TIMEOUT: &str = "connection-timeout";
const SERVER_SIDE_CONFIG: &str = "server-side-config";
const AUTO_CREATE: &str = "auto-create";
const DEFAULT_RESOURCE: &str = "default-resource";
const SHARED_POOL: &str = "shared-pool";
const FROM: &str = "from";
const NAME: &str = "name";
const UNIT: &str = "unit";
const CLUSTERED_STORE: &str = "clustered-store";
const CONSISTENCY: &str = "consistency";

/// Parser for `<tc:cluster>` and `<tc:clustered-store>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClusteringServiceConfigurationParser;

impl ClusteringServiceConfigurationParser {
    pub fn new() -> Self {
        Self
    }

    /// Decodes a `<cluster>` element.
    pub fn parse_cluster(&self, fragment: &Element) -> Result<ClusteringServiceConfiguration> {
        if fragment.local_name() != CLUSTER {
            return Err(XmlConfigError::unsupported_element(
                fragment.tag_name(),
                fragment.parent_tag(),
            ));
        }

        let mut cluster_uri = None;
        let mut timeouts = Timeouts::builder();
        let mut server_side = None;

        for child in fragment.child_elements() {
            if !same_namespace(fragment, child) {
                return Err(unsupported(child, fragment));
            }
            match child.local_name() {
                CONNECTION => cluster_uri = Some(values::decode_uri(child, URL)?),
                READ_TIMEOUT => timeouts = timeouts.read(values::decode_timeout(child)?),
                WRITE_TIMEOUT => timeouts = timeouts.write(values::decode_timeout(child)?),
                CONNECTION_TIMEOUT => {
                    timeouts = timeouts.connection(values::decode_timeout(child)?)
                }
                SERVER_SIDE_CONFIG => server_side = Some(parse_server_side(child)?),
                _ => return Err(unsupported(child, fragment)),
            }
        }

        let cluster_uri = cluster_uri
            .ok_or_else(|| XmlConfigError::missing_element(CONNECTION, fragment.tag_name()))?;
        let timeouts = timeouts.build();
        debug!("Decoded cluster connection to {}", cluster_uri);

        Ok(match server_side {
            None => ClusteringServiceConfiguration::new(cluster_uri, timeouts),
            Some((auto_create, server)) => ClusteringServiceConfiguration::with_server_configuration(
                cluster_uri,
                timeouts,
                auto_create,
                server,
            ),
        })
    }

    /// Encodes a clustering service configuration as `<tc:cluster>`.
    pub fn translate_cluster(&self, config: &ClusteringServiceConfiguration) -> Element {
        let timeouts = config.timeouts();
        let mut cluster = fragment_root(CLUSTER);

        cluster.push_child(element(CONNECTION).with_attribute(URL, config.cluster_uri().as_str()));
        // Element names are rotated relative to decoding.
        cluster.push_child(timeout(READ_TIMEOUT, timeouts.connection_timeout()));
        cluster.push_child(timeout(WRITE_TIMEOUT, timeouts.read_operation_timeout()));
        cluster.push_child(timeout(CONNECTION_TIMEOUT, timeouts.write_operation_timeout()));

        let mut server_side =
            element(SERVER_SIDE_CONFIG).with_attribute(AUTO_CREATE, config.is_auto_create().to_string());
        if let Some(server) = config.server_configuration() {
            if let Some(default) = server
                .default_server_resource()
                .filter(|resource| !resource.trim().is_empty())
            {
                server_side.push_child(element(DEFAULT_RESOURCE).with_attribute(FROM, default));
            }
            for (name, pool) in server.resource_pools() {
                server_side.push_child(
                    element(SHARED_POOL)
                        .with_attribute(NAME, name.as_str())
                        .with_optional_attribute(
                            FROM,
                            pool.server_resource().filter(|from| !from.trim().is_empty()),
                        )
                        .with_attribute(UNIT, MemoryUnit::MB.to_string())
                        .with_text(MemoryUnit::MB.from_bytes(pool.size()).to_string()),
                );
            }
        }
        cluster.push_child(server_side);

        cluster
    }

    /// Decodes a `<clustered-store>` element.
    pub fn parse_clustered_store(&self, fragment: &Element) -> Result<ClusteredStoreConfiguration> {
        if fragment.local_name() != CLUSTERED_STORE {
            return Err(XmlConfigError::unsupported_element(
                fragment.tag_name(),
                fragment.parent_tag(),
            ));
        }
        if let Some(child) = fragment.child_elements().next() {
            return Err(unsupported(child, fragment));
        }

        let consistency = match fragment.attribute(CONSISTENCY) {
            Some(raw) => raw.parse::<Consistency>().map_err(|e| {
                XmlConfigError::invalid_value(fragment.tag_name(), raw, e.to_string())
            })?,
            None => Consistency::default(),
        };
        Ok(ClusteredStoreConfiguration::new(consistency))
    }

    /// Encodes a clustered store configuration as `<tc:clustered-store>`.
    pub fn translate_clustered_store(&self, config: &ClusteredStoreConfiguration) -> Element {
        fragment_root(CLUSTERED_STORE).with_attribute(CONSISTENCY, config.consistency().to_string())
    }
}

impl ServiceCreationConfigurationParser for ClusteringServiceConfigurationParser {
    fn xml_schema(&self) -> SchemaSource {
        schema_source()
    }

    fn namespace(&self) -> &str {
        NAMESPACE
    }

    fn service_creation_configuration_type(&self) -> ServiceType {
        ServiceType::CLUSTERING
    }

    fn parse_service_creation_configuration(
        &self,
        fragment: &Element,
    ) -> Result<ServiceCreationConfiguration> {
        self.parse_cluster(fragment).map(Into::into)
    }

    fn translate_service_creation_configuration(
        &self,
        config: &ServiceCreationConfiguration,
    ) -> Result<Option<Element>> {
        match config {
            ServiceCreationConfiguration::Clustering(cluster) => {
                Ok(Some(self.translate_cluster(cluster)))
            }
            other => Err(XmlConfigError::TypeMismatch {
                expected: "ClusteringServiceConfiguration",
                found: other.kind_name(),
            }),
        }
    }
}

impl ServiceConfigurationParser for ClusteringServiceConfigurationParser {
    fn xml_schema(&self) -> SchemaSource {
        schema_source()
    }

    fn namespace(&self) -> &str {
        NAMESPACE
    }

    fn service_configuration_type(&self) -> ServiceType {
        ServiceType::CLUSTERED_STORE
    }

    fn parse_service_configuration(&self, fragment: &Element) -> Result<ServiceConfiguration> {
        self.parse_clustered_store(fragment).map(Into::into)
    }

    fn translate_service_configuration(
        &self,
        config: &ServiceConfiguration,
    ) -> Result<Option<Element>> {
        match config {
            ServiceConfiguration::ClusteredStore(store) => {
                Ok(Some(self.translate_clustered_store(store)))
            }
            other => Err(XmlConfigError::TypeMismatch {
                expected: "ClusteredStoreConfiguration",
                found: other.kind_name(),
            }),
        }
    }
}

fn unsupported(child: &Element, parent: &Element) -> XmlConfigError {
    XmlConfigError::unsupported_element(child.tag_name(), Some(&parent.tag_name()))
}

fn timeout(name: &str, duration: Duration) -> Element {
    element(name)
        .with_attribute(UNIT, "seconds")
        .with_text(duration.as_secs().to_string())
}

fn parse_server_side(element: &Element) -> Result<(bool, ServerSideConfiguration)> {
    let auto_create = element.attribute(AUTO_CREATE).is_some_and(values::parse_flag);
    let mut default_resource = None;
    let mut pools = IndexMap::new();

    for child in element.child_elements() {
        if !same_namespace(element, child) {
            return Err(unsupported(child, element));
        }
        match child.local_name() {
            // Later occurrences replace earlier ones.
            DEFAULT_RESOURCE => {
                let from = child
                    .attribute(FROM)
                    .ok_or_else(|| XmlConfigError::missing_attribute(FROM, child.tag_name()))?;
                default_resource = Some(from.trim().to_string());
            }
            SHARED_POOL => {
                let (name, pool) = parse_shared_pool(child)?;
                if pools.contains_key(&name) {
                    return Err(XmlConfigError::DuplicatePoolDefinition { pool: name });
                }
                pools.insert(name, pool);
            }
            _ => return Err(unsupported(child, element)),
        }
    }

    let pool_count = pools.len();
    let server = match default_resource.filter(|resource| !resource.is_empty()) {
        Some(default) => ServerSideConfiguration::with_default_resource(default, pools)?,
        None => ServerSideConfiguration::new(pools)?,
    };
    debug!(
        "Decoded server-side configuration with {} shared pools (auto-create: {})",
        pool_count, auto_create
    );
    Ok((auto_create, server))
}

fn parse_shared_pool(element: &Element) -> Result<(String, Pool)> {
    let name = element
        .attribute(NAME)
        .ok_or_else(|| XmlConfigError::missing_attribute(NAME, element.tag_name()))?
        .trim()
        .to_string();
    let unit = values::decode_memory_unit(element, MemoryUnit::B)?;

    let text = element.text();
    let amount = values::parse_amount(&text).map_err(|e| match e {
        AmountError::Overflow => XmlConfigError::PoolSizeOverflow { pool: name.clone() },
        AmountError::Invalid => XmlConfigError::invalid_value(
            element.tag_name(),
            text.trim(),
            "expected a non-negative integer size",
        ),
    })?;
    let size = unit
        .to_bytes(amount)
        .ok_or_else(|| XmlConfigError::PoolSizeOverflow { pool: name.clone() })?;

    let pool = match element.attribute(FROM) {
        Some(from) => Pool::with_resource(size, from.trim()),
        None => Pool::new(size),
    };
    Ok((name, pool))
}
