#![allow(dead_code)]
use std::sync::Once;
use std::time::Duration;

use cachet_clustered::{ClusteringServiceConfigurationParser, plugins};
use cachet_xml::cachet_core::{
    ClusteringServiceConfiguration, Pool, ServerSideConfiguration, Timeouts,
};
use cachet_xml::{ConfigurationTranslator, Document, Result};
use indexmap::IndexMap;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Installs a test subscriber honoring `RUST_LOG`, once per test binary.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub const CLUSTER_URI: &str = "terracotta://host:9410/app";

pub const MIB: u64 = 1024 * 1024;

/// Translator with only the clustered plugins registered.
pub fn translator() -> ConfigurationTranslator {
    init_tracing();
    ConfigurationTranslator::new(plugins()).expect("translator should build")
}

/// Decodes an unvalidated `<cluster>` fragment directly with the plugin.
pub fn decode_cluster(xml: &str) -> Result<ClusteringServiceConfiguration> {
    init_tracing();
    let document = Document::parse(xml)?;
    let root = document.root().expect("fragment has a root");
    ClusteringServiceConfigurationParser::new().parse_cluster(root)
}

/// Timeouts with every value set to `seconds`.
pub fn uniform_timeouts(seconds: u64) -> Timeouts {
    Timeouts::builder()
        .operations(Duration::from_secs(seconds))
        .connection(Duration::from_secs(seconds))
        .build()
}

/// Server-side configuration with a default resource and two pools.
pub fn server_side() -> ServerSideConfiguration {
    let mut pools = IndexMap::new();
    pools.insert("primary".to_string(), Pool::with_resource(16 * MIB, "main"));
    pools.insert("secondary".to_string(), Pool::new(4 * MIB));
    ServerSideConfiguration::with_default_resource("fallback", pools)
        .expect("pools have a resource")
}

pub fn cluster_config(server: Option<ServerSideConfiguration>) -> ClusteringServiceConfiguration {
    let uri = CLUSTER_URI.parse().expect("valid uri");
    match server {
        Some(server) => {
            ClusteringServiceConfiguration::with_server_configuration(uri, uniform_timeouts(20), true, server)
        }
        None => ClusteringServiceConfiguration::new(uri, uniform_timeouts(20)),
    }
}
