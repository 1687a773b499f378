#![allow(dead_code)]
use cachet_core::{
    ClusteringServiceConfiguration, Pool, ServerSideConfiguration, Timeouts,
};
use indexmap::IndexMap;

/// Helper to build a clustering configuration against a fixed test URI.
/// Panics if the URI is invalid (intended for tests).
pub fn clustering(uri: &str) -> ClusteringServiceConfiguration {
    ClusteringServiceConfiguration::new(uri.parse().expect("valid test URI"), Timeouts::default())
}

/// Returns a server-side configuration with two pools drawn from `main`.
pub fn server_side() -> ServerSideConfiguration {
    let mut pools = IndexMap::new();
    pools.insert("primary".to_string(), Pool::with_resource(16 << 20, "main"));
    pools.insert("secondary".to_string(), Pool::new(8 << 20));
    ServerSideConfiguration::with_default_resource("main", pools)
        .expect("valid server-side configuration")
}
