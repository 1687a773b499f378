//! Server-side resource configuration of a cluster.

use indexmap::IndexMap;

use crate::error::{CoreError, Result};

/// A named allocation of cluster-side storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pool {
    size: u64,
    server_resource: Option<String>,
}

impl Pool {
    /// Creates a pool drawn from the default server resource.
    pub fn new(size: u64) -> Self {
        Self {
            size,
            server_resource: None,
        }
    }

    /// Creates a pool drawn from the named server resource.
    pub fn with_resource(size: u64, server_resource: impl Into<String>) -> Self {
        Self {
            size,
            server_resource: Some(server_resource.into()),
        }
    }

    /// Returns the pool size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Returns the backing server resource, if one is named and non-blank.
    pub fn server_resource(&self) -> Option<&str> {
        self.server_resource
            .as_deref()
            .filter(|resource| !resource.trim().is_empty())
    }
}

/// Shared pools and default resource to provision on the cluster.
///
/// Pool order is preserved so that encoding is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServerSideConfiguration {
    default_server_resource: Option<String>,
    pools: IndexMap<String, Pool>,
}

impl ServerSideConfiguration {
    /// Creates a configuration without a default server resource.
    ///
    /// Every pool must then name its own server resource.
    pub fn new(pools: IndexMap<String, Pool>) -> Result<Self> {
        Self::build(None, pools)
    }

    /// Creates a configuration whose pools fall back to `default_server_resource`.
    pub fn with_default_resource(
        default_server_resource: impl Into<String>,
        pools: IndexMap<String, Pool>,
    ) -> Result<Self> {
        let default_server_resource = default_server_resource.into();
        if default_server_resource.trim().is_empty() {
            return Err(CoreError::invalid_value(
                "default-resource",
                "default server resource must not be blank",
            ));
        }
        Self::build(Some(default_server_resource), pools)
    }

    fn build(
        default_server_resource: Option<String>,
        pools: IndexMap<String, Pool>,
    ) -> Result<Self> {
        if default_server_resource.is_none() {
            if let Some((name, _)) = pools.iter().find(|(_, p)| p.server_resource().is_none()) {
                return Err(CoreError::invalid_value(
                    format!("shared-pool '{}'", name),
                    "pool has no server resource and no default resource is available",
                ));
            }
        }
        Ok(Self {
            default_server_resource,
            pools,
        })
    }

    /// Returns the default server resource.
    pub fn default_server_resource(&self) -> Option<&str> {
        self.default_server_resource.as_deref()
    }

    /// Returns the shared pools keyed by name.
    pub fn resource_pools(&self) -> &IndexMap<String, Pool> {
        &self.pools
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pools(entries: &[(&str, Pool)]) -> IndexMap<String, Pool> {
        entries
            .iter()
            .map(|(name, pool)| (name.to_string(), pool.clone()))
            .collect()
    }

    #[test]
    fn test_pool_without_resource_needs_default() {
        let result = ServerSideConfiguration::new(pools(&[("primary", Pool::new(1024))]));

        let err = result.unwrap_err();
        assert!(err.is_invalid_value());
        assert!(err.to_string().contains("primary"));
    }

    #[test]
    fn test_pool_with_default_resource() {
        let config = ServerSideConfiguration::with_default_resource(
            "main",
            pools(&[("primary", Pool::new(1024))]),
        )
        .unwrap();

        assert_eq!(config.default_server_resource(), Some("main"));
        assert_eq!(config.resource_pools()["primary"].size(), 1024);
    }

    #[test]
    fn test_blank_default_resource_rejected() {
        assert!(ServerSideConfiguration::with_default_resource("  ", IndexMap::new()).is_err());
    }

    #[test]
    fn test_blank_pool_resource_counts_as_absent() {
        let pool = Pool::with_resource(10, " ");
        assert_eq!(pool.server_resource(), None);
        assert!(ServerSideConfiguration::new(pools(&[("p", pool)])).is_err());
    }

    #[test]
    fn test_pool_order_is_preserved() {
        let config = ServerSideConfiguration::new(pools(&[
            ("zeta", Pool::with_resource(1, "a")),
            ("alpha", Pool::with_resource(2, "b")),
        ]))
        .unwrap();

        let names: Vec<&str> = config.resource_pools().keys().map(String::as_str).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }
}
