//! Configuration types of the clustering extension.

pub mod resource;
pub mod server_side;
pub mod store;
pub mod timeouts;
pub mod uri;

pub use resource::ClusteredResourcePool;
pub use server_side::{Pool, ServerSideConfiguration};
pub use store::{ClusteredStoreConfiguration, Consistency};
pub use timeouts::{Timeouts, TimeoutsBuilder};
pub use uri::{ClusterUri, UriError};

/// Manager-level settings for connecting a cache manager to a cluster.
///
/// # Example
///
/// ```
/// use cachet_core::{ClusteringServiceConfiguration, Timeouts};
///
/// let uri = "terracotta://host:9410/app".parse().unwrap();
/// let config = ClusteringServiceConfiguration::new(uri, Timeouts::default());
///
/// assert!(!config.is_auto_create());
/// assert!(config.server_configuration().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusteringServiceConfiguration {
    cluster_uri: ClusterUri,
    timeouts: Timeouts,
    auto_create: bool,
    server_configuration: Option<ServerSideConfiguration>,
}

impl ClusteringServiceConfiguration {
    /// Creates a configuration that connects to an existing cluster entity.
    pub fn new(cluster_uri: ClusterUri, timeouts: Timeouts) -> Self {
        Self {
            cluster_uri,
            timeouts,
            auto_create: false,
            server_configuration: None,
        }
    }

    /// Creates a configuration carrying server-side pool definitions.
    pub fn with_server_configuration(
        cluster_uri: ClusterUri,
        timeouts: Timeouts,
        auto_create: bool,
        server_configuration: ServerSideConfiguration,
    ) -> Self {
        Self {
            cluster_uri,
            timeouts,
            auto_create,
            server_configuration: Some(server_configuration),
        }
    }

    /// Returns the cluster connection URI.
    pub fn cluster_uri(&self) -> &ClusterUri {
        &self.cluster_uri
    }

    /// Returns the client-side timeouts.
    pub fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    /// Returns whether the server-side entity is created when missing.
    pub fn is_auto_create(&self) -> bool {
        self.auto_create
    }

    /// Returns the server-side configuration, if any.
    pub fn server_configuration(&self) -> Option<&ServerSideConfiguration> {
        self.server_configuration.as_ref()
    }
}
