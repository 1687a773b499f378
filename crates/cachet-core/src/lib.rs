//! Cachet Core - Configuration model
//!
//! This crate provides the in-memory cache configuration model that the
//! Cachet XML translator decodes into and encodes from: the configuration
//! root, service and resource sum types, the clustering extension types
//! and the memory/time units they are expressed in.

pub mod clustered;
pub mod config;
pub mod error;
pub mod types;
pub mod units;

pub use clustered::{
    ClusterUri, ClusteredResourcePool, ClusteredStoreConfiguration,
    ClusteringServiceConfiguration, Consistency, Pool, ServerSideConfiguration, Timeouts,
    TimeoutsBuilder, UriError,
};
pub use config::{
    CacheConfiguration, Configuration, CustomConfiguration, CustomResourcePool, ResourcePool,
    ServiceConfiguration, ServiceCreationConfiguration, SizedResourcePool,
};
pub use error::{CoreError, Result};
pub use types::{ResourceType, ServiceType};
pub use units::{MemoryUnit, ResourceUnit, TimeUnit};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
