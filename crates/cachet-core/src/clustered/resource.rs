//! Clustered resource pools declared inside a cache's `resources`.

use crate::types::ResourceType;
use crate::units::MemoryUnit;

/// Clustered storage tier of a cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClusteredResourcePool {
    /// A fixed allocation reserved for this cache on the server.
    Dedicated {
        /// Server resource to allocate from; the default resource when absent.
        from: Option<String>,
        /// Allocation size expressed in `unit`.
        size: u64,
        unit: MemoryUnit,
    },
    /// Storage drawn from a named shared pool.
    Shared { sharing: String },
    /// Storage already provisioned on the server.
    Unspecified,
}

impl ClusteredResourcePool {
    /// Returns the resource type key of this pool.
    pub fn resource_type(&self) -> ResourceType {
        match self {
            ClusteredResourcePool::Dedicated { .. } => ResourceType::CLUSTERED_DEDICATED,
            ClusteredResourcePool::Shared { .. } => ResourceType::CLUSTERED_SHARED,
            ClusteredResourcePool::Unspecified => ResourceType::CLUSTERED,
        }
    }
}
