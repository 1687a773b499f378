use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::clustered::ClusteredResourcePool;
use crate::types::ResourceType;
use crate::units::ResourceUnit;

/// A sized local storage tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SizedResourcePool {
    pub size: u64,
    pub unit: ResourceUnit,
}

impl SizedResourcePool {
    pub fn new(size: u64, unit: impl Into<ResourceUnit>) -> Self {
        Self {
            size,
            unit: unit.into(),
        }
    }
}

/// Opaque resource pool contributed by a third-party extension.
#[derive(Clone)]
pub struct CustomResourcePool {
    resource_type: ResourceType,
    payload: Arc<dyn Any + Send + Sync>,
}

impl CustomResourcePool {
    /// Wraps `payload` under the given resource type.
    pub fn new<T: Any + Send + Sync>(resource_type: ResourceType, payload: T) -> Self {
        Self {
            resource_type,
            payload: Arc::new(payload),
        }
    }

    pub fn resource_type(&self) -> &ResourceType {
        &self.resource_type
    }

    /// Returns the payload if it is of type `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }
}

impl fmt::Debug for CustomResourcePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomResourcePool")
            .field("resource_type", &self.resource_type)
            .finish_non_exhaustive()
    }
}

impl PartialEq for CustomResourcePool {
    fn eq(&self, other: &Self) -> bool {
        self.resource_type == other.resource_type && Arc::ptr_eq(&self.payload, &other.payload)
    }
}

/// One storage tier of a cache.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourcePool {
    Heap(SizedResourcePool),
    Offheap(SizedResourcePool),
    Clustered(ClusteredResourcePool),
    Custom(CustomResourcePool),
}

impl ResourcePool {
    /// Returns the registry key of this pool.
    pub fn resource_type(&self) -> ResourceType {
        match self {
            ResourcePool::Heap(_) => ResourceType::HEAP,
            ResourcePool::Offheap(_) => ResourceType::OFFHEAP,
            ResourcePool::Clustered(pool) => pool.resource_type(),
            ResourcePool::Custom(custom) => custom.resource_type().clone(),
        }
    }

    /// Returns a short name of the variant, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ResourcePool::Heap(_) => "HeapResourcePool",
            ResourcePool::Offheap(_) => "OffheapResourcePool",
            ResourcePool::Clustered(_) => "ClusteredResourcePool",
            ResourcePool::Custom(_) => "CustomResourcePool",
        }
    }
}

impl From<ClusteredResourcePool> for ResourcePool {
    fn from(pool: ClusteredResourcePool) -> Self {
        Self::Clustered(pool)
    }
}
