use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::clustered::{ClusteredStoreConfiguration, ClusteringServiceConfiguration};
use crate::types::ServiceType;

/// Opaque configuration contributed by a third-party extension.
///
/// The payload is shared, never mutated, and compared by identity.
///
/// # Example
///
/// ```
/// use cachet_core::{CustomConfiguration, ServiceType};
///
/// #[derive(Debug, PartialEq)]
/// struct Audit { level: u8 }
///
/// let custom = CustomConfiguration::new(ServiceType::new("acme.audit"), Audit { level: 3 });
/// assert_eq!(custom.downcast_ref::<Audit>(), Some(&Audit { level: 3 }));
/// assert!(custom.downcast_ref::<String>().is_none());
/// ```
#[derive(Clone)]
pub struct CustomConfiguration {
    service_type: ServiceType,
    payload: Arc<dyn Any + Send + Sync>,
}

impl CustomConfiguration {
    /// Wraps `payload` under the given service type.
    pub fn new<T: Any + Send + Sync>(service_type: ServiceType, payload: T) -> Self {
        Self {
            service_type,
            payload: Arc::new(payload),
        }
    }

    /// Returns the service type the payload belongs to.
    pub fn service_type(&self) -> &ServiceType {
        &self.service_type
    }

    /// Returns the payload if it is of type `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }
}

impl fmt::Debug for CustomConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomConfiguration")
            .field("service_type", &self.service_type)
            .finish_non_exhaustive()
    }
}

impl PartialEq for CustomConfiguration {
    fn eq(&self, other: &Self) -> bool {
        self.service_type == other.service_type && Arc::ptr_eq(&self.payload, &other.payload)
    }
}

/// A service configured once per cache manager.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceCreationConfiguration {
    Clustering(ClusteringServiceConfiguration),
    Custom(CustomConfiguration),
}

impl ServiceCreationConfiguration {
    /// Returns the registry key of this configuration.
    pub fn service_type(&self) -> ServiceType {
        match self {
            ServiceCreationConfiguration::Clustering(_) => ServiceType::CLUSTERING,
            ServiceCreationConfiguration::Custom(custom) => custom.service_type().clone(),
        }
    }

    /// Returns a short name of the variant, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ServiceCreationConfiguration::Clustering(_) => "ClusteringServiceConfiguration",
            ServiceCreationConfiguration::Custom(_) => "CustomConfiguration",
        }
    }
}

impl From<ClusteringServiceConfiguration> for ServiceCreationConfiguration {
    fn from(config: ClusteringServiceConfiguration) -> Self {
        Self::Clustering(config)
    }
}

/// A service configured on a single cache.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceConfiguration {
    ClusteredStore(ClusteredStoreConfiguration),
    Custom(CustomConfiguration),
}

impl ServiceConfiguration {
    /// Returns the registry key of this configuration.
    pub fn service_type(&self) -> ServiceType {
        match self {
            ServiceConfiguration::ClusteredStore(_) => ServiceType::CLUSTERED_STORE,
            ServiceConfiguration::Custom(custom) => custom.service_type().clone(),
        }
    }

    /// Returns a short name of the variant, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ServiceConfiguration::ClusteredStore(_) => "ClusteredStoreConfiguration",
            ServiceConfiguration::Custom(_) => "CustomConfiguration",
        }
    }
}

impl From<ClusteredStoreConfiguration> for ServiceConfiguration {
    fn from(config: ClusteredStoreConfiguration) -> Self {
        Self::ClusteredStore(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustered::{Consistency, Timeouts};

    #[test]
    fn test_service_types() {
        let uri = "terracotta://localhost:9410/cm".parse().unwrap();
        let creation: ServiceCreationConfiguration =
            ClusteringServiceConfiguration::new(uri, Timeouts::default()).into();
        let service: ServiceConfiguration =
            ClusteredStoreConfiguration::new(Consistency::Strong).into();

        assert_eq!(creation.service_type(), ServiceType::CLUSTERING);
        assert_eq!(service.service_type(), ServiceType::CLUSTERED_STORE);
    }

    #[test]
    fn test_custom_service_type_is_carried() {
        let custom = CustomConfiguration::new(ServiceType::new("acme.audit"), 42u32);
        let service = ServiceConfiguration::Custom(custom.clone());

        assert_eq!(service.service_type(), ServiceType::new("acme.audit"));
        assert_eq!(service.kind_name(), "CustomConfiguration");
        assert_eq!(ServiceConfiguration::Custom(custom), service);
    }

    #[test]
    fn test_custom_equality_is_by_identity() {
        let a = CustomConfiguration::new(ServiceType::new("x"), 1u8);
        let b = CustomConfiguration::new(ServiceType::new("x"), 1u8);

        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }
}
