//! Lookup keys used to route configuration objects to their parsers.

use std::borrow::Cow;
use std::fmt;

/// Identifies the kind of service a configuration object configures.
///
/// Service types are the registry keys for service-creation and service
/// configuration parsers. Third-party kinds are created with
/// [`ServiceType::new`].
///
/// # Example
///
/// ```
/// use cachet_core::ServiceType;
///
/// let kind = ServiceType::new("acme.audit");
/// assert_eq!(kind.as_str(), "acme.audit");
/// assert_ne!(kind, ServiceType::CLUSTERING);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceType(Cow<'static, str>);

impl ServiceType {
    /// Manager-level clustering service.
    pub const CLUSTERING: ServiceType = ServiceType::from_static("cachet.clustering");

    /// Cache-level clustered store service.
    pub const CLUSTERED_STORE: ServiceType = ServiceType::from_static("cachet.clustered-store");

    /// Creates a service type from any string.
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// Creates a service type from a static string, usable in constants.
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Returns the service type name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ServiceType {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Identifies a category of cache storage resource.
///
/// Resource types are the registry keys for resource configuration parsers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceType(Cow<'static, str>);

impl ResourceType {
    /// On-heap storage.
    pub const HEAP: ResourceType = ResourceType::from_static("heap");

    /// Off-heap storage.
    pub const OFFHEAP: ResourceType = ResourceType::from_static("offheap");

    /// Clustered storage with a dedicated server-side allocation.
    pub const CLUSTERED_DEDICATED: ResourceType = ResourceType::from_static("clustered-dedicated");

    /// Clustered storage drawn from a shared server-side pool.
    pub const CLUSTERED_SHARED: ResourceType = ResourceType::from_static("clustered-shared");

    /// Clustered storage whose allocation is decided by the server.
    pub const CLUSTERED: ResourceType = ResourceType::from_static("clustered");

    /// Creates a resource type from any string.
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// Creates a resource type from a static string, usable in constants.
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Returns the resource type name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ResourceType {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_static_and_owned_keys_are_equal() {
        assert_eq!(ServiceType::CLUSTERING, ServiceType::new("cachet.clustering"));
        assert_eq!(ResourceType::HEAP, ResourceType::from("heap"));
    }

    #[test]
    fn test_keys_hash_consistently() {
        let mut map = HashMap::new();
        map.insert(ServiceType::CLUSTERED_STORE, 1);

        assert_eq!(map.get(&ServiceType::new("cachet.clustered-store")), Some(&1));
        assert_eq!(map.get(&ServiceType::CLUSTERING), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(ResourceType::CLUSTERED_SHARED.to_string(), "clustered-shared");
        assert_eq!(ServiceType::new("x").to_string(), "x");
    }
}
