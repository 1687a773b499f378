//! Clustered resource pool parsing.

use cachet_core::{ClusteredResourcePool, MemoryUnit, ResourcePool, ResourceType};
use cachet_xml::dom::Element;
use cachet_xml::values;
use cachet_xml::{Result, ResourceConfigurationParser, SchemaSource, XmlConfigError};
use tracing::debug;

use crate::{NAMESPACE, fragment_root, schema_source};

const DEDICATED: &str = "clustered-dedicated";
const SHARED: &str = "clustered-shared";
const CLUSTERED: &str = "clustered";
const FROM: &str = "from";
const UNIT: &str = "unit";
const SHARING: &str = "sharing";

/// Parser for `<tc:clustered-dedicated>`, `<tc:clustered-shared>` and `<tc:clustered>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClusteredResourceConfigurationParser;

impl ClusteredResourceConfigurationParser {
    pub fn new() -> Self {
        Self
    }

    /// Decodes one of the clustered pool elements.
    pub fn parse_pool(&self, fragment: &Element) -> Result<ClusteredResourcePool> {
        let pool = match fragment.local_name() {
            DEDICATED => ClusteredResourcePool::Dedicated {
                from: fragment.attribute(FROM).map(|from| from.trim().to_string()),
                size: values::decode_size(fragment)?,
                unit: values::decode_memory_unit(fragment, MemoryUnit::MB)?,
            },
            SHARED => {
                let sharing = fragment.attribute(SHARING).ok_or_else(|| {
                    XmlConfigError::missing_attribute(SHARING, fragment.tag_name())
                })?;
                ClusteredResourcePool::Shared {
                    sharing: sharing.trim().to_string(),
                }
            }
            CLUSTERED => ClusteredResourcePool::Unspecified,
            _ => {
                return Err(XmlConfigError::unsupported_element(
                    fragment.tag_name(),
                    fragment.parent_tag(),
                ));
            }
        };
        debug!("Decoded {} resource pool", pool.resource_type());
        Ok(pool)
    }

    /// Encodes a clustered pool.
    pub fn translate_pool(&self, pool: &ClusteredResourcePool) -> Element {
        match pool {
            ClusteredResourcePool::Dedicated { from, size, unit } => fragment_root(DEDICATED)
                .with_optional_attribute(FROM, from.as_deref())
                .with_attribute(UNIT, unit.to_string())
                .with_text(size.to_string()),
            ClusteredResourcePool::Shared { sharing } => {
                fragment_root(SHARED).with_attribute(SHARING, sharing.as_str())
            }
            ClusteredResourcePool::Unspecified => fragment_root(CLUSTERED),
        }
    }
}

impl ResourceConfigurationParser for ClusteredResourceConfigurationParser {
    fn xml_schema(&self) -> SchemaSource {
        schema_source()
    }

    fn namespace(&self) -> &str {
        NAMESPACE
    }

    fn resource_types(&self) -> Vec<ResourceType> {
        vec![
            ResourceType::CLUSTERED_DEDICATED,
            ResourceType::CLUSTERED_SHARED,
            ResourceType::CLUSTERED,
        ]
    }

    fn parse_resource_configuration(&self, fragment: &Element) -> Result<ResourcePool> {
        self.parse_pool(fragment).map(Into::into)
    }

    fn translate_resource_configuration(&self, pool: &ResourcePool) -> Result<Option<Element>> {
        match pool {
            ResourcePool::Clustered(pool) => Ok(Some(self.translate_pool(pool))),
            other => Err(XmlConfigError::TypeMismatch {
                expected: "ClusteredResourcePool",
                found: other.kind_name(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cachet_core::SizedResourcePool;
    use cachet_xml::Document;
    use cachet_xml::serializer::to_string;

    fn parse(xml: &str) -> Result<ClusteredResourcePool> {
        let root = Document::parse(xml).unwrap().into_root().unwrap();
        ClusteredResourceConfigurationParser::new().parse_pool(&root)
    }

    #[test]
    fn test_dedicated_defaults_to_megabytes() {
        let pool = parse(r#"<clustered-dedicated from="main">8</clustered-dedicated>"#).unwrap();

        assert_eq!(
            pool,
            ClusteredResourcePool::Dedicated {
                from: Some("main".to_string()),
                size: 8,
                unit: MemoryUnit::MB,
            }
        );
    }

    #[test]
    fn test_dedicated_explicit_unit_without_resource() {
        let pool = parse(r#"<clustered-dedicated unit="GB">2</clustered-dedicated>"#).unwrap();

        assert_eq!(
            pool,
            ClusteredResourcePool::Dedicated {
                from: None,
                size: 2,
                unit: MemoryUnit::GB,
            }
        );
    }

    #[test]
    fn test_shared_and_unspecified() {
        assert_eq!(
            parse(r#"<clustered-shared sharing="primary"/>"#).unwrap(),
            ClusteredResourcePool::Shared {
                sharing: "primary".to_string()
            }
        );
        assert_eq!(parse("<clustered/>").unwrap(), ClusteredResourcePool::Unspecified);
    }

    #[test]
    fn test_shared_requires_sharing() {
        let err = parse("<clustered-shared/>").unwrap_err();
        assert!(matches!(err, XmlConfigError::MissingAttribute { ref attribute, .. } if attribute == "sharing"));
    }

    #[test]
    fn test_unknown_pool_element() {
        let err = parse("<clustered-everything/>").unwrap_err();
        assert!(err.is_unsupported_element());
    }

    #[test]
    fn test_encoding() {
        let parser = ClusteredResourceConfigurationParser::new();
        let dedicated = ClusteredResourcePool::Dedicated {
            from: Some("main".to_string()),
            size: 8,
            unit: MemoryUnit::MB,
        };

        assert_eq!(
            to_string(&parser.translate_pool(&dedicated)).unwrap(),
            r#"<tc:clustered-dedicated xmlns:tc="urn:cachet:clustered:1" from="main" unit="MB">8</tc:clustered-dedicated>"#
        );
        assert_eq!(
            to_string(&parser.translate_pool(&ClusteredResourcePool::Unspecified)).unwrap(),
            r#"<tc:clustered xmlns:tc="urn:cachet:clustered:1"/>"#
        );
    }

    #[test]
    fn test_heap_is_a_type_mismatch() {
        let parser = ClusteredResourceConfigurationParser::new();
        let heap = ResourcePool::Heap(SizedResourcePool::new(10, MemoryUnit::MB));

        let err = parser.translate_resource_configuration(&heap).unwrap_err();
        assert!(matches!(
            err,
            XmlConfigError::TypeMismatch {
                expected: "ClusteredResourcePool",
                found: "HeapResourcePool"
            }
        ));
    }
}
