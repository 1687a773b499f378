#![allow(dead_code)]
use std::sync::Once;

use cachet_xml::cachet_core::{
    CustomConfiguration, ServiceConfiguration, ServiceCreationConfiguration, ServiceType,
};
use cachet_xml::dom::Element;
use cachet_xml::{
    Result, SchemaSource, ServiceConfigurationParser, ServiceCreationConfigurationParser,
    XmlConfigError,
};
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

pub const AUDIT_NS: &str = "urn:acme:audit:1";

pub const AUDIT_XSD: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
           targetNamespace="urn:acme:audit:1" elementFormDefault="qualified">
  <xs:element name="audit">
    <xs:complexType>
      <xs:attribute name="level" use="required">
        <xs:simpleType>
          <xs:restriction base="xs:token">
            <xs:enumeration value="info"/>
            <xs:enumeration value="debug"/>
          </xs:restriction>
        </xs:simpleType>
      </xs:attribute>
    </xs:complexType>
  </xs:element>
  <xs:element name="trail">
    <xs:complexType>
      <xs:attribute name="retain" type="xs:positiveInteger" default="7"/>
    </xs:complexType>
  </xs:element>
</xs:schema>"#;

/// Payload of the manager-level audit service.
#[derive(Debug, Clone, PartialEq)]
pub struct Audit {
    pub level: String,
}

/// Payload of the cache-level audit trail service.
#[derive(Debug, Clone, PartialEq)]
pub struct Trail {
    pub retain: u32,
}

/// Third-party plugin registered for both service capabilities.
pub struct AuditParser {
    pub schema: SchemaSource,
}

impl Default for AuditParser {
    fn default() -> Self {
        Self {
            schema: SchemaSource::embedded("acme-audit.xsd", AUDIT_XSD),
        }
    }
}

pub fn audit_type() -> ServiceType {
    ServiceType::new("acme.audit")
}

pub fn trail_type() -> ServiceType {
    ServiceType::new("acme.audit-trail")
}

fn audit_element(local: &str) -> Element {
    Element::new_ns(AUDIT_NS, Some("audit"), local).with_namespace_declaration(Some("audit"), AUDIT_NS)
}

impl ServiceCreationConfigurationParser for AuditParser {
    fn xml_schema(&self) -> SchemaSource {
        self.schema.clone()
    }

    fn namespace(&self) -> &str {
        AUDIT_NS
    }

    fn service_creation_configuration_type(&self) -> ServiceType {
        audit_type()
    }

    fn parse_service_creation_configuration(
        &self,
        fragment: &Element,
    ) -> Result<ServiceCreationConfiguration> {
        let level = fragment
            .attribute("level")
            .ok_or_else(|| XmlConfigError::missing_attribute("level", fragment.tag_name()))?;
        Ok(ServiceCreationConfiguration::Custom(CustomConfiguration::new(
            audit_type(),
            Audit {
                level: level.trim().to_string(),
            },
        )))
    }

    fn translate_service_creation_configuration(
        &self,
        config: &ServiceCreationConfiguration,
    ) -> Result<Option<Element>> {
        let audit = match config {
            ServiceCreationConfiguration::Custom(custom) => custom.downcast_ref::<Audit>(),
            _ => None,
        };
        let audit = audit.ok_or(XmlConfigError::TypeMismatch {
            expected: "Audit",
            found: config.kind_name(),
        })?;
        Ok(Some(audit_element("audit").with_attribute("level", audit.level.as_str())))
    }
}

impl ServiceConfigurationParser for AuditParser {
    fn xml_schema(&self) -> SchemaSource {
        self.schema.clone()
    }

    fn namespace(&self) -> &str {
        AUDIT_NS
    }

    fn service_configuration_type(&self) -> ServiceType {
        trail_type()
    }

    fn parse_service_configuration(&self, fragment: &Element) -> Result<ServiceConfiguration> {
        let raw = fragment.attribute("retain").unwrap_or("7");
        let retain = raw
            .trim()
            .parse()
            .map_err(|_| XmlConfigError::invalid_value(fragment.tag_name(), raw, "not a count"))?;
        Ok(ServiceConfiguration::Custom(CustomConfiguration::new(
            trail_type(),
            Trail { retain },
        )))
    }

    fn translate_service_configuration(
        &self,
        config: &ServiceConfiguration,
    ) -> Result<Option<Element>> {
        let trail = match config {
            ServiceConfiguration::Custom(custom) => custom.downcast_ref::<Trail>(),
            _ => None,
        };
        Ok(trail.map(|t| audit_element("trail").with_attribute("retain", t.retain.to_string())))
    }
}
