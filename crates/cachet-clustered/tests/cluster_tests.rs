mod common;

use std::error::Error;
use std::time::Duration;

use cachet_clustered::ClusteringServiceConfigurationParser;
use cachet_xml::cachet_core::{
    ClusterUri, ClusteringServiceConfiguration, CustomConfiguration, Pool,
    ServerSideConfiguration, ServiceCreationConfiguration, ServiceType, Timeouts, UriError,
};
use cachet_xml::serializer::to_string;
use cachet_xml::{ServiceCreationConfigurationParser, XmlConfigError};
use common::{CLUSTER_URI, MIB, cluster_config, decode_cluster, server_side, uniform_timeouts};
use indexmap::IndexMap;

fn encode(config: &ClusteringServiceConfiguration) -> String {
    to_string(&ClusteringServiceConfigurationParser::new().translate_cluster(config)).unwrap()
}

// ============================================
// Decoding
// ============================================

#[test]
fn test_connection_only_uses_defaults() {
    let config =
        decode_cluster(r#"<cluster><connection url="terracotta://host:9410/app"/></cluster>"#)
            .unwrap();

    assert_eq!(config.cluster_uri().as_str(), CLUSTER_URI);
    assert_eq!(config.timeouts(), &Timeouts::default());
    assert!(config.server_configuration().is_none());
}

#[test]
fn test_read_timeout_unit_is_case_insensitive() {
    let config = decode_cluster(
        r#"<cluster>
             <connection url="terracotta://host:9410/app"/>
             <read-timeout value="5" unit="SECONDS"/>
           </cluster>"#,
    )
    .unwrap();

    let timeouts = config.timeouts();
    assert_eq!(timeouts.read_operation_timeout(), Duration::from_secs(5));
    assert_eq!(
        timeouts.write_operation_timeout(),
        Timeouts::default().write_operation_timeout()
    );
    assert_eq!(
        timeouts.connection_timeout(),
        Timeouts::default().connection_timeout()
    );
}

#[test]
fn test_duplicate_shared_pool_is_rejected() {
    let err = decode_cluster(
        r#"<cluster>
             <connection url="terracotta://host:9410/app"/>
             <server-side-config>
               <shared-pool name="primary" from="main" unit="MB">8</shared-pool>
               <shared-pool name="primary" from="other" unit="MB">4</shared-pool>
             </server-side-config>
           </cluster>"#,
    )
    .unwrap_err();

    assert!(matches!(err, XmlConfigError::DuplicatePoolDefinition { ref pool } if pool == "primary"));
    assert_eq!(
        err.to_string(),
        "Duplicate definition for <shared-pool name=\"primary\">"
    );
}

#[test]
fn test_timeout_overflow_names_element() {
    let err = decode_cluster(
        r#"<cluster>
             <connection url="terracotta://host:9410/app"/>
             <read-timeout value="99999999999999999999" unit="SECONDS"/>
           </cluster>"#,
    )
    .unwrap_err();

    match err {
        XmlConfigError::DurationOverflow {
            ref element,
            ref parent,
            ref value,
        } => {
            assert_eq!(element, "read-timeout");
            assert_eq!(parent, "cluster");
            assert_eq!(value, "99999999999999999999");
        }
        other => panic!("expected a duration overflow, got {:?}", other),
    }
}

#[test]
fn test_timeout_overflow_regardless_of_unit() {
    for unit in ["nanos", "millis", "seconds", "minutes", "days"] {
        let xml = format!(
            r#"<cluster>
                 <connection url="terracotta://host:9410/app"/>
                 <connection-timeout unit="{unit}">9223372036854775808</connection-timeout>
               </cluster>"#
        );
        let err = decode_cluster(&xml).unwrap_err();
        assert!(err.is_overflow(), "unit {} should overflow", unit);
    }
}

#[test]
fn test_timeout_overflow_after_unit_conversion() {
    let err = decode_cluster(
        r#"<cluster>
             <connection url="terracotta://host:9410/app"/>
             <write-timeout value="9223372036854775807" unit="days"/>
           </cluster>"#,
    )
    .unwrap_err();

    assert!(matches!(err, XmlConfigError::DurationOverflow { ref element, .. } if element == "write-timeout"));
}

#[test]
fn test_unknown_child_of_cluster() {
    let err = decode_cluster(
        r#"<cluster><connection url="terracotta://host:9410/app"/><foo/></cluster>"#,
    )
    .unwrap_err();

    match err {
        XmlConfigError::UnsupportedElement {
            ref element,
            ref parent,
        } => {
            assert_eq!(element, "foo");
            assert_eq!(parent.as_deref(), Some("cluster"));
        }
        other => panic!("expected an unsupported element, got {:?}", other),
    }
}

#[test]
fn test_missing_connection() {
    let err = decode_cluster(r#"<cluster><read-timeout value="1"/></cluster>"#).unwrap_err();

    assert!(matches!(
        err,
        XmlConfigError::MissingElement { ref element, ref parent }
            if element == "connection" && parent == "cluster"
    ));
}

#[test]
fn test_malformed_uri_keeps_cause() {
    let err = decode_cluster(r#"<cluster><connection url="not a uri"/></cluster>"#).unwrap_err();

    match &err {
        XmlConfigError::MalformedUri {
            attribute,
            element,
            parent,
            value,
            ..
        } => {
            assert_eq!(attribute, "url");
            assert_eq!(element, "connection");
            assert_eq!(parent, "cluster");
            assert_eq!(value, "not a uri");
        }
        other => panic!("expected a malformed uri, got {:?}", other),
    }
    let cause = err.source().expect("cause is kept");
    assert_eq!(
        cause.downcast_ref::<UriError>(),
        Some(&UriError::InvalidCharacter {
            character: ' ',
            offset: 3
        })
    );
}

#[test]
fn test_multi_host_connection_url() {
    let config = decode_cluster(
        r#"<cluster><connection url="terracotta://server1:9410,server2:9410/app"/></cluster>"#,
    )
    .unwrap();

    assert_eq!(
        config.cluster_uri().as_str(),
        "terracotta://server1:9410,server2:9410/app"
    );
}

#[test]
fn test_timeout_with_both_attribute_and_text() {
    let err = decode_cluster(
        r#"<cluster>
             <connection url="terracotta://host:9410/app"/>
             <read-timeout value="5">7</read-timeout>
           </cluster>"#,
    )
    .unwrap_err();

    assert!(matches!(
        err,
        XmlConfigError::InvalidValue { ref element, ref value, .. }
            if element == "read-timeout" && value == "5"
    ));
}

#[test]
fn test_pool_magnitude_overflow() {
    let err = decode_cluster(
        r#"<cluster>
             <connection url="terracotta://host:9410/app"/>
             <server-side-config>
               <shared-pool name="huge" from="main">99999999999999999999</shared-pool>
             </server-side-config>
           </cluster>"#,
    )
    .unwrap_err();

    assert!(matches!(err, XmlConfigError::PoolSizeOverflow { ref pool } if pool == "huge"));
}

#[test]
fn test_shared_pool_unit_defaults_to_bytes() {
    let config = decode_cluster(
        r#"<cluster>
             <connection url="terracotta://host:9410/app"/>
             <server-side-config auto-create="true">
               <default-resource from="main"/>
               <shared-pool name="primary">512</shared-pool>
               <shared-pool name="secondary" from="other" unit="MB">2</shared-pool>
             </server-side-config>
           </cluster>"#,
    )
    .unwrap();

    let server = config.server_configuration().unwrap();
    assert!(config.is_auto_create());
    assert_eq!(server.default_server_resource(), Some("main"));

    let names: Vec<_> = server.resource_pools().keys().cloned().collect();
    assert_eq!(names, vec!["primary", "secondary"]);
    assert_eq!(server.resource_pools()["primary"], Pool::new(512));
    assert_eq!(
        server.resource_pools()["secondary"],
        Pool::with_resource(2 * MIB, "other")
    );
}

// ============================================
// Encoding
// ============================================

#[test]
fn test_shared_pool_in_whole_megabytes() {
    let mut pools = IndexMap::new();
    pools.insert("primary".to_string(), Pool::with_resource(16 * MIB, "main"));
    let server = ServerSideConfiguration::new(pools).unwrap();
    let config = ClusteringServiceConfiguration::with_server_configuration(
        CLUSTER_URI.parse().unwrap(),
        Timeouts::default(),
        false,
        server,
    );

    let xml = encode(&config);

    assert!(
        xml.contains(r#"<tc:shared-pool name="primary" from="main" unit="MB">16</tc:shared-pool>"#),
        "{}",
        xml
    );
}

#[test]
fn test_partial_megabytes_are_truncated() {
    let mut pools = IndexMap::new();
    pools.insert("odd".to_string(), Pool::with_resource(3 * MIB + 1000, "main"));
    let config = cluster_config(Some(ServerSideConfiguration::new(pools).unwrap()));

    let xml = encode(&config);

    assert!(xml.contains(r#"<tc:shared-pool name="odd" from="main" unit="MB">3</tc:shared-pool>"#));
}

#[test]
fn test_full_encoding_layout() {
    let xml = encode(&cluster_config(Some(server_side())));

    let expected = r#"<tc:cluster xmlns:tc="urn:cachet:clustered:1">
  <tc:connection url="terracotta://host:9410/app"/>
  <tc:read-timeout unit="seconds">20</tc:read-timeout>
  <tc:write-timeout unit="seconds">20</tc:write-timeout>
  <tc:connection-timeout unit="seconds">20</tc:connection-timeout>
  <tc:server-side-config auto-create="true">
    <tc:default-resource from="fallback"/>
    <tc:shared-pool name="primary" from="main" unit="MB">16</tc:shared-pool>
    <tc:shared-pool name="secondary" unit="MB">4</tc:shared-pool>
  </tc:server-side-config>
</tc:cluster>"#;
    assert_eq!(xml, expected);
}

#[test]
fn test_timeout_elements_are_rotated() {
    let timeouts = Timeouts::builder()
        .read(Duration::from_secs(1))
        .write(Duration::from_secs(2))
        .connection(Duration::from_secs(3))
        .build();
    let config = ClusteringServiceConfiguration::new(CLUSTER_URI.parse().unwrap(), timeouts);

    let xml = encode(&config);

    assert!(xml.contains(r#"<tc:read-timeout unit="seconds">3</tc:read-timeout>"#));
    assert!(xml.contains(r#"<tc:write-timeout unit="seconds">1</tc:write-timeout>"#));
    assert!(xml.contains(r#"<tc:connection-timeout unit="seconds">2</tc:connection-timeout>"#));

    let decoded = decode_cluster(&xml).unwrap();
    assert_eq!(decoded.timeouts().read_operation_timeout(), Duration::from_secs(3));
    assert_eq!(decoded.timeouts().write_operation_timeout(), Duration::from_secs(1));
    assert_eq!(decoded.timeouts().connection_timeout(), Duration::from_secs(2));
}

#[test]
fn test_sub_second_timeouts_are_truncated() {
    let config = ClusteringServiceConfiguration::new(
        CLUSTER_URI.parse().unwrap(),
        Timeouts::builder()
            .connection(Duration::from_millis(2500))
            .build(),
    );

    let xml = encode(&config);

    assert!(xml.contains(r#"<tc:read-timeout unit="seconds">2</tc:read-timeout>"#));
}

#[test]
fn test_type_mismatch_on_encode() {
    let parser = ClusteringServiceConfigurationParser::new();
    let custom = CustomConfiguration::new(ServiceType::new("acme.audit"), "payload");

    let err = parser
        .translate_service_creation_configuration(&ServiceCreationConfiguration::Custom(custom))
        .unwrap_err();

    assert!(matches!(
        err,
        XmlConfigError::TypeMismatch {
            expected: "ClusteringServiceConfiguration",
            found: "CustomConfiguration"
        }
    ));
}

// ============================================
// Round trips
// ============================================

#[test]
fn test_round_trip_preserves_semantic_fields() {
    let original = cluster_config(Some(server_side()));

    let decoded = decode_cluster(&encode(&original)).unwrap();

    assert_eq!(decoded, original);
}

#[test]
fn test_round_trip_keeps_uri_bytes() {
    for text in [
        "terracotta://server1:9410,server2:9410/app",
        "http://Host:80/app",
        "/relative/path",
    ] {
        let uri: ClusterUri = text.parse().unwrap();
        let original = ClusteringServiceConfiguration::new(uri, Timeouts::default());

        let xml = encode(&original);
        assert!(xml.contains(&format!(r#"<tc:connection url="{text}"/>"#)), "{}", xml);

        let decoded = decode_cluster(&xml).unwrap();
        assert_eq!(decoded.cluster_uri().as_str(), text);
    }
}

#[test]
fn test_round_trip_without_server_side_config() {
    let original = cluster_config(None);

    let decoded = decode_cluster(&encode(&original)).unwrap();

    assert_eq!(decoded.cluster_uri(), original.cluster_uri());
    assert_eq!(decoded.timeouts(), &uniform_timeouts(20));
    assert!(!decoded.is_auto_create());
    let server = decoded.server_configuration().expect("always encoded");
    assert!(server.resource_pools().is_empty());
    assert_eq!(server.default_server_resource(), None);
}
