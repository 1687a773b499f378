//! Error types for XML configuration translation.
//!
//! Every failure of the translator is reported through [`XmlConfigError`].
//! Construction-time failures (schema compilation, registration) abort the
//! creation of the translator; decode and encode failures carry enough
//! context (element, parent, offending value) to produce an actionable
//! message.
//!
//! # Example
//!
//! ```
//! use cachet_xml::XmlConfigError;
//!
//! let error = XmlConfigError::unsupported_element("foo", Some("cluster"));
//! assert!(error.is_unsupported_element());
//! assert_eq!(
//!     error.to_string(),
//!     "Unknown XML configuration element <foo> in <cluster>"
//! );
//! ```

use cachet_core::CoreError;
use thiserror::Error;

use crate::dom::TextPosition;

/// Main error type for XML configuration translation.
#[derive(Debug, Error)]
pub enum XmlConfigError {
    /// A schema resource could not be read or compiled.
    #[error("Failed to compile schema '{resource}': {message}")]
    SchemaCompilation {
        /// Name or path of the schema resource
        resource: String,
        /// Description of the failure
        message: String,
    },

    /// The input is not well-formed XML.
    #[error("Malformed XML: {message}")]
    MalformedXml {
        /// Parser diagnostic
        message: String,
    },

    /// The document does not conform to the aggregated schema.
    #[error(
        "Invalid XML configuration element <{element}>{}: {message}",
        location.map(|p| format!(" at {}", p)).unwrap_or_default()
    )]
    DocumentValidation {
        /// Tag of the offending element
        element: String,
        /// Position of the offending element in the input, if known
        location: Option<TextPosition>,
        /// Description of the violation
        message: String,
    },

    /// An element is not part of the vocabulary of its parser.
    #[error(
        "Unknown XML configuration element <{element}> in <{}>",
        parent.as_deref().unwrap_or("null")
    )]
    UnsupportedElement {
        /// Tag of the unsupported element
        element: String,
        /// Tag of its parent, if any
        parent: Option<String>,
    },

    /// A required child element is absent.
    #[error("Missing required XML configuration element <{element}> in <{parent}>")]
    MissingElement {
        /// Local name of the missing element
        element: String,
        /// Tag of the element that should contain it
        parent: String,
    },

    /// A required attribute is absent.
    #[error("Missing required attribute '{attribute}' on XML configuration element <{element}>")]
    MissingAttribute {
        /// Name of the missing attribute
        attribute: String,
        /// Tag of the element
        element: String,
    },

    /// An attribute value is not a valid URI.
    #[error(
        "Value of {attribute} attribute on XML configuration element <{element}> in <{parent}> is not a valid URI - '{value}'"
    )]
    MalformedUri {
        attribute: String,
        element: String,
        parent: String,
        /// The rejected value
        value: String,
        #[source]
        cause: cachet_core::UriError,
    },

    /// A duration amount does not fit in a signed 64-bit duration.
    #[error("Value of XML configuration element <{element}> in <{parent}> exceeds allowed value - {value}")]
    DurationOverflow {
        element: String,
        parent: String,
        /// The amount as written in the document
        value: String,
    },

    /// A shared pool size does not fit in a signed 64-bit byte count.
    #[error("Magnitude of value specified for <shared-pool name=\"{pool}\"> is too large")]
    PoolSizeOverflow {
        /// Name of the pool
        pool: String,
    },

    /// Two shared pools with the same name in one server-side configuration.
    #[error("Duplicate definition for <shared-pool name=\"{pool}\">")]
    DuplicatePoolDefinition {
        /// Name of the pool
        pool: String,
    },

    /// Two caches with the same alias in one configuration document.
    #[error("Duplicate definition for <cache alias=\"{alias}\">")]
    DuplicateCacheAlias {
        /// The repeated alias
        alias: String,
    },

    /// No parser is registered for the requested key.
    #[error("No {registry} parser registered for '{key}'")]
    UnknownRegistration {
        /// Which registry was consulted
        registry: &'static str,
        /// The key that was looked up
        key: String,
    },

    /// Two parsers declare the same key while strict registration is enabled.
    #[error("Duplicate {registry} parser registration for '{key}'")]
    DuplicateRegistration {
        registry: &'static str,
        key: String,
    },

    /// A parser was handed a configuration of a kind it does not translate.
    #[error("Expected a {expected} but was given a {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// A value in the document cannot be interpreted.
    #[error("Invalid value '{value}' in XML configuration element <{element}>: {message}")]
    InvalidValue {
        element: String,
        value: String,
        message: String,
    },

    /// Writing the XML output failed.
    #[error("Failed to serialize XML: {0}")]
    Serialization(String),

    /// A model constructor rejected the decoded values.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl XmlConfigError {
    // ============================================
    // Convenience constructors
    // ============================================

    /// Creates a SchemaCompilation error.
    pub fn schema(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaCompilation {
            resource: resource.into(),
            message: message.into(),
        }
    }

    /// Creates a DocumentValidation error.
    pub fn validation(
        element: impl Into<String>,
        location: Option<TextPosition>,
        message: impl Into<String>,
    ) -> Self {
        Self::DocumentValidation {
            element: element.into(),
            location,
            message: message.into(),
        }
    }

    /// Creates an UnsupportedElement error.
    pub fn unsupported_element(element: impl Into<String>, parent: Option<&str>) -> Self {
        Self::UnsupportedElement {
            element: element.into(),
            parent: parent.map(str::to_string),
        }
    }

    /// Creates a MissingElement error.
    pub fn missing_element(element: impl Into<String>, parent: impl Into<String>) -> Self {
        Self::MissingElement {
            element: element.into(),
            parent: parent.into(),
        }
    }

    /// Creates a MissingAttribute error.
    pub fn missing_attribute(attribute: impl Into<String>, element: impl Into<String>) -> Self {
        Self::MissingAttribute {
            attribute: attribute.into(),
            element: element.into(),
        }
    }

    /// Creates a DurationOverflow error.
    pub fn duration_overflow(
        element: impl Into<String>,
        parent: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::DurationOverflow {
            element: element.into(),
            parent: parent.into(),
            value: value.into(),
        }
    }

    /// Creates an UnknownRegistration error.
    pub fn unknown_registration(registry: &'static str, key: impl Into<String>) -> Self {
        Self::UnknownRegistration {
            registry,
            key: key.into(),
        }
    }

    /// Creates an InvalidValue error.
    pub fn invalid_value(
        element: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            element: element.into(),
            value: value.into(),
            message: message.into(),
        }
    }

    /// Creates a Serialization error from any displayable writer failure.
    pub fn serialization(cause: impl std::fmt::Display) -> Self {
        Self::Serialization(cause.to_string())
    }

    // ============================================
    // Query methods
    // ============================================

    /// Returns true if a schema resource failed to load or compile.
    pub fn is_schema_error(&self) -> bool {
        matches!(self, Self::SchemaCompilation { .. })
    }

    /// Returns true if the input was malformed or failed schema validation.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedXml { .. } | Self::DocumentValidation { .. }
        )
    }

    /// Returns true if an element outside the parser's vocabulary was found.
    pub fn is_unsupported_element(&self) -> bool {
        matches!(self, Self::UnsupportedElement { .. })
    }

    /// Returns true if the error stems from the parser registry.
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownRegistration { .. } | Self::DuplicateRegistration { .. }
        )
    }

    /// Returns true if a numeric value exceeded its representable range.
    pub fn is_overflow(&self) -> bool {
        matches!(
            self,
            Self::DurationOverflow { .. } | Self::PoolSizeOverflow { .. }
        )
    }
}

/// Type alias for Results with XmlConfigError.
pub type Result<T> = std::result::Result<T, XmlConfigError>;
