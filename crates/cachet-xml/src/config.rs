//! Translator configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::schema::SchemaSource;

/// Name under which the embedded core schema is aggregated.
pub const CORE_SCHEMA_NAME: &str = "cachet-core.xsd";

const CORE_SCHEMA: &str = include_str!("../schema/cachet-core.xsd");

/// Configuration for the [`ConfigurationTranslator`](crate::ConfigurationTranslator).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatorConfig {
    /// Whether two plugins declaring the same key abort construction.
    #[serde(default)]
    strict_registration: bool,

    /// Core schema file replacing the embedded one (optional).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    core_schema: Option<PathBuf>,
}

impl TranslatorConfig {
    /// Creates a new builder for TranslatorConfig.
    pub fn builder() -> TranslatorConfigBuilder {
        TranslatorConfigBuilder::default()
    }

    /// Returns whether duplicate registrations are rejected.
    pub fn strict_registration(&self) -> bool {
        self.strict_registration
    }

    /// Returns the core schema override path.
    pub fn core_schema(&self) -> Option<&PathBuf> {
        self.core_schema.as_ref()
    }

    /// Returns the source the core schema is loaded from.
    pub fn core_schema_source(&self) -> SchemaSource {
        match &self.core_schema {
            Some(path) => SchemaSource::File(path.clone()),
            None => SchemaSource::embedded(CORE_SCHEMA_NAME, CORE_SCHEMA),
        }
    }
}

/// Builder for TranslatorConfig.
#[derive(Debug, Default)]
pub struct TranslatorConfigBuilder {
    strict_registration: bool,
    core_schema: Option<PathBuf>,
}

impl TranslatorConfigBuilder {
    /// Sets whether duplicate registrations are rejected.
    pub fn strict_registration(mut self, strict: bool) -> Self {
        self.strict_registration = strict;
        self
    }

    /// Replaces the embedded core schema with a file.
    pub fn core_schema(mut self, path: impl Into<PathBuf>) -> Self {
        self.core_schema = Some(path.into());
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> TranslatorConfig {
        TranslatorConfig {
            strict_registration: self.strict_registration,
            core_schema: self.core_schema,
        }
    }
}
