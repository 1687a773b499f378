//! Cache-level clustered store settings.

use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Consistency guarantee of a clustered cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Consistency {
    #[default]
    Eventual,
    Strong,
}

impl fmt::Display for Consistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Consistency::Eventual => f.write_str("eventual"),
            Consistency::Strong => f.write_str("strong"),
        }
    }
}

impl FromStr for Consistency {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eventual" => Ok(Self::Eventual),
            "strong" => Ok(Self::Strong),
            _ => Err(CoreError::invalid_value(
                "consistency",
                format!("expected 'strong' or 'eventual', found '{}'", s),
            )),
        }
    }
}

/// Clustered store configuration attached to a single cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ClusteredStoreConfiguration {
    consistency: Consistency,
}

impl ClusteredStoreConfiguration {
    /// Creates a store configuration with the given consistency.
    pub fn new(consistency: Consistency) -> Self {
        Self { consistency }
    }

    /// Returns the configured consistency.
    pub fn consistency(&self) -> Consistency {
        self.consistency
    }
}
