//! Error types for the Cachet configuration model.
//!
//! Model constructors validate their arguments eagerly and report
//! violations through [`CoreError`]. All errors implement the standard
//! `std::error::Error` trait via `thiserror`.
//!
//! # Example
//!
//! ```
//! use cachet_core::{CoreError, MemoryUnit, Result};
//!
//! fn pool_bytes(amount: u64, unit: &str) -> Result<u64> {
//!     let unit: MemoryUnit = unit.parse()?;
//!     unit.to_bytes(amount)
//!         .ok_or_else(|| CoreError::unit_overflow(amount, unit.to_string()))
//! }
//!
//! assert_eq!(pool_bytes(2, "kB").unwrap(), 2048);
//! assert!(pool_bytes(1, "parsecs").unwrap_err().is_unknown_unit());
//! ```

use thiserror::Error;

/// Main error type for configuration model operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A value handed to a model constructor violates its invariants.
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue {
        /// Field or argument that failed validation
        field: String,
        /// Description of the violation
        message: String,
    },

    /// A unit name could not be recognized.
    #[error("Unknown {kind} unit '{value}'")]
    UnknownUnit {
        /// Unit family ("memory", "time", "resource")
        kind: &'static str,
        /// The unrecognized text
        value: String,
    },

    /// Converting an amount between units does not fit in 64 bits.
    #[error("Amount {amount} {unit} exceeds the representable range")]
    UnitOverflow {
        /// The amount that was being converted
        amount: u64,
        /// The unit the amount was expressed in
        unit: String,
    },
}

impl CoreError {
    /// Creates an InvalidValue error.
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates an UnknownUnit error.
    pub fn unknown_unit(kind: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownUnit {
            kind,
            value: value.into(),
        }
    }

    /// Creates a UnitOverflow error.
    pub fn unit_overflow(amount: u64, unit: impl Into<String>) -> Self {
        Self::UnitOverflow {
            amount,
            unit: unit.into(),
        }
    }

    /// Returns true if this is an invalid value error.
    pub fn is_invalid_value(&self) -> bool {
        matches!(self, Self::InvalidValue { .. })
    }

    /// Returns true if a unit name was not recognized.
    pub fn is_unknown_unit(&self) -> bool {
        matches!(self, Self::UnknownUnit { .. })
    }

    /// Returns true if a unit conversion overflowed.
    pub fn is_overflow(&self) -> bool {
        matches!(self, Self::UnitOverflow { .. })
    }
}

/// Type alias for Results with CoreError.
pub type Result<T> = std::result::Result<T, CoreError>;
