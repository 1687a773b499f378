//! Schema aggregation, compilation and validation.
//!
//! Every registered plugin contributes one schema fragment. The fragments are
//! aggregated with the core schema and compiled once into an immutable
//! [`Schema`] that validates whole configuration documents.
//!
//! Supported XML Schema constructs are a practical subset: global and local
//! element declarations, named and anonymous complex and simple types,
//! `sequence`/`choice`/`all` groups with occurrence bounds, wildcards,
//! attributes with defaults, `simpleContent` extensions and enumerations over
//! the common built-in types.

mod compile;
mod model;
mod validate;

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

pub use model::{QName, Schema};

use crate::dom::Element;
use crate::error::{Result, XmlConfigError};

/// Serializes all schema compilations in the process.
static COMPILE_LOCK: Mutex<()> = parking_lot::const_mutex(());

/// Where a schema fragment is loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    /// Schema text compiled into the binary.
    Embedded {
        name: &'static str,
        text: &'static str,
    },
    /// Schema file read at translator construction.
    File(PathBuf),
}

impl SchemaSource {
    /// Creates an embedded source.
    pub const fn embedded(name: &'static str, text: &'static str) -> Self {
        Self::Embedded { name, text }
    }

    /// Creates a file-backed source.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    /// Returns the name used in diagnostics and for de-duplication.
    pub fn identity(&self) -> Cow<'_, str> {
        match self {
            SchemaSource::Embedded { name, .. } => Cow::Borrowed(name),
            SchemaSource::File(path) => path.to_string_lossy(),
        }
    }

    fn load(&self) -> Result<String> {
        match self {
            SchemaSource::Embedded { text, .. } => Ok((*text).to_string()),
            SchemaSource::File(path) => read_schema_file(path),
        }
    }
}

fn read_schema_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        XmlConfigError::schema(path.to_string_lossy(), format!("cannot read schema: {}", e))
    })
}

/// Loads and compiles `sources` into one aggregated schema.
///
/// Sources with the same identity and text are aggregated once; two
/// sources sharing an identity with different text are rejected. The first
/// failing source aborts the whole compilation.
pub fn compile(sources: &[SchemaSource]) -> Result<Arc<Schema>> {
    let _guard = COMPILE_LOCK.lock();

    let mut loaded: Vec<(String, String)> = Vec::with_capacity(sources.len());
    for source in sources {
        let identity = source.identity();
        let text = source.load()?;
        let same_text = loaded
            .iter()
            .find(|(name, _)| name.as_str() == identity)
            .map(|(_, existing)| *existing == text);
        match same_text {
            Some(true) => {
                debug!("Schema '{}' already aggregated, skipping", identity);
            }
            Some(false) => {
                return Err(XmlConfigError::schema(
                    identity,
                    "a different schema is already aggregated under this name",
                ));
            }
            None => loaded.push((identity.into_owned(), text)),
        }
    }

    compile::compile(&loaded).map(Arc::new)
}

impl Schema {
    /// Validates a document rooted at `root`.
    ///
    /// The root must have a global declaration in the aggregated schema.
    pub fn validate(&self, root: &Element) -> Result<()> {
        validate::Validator::new(self).validate_root(root)
    }
}
