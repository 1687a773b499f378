//! Compiled schema components.

use std::collections::HashMap;

pub(crate) const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";
pub(crate) const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

pub(crate) type ElementId = usize;
pub(crate) type TypeId = usize;

/// A namespace-qualified name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub namespace: Option<String>,
    pub local: String,
}

impl QName {
    pub fn new(namespace: Option<&str>, local: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
            local: local.into(),
        }
    }

    pub(crate) fn matches(&self, namespace: Option<&str>, local: &str) -> bool {
        self.namespace.as_deref() == namespace && self.local == local
    }
}

impl std::fmt::Display for QName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local),
            None => f.write_str(&self.local),
        }
    }
}

/// Built-in simple types understood by the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Builtin {
    String,
    NormalizedString,
    Token,
    NCName,
    AnyUri,
    Boolean,
    Integer,
    Long,
    Int,
    PositiveInteger,
    NonNegativeInteger,
    AnySimpleType,
}

impl Builtin {
    pub(crate) fn from_local_name(name: &str) -> Option<Self> {
        let builtin = match name {
            "string" => Self::String,
            "normalizedString" => Self::NormalizedString,
            "token" => Self::Token,
            "NCName" => Self::NCName,
            "anyURI" => Self::AnyUri,
            "boolean" => Self::Boolean,
            "integer" => Self::Integer,
            "long" => Self::Long,
            "int" => Self::Int,
            "positiveInteger" => Self::PositiveInteger,
            "nonNegativeInteger" => Self::NonNegativeInteger,
            "anySimpleType" => Self::AnySimpleType,
            _ => return None,
        };
        Some(builtin)
    }

    fn preserves_whitespace(self) -> bool {
        matches!(self, Self::String | Self::AnySimpleType)
    }

    fn check(self, value: &str) -> std::result::Result<(), String> {
        let ok = match self {
            Self::String | Self::Token | Self::AnyUri | Self::AnySimpleType => true,
            Self::NormalizedString => !value.contains(['\r', '\n', '\t']),
            Self::NCName => is_ncname(value),
            Self::Boolean => matches!(value, "true" | "false" | "1" | "0"),
            Self::Integer => is_integer(value, true),
            Self::Long => value.parse::<i64>().is_ok(),
            Self::Int => value.parse::<i32>().is_ok(),
            Self::NonNegativeInteger => {
                is_integer(value, false) || (is_integer(value, true) && is_zero(value))
            }
            Self::PositiveInteger => is_integer(value, false) && !is_zero(value),
        };
        if ok {
            Ok(())
        } else {
            Err(format!("'{}' is not a valid {}", value, self.name()))
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::String => "xs:string",
            Self::NormalizedString => "xs:normalizedString",
            Self::Token => "xs:token",
            Self::NCName => "xs:NCName",
            Self::AnyUri => "xs:anyURI",
            Self::Boolean => "xs:boolean",
            Self::Integer => "xs:integer",
            Self::Long => "xs:long",
            Self::Int => "xs:int",
            Self::PositiveInteger => "xs:positiveInteger",
            Self::NonNegativeInteger => "xs:nonNegativeInteger",
            Self::AnySimpleType => "xs:anySimpleType",
        }
    }
}

fn is_integer(value: &str, allow_minus: bool) -> bool {
    let digits = match value.as_bytes().first() {
        Some(b'+') => &value[1..],
        Some(b'-') if allow_minus => &value[1..],
        _ => value,
    };
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn is_zero(value: &str) -> bool {
    value
        .trim_start_matches(['+', '-'])
        .bytes()
        .all(|b| b == b'0')
}

fn is_ncname(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// A simple type: a built-in base, optionally restricted to an enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SimpleType {
    pub base: Builtin,
    pub enumeration: Vec<String>,
}

impl SimpleType {
    pub(crate) fn builtin(base: Builtin) -> Self {
        Self {
            base,
            enumeration: Vec::new(),
        }
    }

    /// Checks a lexical value against this type.
    pub(crate) fn check(&self, raw: &str) -> std::result::Result<(), String> {
        let value = if self.base.preserves_whitespace() {
            raw
        } else {
            raw.trim()
        };
        self.base.check(value)?;
        if !self.enumeration.is_empty() && !self.enumeration.iter().any(|e| e == value) {
            return Err(format!(
                "'{}' is not one of [{}]",
                value,
                self.enumeration.join(", ")
            ));
        }
        Ok(())
    }
}

/// The type of an element declaration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TypeRef {
    AnyType,
    Simple(SimpleType),
    Complex(TypeId),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ElementDecl {
    pub name: QName,
    pub ty: TypeRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessContents {
    Strict,
    Lax,
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NamespaceConstraint {
    Any,
    /// Any namespace except the given target namespace and the absent one.
    Other(Option<String>),
    List(Vec<Option<String>>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Wildcard {
    pub namespaces: NamespaceConstraint,
    pub process: ProcessContents,
}

impl Wildcard {
    pub(crate) fn allows(&self, namespace: Option<&str>) -> bool {
        match &self.namespaces {
            NamespaceConstraint::Any => true,
            NamespaceConstraint::Other(target) => {
                namespace.is_some() && namespace != target.as_deref()
            }
            NamespaceConstraint::List(list) => list.iter().any(|ns| ns.as_deref() == namespace),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Term {
    Element(ElementId),
    Any(Wildcard),
    Sequence(Vec<Particle>),
    Choice(Vec<Particle>),
    All(Vec<Particle>),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Particle {
    pub term: Term,
    pub min: u32,
    /// `None` means unbounded.
    pub max: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AttributeDecl {
    pub name: String,
    pub required: bool,
    pub default: Option<String>,
    pub ty: SimpleType,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) enum Content {
    #[default]
    Empty,
    Simple(SimpleType),
    Particle(Particle),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct ComplexType {
    pub mixed: bool,
    pub content: Content,
    pub attributes: Vec<AttributeDecl>,
    pub any_attribute: Option<Wildcard>,
}

/// An aggregated, compiled schema.
///
/// A `Schema` is immutable once compiled; share it through an `Arc`.
#[derive(Debug, Default)]
pub struct Schema {
    pub(crate) elements: Vec<ElementDecl>,
    pub(crate) types: Vec<ComplexType>,
    pub(crate) globals: HashMap<QName, ElementId>,
    pub(crate) target_namespaces: Vec<String>,
}

impl Schema {
    /// Returns true if a global element with this name is declared.
    pub fn declares(&self, namespace: Option<&str>, local: &str) -> bool {
        self.global(namespace, local).is_some()
    }

    /// Returns the target namespaces of the aggregated schemas, in load order.
    pub fn target_namespaces(&self) -> &[String] {
        &self.target_namespaces
    }

    /// Returns the number of global element declarations.
    pub fn global_element_count(&self) -> usize {
        self.globals.len()
    }

    pub(crate) fn global(&self, namespace: Option<&str>, local: &str) -> Option<&ElementDecl> {
        let key = QName::new(namespace, local);
        self.globals.get(&key).map(|&id| &self.elements[id])
    }
}
