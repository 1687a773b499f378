//! Owned XML document model.
//!
//! Parsed documents are converted from a borrowed `roxmltree` tree into owned
//! [`Element`] values so that plugins can hold, inspect and build fragments
//! without lifetimes. Comments, processing instructions and whitespace-only
//! text are dropped during conversion.

use std::fmt;

use crate::error::{Result, XmlConfigError};

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// A 1-based line/column position in the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextPosition {
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for TextPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// An attribute of an [`Element`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub namespace: Option<String>,
    pub prefix: Option<String>,
    pub name: String,
    pub value: String,
}

impl Attribute {
    /// Returns the attribute name as written, including its prefix.
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.name),
            None => self.name.clone(),
        }
    }
}

/// A child of an [`Element`].
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An owned XML element.
///
/// # Example
///
/// ```
/// use cachet_xml::dom::Element;
///
/// let cluster = Element::new_ns("urn:cachet:clustered:1", Some("tc"), "cluster")
///     .with_namespace_declaration(Some("tc"), "urn:cachet:clustered:1")
///     .with_child(
///         Element::new_ns("urn:cachet:clustered:1", Some("tc"), "connection")
///             .with_attribute("url", "terracotta://localhost:9410/app"),
///     );
///
/// assert_eq!(cluster.tag_name(), "tc:cluster");
/// let connection = cluster.child("connection").unwrap();
/// assert_eq!(connection.parent_tag(), Some("tc:cluster"));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    namespace: Option<String>,
    prefix: Option<String>,
    local_name: String,
    attributes: Vec<Attribute>,
    namespace_declarations: Vec<(Option<String>, String)>,
    children: Vec<Node>,
    parent_tag: Option<String>,
    location: Option<TextPosition>,
}

impl Element {
    /// Creates an element with no namespace.
    pub fn new(local_name: impl Into<String>) -> Self {
        Self {
            local_name: local_name.into(),
            ..Default::default()
        }
    }

    /// Creates a namespaced element, optionally written with a prefix.
    pub fn new_ns(
        namespace: impl Into<String>,
        prefix: Option<&str>,
        local_name: impl Into<String>,
    ) -> Self {
        Self {
            namespace: Some(namespace.into()),
            prefix: prefix.map(str::to_string),
            local_name: local_name.into(),
            ..Default::default()
        }
    }

    /// Adds (or replaces) an unqualified attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Adds an attribute when `value` is present.
    pub fn with_optional_attribute(self, name: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.with_attribute(name, value),
            None => self,
        }
    }

    /// Declares a namespace binding on this element.
    pub fn with_namespace_declaration(mut self, prefix: Option<&str>, uri: impl Into<String>) -> Self {
        self.namespace_declarations
            .push((prefix.map(str::to_string), uri.into()));
        self
    }

    /// Appends a child element.
    pub fn with_child(mut self, child: Element) -> Self {
        self.push_child(child);
        self
    }

    /// Appends a text node.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Sets an unqualified attribute, replacing any previous value.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .attributes
            .iter_mut()
            .find(|a| a.namespace.is_none() && a.name == name)
        {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute {
                namespace: None,
                prefix: None,
                name,
                value,
            }),
        }
    }

    /// Appends a child element, recording this element as its parent.
    pub fn push_child(&mut self, mut child: Element) {
        child.parent_tag = Some(self.tag_name());
        self.children.push(Node::Element(child));
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Returns the tag as written in the document (`prefix:local` or `local`).
    pub fn tag_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.local_name),
            None => self.local_name.clone(),
        }
    }

    /// Returns the tag of the enclosing element, if any.
    pub fn parent_tag(&self) -> Option<&str> {
        self.parent_tag.as_deref()
    }

    /// Returns the position of the start tag when the element was parsed.
    pub fn location(&self) -> Option<TextPosition> {
        self.location
    }

    /// Returns the value of an unqualified attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.namespace.is_none() && a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn namespace_declarations(&self) -> &[(Option<String>, String)] {
        &self.namespace_declarations
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Iterates over the child elements, skipping text.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// Returns the first child element with the given local name.
    pub fn child(&self, local_name: &str) -> Option<&Element> {
        self.child_elements().find(|e| e.local_name == local_name)
    }

    /// Returns the concatenated direct text content.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    /// Returns true if the element has no child elements and no text.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// An XML document holding at most one root element.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    root: Option<Element>,
}

impl Document {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a document around an existing root element.
    pub fn with_root(root: Element) -> Self {
        Self { root: Some(root) }
    }

    /// Parses `xml`, checking well-formedness only.
    pub fn parse(xml: &str) -> Result<Self> {
        let doc = roxmltree::Document::parse(xml).map_err(|e| XmlConfigError::MalformedXml {
            message: e.to_string(),
        })?;
        let root = convert(xml, &doc, doc.root_element(), None);
        Ok(Self { root: Some(root) })
    }

    pub fn root(&self) -> Option<&Element> {
        self.root.as_ref()
    }

    pub fn set_root(&mut self, root: Element) {
        self.root = Some(root);
    }

    pub fn into_root(self) -> Option<Element> {
        self.root
    }
}

fn convert(
    xml: &str,
    doc: &roxmltree::Document<'_>,
    node: roxmltree::Node<'_, '_>,
    parent_tag: Option<String>,
) -> Element {
    let start = node.range().start;
    let pos = doc.text_pos_at(start);
    let qname = qualified_name(xml, start);

    let mut element = Element {
        namespace: node.tag_name().namespace().map(str::to_string),
        prefix: qname.split_once(':').map(|(p, _)| p.to_string()),
        local_name: node.tag_name().name().to_string(),
        parent_tag,
        location: Some(TextPosition {
            line: pos.row,
            column: pos.col,
        }),
        ..Default::default()
    };

    for attr in node.attributes() {
        let prefix = attr
            .namespace()
            .and_then(|ns| node.lookup_prefix(ns))
            .filter(|p| !p.is_empty())
            .map(str::to_string);
        element.attributes.push(Attribute {
            namespace: attr.namespace().map(str::to_string),
            prefix,
            name: attr.name().to_string(),
            value: attr.value().to_string(),
        });
    }

    let inherited: Vec<(Option<&str>, &str)> = node
        .parent_element()
        .map(|p| p.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
        .unwrap_or_default();
    for ns in node.namespaces() {
        if ns.uri() != XML_NAMESPACE && !inherited.contains(&(ns.name(), ns.uri())) {
            element
                .namespace_declarations
                .push((ns.name().map(str::to_string), ns.uri().to_string()));
        }
    }

    let tag = element.tag_name();
    for child in node.children() {
        if child.is_element() {
            let converted = convert(xml, doc, child, Some(tag.clone()));
            element.children.push(Node::Element(converted));
        } else if child.is_text() {
            if let Some(text) = child.text().filter(|t| !t.trim().is_empty()) {
                element.children.push(Node::Text(text.to_string()));
            }
        }
    }

    element
}

/// Reads the qualified name of the start tag beginning at `start`.
fn qualified_name(xml: &str, start: usize) -> &str {
    let rest = xml.get(start + 1..).unwrap_or_default();
    let end = rest
        .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .unwrap_or(rest.len());
    &rest[..end]
}
