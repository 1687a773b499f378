//! Compiles XML Schema documents into a [`Schema`].
//!
//! Compilation runs in two passes over every aggregated document: the first
//! declares global elements and named types so that references may point
//! forward or across documents, the second compiles their bodies.

use std::collections::HashMap;

use roxmltree::Node as XNode;
use tracing::debug;

use super::model::{
    AttributeDecl, Builtin, ComplexType, Content, ElementDecl, NamespaceConstraint, Particle,
    ProcessContents, QName, Schema, SimpleType, Term, TypeId, TypeRef, Wildcard, XSD_NAMESPACE,
};
use crate::error::{Result, XmlConfigError};

/// Compiles loaded `(resource name, schema text)` pairs into one schema.
pub(crate) fn compile(sources: &[(String, String)]) -> Result<Schema> {
    let mut docs = Vec::with_capacity(sources.len());
    for (name, text) in sources {
        let doc = roxmltree::Document::parse(text)
            .map_err(|e| XmlConfigError::schema(name.as_str(), e.to_string()))?;
        docs.push((name.as_str(), doc));
    }

    let mut compiler = Compiler::default();
    for (name, doc) in &docs {
        let ctx = Context::new(name, doc.root_element())?;
        compiler.declare(&ctx, doc.root_element())?;
    }
    for (name, doc) in &docs {
        let ctx = Context::new(name, doc.root_element())?;
        compiler.define(&ctx, doc.root_element())?;
    }

    debug!(
        "Compiled {} schema documents: {} global elements, {} complex types",
        docs.len(),
        compiler.schema.globals.len(),
        compiler.schema.types.len()
    );
    Ok(compiler.schema)
}

struct Context<'a> {
    resource: &'a str,
    target: Option<String>,
    qualified: bool,
}

impl<'a> Context<'a> {
    fn new(resource: &'a str, root: XNode<'_, '_>) -> Result<Self> {
        if !is_xsd(root, "schema") {
            return Err(XmlConfigError::schema(
                resource,
                format!("root element <{}> is not xs:schema", root.tag_name().name()),
            ));
        }
        Ok(Self {
            resource,
            target: root.attribute("targetNamespace").map(str::to_string),
            qualified: root.attribute("elementFormDefault") == Some("qualified"),
        })
    }

    fn error(&self, message: impl Into<String>) -> XmlConfigError {
        XmlConfigError::schema(self.resource, message)
    }

    fn unsupported(&self, node: XNode<'_, '_>) -> XmlConfigError {
        let pos = node.document().text_pos_at(node.range().start);
        self.error(format!(
            "unsupported construct <xs:{}> at line {}, column {}",
            node.tag_name().name(),
            pos.row,
            pos.col
        ))
    }

    fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }
}

#[derive(Default)]
struct Compiler {
    schema: Schema,
    complex_names: HashMap<QName, TypeId>,
    simple_names: HashMap<QName, SimpleType>,
}

impl Compiler {
    fn declare(&mut self, ctx: &Context<'_>, root: XNode<'_, '_>) -> Result<()> {
        if let Some(target) = ctx.target() {
            if !self.schema.target_namespaces.iter().any(|t| t == target) {
                self.schema.target_namespaces.push(target.to_string());
            }
        }

        for child in xsd_children(ctx, root)? {
            match child.tag_name().name() {
                "annotation" | "import" => {}
                "element" => {
                    let name = QName::new(ctx.target(), required(ctx, child, "name")?);
                    if self.schema.globals.contains_key(&name) {
                        return Err(ctx.error(format!("duplicate global element '{}'", name)));
                    }
                    let id = self.schema.elements.len();
                    self.schema.elements.push(ElementDecl {
                        name: name.clone(),
                        ty: TypeRef::AnyType,
                    });
                    self.schema.globals.insert(name, id);
                }
                "complexType" => {
                    let name = self.new_type_name(ctx, child)?;
                    let id = self.schema.types.len();
                    self.schema.types.push(ComplexType::default());
                    self.complex_names.insert(name, id);
                }
                "simpleType" => {
                    let name = self.new_type_name(ctx, child)?;
                    let simple = self.compile_simple_type(ctx, child)?;
                    self.simple_names.insert(name, simple);
                }
                _ => return Err(ctx.unsupported(child)),
            }
        }
        Ok(())
    }

    fn define(&mut self, ctx: &Context<'_>, root: XNode<'_, '_>) -> Result<()> {
        for child in xsd_children(ctx, root)? {
            match child.tag_name().name() {
                "element" => {
                    let name = QName::new(ctx.target(), required(ctx, child, "name")?);
                    let ty = self.element_type(ctx, child)?;
                    if let Some(&id) = self.schema.globals.get(&name) {
                        self.schema.elements[id].ty = ty;
                    }
                }
                "complexType" => {
                    let name = QName::new(ctx.target(), required(ctx, child, "name")?);
                    let complex = self.compile_complex_type(ctx, child)?;
                    if let Some(&id) = self.complex_names.get(&name) {
                        self.schema.types[id] = complex;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn new_type_name(&self, ctx: &Context<'_>, node: XNode<'_, '_>) -> Result<QName> {
        let name = QName::new(ctx.target(), required(ctx, node, "name")?);
        if self.complex_names.contains_key(&name) || self.simple_names.contains_key(&name) {
            return Err(ctx.error(format!("duplicate global type '{}'", name)));
        }
        Ok(name)
    }

    fn element_type(&mut self, ctx: &Context<'_>, node: XNode<'_, '_>) -> Result<TypeRef> {
        let inline: Vec<_> = xsd_children(ctx, node)?
            .into_iter()
            .filter(|c| c.tag_name().name() != "annotation")
            .collect();

        if let Some(type_name) = node.attribute("type") {
            if !inline.is_empty() {
                return Err(ctx.error(format!(
                    "element '{}' declares both a type attribute and an inline type",
                    node.attribute("name").unwrap_or_default()
                )));
            }
            return self.resolve_type(ctx, node, type_name);
        }

        match inline.as_slice() {
            [] => Ok(TypeRef::AnyType),
            [child] if child.tag_name().name() == "complexType" => {
                let id = self.schema.types.len();
                self.schema.types.push(ComplexType::default());
                let complex = self.compile_complex_type(ctx, *child)?;
                self.schema.types[id] = complex;
                Ok(TypeRef::Complex(id))
            }
            [child] if child.tag_name().name() == "simpleType" => {
                Ok(TypeRef::Simple(self.compile_simple_type(ctx, *child)?))
            }
            [.., last] => Err(ctx.unsupported(*last)),
        }
    }

    fn resolve_type(&self, ctx: &Context<'_>, node: XNode<'_, '_>, value: &str) -> Result<TypeRef> {
        let name = resolve_qname(ctx, node, value)?;
        if name.namespace.as_deref() == Some(XSD_NAMESPACE) {
            if name.local == "anyType" {
                return Ok(TypeRef::AnyType);
            }
            return Builtin::from_local_name(&name.local)
                .map(|b| TypeRef::Simple(SimpleType::builtin(b)))
                .ok_or_else(|| ctx.error(format!("unsupported built-in type '{}'", value)));
        }
        if let Some(&id) = self.complex_names.get(&name) {
            return Ok(TypeRef::Complex(id));
        }
        if let Some(simple) = self.simple_names.get(&name) {
            return Ok(TypeRef::Simple(simple.clone()));
        }
        Err(ctx.error(format!("unresolved type reference '{}'", value)))
    }

    fn resolve_simple(&self, ctx: &Context<'_>, node: XNode<'_, '_>, value: &str) -> Result<SimpleType> {
        match self.resolve_type(ctx, node, value)? {
            TypeRef::Simple(simple) => Ok(simple),
            _ => Err(ctx.error(format!("'{}' is not a simple type", value))),
        }
    }

    fn compile_simple_type(&self, ctx: &Context<'_>, node: XNode<'_, '_>) -> Result<SimpleType> {
        let mut restriction = None;
        for child in xsd_children(ctx, node)? {
            match child.tag_name().name() {
                "annotation" => {}
                "restriction" if restriction.is_none() => restriction = Some(child),
                _ => return Err(ctx.unsupported(child)),
            }
        }
        let Some(restriction) = restriction else {
            return Err(ctx.error("simple type without a restriction"));
        };

        let base = required(ctx, restriction, "base")?;
        let mut simple = self.resolve_simple(ctx, restriction, base)?;
        let mut enumeration = Vec::new();
        for facet in xsd_children(ctx, restriction)? {
            match facet.tag_name().name() {
                "annotation" => {}
                "enumeration" => enumeration.push(required(ctx, facet, "value")?.to_string()),
                _ => return Err(ctx.unsupported(facet)),
            }
        }
        if !enumeration.is_empty() {
            simple.enumeration = enumeration;
        }
        Ok(simple)
    }

    fn compile_complex_type(&mut self, ctx: &Context<'_>, node: XNode<'_, '_>) -> Result<ComplexType> {
        let mut complex = ComplexType {
            mixed: flag(ctx, node, "mixed")?,
            ..Default::default()
        };
        let mut has_content = false;

        for child in xsd_children(ctx, node)? {
            match child.tag_name().name() {
                "annotation" => {}
                "sequence" | "choice" | "all" | "simpleContent" if has_content => {
                    return Err(ctx.error("complex type declares more than one content model"));
                }
                "sequence" | "choice" | "all" => {
                    complex.content = Content::Particle(self.compile_group(ctx, child)?);
                    has_content = true;
                }
                "simpleContent" => {
                    self.compile_simple_content(ctx, child, &mut complex)?;
                    has_content = true;
                }
                "attribute" => self.add_attribute(ctx, child, &mut complex)?,
                "anyAttribute" => complex.any_attribute = Some(compile_wildcard(ctx, child)?),
                _ => return Err(ctx.unsupported(child)),
            }
        }
        Ok(complex)
    }

    fn compile_simple_content(
        &self,
        ctx: &Context<'_>,
        node: XNode<'_, '_>,
        complex: &mut ComplexType,
    ) -> Result<()> {
        for child in xsd_children(ctx, node)? {
            match child.tag_name().name() {
                "annotation" => {}
                "extension" => {
                    let base = required(ctx, child, "base")?;
                    complex.content = Content::Simple(self.resolve_simple(ctx, child, base)?);
                    for member in xsd_children(ctx, child)? {
                        match member.tag_name().name() {
                            "annotation" => {}
                            "attribute" => self.add_attribute(ctx, member, complex)?,
                            "anyAttribute" => {
                                complex.any_attribute = Some(compile_wildcard(ctx, member)?)
                            }
                            _ => return Err(ctx.unsupported(member)),
                        }
                    }
                }
                _ => return Err(ctx.unsupported(child)),
            }
        }
        Ok(())
    }

    fn add_attribute(
        &self,
        ctx: &Context<'_>,
        node: XNode<'_, '_>,
        complex: &mut ComplexType,
    ) -> Result<()> {
        if node.attribute("ref").is_some() {
            return Err(ctx.error("attribute references are not supported"));
        }
        let name = required(ctx, node, "name")?.to_string();
        if complex.attributes.iter().any(|a| a.name == name) {
            return Err(ctx.error(format!("duplicate attribute '{}'", name)));
        }

        let mut ty = match node.attribute("type") {
            Some(type_name) => Some(self.resolve_simple(ctx, node, type_name)?),
            None => None,
        };
        for child in xsd_children(ctx, node)? {
            match child.tag_name().name() {
                "annotation" => {}
                "simpleType" if ty.is_none() => ty = Some(self.compile_simple_type(ctx, child)?),
                _ => return Err(ctx.unsupported(child)),
            }
        }
        let ty = ty.unwrap_or_else(|| SimpleType::builtin(Builtin::AnySimpleType));

        let required = match node.attribute("use") {
            None | Some("optional") => false,
            Some("required") => true,
            Some(other) => {
                return Err(ctx.error(format!("unsupported attribute use '{}'", other)));
            }
        };
        let default = node.attribute("default").map(str::to_string);
        if let Some(value) = &default {
            if required {
                return Err(ctx.error(format!(
                    "required attribute '{}' cannot declare a default",
                    name
                )));
            }
            ty.check(value)
                .map_err(|e| ctx.error(format!("default of attribute '{}': {}", name, e)))?;
        }

        complex.attributes.push(AttributeDecl {
            name,
            required,
            default,
            ty,
        });
        Ok(())
    }

    fn compile_group(&mut self, ctx: &Context<'_>, node: XNode<'_, '_>) -> Result<Particle> {
        let (min, max) = occurs(ctx, node)?;
        let kind = node.tag_name().name();
        let mut items = Vec::new();

        for child in xsd_children(ctx, node)? {
            let particle = match child.tag_name().name() {
                "annotation" => continue,
                "element" => self.compile_local_element(ctx, child)?,
                "sequence" | "choice" if kind != "all" => self.compile_group(ctx, child)?,
                "any" if kind != "all" => {
                    let (min, max) = occurs(ctx, child)?;
                    Particle {
                        term: Term::Any(compile_wildcard(ctx, child)?),
                        min,
                        max,
                    }
                }
                _ => return Err(ctx.unsupported(child)),
            };
            if kind == "all" && particle.max.is_none_or(|m| m > 1) {
                return Err(ctx.error("elements of xs:all may occur at most once"));
            }
            items.push(particle);
        }

        let term = match kind {
            "sequence" => Term::Sequence(items),
            "choice" => Term::Choice(items),
            _ => Term::All(items),
        };
        Ok(Particle { term, min, max })
    }

    fn compile_local_element(&mut self, ctx: &Context<'_>, node: XNode<'_, '_>) -> Result<Particle> {
        let (min, max) = occurs(ctx, node)?;

        if let Some(reference) = node.attribute("ref") {
            let name = resolve_qname(ctx, node, reference)?;
            let id = *self.schema.globals.get(&name).ok_or_else(|| {
                ctx.error(format!("unresolved element reference '{}'", reference))
            })?;
            return Ok(Particle {
                term: Term::Element(id),
                min,
                max,
            });
        }

        let local = required(ctx, node, "name")?;
        let qualified = match node.attribute("form") {
            Some(form) => form == "qualified",
            None => ctx.qualified,
        };
        let namespace = if qualified { ctx.target() } else { None };
        let ty = self.element_type(ctx, node)?;

        let id = self.schema.elements.len();
        self.schema.elements.push(ElementDecl {
            name: QName::new(namespace, local),
            ty,
        });
        Ok(Particle {
            term: Term::Element(id),
            min,
            max,
        })
    }
}

fn compile_wildcard(ctx: &Context<'_>, node: XNode<'_, '_>) -> Result<Wildcard> {
    let namespaces = match node.attribute("namespace").unwrap_or("##any").trim() {
        "##any" => NamespaceConstraint::Any,
        "##other" => NamespaceConstraint::Other(ctx.target.clone()),
        list => NamespaceConstraint::List(
            list.split_whitespace()
                .map(|token| match token {
                    "##targetNamespace" => ctx.target.clone(),
                    "##local" => None,
                    uri => Some(uri.to_string()),
                })
                .collect(),
        ),
    };
    let process = match node.attribute("processContents").unwrap_or("strict") {
        "strict" => ProcessContents::Strict,
        "lax" => ProcessContents::Lax,
        "skip" => ProcessContents::Skip,
        other => return Err(ctx.error(format!("invalid processContents '{}'", other))),
    };
    Ok(Wildcard {
        namespaces,
        process,
    })
}

fn occurs(ctx: &Context<'_>, node: XNode<'_, '_>) -> Result<(u32, Option<u32>)> {
    let min = match node.attribute("minOccurs") {
        Some(value) => value
            .trim()
            .parse::<u32>()
            .map_err(|_| ctx.error(format!("invalid minOccurs '{}'", value)))?,
        None => 1,
    };
    let max = match node.attribute("maxOccurs").map(str::trim) {
        Some("unbounded") => None,
        Some(value) => Some(
            value
                .parse::<u32>()
                .map_err(|_| ctx.error(format!("invalid maxOccurs '{}'", value)))?,
        ),
        None => Some(1),
    };
    if max.is_some_and(|max| max < min) {
        return Err(ctx.error("maxOccurs is smaller than minOccurs"));
    }
    Ok((min, max))
}

fn flag(ctx: &Context<'_>, node: XNode<'_, '_>, name: &str) -> Result<bool> {
    match node.attribute(name) {
        None | Some("false") | Some("0") => Ok(false),
        Some("true") | Some("1") => Ok(true),
        Some(other) => Err(ctx.error(format!("invalid boolean '{}' for {}", other, name))),
    }
}

fn required<'a>(ctx: &Context<'_>, node: XNode<'a, '_>, name: &str) -> Result<&'a str> {
    node.attribute(name).ok_or_else(|| {
        ctx.error(format!(
            "<xs:{}> is missing the '{}' attribute",
            node.tag_name().name(),
            name
        ))
    })
}

fn resolve_qname(ctx: &Context<'_>, node: XNode<'_, '_>, value: &str) -> Result<QName> {
    let (prefix, local) = match value.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, value),
    };
    let namespace = node.lookup_namespace_uri(prefix);
    if prefix.is_some() && namespace.is_none() {
        return Err(ctx.error(format!("undeclared prefix in '{}'", value)));
    }
    Ok(QName::new(namespace, local))
}

fn is_xsd(node: XNode<'_, '_>, local: &str) -> bool {
    node.tag_name().namespace() == Some(XSD_NAMESPACE) && node.tag_name().name() == local
}

fn xsd_children<'a, 'i>(ctx: &Context<'_>, node: XNode<'a, 'i>) -> Result<Vec<XNode<'a, 'i>>> {
    let mut children = Vec::new();
    for child in node.children().filter(|c| c.is_element()) {
        if child.tag_name().namespace() != Some(XSD_NAMESPACE) {
            return Err(ctx.error(format!(
                "unexpected element <{}> in <xs:{}>",
                child.tag_name().name(),
                node.tag_name().name()
            )));
        }
        children.push(child);
    }
    Ok(children)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile_one(text: &str) -> Result<Schema> {
        compile(&[("test.xsd".to_string(), text.to_string())])
    }

    const POOLS: &str = r#"
        <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
                   xmlns:p="urn:pools" targetNamespace="urn:pools"
                   elementFormDefault="qualified">
          <xs:element name="pools" type="p:pools-type"/>
          <xs:complexType name="pools-type">
            <xs:sequence>
              <xs:element name="pool" type="p:pool-type" maxOccurs="unbounded"/>
            </xs:sequence>
          </xs:complexType>
          <xs:complexType name="pool-type">
            <xs:simpleContent>
              <xs:extension base="xs:nonNegativeInteger">
                <xs:attribute name="name" type="xs:NCName" use="required"/>
                <xs:attribute name="unit" type="p:unit" default="B"/>
              </xs:extension>
            </xs:simpleContent>
          </xs:complexType>
          <xs:simpleType name="unit">
            <xs:restriction base="xs:token">
              <xs:enumeration value="B"/>
              <xs:enumeration value="MB"/>
            </xs:restriction>
          </xs:simpleType>
        </xs:schema>"#;

    #[test]
    fn test_compile_resolves_forward_references() {
        let schema = compile_one(POOLS).unwrap();

        assert!(schema.declares(Some("urn:pools"), "pools"));
        assert!(!schema.declares(Some("urn:pools"), "pool"));
        assert_eq!(schema.target_namespaces(), &["urn:pools".to_string()]);
    }

    #[test]
    fn test_unresolved_type_reference() {
        let text = r#"
            <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns:p="urn:p" targetNamespace="urn:p">
              <xs:element name="root" type="p:missing"/>
            </xs:schema>"#;
        let err = compile_one(text).unwrap_err();

        assert!(err.is_schema_error());
        assert!(err.to_string().contains("test.xsd"));
        assert!(err.to_string().contains("p:missing"));
    }

    #[test]
    fn test_duplicate_global_element_across_documents() {
        let text = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:p">
              <xs:element name="root"/>
            </xs:schema>"#;
        let err = compile(&[
            ("a.xsd".to_string(), text.to_string()),
            ("b.xsd".to_string(), text.to_string()),
        ])
        .unwrap_err();

        assert!(err.to_string().contains("b.xsd"));
        assert!(err.to_string().contains("duplicate global element"));
    }

    #[test]
    fn test_unsupported_construct() {
        let text = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
              <xs:group name="g"><xs:sequence/></xs:group>
            </xs:schema>"#;
        let err = compile_one(text).unwrap_err();

        assert!(err.to_string().contains("unsupported construct <xs:group>"));
    }

    #[test]
    fn test_not_a_schema() {
        let err = compile_one("<schema/>").unwrap_err();
        assert!(err.to_string().contains("is not xs:schema"));
    }

    #[test]
    fn test_invalid_default_is_rejected() {
        let text = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
              <xs:element name="e">
                <xs:complexType>
                  <xs:attribute name="n" type="xs:int" default="many"/>
                </xs:complexType>
              </xs:element>
            </xs:schema>"#;
        let err = compile_one(text).unwrap_err();

        assert!(err.to_string().contains("default of attribute 'n'"));
    }
}
