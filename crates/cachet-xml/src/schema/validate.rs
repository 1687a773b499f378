//! Validates owned documents against a compiled [`Schema`].

use std::collections::BTreeSet;

use super::model::{
    ComplexType, Content, ElementDecl, Particle, ProcessContents, Schema, SimpleType, Term,
    TypeRef, XSI_NAMESPACE,
};
use crate::dom::{Element, Node};
use crate::error::{Result, XmlConfigError};

/// Resolution of a child element against its parent's content model.
enum ChildDecl<'s> {
    Declared(&'s ElementDecl),
    Wildcard(ProcessContents),
}

pub(crate) struct Validator<'s> {
    schema: &'s Schema,
}

impl<'s> Validator<'s> {
    pub(crate) fn new(schema: &'s Schema) -> Self {
        Self { schema }
    }

    /// Validates `root`, which must have a global declaration.
    pub(crate) fn validate_root(&self, root: &Element) -> Result<()> {
        let decl = self
            .schema
            .global(root.namespace(), root.local_name())
            .ok_or_else(|| {
                invalid(
                    root,
                    format!(
                        "no global declaration for element '{}'",
                        qualified(root)
                    ),
                )
            })?;
        self.validate_element(&decl.ty, root)
    }

    fn validate_element(&self, ty: &TypeRef, element: &Element) -> Result<()> {
        match ty {
            TypeRef::AnyType => Ok(()),
            TypeRef::Simple(simple) => {
                self.check_attributes(&ComplexType::default(), element)?;
                self.check_simple_content(simple, element)
            }
            TypeRef::Complex(id) => {
                let complex = &self.schema.types[*id];
                self.check_attributes(complex, element)?;
                match &complex.content {
                    Content::Empty => {
                        if let Some(child) = element.child_elements().next() {
                            return Err(invalid(
                                child,
                                format!("element <{}> must be empty", element.tag_name()),
                            ));
                        }
                        if !complex.mixed {
                            reject_text(element)?;
                        }
                        Ok(())
                    }
                    Content::Simple(simple) => self.check_simple_content(simple, element),
                    Content::Particle(particle) => {
                        if !complex.mixed {
                            reject_text(element)?;
                        }
                        self.check_children(particle, element)
                    }
                }
            }
        }
    }

    fn check_simple_content(&self, simple: &SimpleType, element: &Element) -> Result<()> {
        if let Some(child) = element.child_elements().next() {
            return Err(invalid(
                child,
                format!("element <{}> only allows text content", element.tag_name()),
            ));
        }
        simple
            .check(&element.text())
            .map_err(|message| invalid(element, message))
    }

    fn check_attributes(&self, complex: &ComplexType, element: &Element) -> Result<()> {
        for attr in element.attributes() {
            let namespace = attr.namespace.as_deref();
            if namespace == Some(XSI_NAMESPACE) {
                continue;
            }
            let declared = match namespace {
                None => complex.attributes.iter().find(|d| d.name == attr.name),
                Some(_) => None,
            };
            match declared {
                Some(decl) => decl.ty.check(&attr.value).map_err(|message| {
                    invalid(
                        element,
                        format!("attribute '{}': {}", attr.qualified_name(), message),
                    )
                })?,
                None if complex
                    .any_attribute
                    .as_ref()
                    .is_some_and(|w| w.allows(namespace)) => {}
                None => {
                    return Err(invalid(
                        element,
                        format!("attribute '{}' is not allowed", attr.qualified_name()),
                    ));
                }
            }
        }

        for decl in complex.attributes.iter().filter(|d| d.required) {
            if element.attribute(&decl.name).is_none() {
                return Err(invalid(
                    element,
                    format!("missing required attribute '{}'", decl.name),
                ));
            }
        }
        Ok(())
    }

    fn check_children(&self, particle: &Particle, element: &Element) -> Result<()> {
        let children: Vec<&Element> = element.child_elements().collect();
        let ends = self.match_particle(particle, &children, 0);

        if !ends.contains(&children.len()) {
            let message = match ends.last() {
                Some(&end) if end < children.len() => {
                    return Err(invalid(
                        children[end],
                        format!(
                            "unexpected element <{}> in <{}>",
                            children[end].tag_name(),
                            element.tag_name()
                        ),
                    ));
                }
                _ if children.is_empty() => "required child elements are missing".to_string(),
                _ => "content does not match the declared model".to_string(),
            };
            return Err(invalid(element, message));
        }

        for child in children {
            match self.resolve_child(particle, child) {
                Some(ChildDecl::Declared(decl)) => self.validate_element(&decl.ty, child)?,
                Some(ChildDecl::Wildcard(ProcessContents::Skip)) => {}
                Some(ChildDecl::Wildcard(process)) => {
                    match self.schema.global(child.namespace(), child.local_name()) {
                        Some(decl) => self.validate_element(&decl.ty, child)?,
                        None if process == ProcessContents::Lax => {}
                        None => {
                            return Err(invalid(
                                child,
                                format!(
                                    "no global declaration for element '{}'",
                                    qualified(child)
                                ),
                            ));
                        }
                    }
                }
                None => {
                    return Err(invalid(
                        child,
                        format!("unexpected element <{}>", child.tag_name()),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Returns every position at which `particle` can stop after starting at `start`.
    fn match_particle(&self, particle: &Particle, children: &[&Element], start: usize) -> BTreeSet<usize> {
        let mut ends = BTreeSet::new();
        let mut frontier = BTreeSet::from([start]);
        let mut count = 0u32;

        loop {
            if count >= particle.min {
                ends.extend(frontier.iter().copied());
            }
            if frontier.is_empty() || particle.max.is_some_and(|max| count >= max) {
                break;
            }
            let mut next = BTreeSet::new();
            for &pos in &frontier {
                next.extend(self.match_term(&particle.term, children, pos));
            }
            if count >= particle.min {
                next.retain(|pos| !ends.contains(pos));
            }
            frontier = next;
            count += 1;
        }
        ends
    }

    fn match_term(&self, term: &Term, children: &[&Element], pos: usize) -> BTreeSet<usize> {
        match term {
            Term::Element(id) => {
                let name = &self.schema.elements[*id].name;
                children
                    .get(pos)
                    .filter(|c| name.matches(c.namespace(), c.local_name()))
                    .map(|_| BTreeSet::from([pos + 1]))
                    .unwrap_or_default()
            }
            Term::Any(wildcard) => children
                .get(pos)
                .filter(|c| wildcard.allows(c.namespace()))
                .map(|_| BTreeSet::from([pos + 1]))
                .unwrap_or_default(),
            Term::Sequence(items) => {
                let mut positions = BTreeSet::from([pos]);
                for item in items {
                    let mut next = BTreeSet::new();
                    for &p in &positions {
                        next.extend(self.match_particle(item, children, p));
                    }
                    positions = next;
                    if positions.is_empty() {
                        break;
                    }
                }
                positions
            }
            Term::Choice(items) => items
                .iter()
                .flat_map(|item| self.match_particle(item, children, pos))
                .collect(),
            Term::All(items) => self.match_all(items, children, pos),
        }
    }

    /// Matches an `xs:all` group greedily; its members occur at most once.
    fn match_all(&self, items: &[Particle], children: &[&Element], start: usize) -> BTreeSet<usize> {
        let mut used = vec![false; items.len()];
        let mut pos = start;

        while let Some(child) = children.get(pos) {
            let found = items.iter().enumerate().position(|(i, item)| {
                !used[i]
                    && matches!(&item.term, Term::Element(id)
                        if self.schema.elements[*id].name.matches(child.namespace(), child.local_name()))
            });
            match found {
                Some(i) => {
                    used[i] = true;
                    pos += 1;
                }
                None => break,
            }
        }

        let complete = items
            .iter()
            .zip(&used)
            .all(|(item, &used)| used || item.min == 0);
        if complete {
            BTreeSet::from([pos])
        } else {
            BTreeSet::new()
        }
    }

    fn resolve_child(&self, particle: &Particle, child: &Element) -> Option<ChildDecl<'s>> {
        let mut wildcard = None;
        self.find_decl(particle, child, &mut wildcard)
            .map(ChildDecl::Declared)
            .or(wildcard.map(ChildDecl::Wildcard))
    }

    fn find_decl(
        &self,
        particle: &Particle,
        child: &Element,
        wildcard: &mut Option<ProcessContents>,
    ) -> Option<&'s ElementDecl> {
        match &particle.term {
            Term::Element(id) => {
                let decl = &self.schema.elements[*id];
                decl.name
                    .matches(child.namespace(), child.local_name())
                    .then_some(decl)
            }
            Term::Any(any) => {
                if wildcard.is_none() && any.allows(child.namespace()) {
                    *wildcard = Some(any.process);
                }
                None
            }
            Term::Sequence(items) | Term::Choice(items) | Term::All(items) => items
                .iter()
                .find_map(|item| self.find_decl(item, child, wildcard)),
        }
    }
}

fn reject_text(element: &Element) -> Result<()> {
    let has_text = element
        .children()
        .iter()
        .any(|node| matches!(node, Node::Text(text) if !text.trim().is_empty()));
    if has_text {
        return Err(invalid(
            element,
            format!("element <{}> does not allow text content", element.tag_name()),
        ));
    }
    Ok(())
}

fn qualified(element: &Element) -> String {
    match element.namespace() {
        Some(ns) => format!("{{{}}}{}", ns, element.local_name()),
        None => element.local_name().to_string(),
    }
}

fn invalid(element: &Element, message: impl Into<String>) -> XmlConfigError {
    XmlConfigError::validation(element.tag_name(), element.location(), message)
}
