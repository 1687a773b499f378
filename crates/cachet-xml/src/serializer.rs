//! DOM to XML text.
//!
//! Output policy is fixed: UTF-8, no XML declaration, two-space indentation,
//! empty elements self-closed and text-only elements on a single line.

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::dom::{Document, Element, Node};
use crate::error::{Result, XmlConfigError};

const INDENT_SIZE: usize = 2;

/// Serializes an element and its subtree.
///
/// # Example
///
/// ```
/// use cachet_xml::dom::Element;
/// use cachet_xml::serializer::to_string;
///
/// let pool = Element::new("shared-pool")
///     .with_attribute("name", "primary")
///     .with_text("16");
/// let xml = to_string(&Element::new("pools").with_child(pool)).unwrap();
///
/// assert_eq!(xml, "<pools>\n  <shared-pool name=\"primary\">16</shared-pool>\n</pools>");
/// ```
pub fn to_string(element: &Element) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT_SIZE);
    write_element(&mut writer, element)?;
    String::from_utf8(writer.into_inner()).map_err(XmlConfigError::serialization)
}

/// Serializes a document; an empty document yields an empty string.
pub fn document_to_string(document: &Document) -> Result<String> {
    match document.root() {
        Some(root) => to_string(root),
        None => Ok(String::new()),
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<()> {
    let tag = element.tag_name();
    let mut start = BytesStart::new(tag.as_str());

    for (prefix, uri) in element.namespace_declarations() {
        let name = match prefix {
            Some(prefix) => format!("xmlns:{}", prefix),
            None => "xmlns".to_string(),
        };
        start.push_attribute((name.as_str(), uri.as_str()));
    }
    for attr in element.attributes() {
        let name = attr.qualified_name();
        start.push_attribute((name.as_str(), attr.value.as_str()));
    }

    if element.is_empty() {
        return write(writer, Event::Empty(start));
    }

    write(writer, Event::Start(start))?;
    for child in element.children() {
        match child {
            Node::Element(child) => write_element(writer, child)?,
            Node::Text(text) => write(writer, Event::Text(BytesText::new(text)))?,
        }
    }
    write(writer, Event::End(BytesEnd::new(tag.as_str())))
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(XmlConfigError::serialization)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indentation_and_self_closing() {
        let element = Element::new_ns("urn:x", Some("x"), "root")
            .with_namespace_declaration(Some("x"), "urn:x")
            .with_child(Element::new_ns("urn:x", Some("x"), "empty").with_attribute("a", "1"))
            .with_child(
                Element::new_ns("urn:x", Some("x"), "nested")
                    .with_child(Element::new_ns("urn:x", Some("x"), "leaf").with_text("v")),
            );

        let xml = to_string(&element).unwrap();
        assert_eq!(
            xml,
            "<x:root xmlns:x=\"urn:x\">\n  <x:empty a=\"1\"/>\n  <x:nested>\n    <x:leaf>v</x:leaf>\n  </x:nested>\n</x:root>"
        );
    }

    #[test]
    fn test_escaping() {
        let element = Element::new("note")
            .with_attribute("title", "a \"quoted\" <title>")
            .with_text("x < y & z");

        let xml = to_string(&element).unwrap();
        assert!(xml.contains("&lt;title&gt;"));
        assert!(xml.contains("x &lt; y &amp; z"));
        assert!(!xml.starts_with("<?xml"));
    }

    #[test]
    fn test_parse_serialize_parse() {
        let xml = r#"<c:config xmlns:c="urn:c"><c:cache alias="a"><c:key-type>K</c:key-type></c:cache></c:config>"#;
        let first = Document::parse(xml).unwrap();
        let text = document_to_string(&first).unwrap();
        let second = Document::parse(&text).unwrap();

        let a = first.root().unwrap().child("cache").unwrap();
        let b = second.root().unwrap().child("cache").unwrap();
        assert_eq!(a.attribute("alias"), b.attribute("alias"));
        assert_eq!(b.child("key-type").unwrap().text(), "K");
        assert_eq!(second.root().unwrap().namespace(), Some("urn:c"));
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(document_to_string(&Document::new()).unwrap(), "");
    }
}
