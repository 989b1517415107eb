//! Bidirectional conversion between structured values and XML element trees.
//!
//! Structured values ([`serde_json::Value`]) have no native list tag in XML,
//! so the two directions use an asymmetric pair of rules:
//!
//! - **Value → XML**: mapping keys become element names; sequence indices (and
//!   purely numeric mapping keys) synthesize `item<N>` element names.
//! - **XML → Value**: attributes collect under a synthetic `@attributes` key;
//!   child elements accumulate into sequences keyed by tag name so repeated
//!   sibling tags are preserved; a childless element with non-empty text
//!   records it under `@value`; finally every singleton sequence collapses to
//!   its single element.
//!
//! The singleton collapse is a deliberate ergonomics trade-off: a tag that
//! occurs once does not surprise callers with a one-element list, while
//! repeated tags remain sequences. Changing that rule breaks round-tripping
//! for single-item lists, so it must be preserved exactly.
//!
//! # Examples
//!
//! ```
//! use restwire::codec::xml::xml_to_value;
//! use serde_json::json;
//!
//! let value = xml_to_value("<root><a>1</a><a>2</a><b>x</b></root>").unwrap();
//! assert_eq!(value["a"], json!([{"@value": "1"}, {"@value": "2"}]));
//! assert_eq!(value["b"], json!({"@value": "x"}));
//! ```

use crate::error::{RestError, Result};
use quick_xml::escape::{escape, resolve_predefined_entity};
use quick_xml::events::{BytesRef, BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

/// Render a structured value as an XML document wrapped in a `<response>`
/// root element.
pub fn value_to_xml(value: &Value) -> String {
    let mut out = String::from("<?xml version=\"1.0\"?><response>");
    write_children(value, &mut out);
    out.push_str("</response>");
    out
}

fn write_children(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                write_node(&element_name(key), child, out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                write_node(&format!("item{index}"), child, out);
            }
        }
        scalar => out.push_str(&escape(&scalar_text(scalar))),
    }
}

fn write_node(tag: &str, value: &Value, out: &mut String) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    write_children(value, out);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

/// Purely numeric keys signal an array index and synthesize `item<key>`,
/// which keeps the emitted element names well-formed.
fn element_name(key: &str) -> String {
    if !key.is_empty() && key.chars().all(|c| c.is_ascii_digit()) {
        format!("item{key}")
    } else {
        key.to_string()
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Parse an XML document and convert its root element to a structured value.
///
/// # Errors
///
/// Malformed XML is a [`RestError::Decode`]; silent data loss here would be a
/// worse failure mode than an explicit decode error.
pub fn xml_to_value(xml: &str) -> Result<Value> {
    let root = parse_tree(xml)?;
    Ok(node_to_value(&root))
}

/// An element subtree: attributes, ordered children, accumulated text.
#[derive(Debug, Default)]
struct XmlNode {
    attrs: Vec<(String, String)>,
    children: Vec<(String, XmlNode)>,
    text: String,
}

fn decode_err(detail: impl std::fmt::Display) -> RestError {
    RestError::Decode {
        format: "xml",
        detail: detail.to_string(),
    }
}

fn parse_tree(xml: &str) -> Result<XmlNode> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<(String, XmlNode)> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        match reader.read_event().map_err(decode_err)? {
            Event::Start(start) => {
                let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                let node = XmlNode {
                    attrs: read_attrs(&start)?,
                    ..XmlNode::default()
                };
                stack.push((name, node));
            }
            Event::Empty(start) => {
                let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                let node = XmlNode {
                    attrs: read_attrs(&start)?,
                    ..XmlNode::default()
                };
                attach(&mut stack, &mut root, name, node)?;
            }
            Event::End(_) => {
                let (name, node) = stack
                    .pop()
                    .ok_or_else(|| decode_err("unexpected closing tag"))?;
                attach(&mut stack, &mut root, name, node)?;
            }
            Event::Text(text) => {
                let decoded = text.xml_content().map_err(decode_err)?;
                if let Some((_, node)) = stack.last_mut() {
                    node.text.push_str(&decoded);
                }
            }
            // Entity and character references arrive as their own events and
            // must be resolved back into the surrounding text.
            Event::GeneralRef(reference) => {
                let resolved = resolve_reference(&reference)?;
                if let Some((_, node)) = stack.last_mut() {
                    node.text.push_str(&resolved);
                }
            }
            Event::CData(data) => {
                if let Some((_, node)) = stack.last_mut() {
                    node.text
                        .push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            // Declarations, comments and processing instructions carry no data.
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(decode_err("unclosed element"));
    }
    root.ok_or_else(|| decode_err("document has no root element"))
}

fn attach(
    stack: &mut [(String, XmlNode)],
    root: &mut Option<XmlNode>,
    name: String,
    node: XmlNode,
) -> Result<()> {
    if let Some((_, parent)) = stack.last_mut() {
        parent.children.push((name, node));
    } else if root.is_none() {
        *root = Some(node);
    } else {
        return Err(decode_err("multiple root elements"));
    }
    Ok(())
}

/// Resolve a `&name;` or `&#N;` reference to its replacement text. Numeric
/// character references and the five predefined entities are supported;
/// anything else is undeclared and therefore malformed.
fn resolve_reference(reference: &BytesRef) -> Result<String> {
    if let Some(ch) = reference.resolve_char_ref().map_err(decode_err)? {
        return Ok(ch.to_string());
    }
    let name = reference.decode().map_err(decode_err)?;
    match resolve_predefined_entity(&name) {
        Some(text) => Ok(text.to_string()),
        None => Err(decode_err(format!("undeclared entity reference &{name};"))),
    }
}

fn read_attrs(start: &BytesStart) -> Result<Vec<(String, String)>> {
    let mut attrs = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(decode_err)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(decode_err)?.into_owned();
        attrs.push((key, value));
    }
    Ok(attrs)
}

fn node_to_value(node: &XmlNode) -> Value {
    let mut out = Map::new();

    if !node.attrs.is_empty() {
        let mut attrs = Map::new();
        for (key, value) in &node.attrs {
            attrs.insert(key.clone(), Value::String(value.clone()));
        }
        out.insert("@attributes".to_string(), Value::Object(attrs));
    }

    // Children accumulate per tag so repeated sibling tags become sequences.
    for (tag, child) in &node.children {
        let entry = out
            .entry(tag.clone())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(items) = entry {
            items.push(node_to_value(child));
        }
    }

    let text = node.text.trim();
    if node.children.is_empty() && !text.is_empty() {
        out.insert("@value".to_string(), Value::String(text.to_string()));
    }

    // Singleton collapse: a tag that occurred once is not a list.
    for value in out.values_mut() {
        if let Value::Array(items) = value {
            if items.len() == 1 {
                *value = items.remove(0);
            }
        }
    }

    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_to_xml_scalars() {
        let xml = value_to_xml(&json!({"a": "1", "b": 2, "c": true}));
        assert_eq!(
            xml,
            "<?xml version=\"1.0\"?><response><a>1</a><b>2</b><c>true</c></response>"
        );
    }

    #[test]
    fn test_value_to_xml_nested_mapping() {
        let xml = value_to_xml(&json!({"user": {"name": "fred"}}));
        assert_eq!(
            xml,
            "<?xml version=\"1.0\"?><response><user><name>fred</name></user></response>"
        );
    }

    #[test]
    fn test_value_to_xml_sequence_uses_item_tags() {
        let xml = value_to_xml(&json!({"rows": [{"id": 1}, {"id": 2}]}));
        assert_eq!(
            xml,
            "<?xml version=\"1.0\"?><response><rows><item0><id>1</id></item0><item1><id>2</id></item1></rows></response>"
        );
    }

    #[test]
    fn test_value_to_xml_numeric_mapping_key() {
        let xml = value_to_xml(&json!({"0": {"id": 1}}));
        assert!(xml.contains("<item0><id>1</id></item0>"));
    }

    #[test]
    fn test_value_to_xml_escapes_text() {
        let xml = value_to_xml(&json!({"a": "x < y & z"}));
        assert!(xml.contains("<a>x &lt; y &amp; z</a>"));
    }

    #[test]
    fn test_xml_to_value_text_under_value_key() {
        let value = xml_to_value("<root><a>hello</a></root>").unwrap();
        assert_eq!(value, json!({"a": {"@value": "hello"}}));
    }

    #[test]
    fn test_xml_to_value_attributes() {
        let value = xml_to_value(r#"<root id="7"><a>x</a></root>"#).unwrap();
        assert_eq!(value["@attributes"], json!({"id": "7"}));
    }

    #[test]
    fn test_xml_to_value_repeated_tags_stay_sequences() {
        let value = xml_to_value("<root><a>1</a><a>2</a></root>").unwrap();
        assert_eq!(value["a"], json!([{"@value": "1"}, {"@value": "2"}]));
    }

    #[test]
    fn test_xml_to_value_singleton_collapses() {
        let value = xml_to_value("<root><a><b>1</b></a></root>").unwrap();
        // Without the collapse this would be {"a": [{"b": [...]}]}.
        assert_eq!(value, json!({"a": {"b": {"@value": "1"}}}));
    }

    #[test]
    fn test_xml_to_value_empty_element() {
        let value = xml_to_value("<root><a/></root>").unwrap();
        assert_eq!(value, json!({"a": {}}));
    }

    #[test]
    fn test_xml_to_value_unescapes_entities() {
        let value = xml_to_value("<root><a>x &lt; y</a></root>").unwrap();
        assert_eq!(value["a"]["@value"], json!("x < y"));
    }

    #[test]
    fn test_xml_to_value_all_predefined_entities() {
        let value = xml_to_value("<root><a>&lt;&gt;&amp;&apos;&quot;</a></root>").unwrap();
        assert_eq!(value["a"]["@value"], json!("<>&'\""));
    }

    #[test]
    fn test_xml_to_value_numeric_char_refs() {
        let value = xml_to_value("<root><a>&#65;&#x42;</a></root>").unwrap();
        assert_eq!(value["a"]["@value"], json!("AB"));
    }

    #[test]
    fn test_xml_to_value_entity_between_text_runs() {
        let value = xml_to_value("<root><a>fred &amp; wilma &amp; co</a></root>").unwrap();
        assert_eq!(value["a"]["@value"], json!("fred & wilma & co"));
    }

    #[test]
    fn test_xml_to_value_undeclared_entity_is_decode_error() {
        let err = xml_to_value("<root><a>&bogus;</a></root>").unwrap_err();
        assert!(matches!(err, RestError::Decode { format: "xml", .. }));
    }

    #[test]
    fn test_xml_to_value_entity_in_attribute() {
        let value = xml_to_value(r#"<root name="a&amp;b"><c>x</c></root>"#).unwrap();
        assert_eq!(value["@attributes"], json!({"name": "a&b"}));
    }

    #[test]
    fn test_xml_to_value_malformed_is_decode_error() {
        let err = xml_to_value("<root><a></root>").unwrap_err();
        assert!(matches!(err, RestError::Decode { format: "xml", .. }));
    }

    #[test]
    fn test_xml_to_value_empty_document_is_decode_error() {
        assert!(xml_to_value("").is_err());
    }

    #[test]
    fn test_round_trip_with_collapse_rule() {
        let original = json!({"name": "fred", "tags": ["a", "b"]});
        let value = xml_to_value(&value_to_xml(&original)).unwrap();
        // Scalar leaves come back under @value; the two-item list survives as
        // repeated item tags, and single-occurrence tags are not lists.
        assert_eq!(
            value,
            json!({
                "name": {"@value": "fred"},
                "tags": {
                    "item0": {"@value": "a"},
                    "item1": {"@value": "b"},
                },
            })
        );
    }
}
