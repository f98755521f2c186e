//! Minimal typed XML tree for capability documents.
//!
//! Capability documents are small, so the whole document is parsed into an
//! owned tree of [`XmlNode`]s and then queried with pure lookup functions.

use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use wms_common::{WmsError, WmsResult};

/// Namespace URI of XLink attributes (`xlink:href`).
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// Deepest element nesting [`parse_document`] accepts.
pub const MAX_DEPTH: usize = 256;

/// An attribute with its namespace resolved against the declarations in scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub prefix: Option<String>,
    pub name: String,
    /// `None` for unprefixed attributes and for undeclared prefixes.
    pub namespace: Option<String>,
    pub value: String,
}

/// One element of a parsed XML document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    /// Local tag name, without any namespace prefix.
    pub name: String,
    pub attributes: Vec<XmlAttribute>,
    pub children: Vec<XmlNode>,
    /// Concatenated, trimmed character data directly inside this element.
    pub text: String,
}

impl XmlNode {
    /// Unprefixed attribute by exact name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.prefix.is_none() && a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Attribute by local name and namespace URI.
    ///
    /// Documents that use an `xlink:` prefix without declaring it still match
    /// when `namespace` is [`XLINK_NS`].
    pub fn attribute_ns(&self, name: &str, namespace: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| {
                a.name == name
                    && match (&a.namespace, &a.prefix) {
                        (Some(ns), _) => ns == namespace,
                        (None, Some(prefix)) => namespace == XLINK_NS && prefix == "xlink",
                        (None, None) => false,
                    }
            })
            .map(|a| a.value.as_str())
    }
}

/// First child of `node` whose tag name matches `name`, ignoring ASCII case.
pub fn find_child<'a>(node: &'a XmlNode, name: &str) -> Option<&'a XmlNode> {
    node.children
        .iter()
        .find(|child| child.name.eq_ignore_ascii_case(name))
}

/// Follow `path` from `node`, taking the first case-insensitive match at each
/// level.
pub fn find_path<'a>(node: &'a XmlNode, path: &[&str]) -> Option<&'a XmlNode> {
    path.iter()
        .try_fold(node, |current, segment| find_child(current, segment))
}

/// Parse a complete XML document and return its root element.
pub fn parse_document(xml: &str) -> WmsResult<XmlNode> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut stack: Vec<XmlNode> = Vec::new();
    let mut scopes: Vec<HashMap<String, String>> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if stack.len() >= MAX_DEPTH {
                    return Err(WmsError::Parse(format!(
                        "XML nesting deeper than {} elements at position {}",
                        MAX_DEPTH,
                        reader.buffer_position()
                    )));
                }
                let node = open_element(&e, &mut scopes)?;
                stack.push(node);
            }
            Ok(Event::Empty(e)) => {
                let node = open_element(&e, &mut scopes)?;
                scopes.pop();
                attach(node, &mut stack, &mut root);
            }
            Ok(Event::End(_)) => {
                scopes.pop();
                if let Some(node) = stack.pop() {
                    attach(node, &mut stack, &mut root);
                }
            }
            Ok(Event::Text(t)) => {
                let text = t.unescape().map_err(|e| xml_error(&reader, e))?;
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(text.trim());
                }
            }
            Ok(Event::CData(c)) => {
                if let Some(node) = stack.last_mut() {
                    node.text
                        .push_str(String::from_utf8_lossy(&c.into_inner()).trim());
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(&reader, e)),
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(WmsError::Parse(format!(
            "XML document ended inside <{}>",
            open.name
        )));
    }

    root.ok_or_else(|| WmsError::Parse("XML document has no root element".to_string()))
}

fn open_element(
    e: &BytesStart<'_>,
    scopes: &mut Vec<HashMap<String, String>>,
) -> WmsResult<XmlNode> {
    let mut declared = HashMap::new();
    let mut raw = Vec::new();

    for attr in e.attributes() {
        let attr = attr.map_err(|err| WmsError::Parse(format!("Invalid XML attribute: {}", err)))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| WmsError::Parse(format!("Invalid value for attribute '{}': {}", key, err)))?
            .into_owned();

        if key == "xmlns" {
            continue;
        }
        if let Some(prefix) = key.strip_prefix("xmlns:") {
            declared.insert(prefix.to_string(), value);
            continue;
        }
        raw.push((key, value));
    }
    scopes.push(declared);

    let attributes = raw
        .into_iter()
        .map(|(key, value)| match key.split_once(':') {
            Some((prefix, name)) => XmlAttribute {
                namespace: lookup_namespace(scopes, prefix),
                prefix: Some(prefix.to_string()),
                name: name.to_string(),
                value,
            },
            None => XmlAttribute {
                prefix: None,
                name: key,
                namespace: None,
                value,
            },
        })
        .collect();

    Ok(XmlNode {
        name: String::from_utf8_lossy(e.name().local_name().as_ref()).into_owned(),
        attributes,
        children: Vec::new(),
        text: String::new(),
    })
}

fn lookup_namespace(scopes: &[HashMap<String, String>], prefix: &str) -> Option<String> {
    scopes
        .iter()
        .rev()
        .find_map(|scope| scope.get(prefix))
        .cloned()
}

fn attach(node: XmlNode, stack: &mut [XmlNode], root: &mut Option<XmlNode>) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => {
            if root.is_none() {
                *root = Some(node);
            }
        }
    }
}

fn xml_error(reader: &Reader<&[u8]>, err: quick_xml::Error) -> WmsError {
    WmsError::Parse(format!(
        "XML parsing error at position {}: {}",
        reader.buffer_position(),
        err
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<?xml version="1.0"?>
<Root version="1.3.0" xmlns:xlink="http://www.w3.org/1999/xlink">
    <Service><Name>WMS</Name></Service>
    <service><Name>second</Name></service>
    <Link xlink:href="http://example/a" href="plain"/>
    <Escaped>a &amp; b</Escaped>
    <Data><![CDATA[raw <text>]]></Data>
</Root>"#;

    #[test]
    fn test_parse_tree() {
        let root = parse_document(DOC).unwrap();
        assert_eq!(root.name, "Root");
        assert_eq!(root.attribute("version"), Some("1.3.0"));
        assert_eq!(root.children.len(), 5);
        assert_eq!(find_child(&root, "Escaped").unwrap().text, "a & b");
        assert_eq!(find_child(&root, "Data").unwrap().text, "raw <text>");
    }

    #[test]
    fn test_find_child_is_case_insensitive_first_match() {
        let root = parse_document(DOC).unwrap();
        let service = find_child(&root, "SERVICE").unwrap();
        assert_eq!(find_child(service, "name").unwrap().text, "WMS");
        assert!(find_child(&root, "Missing").is_none());
    }

    #[test]
    fn test_find_path() {
        let root = parse_document(DOC).unwrap();
        assert_eq!(find_path(&root, &["service", "NAME"]).unwrap().text, "WMS");
        assert!(find_path(&root, &["Service", "Title"]).is_none());
        assert_eq!(find_path(&root, &[]).unwrap().name, "Root");
    }

    #[test]
    fn test_namespaced_attribute() {
        let root = parse_document(DOC).unwrap();
        let link = find_child(&root, "link").unwrap();
        assert_eq!(link.attribute_ns("href", XLINK_NS), Some("http://example/a"));
        assert_eq!(link.attribute("href"), Some("plain"));
    }

    #[test]
    fn test_undeclared_xlink_prefix_still_matches() {
        let root = parse_document(r#"<a><b xlink:href="x"/></a>"#).unwrap();
        let b = find_child(&root, "b").unwrap();
        assert_eq!(b.attribute_ns("href", XLINK_NS), Some("x"));
    }

    #[test]
    fn test_prefixed_element_uses_local_name() {
        let root = parse_document(r#"<wms:Root xmlns:wms="urn:x"><wms:Service/></wms:Root>"#)
            .unwrap();
        assert_eq!(root.name, "Root");
        assert!(find_child(&root, "service").is_some());
    }

    #[test]
    fn test_malformed_documents() {
        assert!(matches!(parse_document("<a><b></a>"), Err(WmsError::Parse(_))));
        assert!(matches!(parse_document("<a><b>"), Err(WmsError::Parse(_))));
        assert!(matches!(parse_document(""), Err(WmsError::Parse(_))));
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |depth: usize| format!("{}{}", "<a>".repeat(depth), "</a>".repeat(depth));

        let root = parse_document(&nested(MAX_DEPTH)).unwrap();
        assert_eq!(find_path(&root, &["a", "a"]).unwrap().name, "a");

        let err = parse_document(&nested(200_000)).unwrap_err();
        assert!(matches!(err, WmsError::Parse(ref msg) if msg.contains("nesting")));
    }
}
