//! Minimal owned XML tree.
//!
//! The `serviceResponse` classifier and the attribute extraction strategies
//! both need to inspect complete child lists (a strategy only applies when
//! the previous one yielded nothing), so the quick-xml event stream is
//! materialized into a small element tree before any protocol logic runs.
//!
//! Namespace prefixes are stripped: CAS servers emit `cas:`, `saml1:` or no
//! prefix at all depending on version, and the protocol only ever matches on
//! local names.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

/// Errors raised while building the element tree.
#[derive(Debug, Error)]
pub enum XmlParseError {
    /// quick-xml rejected the byte stream.
    #[error("malformed XML: {0}")]
    Syntax(#[from] quick_xml::Error),

    /// An element carried an unparsable attribute list.
    #[error("malformed attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// The document ended without a complete root element.
    #[error("document has no root element")]
    NoRoot,

    /// A closing tag appeared with no element open.
    #[error("unexpected closing tag")]
    UnexpectedClose,

    /// Text or a second element appeared outside the root element.
    #[error("content outside the document root")]
    ContentOutsideRoot,
}

/// A parsed XML element.
///
/// Element and attribute names are stored without their namespace prefix.
/// Text content accumulates across mixed content and CDATA sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlNode {
    local_name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<XmlNode>,
}

impl XmlNode {
    /// Element name with any namespace prefix stripped.
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Value of the named attribute, if present.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Trimmed text content of this element (direct text only, not
    /// descendants').
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    /// Direct child elements in document order.
    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    /// First direct child with the given local name.
    pub fn child(&self, local_name: &str) -> Option<&XmlNode> {
        self.children
            .iter()
            .find(|child| child.local_name == local_name)
    }

    /// First descendant with the given local name, depth-first. The element
    /// itself is not considered.
    pub fn descendant(&self, local_name: &str) -> Option<&XmlNode> {
        for child in &self.children {
            if child.local_name == local_name {
                return Some(child);
            }
            if let Some(found) = child.descendant(local_name) {
                return Some(found);
            }
        }
        None
    }

    /// All descendants with the given local name, in document order.
    pub fn descendants(&self, local_name: &str) -> Vec<&XmlNode> {
        let mut found = Vec::new();
        self.collect_descendants(local_name, &mut found);
        found
    }

    fn collect_descendants<'a>(&'a self, local_name: &str, found: &mut Vec<&'a XmlNode>) {
        for child in &self.children {
            if child.local_name == local_name {
                found.push(child);
            }
            child.collect_descendants(local_name, found);
        }
    }
}

/// Parses an XML document into its root element.
///
/// Whitespace-only text is dropped and remaining text is trimmed at the
/// accessor. Prologs, comments and processing instructions are skipped. The
/// document must contain exactly one root element.
pub fn parse_document(raw: &str) -> Result<XmlNode, XmlParseError> {
    let mut reader = Reader::from_str(raw);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if stack.is_empty() && root.is_some() {
                    return Err(XmlParseError::ContentOutsideRoot);
                }
                stack.push(element_from(&e)?);
            }
            Event::Empty(e) => {
                let node = element_from(&e)?;
                attach(&mut stack, &mut root, node)?;
            }
            Event::End(_) => match stack.pop() {
                Some(node) => attach(&mut stack, &mut root, node)?,
                None => return Err(XmlParseError::UnexpectedClose),
            },
            Event::Text(e) => {
                let text = e.unescape()?;
                match stack.last_mut() {
                    Some(open) => open.text.push_str(&text),
                    None if text.trim().is_empty() => {}
                    None => return Err(XmlParseError::ContentOutsideRoot),
                }
            }
            Event::CData(e) => {
                if let Some(open) = stack.last_mut() {
                    open.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
            Event::Eof => break,
        }
    }

    root.ok_or(XmlParseError::NoRoot)
}

fn element_from(start: &BytesStart<'_>) -> Result<XmlNode, XmlParseError> {
    let local_name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attributes.push((key, value));
    }

    Ok(XmlNode {
        local_name,
        attributes,
        text: String::new(),
        children: Vec::new(),
    })
}

fn attach(
    stack: &mut Vec<XmlNode>,
    root: &mut Option<XmlNode>,
    node: XmlNode,
) -> Result<(), XmlParseError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    } else if root.is_some() {
        return Err(XmlParseError::ContentOutsideRoot);
    } else {
        *root = Some(node);
    }
    Ok(())
}
