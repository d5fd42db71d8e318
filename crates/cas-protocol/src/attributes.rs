//! User attribute extraction.
//!
//! CAS servers release attributes in three mutually incompatible shapes
//! depending on server generation and configuration: a nested
//! `<attributes>` container, flat sibling elements next to `<user>`, or
//! `<attribute name=".." value=".."/>` pairs (the RubyCAS style). The
//! strategies are tried strictly in that order and the first one to yield
//! anything wins; shapes are never mixed within one response.

use serde::{Deserialize, Serialize};

use crate::xml::XmlNode;

/// Children of `authenticationSuccess` that are protocol structure rather
/// than released attributes.
const RESERVED_CHILDREN: [&str; 3] = ["user", "proxies", "proxyGrantingTicket"];

/// Element name used by the name/value release shape.
const ATTRIBUTE_ELEMENT: &str = "attribute";

/// One released attribute value.
///
/// An attribute starts out [`Single`](AttributeValue::Single) and is
/// promoted to [`Multi`](AttributeValue::Multi) the moment a second value
/// arrives under the same name. Arrival order is preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Exactly one value was released under this name.
    Single(String),
    /// Two or more values were released under this name.
    Multi(Vec<String>),
}

impl AttributeValue {
    /// The value, when exactly one was released.
    pub fn as_single(&self) -> Option<&str> {
        match self {
            Self::Single(value) => Some(value.as_str()),
            Self::Multi(_) => None,
        }
    }

    /// All values in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        match self {
            Self::Single(value) => std::slice::from_ref(value).iter(),
            Self::Multi(values) => values.iter(),
        }
        .map(String::as_str)
    }

    fn push(&mut self, value: String) {
        match self {
            Self::Single(first) => {
                let first = std::mem::take(first);
                *self = Self::Multi(vec![first, value]);
            }
            Self::Multi(values) => values.push(value),
        }
    }
}

/// Released attributes keyed by name, in first-seen order.
///
/// Lookups are linear; attribute sets are small (typically well under a
/// dozen entries) and iteration order matters more than lookup speed here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeMap {
    entries: Vec<(String, AttributeValue)>,
}

impl AttributeMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value under `name`, trimming it first.
    ///
    /// A repeated name promotes the existing entry to a multi-value,
    /// keeping earlier values ahead of later ones.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into().trim().to_owned();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => existing.push(value),
            None => self.entries.push((name, AttributeValue::Single(value))),
        }
    }

    /// Looks up an attribute by name.
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Number of distinct attribute names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no attribute was released.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> + '_ {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }
}

/// Extracts released attributes from an `authenticationSuccess` element.
///
/// Tries the nested-container shape, then flat siblings, then name/value
/// pairs; returns an empty map when none of the three matches.
pub fn extract_attributes(success: &XmlNode) -> AttributeMap {
    let mut map = AttributeMap::new();

    // Shape 1: a nested <attributes> container anywhere under the success
    // element, one child element per attribute.
    if let Some(container) = success.descendant("attributes") {
        for child in container.children() {
            map.add(child.local_name(), child.text());
        }
        if !map.is_empty() {
            return map;
        }
    }

    // Shape 2: attributes as flat siblings of <user>. Structural children
    // and empty elements do not count.
    for child in success.children() {
        if RESERVED_CHILDREN.contains(&child.local_name()) {
            continue;
        }
        if child.text().is_empty() {
            continue;
        }
        map.add(child.local_name(), child.text());
    }
    if !map.is_empty() {
        return map;
    }

    // Shape 3: <attribute name=".." value=".."/> elements. Only taken when
    // the first such element is childless and fully qualified, so documents
    // that merely contain an element named "attribute" with content are not
    // misread.
    let candidates = success.descendants(ATTRIBUTE_ELEMENT);
    if let Some(first) = candidates.first() {
        let qualified = first.children().is_empty()
            && first.text().is_empty()
            && first.attribute("name").is_some()
            && first.attribute("value").is_some();
        if qualified {
            for node in &candidates {
                if let (Some(name), Some(value)) = (node.attribute("name"), node.attribute("value"))
                {
                    map.add(name, value);
                }
            }
        }
    }

    map
}
