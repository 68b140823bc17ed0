use serde::{Deserialize, Serialize};
use std::fmt;

/// The two root kinds the generator is asked to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RootKind {
    /// A full document snapshot (outline or working copy)
    Book,
    /// A partial replace-whole-subtree update
    Patch,
}

impl RootKind {
    /// Tag names accepted for this root, canonical name first
    pub fn tag_names(self) -> &'static [&'static str] {
        match self {
            RootKind::Book => &["book", "novel", "story"],
            RootKind::Patch => &["patch"],
        }
    }

    /// Canonical tag used when rendering
    pub fn tag(self) -> &'static str {
        self.tag_names()[0]
    }

    pub fn matches(self, name: &str) -> bool {
        self.tag_names().iter().any(|candidate| same_tag(candidate, name))
    }
}

impl fmt::Display for RootKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Fold a tag name so `storyElements`, `story-elements` and `STORY_ELEMENTS`
/// compare equal.
pub fn canonical_tag(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(|c| c.to_lowercase())
        .collect()
}

pub fn same_tag(a: &str, b: &str) -> bool {
    canonical_tag(a) == canonical_tag(b)
}

/// Markup tree node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    Element(Element),
    Text { value: String },
}

impl Node {
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text {
            value: value.into(),
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text { .. } => None,
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

/// Element node with ordered attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder: set an attribute
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Builder: append a child element
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Builder: append a text child
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::text(text));
        self
    }

    pub fn is(&self, name: &str) -> bool {
        same_tag(&self.name, name)
    }

    /// Whether the tag matches any of the given names
    pub fn is_any(&self, names: &[&str]) -> bool {
        names.iter().any(|name| self.is(name))
    }

    /// Attribute lookup, tolerant to case and separators
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| same_tag(key, name))
            .map(|(_, value)| value.as_str())
    }

    /// Child elements in document order
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// First child element matching any of `names`
    pub fn child(&self, names: &[&str]) -> Option<&Element> {
        self.elements().find(|element| element.is_any(names))
    }

    /// All child elements matching any of `names`
    pub fn children_named<'a>(
        &'a self,
        names: &'a [&'a str],
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements().filter(move |element| element.is_any(names))
    }

    /// Concatenated text of this element and its descendants, trimmed
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out.trim().to_string()
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text { value } => out.push_str(value),
                Node::Element(element) => element.collect_text(out),
            }
        }
    }

    /// True when every child is text (or there are no children)
    pub fn is_leaf(&self) -> bool {
        self.children
            .iter()
            .all(|child| matches!(child, Node::Text { .. }))
    }
}
