use crate::ast::{Element, Node};

/// Serializer renders a tree back to markup
///
/// Output is deterministic: attributes keep their stored order, elements
/// holding only text render on one line, everything else is indented.
pub struct Serializer {
    indent_level: usize,
    indent_string: String,
}

impl Serializer {
    pub fn new() -> Self {
        Self {
            indent_level: 0,
            indent_string: "  ".to_string(), // 2 spaces
        }
    }

    pub fn with_indent(indent: &str) -> Self {
        Self {
            indent_level: 0,
            indent_string: indent.to_string(),
        }
    }

    /// Serialize an element tree to markup
    pub fn serialize(&mut self, root: &Element) -> String {
        let mut output = String::new();
        self.serialize_element(root, &mut output);
        output.push('\n');
        output
    }

    fn serialize_element(&mut self, element: &Element, output: &mut String) {
        self.write_indent(output);
        output.push('<');
        output.push_str(&element.name);
        for (key, value) in &element.attributes {
            output.push(' ');
            output.push_str(key);
            output.push_str("=\"");
            output.push_str(&escape_attribute(value));
            output.push('"');
        }

        if element.children.is_empty() {
            output.push_str("/>");
            return;
        }
        output.push('>');

        if element.is_leaf() {
            for child in &element.children {
                if let Node::Text { value } = child {
                    output.push_str(&escape_text(value));
                }
            }
        } else {
            self.indent_level += 1;
            for child in &element.children {
                output.push('\n');
                match child {
                    Node::Element(child) => self.serialize_element(child, output),
                    Node::Text { value } => {
                        self.write_indent(output);
                        output.push_str(&escape_text(value.trim()));
                    }
                }
            }
            self.indent_level -= 1;
            output.push('\n');
            self.write_indent(output);
        }

        output.push_str("</");
        output.push_str(&element.name);
        output.push('>');
    }

    fn write_indent(&self, output: &mut String) {
        for _ in 0..self.indent_level {
            output.push_str(&self.indent_string);
        }
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to render a tree with default settings
pub fn render(root: &Element) -> String {
    Serializer::new().serialize(root)
}

pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn escape_attribute(text: &str) -> String {
    escape_text(text).replace('"', "&quot;")
}
