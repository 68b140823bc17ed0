//! Repair pass for truncated generator output
//!
//! Generators stop mid-document when they hit their output limit. The repair
//! pass walks the token stream with a stack of open elements and, at the end
//! of input, appends closing tags for whatever is still open, innermost
//! first. It does not try to fix anything else.

use crate::ast::same_tag;
use crate::lexer::{tokenize, Lexeme};

/// Return `source` with synthesized closing tags, or `None` when nothing is
/// left open (in which case there is nothing this pass can do).
pub fn repair(source: &str) -> Option<String> {
    let open = unclosed_elements(source);
    if open.is_empty() {
        return None;
    }

    let mut repaired = source.trim_end().to_string();
    for name in open.iter().rev() {
        repaired.push_str("</");
        repaired.push_str(name);
        repaired.push('>');
    }
    Some(repaired)
}

/// Names of elements still open at end of input, outermost first.
///
/// A closing tag pops back to the nearest matching open element; a closing
/// tag that matches nothing on the stack is ignored.
pub fn unclosed_elements(source: &str) -> Vec<&str> {
    let mut stack: Vec<&str> = Vec::new();

    for token in tokenize(source) {
        match token.lexeme {
            Lexeme::Open {
                name,
                self_closing: false,
                ..
            } => stack.push(name),
            Lexeme::Close { name } => {
                if let Some(pos) = stack.iter().rposition(|open| same_tag(open, name)) {
                    stack.truncate(pos);
                }
            }
            _ => {}
        }
    }

    stack
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dangling_chapter_and_patch() {
        let repaired = repair(r#"<patch><chapter id="7">"#).unwrap();
        assert_eq!(repaired, r#"<patch><chapter id="7"></chapter></patch>"#);
    }

    #[test]
    fn test_balanced_input_needs_no_repair() {
        assert_eq!(repair("<patch><title>x</title></patch>"), None);
    }

    #[test]
    fn test_self_closing_not_counted() {
        assert_eq!(unclosed_elements("<book><summary/>"), vec!["book"]);
    }

    #[test]
    fn test_close_pops_to_matching_ancestor() {
        let open = unclosed_elements("<book><chapters><chapter><title>t</chapter>");
        assert_eq!(open, vec!["book", "chapters"]);
    }

    #[test]
    fn test_trailing_whitespace_trimmed_before_closing() {
        let repaired = repair("<patch>\n  <title>Dusk</title>\n  ").unwrap();
        assert_eq!(repaired, "<patch>\n  <title>Dusk</title></patch>");
    }
}
