//! Pre-parse cleanup of generator output
//!
//! Generator responses wrap the markup in chatter and code fences, get cut
//! off mid-tag, and occasionally wrap an attribute value across a line. This
//! module narrows the text to the expected root element before the tree
//! builder sees it.

use crate::ast::RootKind;
use crate::error::{ParseError, ParseResult};
use regex::Regex;
use std::sync::OnceLock;

/// Narrow raw generator output to the span of the expected root element.
///
/// 1. drop code-fence lines
/// 2. keep the first `<root ...>` through the last `</root>`; without a
///    closing tag keep to the end, minus any trailing partial tag
/// 3. rejoin attribute values broken by a stray line break
pub fn sanitize(text: &str, expected: RootKind) -> ParseResult<String> {
    if text.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let unfenced = strip_code_fences(text);
    let start = find_root_open(&unfenced, expected).ok_or(ParseError::MissingRoot { expected })?;

    let body = match find_last_root_close(&unfenced, expected) {
        Some(end) if end > start => &unfenced[start..end],
        _ => drop_partial_tag(&unfenced[start..]),
    };

    Ok(rejoin_broken_attributes(body))
}

/// Remove lines that open or close a markdown code fence
pub fn strip_code_fences(text: &str) -> String {
    if !text.contains("```") {
        return text.to_string();
    }

    text.lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn find_root_open(text: &str, kind: RootKind) -> Option<usize> {
    root_patterns(kind).0.find(text).map(|m| m.start())
}

fn find_last_root_close(text: &str, kind: RootKind) -> Option<usize> {
    root_patterns(kind).1.find_iter(text).last().map(|m| m.end())
}

fn root_patterns(kind: RootKind) -> &'static (Regex, Regex) {
    static BOOK: OnceLock<(Regex, Regex)> = OnceLock::new();
    static PATCH: OnceLock<(Regex, Regex)> = OnceLock::new();

    let cell = match kind {
        RootKind::Book => &BOOK,
        RootKind::Patch => &PATCH,
    };

    cell.get_or_init(|| {
        let names = kind.tag_names().join("|");
        let open = Regex::new(&format!(r"(?i)<\s*(?:{})(?:[\s/>]|$)", names))
            .expect("root open pattern is valid");
        let close = Regex::new(&format!(r"(?i)</\s*(?:{})\s*>", names))
            .expect("root close pattern is valid");
        (open, close)
    })
}

/// Cut a tag that was truncated before its `>`
fn drop_partial_tag(text: &str) -> &str {
    match text.rfind('<') {
        Some(lt) if !text[lt..].contains('>') => &text[..lt],
        _ => text,
    }
}

/// `id="ch\n   4"` becomes `id="ch4"`: line breaks inside quoted attribute
/// values are removed together with the indentation around them.
pub fn rejoin_broken_attributes(text: &str) -> String {
    static TAG: OnceLock<Regex> = OnceLock::new();
    static QUOTED: OnceLock<Regex> = OnceLock::new();
    static BREAK: OnceLock<Regex> = OnceLock::new();

    let tag = TAG.get_or_init(|| Regex::new(r"<[^<>/!?][^<>]*>").expect("tag pattern is valid"));
    let quoted =
        QUOTED.get_or_init(|| Regex::new(r#""[^"]*"|'[^']*'"#).expect("quoted pattern is valid"));
    let line_break =
        BREAK.get_or_init(|| Regex::new(r"[ \t]*\r?\n\s*").expect("break pattern is valid"));

    if !text.contains('\n') {
        return text.to_string();
    }

    tag.replace_all(text, |caps: &regex::Captures| {
        quoted
            .replace_all(&caps[0], |value: &regex::Captures| {
                line_break.replace_all(&value[0], "").into_owned()
            })
            .into_owned()
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chatter_and_fences_removed() {
        let raw = "Sure! Here is the patch:\n```xml\n<patch><title>New</title></patch>\n```\nLet me know.";
        let clean = sanitize(raw, RootKind::Patch).unwrap();
        assert_eq!(clean, "<patch><title>New</title></patch>");
    }

    #[test]
    fn test_uses_last_closing_tag() {
        let raw = "<patch><title>A</title></patch> trailing </patch> junk";
        let clean = sanitize(raw, RootKind::Patch).unwrap();
        assert!(clean.ends_with("trailing </patch>"));
    }

    #[test]
    fn test_truncated_keeps_to_end_without_partial_tag() {
        let raw = "<book><title>Storm</title><chap";
        let clean = sanitize(raw, RootKind::Book).unwrap();
        assert_eq!(clean, "<book><title>Storm</title>");
    }

    #[test]
    fn test_missing_root() {
        let err = sanitize("<book></book>", RootKind::Patch).unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingRoot {
                expected: RootKind::Patch
            }
        );
        assert_eq!(sanitize("   ", RootKind::Book).unwrap_err(), ParseError::Empty);
    }

    #[test]
    fn test_root_alias_and_case() {
        let clean = sanitize("noise <NOVEL><title>x</title></Novel>", RootKind::Book).unwrap();
        assert!(clean.starts_with("<NOVEL>"));
    }

    #[test]
    fn test_broken_identifier_rejoined() {
        let raw = "<patch><chapter id=\"ch\n    4\"><content/></chapter></patch>";
        let clean = sanitize(raw, RootKind::Patch).unwrap();
        assert!(clean.contains("id=\"ch4\""));
    }

    #[test]
    fn test_text_line_breaks_untouched() {
        let text = "<p>one\ntwo</p>";
        assert_eq!(rejoin_broken_attributes(text), text);
    }

    #[test]
    fn test_prefix_of_other_tag_not_matched() {
        // <patches> must not be mistaken for <patch>
        let err = sanitize("<patches></patches>", RootKind::Patch).unwrap_err();
        assert!(matches!(err, ParseError::MissingRoot { .. }));
    }
}
