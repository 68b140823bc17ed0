/// Truncation and recovery behaviour of the full parse path
use crate::*;

const BOOK: &str = r#"<book>
  <title>The Lantern Road</title>
  <chapters>
    <chapter id="1" number="1">
      <title>Departure</title>
      <content>
        <paragraph number="1">Mara shut the gate.</paragraph>
        <paragraph number="2">The road was already dark.</paragraph>
      </content>
    </chapter>
  </chapters>
</book>
"#;

/// Remove the last `n` closing tags (and the whitespace around them)
fn drop_closing_tags(text: &str, n: usize) -> String {
    let mut out = text.trim_end().to_string();
    for _ in 0..n {
        let start = out.rfind("</").expect("closing tag present");
        out.truncate(start);
        out = out.trim_end().to_string();
    }
    out
}

#[test]
fn test_single_level_truncation_restores_tree() {
    let original = parse(BOOK, RootKind::Book).unwrap();
    let truncated = drop_closing_tags(BOOK, 1);

    let repaired = parse(&truncated, RootKind::Book).unwrap();
    assert_eq!(repaired, original);
    assert_eq!(render(&repaired), render(&original));
}

#[test]
fn test_deeper_truncation_never_panics() {
    let original = parse(BOOK, RootKind::Book).unwrap();

    for depth in 1..=5 {
        let truncated = drop_closing_tags(BOOK, depth);
        // Closing only ever happens at the tail here, so every depth recovers
        let repaired = parse(&truncated, RootKind::Book)
            .unwrap_or_else(|e| panic!("depth {depth} failed: {e}"));
        assert_eq!(repaired, original, "depth {depth}");
    }
}

#[test]
fn test_dangling_patch_closes_inner_first() {
    let repaired = repair(r#"<patch><chapter id="7">"#).unwrap();
    assert!(repaired.ends_with("</chapter></patch>"));

    let root = parse(r#"<patch><chapter id="7">"#, RootKind::Patch).unwrap();
    assert_eq!(root.name, "patch");
    assert_eq!(root.elements().count(), 1);
}

#[test]
fn test_cut_mid_paragraph_keeps_partial_text() {
    let cut = "<patch><chapter id=\"3\"><content><paragraph>The rain fel";
    let root = parse(cut, RootKind::Patch).unwrap();
    let paragraph = root
        .child(&["chapter"])
        .and_then(|c| c.child(&["content"]))
        .and_then(|c| c.child(&["paragraph"]))
        .unwrap();
    assert_eq!(paragraph.text_content(), "The rain fel");
}

#[test]
fn test_cut_inside_tag_drops_partial_tag() {
    let cut = "<patch><title>Ash</title><chapter id=\"4";
    let root = parse(cut, RootKind::Patch).unwrap();
    assert_eq!(root.elements().count(), 1);
}

#[test]
fn test_repair_does_not_fix_mismatches() {
    let err = parse("<patch><title>x</summary></patch>", RootKind::Patch).unwrap_err();
    assert!(matches!(err, ParseError::MismatchedClose { .. }));
}

#[test]
fn test_garbage_does_not_panic() {
    for input in ["<patch><<<>", "<patch></", "<patch>&&&;", "<patch><a b='", "<patch>\u{0}"] {
        let _ = parse(input, RootKind::Patch);
    }
}
