use folio_parser::{parse, render, Element, ParseError, RootKind};

fn parse_ok(source: &str, kind: RootKind) -> Element {
    let result = parse(source, kind);
    if let Err(e) = &result {
        eprintln!("Parse error: {:?}", e);
    }
    result.unwrap()
}

#[test]
fn test_chatty_preamble_and_fences() {
    let source = r#"Of course! Here's the outline you asked for.

```xml
<?xml version="1.0" encoding="UTF-8"?>
<!-- generated outline -->
<book>
  <title>Night Ferry</title>
  <chapters>
    <chapter id="1"><title>Boarding</title></chapter>
  </chapters>
</book>
```

Let me know if you want changes."#;

    let root = parse_ok(source, RootKind::Book);
    assert_eq!(root.name, "book");
    assert_eq!(root.child(&["title"]).unwrap().text_content(), "Night Ferry");
    let chapter = root.child(&["chapters"]).unwrap().child(&["chapter"]).unwrap();
    assert_eq!(chapter.attr("id"), Some("1"));
}

#[test]
fn test_root_alias_and_case() {
    let root = parse_ok("<Novel><Title>Tides</Title></Novel>", RootKind::Book);
    assert!(RootKind::Book.matches(&root.name));
    assert_eq!(root.child(&["title"]).unwrap().text_content(), "Tides");
}

#[test]
fn test_attribute_broken_across_lines() {
    let root = parse_ok("<patch><chapter id=\"ch\n   4\"><summary>x</summary></chapter></patch>", RootKind::Patch);
    let chapter = root.child(&["chapter"]).unwrap();
    assert_eq!(chapter.attr("id"), Some("ch4"));
}

#[test]
fn test_entities_decoded_and_reencoded() {
    let root = parse_ok(
        "<patch><synopsis>Salt &amp; smoke &#8212; &quot;always&quot;</synopsis></patch>",
        RootKind::Patch,
    );
    let synopsis = root.child(&["synopsis"]).unwrap();
    assert_eq!(synopsis.text_content(), "Salt & smoke \u{2014} \"always\"");

    let rendered = render(&root);
    assert!(rendered.contains("Salt &amp; smoke"));
    assert_eq!(parse_ok(&rendered, RootKind::Patch), root);
}

#[test]
fn test_reply_cut_off_mid_chapter() {
    let source = r#"<patch>
  <chapter id="12">
    <content>
      <paragraph>The bell rang twice.</paragraph>
      <paragraph>Nobody answered the do"#;

    let root = parse_ok(source, RootKind::Patch);
    let content = root
        .child(&["chapter"])
        .and_then(|chapter| chapter.child(&["content"]))
        .unwrap();
    let paragraphs: Vec<String> = content.elements().map(Element::text_content).collect();
    assert_eq!(paragraphs, vec!["The bell rang twice.", "Nobody answered the do"]);
}

#[test]
fn test_refusal_has_no_root() {
    let err = parse("I'm unable to continue this story.", RootKind::Patch).unwrap_err();
    assert!(matches!(err, ParseError::MissingRoot { .. }));
}

#[test]
fn test_crossed_tags_are_not_repaired() {
    let err = parse(
        "<patch><chapter id=\"1\"><summary>x</chapter></summary></patch>",
        RootKind::Patch,
    )
    .unwrap_err();
    assert!(matches!(err, ParseError::MismatchedClose { .. }));
}

#[test]
fn test_trailing_text_after_root_is_dropped() {
    let root = parse_ok(
        "<patch><title>A</title></patch>\n\nI also fixed the typo in chapter 3. <3",
        RootKind::Patch,
    );
    assert_eq!(root.elements().count(), 1);
}
