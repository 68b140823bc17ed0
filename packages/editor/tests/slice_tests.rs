//! Context slicer tests over a five-chapter book

use folio_editor::{
    parse_document, slice, Document, EditorError, SliceBody, SliceBudgets, SliceMode, ELLIPSIS,
};

fn book() -> Document {
    let chapters: String = (1..=5)
        .map(|n| {
            format!(
                r#"<chapter id="ch{n}" number="{n}">
                     <title>Chapter {n}</title><summary>Summary {n}</summary>
                     <content>
                       <paragraph>Opening of {n}.</paragraph>
                       <paragraph>Middle of {n}.</paragraph>
                       <paragraph>Closing of {n}.</paragraph>
                     </content>
                   </chapter>"#
            )
        })
        .collect();
    let long_description = "A cartographer who maps rivers that move. ".repeat(20);
    parse_document(&format!(
        r#"<book>
             <title>Drift</title>
             <synopsis>Maps that will not hold still.</synopsis>
             <characters>
               <character id="c1"><name>Tomas</name><description>{long_description}</description></character>
             </characters>
             <chapters>{chapters}</chapters>
           </book>"#
    ))
    .unwrap()
}

fn ids(view: &folio_editor::ContextSlice) -> Vec<&str> {
    view.sections.iter().map(|s| s.id.as_str()).collect()
}

#[test]
fn test_local_window_is_one_each_side() {
    let doc = book();
    let view = slice(&doc, "ch3", SliceMode::Local, &SliceBudgets::default()).unwrap();

    assert_eq!(ids(&view), vec!["ch2", "ch3", "ch4"]);
    assert!(view.narrative_flow.is_none());
    assert!(view
        .sections
        .iter()
        .all(|s| matches!(&s.body, SliceBody::Full { content } if content.len() == 3)));
    assert_eq!(view.target_section().unwrap().id, "ch3");
}

#[test]
fn test_local_window_clipped_at_edges() {
    let doc = book();
    let budgets = SliceBudgets::default();

    let first = slice(&doc, "ch1", SliceMode::Local, &budgets).unwrap();
    assert_eq!(ids(&first), vec!["ch1", "ch2"]);

    let last = slice(&doc, "ch5", SliceMode::Local, &budgets).unwrap();
    assert_eq!(ids(&last), vec!["ch4", "ch5"]);
}

#[test]
fn test_local_clips_character_descriptions() {
    let doc = book();
    let budgets = SliceBudgets {
        character_chars: 40,
        ..SliceBudgets::default()
    };
    let view = slice(&doc, "ch2", SliceMode::Local, &budgets).unwrap();

    let description = &view.characters[0].description;
    assert!(description.ends_with(ELLIPSIS));
    assert!(description.chars().count() <= 40 + ELLIPSIS.len());
    // The source is untouched
    assert!(doc.characters().unwrap()[0].description.len() > 400);
}

#[test]
fn test_continuity_digests_neighbours() {
    let doc = book();
    let budgets = SliceBudgets {
        paragraph_chars: 8,
        ..SliceBudgets::default()
    };
    let view = slice(&doc, "ch3", SliceMode::Continuity, &budgets).unwrap();

    assert_eq!(ids(&view), vec!["ch1", "ch2", "ch3", "ch4", "ch5"]);
    assert!(view.characters[0].description.len() > 400);

    for section in &view.sections {
        match &section.body {
            SliceBody::Full { content } => {
                assert!(section.is_target);
                assert_eq!(content.len(), 3);
            }
            SliceBody::Digest { first, last } => {
                assert!(!section.is_target);
                assert_eq!(first.as_deref(), Some("Opening..."));
                assert_eq!(last.as_deref(), Some("Closing..."));
                assert!(section.summary.starts_with("Summary"));
            }
        }
    }
}

#[test]
fn test_flow_note_at_boundaries() {
    let doc = book();
    let budgets = SliceBudgets::default();

    let first = slice(&doc, "ch1", SliceMode::Continuity, &budgets).unwrap();
    let note = first.narrative_flow.clone().unwrap();
    assert_eq!(ids(&first), vec!["ch1", "ch2", "ch3"]);
    assert!(note.starts_with("Section 1 of 5"));
    assert!(!note.contains("follows"));
    assert!(note.contains("precedes \"Chapter 2\""));

    let last = slice(&doc, "ch5", SliceMode::Continuity, &budgets).unwrap();
    let note = last.narrative_flow.clone().unwrap();
    assert_eq!(ids(&last), vec!["ch3", "ch4", "ch5"]);
    assert!(note.contains("follows \"Chapter 4\""));
    assert!(!note.contains("precedes"));
}

#[test]
fn test_unknown_target_is_error() {
    let err = slice(&book(), "ch9", SliceMode::Local, &SliceBudgets::default()).unwrap_err();
    assert_eq!(err, EditorError::SectionNotFound("ch9".to_string()));
}

#[test]
fn test_rendered_view_reparses_as_book() {
    let doc = book();
    let view = slice(&doc, "ch2", SliceMode::Continuity, &SliceBudgets::default()).unwrap();
    let rendered = view.render();

    assert!(rendered.starts_with("<book>"));
    assert!(rendered.contains("<narrative-flow>"));
    assert!(rendered.contains("target=\"true\""));

    let tree = folio_parser::parse(&rendered, folio_parser::RootKind::Book).unwrap();
    assert!(tree.child(&["narrative-flow"]).is_some());
}

#[test]
fn test_view_serializes_to_json() {
    let view = slice(&book(), "ch1", SliceMode::Local, &SliceBudgets::default()).unwrap();
    let json = serde_json::to_value(&view).unwrap();

    assert_eq!(json["mode"], "local");
    assert_eq!(json["sections"][0]["isTarget"], true);
    assert_eq!(json["sections"][0]["body"]["kind"], "full");
    assert!(json.get("narrativeFlow").is_none());
}
