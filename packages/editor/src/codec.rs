//! Mapping between markup trees and the book model
//!
//! Reading is lenient about the shapes generators actually emit: tag
//! aliases, a missing `<chapters>` wrapper, values given as attributes
//! instead of child elements, prose without `<paragraph>` tags. Writing
//! always produces the one canonical shape.

use crate::document::{Character, ContentBlock, Document, DocumentParts, Section, StoryElements};
use crate::patch::{FieldPatch, Patch, SectionPatch};
use crate::EditorError;
use folio_parser::{parse, render, Element, RootKind};
use tracing::{debug, warn};

const SECTIONS: &[&str] = &["chapters", "sections", "scenes"];
const SECTION: &[&str] = &["chapter", "section", "scene"];
const CONTENT: &[&str] = &["content", "body", "text"];
const PARAGRAPH: &[&str] = &["paragraph", "p", "para"];
const STORY_ELEMENTS: &[&str] = &["storyElements", "elements"];
const CHARACTERS: &[&str] = &["characters", "cast"];
const CHARACTER: &[&str] = &["character"];

/// Parse generator or snapshot text into a document
pub fn parse_document(text: &str) -> Result<Document, EditorError> {
    let root = parse(text, RootKind::Book)?;
    document_from_element(&root)
}

/// Parse generator or log text into a patch
pub fn parse_patch(text: &str) -> Result<Patch, EditorError> {
    let root = parse(text, RootKind::Patch)?;
    patch_from_element(&root)
}

/// Canonical snapshot rendering
pub fn render_document(doc: &Document) -> String {
    render(&document_to_element(doc))
}

/// Canonical log-entry rendering
pub fn render_patch(patch: &Patch) -> String {
    render(&patch_to_element(patch))
}

/// CRC32 of the canonical rendering; equal documents have equal fingerprints
pub fn fingerprint(doc: &Document) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(render_document(doc).as_bytes());
    hasher.finalize()
}

fn expect_root(root: &Element, kind: RootKind) -> Result<(), EditorError> {
    if kind.matches(&root.name) {
        Ok(())
    } else {
        Err(EditorError::WrongRoot {
            expected: kind,
            found: root.name.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

pub fn document_from_element(root: &Element) -> Result<Document, EditorError> {
    expect_root(root, RootKind::Book)?;

    let mut sections = Vec::new();
    for (position, element) in section_elements(root).enumerate() {
        sections.push(section_from_element(element, position)?);
    }

    let parts = DocumentParts {
        title: field_text(root, "title"),
        synopsis: field_text(root, "synopsis"),
        story_elements: root.child(STORY_ELEMENTS).map(story_elements_from),
        characters: root.child(CHARACTERS).map(characters_from),
        sections,
    };

    debug!(sections = parts.sections.len(), "Decoded document");
    Document::from_parts(parts)
}

pub fn patch_from_element(root: &Element) -> Result<Patch, EditorError> {
    expect_root(root, RootKind::Patch)?;

    let mut patch = Patch::new();
    for element in root.elements() {
        if element.is("title") {
            patch.fields.push(FieldPatch::Title(element.text_content()));
        } else if element.is("synopsis") {
            patch.fields.push(FieldPatch::Synopsis(element.text_content()));
        } else if element.is_any(STORY_ELEMENTS) {
            patch
                .fields
                .push(FieldPatch::StoryElements(story_elements_from(element)));
        } else if element.is_any(CHARACTERS) {
            patch.fields.push(FieldPatch::Characters(characters_from(element)));
        } else if element.is_any(SECTIONS) {
            for section in element.children_named(SECTION) {
                push_section_patch(&mut patch, section);
            }
        } else if element.is_any(SECTION) {
            push_section_patch(&mut patch, element);
        } else {
            warn!(tag = %element.name, "Ignoring unknown element in patch");
        }
    }

    Ok(patch)
}

fn push_section_patch(patch: &mut Patch, element: &Element) {
    match section_patch_from(element) {
        Some(fragment) => patch.sections.push(fragment),
        None => warn!("Ignoring section fragment without an id"),
    }
}

/// Section elements in document order, wrapped or not
fn section_elements(root: &Element) -> impl Iterator<Item = &Element> {
    root.elements().flat_map(|element| {
        let nested: Vec<&Element> = if element.is_any(SECTIONS) {
            element.children_named(SECTION).collect()
        } else if element.is_any(SECTION) {
            vec![element]
        } else {
            Vec::new()
        };
        nested
    })
}

/// Value given either as a child element or as an attribute
fn field_text(element: &Element, name: &str) -> Option<String> {
    element
        .child(&[name])
        .map(Element::text_content)
        .or_else(|| element.attr(name).map(|value| value.trim().to_string()))
}

fn section_id(element: &Element) -> Option<String> {
    field_text(element, "id")
        .or_else(|| field_text(element, "number"))
        .filter(|id| !id.is_empty())
}

fn section_from_element(element: &Element, position: usize) -> Result<Section, EditorError> {
    let id = section_id(element).ok_or(EditorError::MissingSectionId { position })?;
    let number = field_text(element, "number")
        .and_then(|n| n.parse().ok())
        .unwrap_or(position as u32 + 1);

    Ok(Section {
        id,
        number,
        title: field_text(element, "title").unwrap_or_default(),
        setting: field_text(element, "setting").unwrap_or_default(),
        summary: field_text(element, "summary").unwrap_or_default(),
        content: content_from(element).unwrap_or_default(),
    })
}

fn section_patch_from(element: &Element) -> Option<SectionPatch> {
    Some(SectionPatch {
        id: section_id(element)?,
        content: content_from(element),
        title: field_text(element, "title"),
        setting: field_text(element, "setting"),
        summary: field_text(element, "summary"),
    })
}

/// Paragraphs of a section: `<content>` children, bare `<paragraph>`
/// children, or plain text in `<content>` split on blank lines.
/// `None` when the section carries no content at all.
fn content_from(section: &Element) -> Option<Vec<ContentBlock>> {
    let container = match section.child(CONTENT) {
        Some(content) => content,
        None if section.child(PARAGRAPH).is_some() => section,
        None => return None,
    };

    let paragraphs: Vec<&Element> = container.children_named(PARAGRAPH).collect();
    if !paragraphs.is_empty() {
        return Some(
            paragraphs
                .into_iter()
                .enumerate()
                .map(|(i, paragraph)| {
                    let number = paragraph
                        .attr("number")
                        .and_then(|n| n.trim().parse().ok())
                        .unwrap_or(i as u32 + 1);
                    ContentBlock::new(number, paragraph.text_content())
                })
                .collect(),
        );
    }

    let text = container.text_content();
    Some(
        text.split("\n\n")
            .map(str::trim)
            .filter(|chunk| !chunk.is_empty())
            .enumerate()
            .map(|(i, chunk)| ContentBlock::new(i as u32 + 1, chunk))
            .collect(),
    )
}

fn story_elements_from(element: &Element) -> StoryElements {
    element
        .elements()
        .map(|entry| (entry.name.clone(), entry.text_content()))
        .collect()
}

fn characters_from(element: &Element) -> Vec<Character> {
    element
        .children_named(CHARACTER)
        .enumerate()
        .map(|(i, character)| Character {
            id: field_text(character, "id")
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| format!("character-{}", i + 1)),
            name: field_text(character, "name").unwrap_or_default(),
            description: field_text(character, "description").unwrap_or_default(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

pub fn document_to_element(doc: &Document) -> Element {
    let mut root = Element::new(RootKind::Book.tag());

    if let Some(title) = doc.title() {
        root = root.with_child(text_element("title", title));
    }
    if let Some(synopsis) = doc.synopsis() {
        root = root.with_child(text_element("synopsis", synopsis));
    }
    if let Some(elements) = doc.story_elements() {
        root = root.with_child(story_elements_to_element(elements));
    }
    if let Some(characters) = doc.characters() {
        root = root.with_child(characters_to_element(characters));
    }

    let mut chapters = Element::new("chapters");
    for section in doc.sections() {
        chapters = chapters.with_child(section_to_element(section));
    }
    root.with_child(chapters)
}

pub fn patch_to_element(patch: &Patch) -> Element {
    let mut root = Element::new(RootKind::Patch.tag());

    for field in &patch.fields {
        root = root.with_child(match field {
            FieldPatch::Title(title) => text_element("title", title),
            FieldPatch::Synopsis(synopsis) => text_element("synopsis", synopsis),
            FieldPatch::StoryElements(elements) => story_elements_to_element(elements),
            FieldPatch::Characters(characters) => characters_to_element(characters),
        });
    }

    for fragment in &patch.sections {
        let mut chapter = Element::new("chapter").with_attr("id", &fragment.id);
        for (name, value) in [
            ("title", &fragment.title),
            ("setting", &fragment.setting),
            ("summary", &fragment.summary),
        ] {
            if let Some(value) = value {
                chapter = chapter.with_child(text_element(name, value));
            }
        }
        if let Some(blocks) = &fragment.content {
            chapter = chapter.with_child(content_to_element(blocks));
        }
        root = root.with_child(chapter);
    }

    root
}

pub(crate) fn section_to_element(section: &Section) -> Element {
    section_header(section)
        .with_child(text_element("summary", &section.summary))
        .with_child(content_to_element(&section.content))
}

/// `<chapter id number>` with title and setting, shared with slice rendering
pub(crate) fn section_header(section: &Section) -> Element {
    Element::new("chapter")
        .with_attr("id", &section.id)
        .with_attr("number", section.number.to_string())
        .with_child(text_element("title", &section.title))
        .with_child(text_element("setting", &section.setting))
}

pub(crate) fn content_to_element(blocks: &[ContentBlock]) -> Element {
    blocks.iter().fold(Element::new("content"), |content, block| {
        content.with_child(
            text_element("paragraph", &block.text).with_attr("number", block.number.to_string()),
        )
    })
}

pub(crate) fn characters_to_element(characters: &[Character]) -> Element {
    characters
        .iter()
        .fold(Element::new("characters"), |list, character| {
            list.with_child(
                Element::new("character")
                    .with_attr("id", &character.id)
                    .with_child(text_element("name", &character.name))
                    .with_child(text_element("description", &character.description)),
            )
        })
}

pub(crate) fn story_elements_to_element(elements: &StoryElements) -> Element {
    elements
        .iter()
        .fold(Element::new("story-elements"), |list, (name, value)| {
            list.with_child(text_element(name, value))
        })
}

/// Leaf element; empty values render self-closing
pub(crate) fn text_element(name: &str, value: &str) -> Element {
    let element = Element::new(name);
    if value.is_empty() {
        element
    } else {
        element.with_text(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTLINE: &str = r#"Here is your outline:
```xml
<book>
  <title>The Lantern Road</title>
  <synopsis>A courier crosses a flooded country.</synopsis>
  <storyElements><genre>Fantasy</genre><tone>Quiet</tone></storyElements>
  <characters>
    <character id="mara"><name>Mara</name><description>A courier.</description></character>
    <character><name>Oren</name></character>
  </characters>
  <chapters>
    <chapter id="1" number="1"><title>Departure</title><summary>Mara leaves.</summary></chapter>
    <chapter number="2"><title>The Ferry</title>
      <content><paragraph>Water everywhere.</paragraph><paragraph>A boat.</paragraph></content>
    </chapter>
  </chapters>
</book>
```"#;

    #[test]
    fn test_decode_outline() {
        let doc = parse_document(OUTLINE).unwrap();

        assert_eq!(doc.title(), Some("The Lantern Road"));
        assert_eq!(doc.story_elements().unwrap()["genre"], "Fantasy");

        let characters = doc.characters().unwrap();
        assert_eq!(characters[0].id, "mara");
        assert_eq!(characters[1].id, "character-2");

        assert_eq!(doc.len(), 2);
        // Falls back to the number when no id is given
        let ferry = doc.section("2").unwrap();
        assert_eq!(ferry.title, "The Ferry");
        assert_eq!(ferry.content.len(), 2);
        assert_eq!(ferry.content[1], ContentBlock::new(2, "A boat."));
        assert!(doc.section("1").unwrap().content.is_empty());
    }

    #[test]
    fn test_document_round_trip() {
        let doc = parse_document(OUTLINE).unwrap();
        let reparsed = parse_document(&render_document(&doc)).unwrap();
        assert_eq!(reparsed, doc);
        assert_eq!(fingerprint(&reparsed), fingerprint(&doc));
    }

    #[test]
    fn test_unwrapped_sections_and_attribute_values() {
        let doc = parse_document(
            r#"<book title="Short"><chapter id="x" title="Only"><p>Hi.</p></chapter></book>"#,
        )
        .unwrap();

        assert_eq!(doc.title(), Some("Short"));
        let section = doc.section("x").unwrap();
        assert_eq!(section.title, "Only");
        assert_eq!(section.content, vec![ContentBlock::new(1, "Hi.")]);
    }

    #[test]
    fn test_section_without_identity_is_rejected() {
        let err = parse_document("<book><chapters><chapter><title>?</title></chapter></chapters></book>")
            .unwrap_err();
        assert_eq!(err, EditorError::MissingSectionId { position: 0 });
    }

    #[test]
    fn test_plain_text_content_splits_on_blank_lines() {
        let patch = parse_patch(
            "<patch><chapter id=\"3\"><content>First part.\n\nSecond part.</content></chapter></patch>",
        )
        .unwrap();
        let blocks = patch.sections[0].content.as_ref().unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].text, "Second part.");
    }

    #[test]
    fn test_patch_decode_fields_and_sections() {
        let patch = parse_patch(
            r#"<patch>
                <synopsis>New synopsis</synopsis>
                <chapters><chapter id="2"><summary>Changed</summary></chapter></chapters>
                <chapter id="3"><content><paragraph>Text</paragraph></content></chapter>
                <chapter><content/></chapter>
                <weather>rain</weather>
            </patch>"#,
        )
        .unwrap();

        assert_eq!(patch.fields, vec![FieldPatch::Synopsis("New synopsis".to_string())]);
        assert_eq!(patch.sections.len(), 2);
        assert_eq!(patch.sections[0].summary.as_deref(), Some("Changed"));
        assert!(patch.sections[0].content.is_none());
        assert_eq!(patch.sections[1].content.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_patch_round_trip() {
        let patch = Patch::new()
            .with_field(FieldPatch::Title("Renamed".to_string()))
            .with_section_content("2", &["A.", "B."]);
        assert_eq!(parse_patch(&render_patch(&patch)).unwrap(), patch);
    }

    #[test]
    fn test_wrong_root_from_element() {
        let err = patch_from_element(&Element::new("book")).unwrap_err();
        assert!(matches!(err, EditorError::WrongRoot { .. }));
    }
}
