//! # Document Model
//!
//! In-memory tree of a book: top-level metadata, characters, and an ordered
//! list of sections (chapters or scenes), each holding ordered paragraphs.
//!
//! ## Identity
//!
//! Sections are addressed by an opaque `id` assigned when the outline is
//! generated. The id never changes and is never reused; the display
//! `number` may. A [`SectionIndex`] maps ids to positions so patch targets
//! resolve without scanning, and it is rebuilt whenever the section list
//! changes shape.
//!
//! ## Mutation
//!
//! Fields are private and the only `&mut` access is crate-internal: a
//! loaded document changes exclusively through [`crate::merge`].

use crate::EditorError;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Flat named attributes: genre, tone, perspective, target audience, ...
pub type StoryElements = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Character {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// One paragraph of prose
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentBlock {
    pub number: u32,
    pub text: String,
}

impl ContentBlock {
    pub fn new(number: u32, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }
}

/// A chapter or scene
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Section {
    pub id: String,
    pub number: u32,
    pub title: String,
    pub setting: String,
    pub summary: String,
    pub content: Vec<ContentBlock>,
}

impl Section {
    pub fn new(id: impl Into<String>, number: u32) -> Self {
        Self {
            id: id.into(),
            number,
            ..Self::default()
        }
    }

    pub fn has_summary(&self) -> bool {
        !self.summary.trim().is_empty()
    }

    pub fn has_content(&self) -> bool {
        self.content.iter().any(|block| !block.text.trim().is_empty())
    }
}

/// Section id → position in reading order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SectionIndex {
    positions: HashMap<String, usize>,
}

impl SectionIndex {
    /// Build from sections, rejecting duplicate ids
    pub fn build(sections: &[Section]) -> Result<Self, EditorError> {
        let mut positions = HashMap::with_capacity(sections.len());
        for (position, section) in sections.iter().enumerate() {
            if positions.insert(section.id.clone(), position).is_some() {
                return Err(EditorError::DuplicateSectionId(section.id.clone()));
            }
        }
        Ok(Self { positions })
    }

    pub fn get(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Everything an outline provides, before identity checks
#[derive(Debug, Clone, Default)]
pub struct DocumentParts {
    pub title: Option<String>,
    pub synopsis: Option<String>,
    pub story_elements: Option<StoryElements>,
    pub characters: Option<Vec<Character>>,
    pub sections: Vec<Section>,
}

/// The book
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    title: Option<String>,
    synopsis: Option<String>,
    story_elements: Option<StoryElements>,
    characters: Option<Vec<Character>>,
    sections: Vec<Section>,
    #[serde(skip)]
    index: SectionIndex,
}

impl Document {
    /// Assemble a document from outline parts. Fails on duplicate section ids.
    pub fn from_parts(parts: DocumentParts) -> Result<Self, EditorError> {
        let index = SectionIndex::build(&parts.sections)?;
        Ok(Self {
            title: parts.title,
            synopsis: parts.synopsis,
            story_elements: parts.story_elements,
            characters: parts.characters,
            sections: parts.sections,
            index,
        })
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn synopsis(&self) -> Option<&str> {
        self.synopsis.as_deref()
    }

    pub fn story_elements(&self) -> Option<&StoryElements> {
        self.story_elements.as_ref()
    }

    pub fn characters(&self) -> Option<&[Character]> {
        self.characters.as_deref()
    }

    /// Sections in reading order
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Constant-time lookup by id
    pub fn section(&self, id: &str) -> Option<&Section> {
        self.index.get(id).map(|position| &self.sections[position])
    }

    /// Reading-order position of a section
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub(crate) fn section_mut(&mut self, id: &str) -> Option<&mut Section> {
        let position = self.index.get(id)?;
        self.sections.get_mut(position)
    }

    pub(crate) fn set_title(&mut self, title: String) {
        self.title = Some(title);
    }

    pub(crate) fn set_synopsis(&mut self, synopsis: String) {
        self.synopsis = Some(synopsis);
    }

    pub(crate) fn set_story_elements(&mut self, elements: StoryElements) {
        self.story_elements = Some(elements);
    }

    pub(crate) fn set_characters(&mut self, characters: Vec<Character>) {
        self.characters = Some(characters);
    }
}
