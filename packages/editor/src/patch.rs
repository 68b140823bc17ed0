//! Patch: a replace-whole-subtree update
//!
//! A patch never describes a line-level change. Every present value replaces
//! its target entirely, which keeps application idempotent and makes a
//! generator's rewrite of a chapter unambiguous.

use crate::document::{Character, ContentBlock, StoryElements};
use serde::Serialize;

/// Replacement values for one section, addressed by id
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionPatch {
    pub id: String,
    /// New paragraph list; `None` leaves content untouched
    pub content: Option<Vec<ContentBlock>>,
    pub title: Option<String>,
    pub setting: Option<String>,
    pub summary: Option<String>,
}

impl SectionPatch {
    pub fn content(id: impl Into<String>, blocks: Vec<ContentBlock>) -> Self {
        Self {
            id: id.into(),
            content: Some(blocks),
            ..Self::default()
        }
    }
}

/// Replacement for one top-level field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum FieldPatch {
    Title(String),
    Synopsis(String),
    StoryElements(StoryElements),
    Characters(Vec<Character>),
}

impl FieldPatch {
    pub fn name(&self) -> &'static str {
        match self {
            FieldPatch::Title(_) => "title",
            FieldPatch::Synopsis(_) => "synopsis",
            FieldPatch::StoryElements(_) => "storyElements",
            FieldPatch::Characters(_) => "characters",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Patch {
    pub sections: Vec<SectionPatch>,
    pub fields: Vec<FieldPatch>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: replace a section's paragraphs
    pub fn with_section_content(mut self, id: impl Into<String>, paragraphs: &[&str]) -> Self {
        let blocks = paragraphs
            .iter()
            .enumerate()
            .map(|(i, text)| ContentBlock::new(i as u32 + 1, *text))
            .collect();
        self.sections.push(SectionPatch::content(id, blocks));
        self
    }

    /// Builder: replace a top-level field
    pub fn with_field(mut self, field: FieldPatch) -> Self {
        self.fields.push(field);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.fields.is_empty()
    }

    /// Number of individual targets (sections plus fields)
    pub fn target_count(&self) -> usize {
        self.sections.len() + self.fields.len()
    }

    pub fn section_ids(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|section| section.id.as_str())
    }
}
