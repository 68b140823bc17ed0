//! # Patch Merge Engine
//!
//! Applies a [`Patch`] to a [`Document`] by identity. Section fragments are
//! resolved through the document's id index; a fragment whose id is unknown
//! is skipped, never turned into a new section. Every present value replaces
//! its target whole, so applying the same patch twice leaves the document as
//! applying it once did.

use crate::document::{ContentBlock, Document};
use crate::patch::{FieldPatch, Patch, SectionPatch};
use folio_parser::normalize_paragraph;
use serde::Serialize;
use tracing::{debug, warn};

/// What a merge did
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeOutcome {
    /// Matched targets: found sections plus top-level fields
    pub applied: usize,
    /// Section ids the patch addressed that do not exist, in patch order
    pub missing_sections: Vec<String>,
}

impl MergeOutcome {
    /// Nothing matched; the document is unchanged and nothing should be logged
    pub fn is_noop(&self) -> bool {
        self.applied == 0
    }
}

/// Merge `patch` into `doc`
pub fn apply(doc: &mut Document, patch: &Patch) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();

    for fragment in &patch.sections {
        if apply_section(doc, fragment) {
            outcome.applied += 1;
        } else {
            warn!(section = %fragment.id, "Patch targets an unknown section, skipping");
            outcome.missing_sections.push(fragment.id.clone());
        }
    }

    for field in &patch.fields {
        debug!(field = field.name(), "Replacing top-level field");
        apply_field(doc, field.clone());
        outcome.applied += 1;
    }

    outcome
}

impl Patch {
    /// Convenience for [`apply`]
    pub fn apply(&self, doc: &mut Document) -> MergeOutcome {
        apply(doc, self)
    }
}

fn apply_section(doc: &mut Document, fragment: &SectionPatch) -> bool {
    let Some(section) = doc.section_mut(&fragment.id) else {
        return false;
    };

    if let Some(blocks) = &fragment.content {
        section.content = normalize_blocks(blocks);
        debug!(
            section = %fragment.id,
            paragraphs = section.content.len(),
            "Replaced section content"
        );
    }
    if let Some(title) = &fragment.title {
        section.title = title.clone();
    }
    if let Some(setting) = &fragment.setting {
        section.setting = setting.clone();
    }
    if let Some(summary) = &fragment.summary {
        section.summary = summary.clone();
    }

    true
}

fn apply_field(doc: &mut Document, field: FieldPatch) {
    match field {
        FieldPatch::Title(title) => doc.set_title(title),
        FieldPatch::Synopsis(synopsis) => doc.set_synopsis(synopsis),
        FieldPatch::StoryElements(elements) => doc.set_story_elements(elements),
        FieldPatch::Characters(characters) => doc.set_characters(characters),
    }
}

/// Normalize each paragraph, drop the ones left empty, number the rest 1..n
pub fn normalize_blocks(blocks: &[ContentBlock]) -> Vec<ContentBlock> {
    blocks
        .iter()
        .map(|block| normalize_paragraph(&block.text))
        .filter(|text| !text.is_empty())
        .enumerate()
        .map(|(i, text)| ContentBlock::new(i as u32 + 1, text))
        .collect()
}
