//! # Context Slicer
//!
//! Builds a bounded view of the book around one target section, sized to
//! fit a generator's input limit. The view is an independent value; the
//! source document is only borrowed.
//!
//! - [`SliceMode::Local`]: metadata, characters with descriptions clipped,
//!   and the target with one neighbour on each side, all in full.
//! - [`SliceMode::Continuity`]: full metadata and characters, two neighbours
//!   on each side reduced to digests, and a one-line narrative flow note.

use crate::codec::{
    characters_to_element, content_to_element, section_header, story_elements_to_element,
    text_element,
};
use crate::document::{Character, ContentBlock, Document, Section, StoryElements};
use crate::EditorError;
use folio_parser::{render, Element, RootKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Suffix marking clipped text
pub const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SliceMode {
    #[default]
    Local,
    Continuity,
}

impl SliceMode {
    /// Sections included on each side of the target
    pub fn radius(self) -> usize {
        match self {
            SliceMode::Local => 1,
            SliceMode::Continuity => 2,
        }
    }
}

impl fmt::Display for SliceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SliceMode::Local => f.write_str("local"),
            SliceMode::Continuity => f.write_str("continuity"),
        }
    }
}

impl FromStr for SliceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(SliceMode::Local),
            "continuity" => Ok(SliceMode::Continuity),
            other => Err(format!("unknown slice mode '{}'", other)),
        }
    }
}

/// Character budgets for clipped text, counted in Unicode scalar values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SliceBudgets {
    /// Character descriptions in local mode
    pub character_chars: usize,
    /// First/last paragraphs in continuity digests
    pub paragraph_chars: usize,
}

impl Default for SliceBudgets {
    fn default() -> Self {
        Self {
            character_chars: 240,
            paragraph_chars: 280,
        }
    }
}

/// Clip `text` to `budget` chars, appending [`ELLIPSIS`] when anything was cut
pub fn truncate(text: &str, budget: usize) -> String {
    if text.chars().count() <= budget {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(budget).collect();
    clipped.truncate(clipped.trim_end().len());
    clipped.push_str(ELLIPSIS);
    clipped
}

/// How a section appears in a slice
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SliceBody {
    Full {
        content: Vec<ContentBlock>,
    },
    /// Stand-in for content: clipped first and last paragraphs
    Digest {
        first: Option<String>,
        last: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SliceSection {
    pub id: String,
    pub number: u32,
    pub title: String,
    pub setting: String,
    pub summary: String,
    pub is_target: bool,
    pub body: SliceBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextSlice {
    pub mode: SliceMode,
    pub target: String,
    pub title: Option<String>,
    pub synopsis: Option<String>,
    pub story_elements: Option<StoryElements>,
    pub characters: Vec<Character>,
    pub sections: Vec<SliceSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative_flow: Option<String>,
}

/// Build the view of `doc` around `target`
pub fn slice(
    doc: &Document,
    target: &str,
    mode: SliceMode,
    budgets: &SliceBudgets,
) -> Result<ContextSlice, EditorError> {
    let position = doc
        .position(target)
        .ok_or_else(|| EditorError::SectionNotFound(target.to_string()))?;

    let sections = doc.sections();
    let radius = mode.radius();
    let start = position.saturating_sub(radius);
    let end = (position + radius).min(sections.len() - 1);

    let window = sections[start..=end]
        .iter()
        .enumerate()
        .map(|(offset, section)| {
            let is_target = start + offset == position;
            let body = if is_target || mode == SliceMode::Local {
                SliceBody::Full {
                    content: section.content.clone(),
                }
            } else {
                digest(section, budgets.paragraph_chars)
            };
            SliceSection {
                id: section.id.clone(),
                number: section.number,
                title: section.title.clone(),
                setting: section.setting.clone(),
                summary: section.summary.clone(),
                is_target,
                body,
            }
        })
        .collect();

    let characters = doc
        .characters()
        .unwrap_or_default()
        .iter()
        .map(|character| match mode {
            SliceMode::Local => Character {
                description: truncate(&character.description, budgets.character_chars),
                ..character.clone()
            },
            SliceMode::Continuity => character.clone(),
        })
        .collect();

    let narrative_flow = match mode {
        SliceMode::Local => None,
        SliceMode::Continuity => Some(narrative_flow(sections, position)),
    };

    Ok(ContextSlice {
        mode,
        target: target.to_string(),
        title: doc.title().map(str::to_string),
        synopsis: doc.synopsis().map(str::to_string),
        story_elements: doc.story_elements().cloned(),
        characters,
        sections: window,
        narrative_flow,
    })
}

fn digest(section: &Section, budget: usize) -> SliceBody {
    let first = section.content.first();
    let last = section.content.last().filter(|_| section.content.len() > 1);
    SliceBody::Digest {
        first: first.map(|block| truncate(&block.text, budget)),
        last: last.map(|block| truncate(&block.text, budget)),
    }
}

/// `Section 3 of 7 ("The Ferry"); follows "Departure"; precedes "Flood".`
fn narrative_flow(sections: &[Section], position: usize) -> String {
    let target = &sections[position];
    let mut note = format!(
        "Section {} of {} (\"{}\")",
        position + 1,
        sections.len(),
        target.title
    );
    if let Some(previous) = position.checked_sub(1).map(|i| &sections[i]) {
        note.push_str(&format!("; follows \"{}\"", previous.title));
    }
    if let Some(next) = sections.get(position + 1) {
        note.push_str(&format!("; precedes \"{}\"", next.title));
    }
    note.push('.');
    note
}

impl ContextSlice {
    pub fn target_section(&self) -> Option<&SliceSection> {
        self.sections.iter().find(|section| section.is_target)
    }

    /// Markup tree with root `book`, the shape a generator is prompted with
    pub fn to_element(&self) -> Element {
        let mut root = Element::new(RootKind::Book.tag());

        if let Some(title) = &self.title {
            root = root.with_child(text_element("title", title));
        }
        if let Some(synopsis) = &self.synopsis {
            root = root.with_child(text_element("synopsis", synopsis));
        }
        if let Some(elements) = &self.story_elements {
            root = root.with_child(story_elements_to_element(elements));
        }
        if !self.characters.is_empty() {
            root = root.with_child(characters_to_element(&self.characters));
        }
        if let Some(note) = &self.narrative_flow {
            root = root.with_child(text_element("narrative-flow", note));
        }

        let mut chapters = Element::new("chapters");
        for section in &self.sections {
            chapters = chapters.with_child(slice_section_to_element(section));
        }
        root.with_child(chapters)
    }

    pub fn render(&self) -> String {
        render(&self.to_element())
    }
}

fn slice_section_to_element(section: &SliceSection) -> Element {
    let header = Section {
        id: section.id.clone(),
        number: section.number,
        title: section.title.clone(),
        setting: section.setting.clone(),
        ..Section::default()
    };
    let mut element = section_header(&header);
    if section.is_target {
        element = element.with_attr("target", "true");
    }
    element = element.with_child(text_element("summary", &section.summary));

    match &section.body {
        SliceBody::Full { content } => element.with_child(content_to_element(content)),
        SliceBody::Digest { first, last } => {
            let mut digest = Element::new("digest");
            if let Some(first) = first {
                digest = digest.with_child(text_element("first-paragraph", first));
            }
            if let Some(last) = last {
                digest = digest.with_child(text_element("last-paragraph", last));
            }
            element.with_child(digest)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("héllo wörld", 5), "héllo...");
        assert_eq!(truncate("ab cd", 3), "ab...");
        assert_eq!(truncate("", 0), "");
        assert!(truncate(&"é".repeat(500), 280).chars().count() <= 280 + ELLIPSIS.len());
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("Continuity".parse::<SliceMode>(), Ok(SliceMode::Continuity));
        assert_eq!("local".parse::<SliceMode>(), Ok(SliceMode::Local));
        assert!("global".parse::<SliceMode>().is_err());
        assert_eq!(SliceMode::Continuity.to_string(), "continuity");
    }

    #[test]
    fn test_narrative_flow_omits_missing_neighbours() {
        let sections: Vec<Section> = ["A", "B"]
            .iter()
            .enumerate()
            .map(|(i, title)| Section {
                title: title.to_string(),
                ..Section::new(i.to_string(), i as u32 + 1)
            })
            .collect();

        assert_eq!(narrative_flow(&sections, 0), "Section 1 of 2 (\"A\"); precedes \"B\".");
        assert_eq!(narrative_flow(&sections, 1), "Section 2 of 2 (\"B\"); follows \"A\".");
        assert_eq!(narrative_flow(&sections[..1], 0), "Section 1 of 1 (\"A\").");
    }

    #[test]
    fn test_budgets_deserialize_with_defaults() {
        let budgets: SliceBudgets = serde_json::from_str(r#"{"paragraphChars": 50}"#).unwrap();
        assert_eq!(budgets.paragraph_chars, 50);
        assert_eq!(budgets.character_chars, 240);
    }
}
