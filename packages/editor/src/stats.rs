//! Read-only progress queries over a document

use crate::document::{Document, Section};
use folio_parser::word_count;
use serde::Serialize;

/// Where one section stands
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionStatus {
    pub id: String,
    pub number: u32,
    pub title: String,
    pub has_summary: bool,
    pub has_content: bool,
    pub words: usize,
}

impl From<&Section> for SectionStatus {
    fn from(section: &Section) -> Self {
        Self {
            id: section.id.clone(),
            number: section.number,
            title: section.title.clone(),
            has_summary: section.has_summary(),
            has_content: section.has_content(),
            words: section_words(section),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookStats {
    pub title: Option<String>,
    pub sections: usize,
    pub drafted: usize,
    pub summarized: usize,
    pub words: usize,
}

fn section_words(section: &Section) -> usize {
    section
        .content
        .iter()
        .map(|block| word_count(&block.text))
        .sum()
}

impl Document {
    pub fn section_statuses(&self) -> Vec<SectionStatus> {
        self.sections().iter().map(SectionStatus::from).collect()
    }

    /// Words across all section content
    pub fn word_count(&self) -> usize {
        self.sections().iter().map(section_words).sum()
    }

    pub fn stats(&self) -> BookStats {
        let statuses = self.section_statuses();
        BookStats {
            title: self.title().map(str::to_string),
            sections: statuses.len(),
            drafted: statuses.iter().filter(|s| s.has_content).count(),
            summarized: statuses.iter().filter(|s| s.has_summary).count(),
            words: statuses.iter().map(|s| s.words).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::codec::parse_document;

    #[test]
    fn test_statuses_and_totals() {
        let doc = parse_document(
            r#"<book><title>T</title><chapters>
                <chapter id="1"><summary>Opening</summary>
                  <content><paragraph>Three small words.</paragraph><paragraph>Two more.</paragraph></content>
                </chapter>
                <chapter id="2"><title>Later</title></chapter>
            </chapters></book>"#,
        )
        .unwrap();

        let statuses = doc.section_statuses();
        assert_eq!(statuses.len(), 2);
        assert!(statuses[0].has_summary && statuses[0].has_content);
        assert_eq!(statuses[0].words, 5);
        assert!(!statuses[1].has_content);
        assert_eq!(statuses[1].title, "Later");

        assert_eq!(doc.word_count(), 5);
        let stats = doc.stats();
        assert_eq!((stats.sections, stats.drafted, stats.summarized), (2, 1, 1));
    }

    #[test]
    fn test_status_serializes_camel_case() {
        let doc = parse_document(r#"<book><chapter id="a"/></book>"#).unwrap();
        let json = serde_json::to_value(doc.section_statuses()).unwrap();
        assert_eq!(json[0]["hasContent"], false);
        assert_eq!(json[0]["id"], "a");
    }
}
