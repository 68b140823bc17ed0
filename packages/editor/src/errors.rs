//! Error types for the editor

use folio_parser::{ParseError, RootKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Expected a <{expected}> document, found <{found}>")]
    WrongRoot { expected: RootKind, found: String },

    #[error("Section at position {position} has neither an id nor a number")]
    MissingSectionId { position: usize },

    #[error("Duplicate section id: {0}")]
    DuplicateSectionId(String),

    #[error("Section not found: {0}")]
    SectionNotFound(String),
}
