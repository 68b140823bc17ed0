use folio_editor::EditorError;
use folio_parser::ParseError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("No base snapshot at {}", .0.display())]
    MissingSnapshot(PathBuf),

    #[error("A project already exists at {}", .0.display())]
    AlreadyInitialized(PathBuf),

    #[error("Parse error: {0}")]
    Parse(ParseError),

    #[error("{0}")]
    Editor(EditorError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Manifest error: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("Invalid config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Patch log entry {0} already exists")]
    EntryExists(u64),

    #[error("Patch log has no sequence number left after {0}")]
    SequenceExhausted(u64),
}

impl From<EditorError> for ProjectError {
    fn from(error: EditorError) -> Self {
        match error {
            EditorError::Parse(parse) => ProjectError::Parse(parse),
            other => ProjectError::Editor(other),
        }
    }
}

impl ProjectError {
    /// Generator text that could not be read, as opposed to an I/O or state problem
    pub fn is_parse_failure(&self) -> bool {
        matches!(
            self,
            ProjectError::Parse(_)
                | ProjectError::Editor(EditorError::WrongRoot { .. })
                | ProjectError::Editor(EditorError::MissingSectionId { .. })
                | ProjectError::Editor(EditorError::DuplicateSectionId(_))
        )
    }
}

pub type ProjectResult<T> = Result<T, ProjectError>;
