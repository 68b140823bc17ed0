pub mod apply;
pub mod init;
pub mod inspect;
pub mod slice;

pub use apply::{apply, ApplyArgs};
pub use init::{init, InitArgs};
pub use inspect::{history, render, status, verify, RenderArgs, StatusArgs};
pub use slice::{slice, SliceArgs};

use anyhow::{anyhow, Result};
use folio_parser::{format_error, sanitize, RootKind};
use folio_workspace::{Project, ProjectConfig, ProjectError};
use std::io::Read;
use std::path::Path;

/// Turn a parse failure into a source-annotated report
pub fn explain(error: ProjectError, text: &str, source_name: &str, kind: RootKind) -> anyhow::Error {
    match &error {
        ProjectError::Parse(parse) if parse.span().is_some() => {
            // Spans point into the sanitized text
            let source = sanitize(text, kind).unwrap_or_else(|_| text.to_string());
            anyhow!("\n{}", format_error(&source, source_name, parse))
        }
        _ => error.into(),
    }
}

/// Load the project at `root` with its own `folio.config.json`
pub fn open_project(root: &Path) -> Result<Project> {
    let config = ProjectConfig::load(root)?;
    Ok(Project::load(root, config)?)
}

/// Read a file, or stdin for `-` / no path
pub fn read_input(path: Option<&Path>) -> Result<(String, String)> {
    match path {
        Some(path) if path != Path::new("-") => {
            let text = std::fs::read_to_string(path)?;
            Ok((text, path.display().to_string()))
        }
        _ => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok((text, "<stdin>".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_explain_annotates_parse_errors() {
        let text = r#"<patch><chapter id="1"></content></patch>"#;
        let error = ProjectError::Parse(folio_parser::parse(text, RootKind::Patch).unwrap_err());
        let message = explain(error, text, "reply.xml", RootKind::Patch).to_string();
        assert!(message.contains("reply.xml"));
    }

    #[test]
    fn test_explain_passes_other_errors_through() {
        let error = ProjectError::EntryExists(3);
        let message = explain(error, "", "reply.xml", RootKind::Patch).to_string();
        assert_eq!(message, "Patch log entry 3 already exists");
    }

    #[test]
    fn test_open_project_reads_config() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(folio_workspace::CONFIG_FILE),
            r#"{ "snapshotFile": "outline.xml" }"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("outline.xml"),
            r#"<book><chapter id="1"/></book>"#,
        )
        .unwrap();

        let project = open_project(dir.path()).unwrap();
        assert_eq!(project.document().len(), 1);
        assert_eq!(project.config().snapshot_file, "outline.xml");
    }
}
