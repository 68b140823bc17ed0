use super::{explain, open_project, read_input};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use folio_parser::RootKind;
use folio_workspace::store::entry_file_name;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Generator reply holding a <patch> (`-` or omitted for stdin)
    pub patch: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn apply(args: ApplyArgs, root: &Path) -> Result<()> {
    let mut project = open_project(root)?;
    let (text, source_name) = read_input(args.patch.as_deref())?;

    let mutation = project
        .apply_patch_text(&text)
        .map_err(|e| explain(e, &text, &source_name, RootKind::Patch))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&mutation)?);
        return Ok(());
    }

    match mutation.seq {
        Some(seq) => println!(
            "{} Applied {} target(s) → {}",
            "✓".green(),
            mutation.applied(),
            entry_file_name(seq).bright_white()
        ),
        None => println!(
            "{}",
            "⚠️  No targets matched; nothing was logged".yellow()
        ),
    }
    for id in &mutation.outcome.missing_sections {
        println!("  {} no section with id {}", "✗".red(), id.cyan());
    }

    Ok(())
}
