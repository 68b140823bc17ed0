//! Read-only commands

use super::open_project;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use folio_editor::render_document;
use folio_workspace::LoadSource;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Print status as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn status(args: StatusArgs, root: &Path) -> Result<()> {
    let project = open_project(root)?;
    let doc = project.document();
    let stats = doc.stats();
    let report = project.load_report();

    if args.json {
        let value = json!({
            "stats": stats,
            "sections": doc.section_statuses(),
            "load": report,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!(
        "{}",
        stats.title.as_deref().unwrap_or("Untitled").bright_blue().bold()
    );
    println!(
        "{} sections, {} drafted, {} words",
        stats.sections, stats.drafted, stats.words
    );
    println!();

    for section in doc.section_statuses() {
        let mark = if section.has_content {
            "✓".green()
        } else if section.has_summary {
            "·".yellow()
        } else {
            "✗".red()
        };
        println!(
            "  {} {:>3}  {:<32} {:>6} words  {}",
            mark,
            section.number,
            section.title,
            section.words,
            format!("[{}]", section.id).dimmed()
        );
    }

    if !report.skipped.is_empty() {
        println!();
        println!(
            "{} skipped corrupt log entries: {:?}",
            "⚠️".yellow(),
            report.skipped
        );
    }
    Ok(())
}

pub fn history(root: &Path) -> Result<()> {
    let project = open_project(root)?;
    let entries = project.history()?;
    let report = project.load_report();

    if entries.is_empty() {
        println!("{}", "No patches applied yet".yellow());
        return Ok(());
    }

    let working = match report.source {
        LoadSource::Working { seq } => Some(seq),
        LoadSource::Base => None,
    };
    for entry in &entries {
        let name = entry
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let note = if report.skipped.contains(&entry.seq) {
            "corrupt, skipped".red().to_string()
        } else if Some(entry.seq) == working {
            "working snapshot".dimmed().to_string()
        } else {
            String::new()
        };
        println!("  {:>4}  {}  {}", entry.seq, name, note);
    }
    Ok(())
}

pub fn verify(root: &Path) -> Result<()> {
    let project = open_project(root)?;
    let verification = project.verify()?;

    println!("  replayed from base  {:08x}", verification.replayed);
    println!("  bounded load        {:08x}", verification.bounded);
    println!("  in memory           {:08x}", verification.in_memory);
    println!("  log entries         {}", verification.entries);
    println!();

    if verification.is_consistent() {
        println!("{}", "✅ Working state matches the log".green().bold());
        Ok(())
    } else {
        Err(anyhow!(
            "working snapshot diverges from the patch log; delete it to rebuild from base"
        ))
    }
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn render(args: RenderArgs, root: &Path) -> Result<()> {
    let project = open_project(root)?;
    let text = render_document(project.document());

    match args.output {
        Some(path) => {
            fs::write(&path, text)?;
            println!("{} Wrote {}", "✓".green(), path.display());
        }
        None => print!("{}", text),
    }
    Ok(())
}
