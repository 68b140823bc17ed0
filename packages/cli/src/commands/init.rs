use super::{explain, read_input};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use folio_parser::RootKind;
use folio_workspace::{Project, ProjectConfig, CONFIG_FILE};
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Generated outline (`-` or omitted for stdin)
    pub outline: Option<PathBuf>,

    /// Generator model to record in the config
    #[arg(long)]
    pub model: Option<String>,
}

pub fn init(args: InitArgs, root: &Path) -> Result<()> {
    let (text, source_name) = read_input(args.outline.as_deref())?;

    let mut config = ProjectConfig::load(root)?;
    if args.model.is_some() {
        config.generator.model = args.model;
    }

    println!("{}", "📖 Initializing Folio project...".bright_blue().bold());

    let project = Project::create(root, &text, config.clone())
        .map_err(|e| explain(e, &text, &source_name, RootKind::Book))?;
    println!("  {} Created {}", "✓".green(), config.snapshot_file);

    if !root.join(CONFIG_FILE).exists() {
        config.save(root)?;
        println!("  {} Created {}", "✓".green(), CONFIG_FILE);
    }

    let doc = project.document();
    println!();
    println!(
        "{} {} ({} sections)",
        "✅".green(),
        doc.title().unwrap_or("Untitled").bold(),
        doc.len()
    );
    println!();
    println!("Next steps:");
    println!("  1. Run: folio slice <section-id>");
    println!("  2. Send the slice to your generator");
    println!("  3. Run: folio apply <reply-file>");

    Ok(())
}
