use super::open_project;
use anyhow::Result;
use clap::Args;
use folio_editor::SliceMode;
use std::path::Path;

#[derive(Debug, Args)]
pub struct SliceArgs {
    /// Target section id
    pub section: String,

    /// Wider window with digests and a narrative flow note
    #[arg(long)]
    pub continuity: bool,

    /// Print the slice as JSON instead of markup
    #[arg(long)]
    pub json: bool,
}

pub fn slice(args: SliceArgs, root: &Path) -> Result<()> {
    let project = open_project(root)?;
    let mode = if args.continuity {
        SliceMode::Continuity
    } else {
        SliceMode::Local
    };

    let view = project.slice(&args.section, mode)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", view.render());
    }
    Ok(())
}
