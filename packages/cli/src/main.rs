mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    apply, history, init, render, slice, status, verify, ApplyArgs, InitArgs, RenderArgs,
    SliceArgs, StatusArgs,
};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Folio CLI - keeps a generated manuscript consistent, one patch at a time
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Project directory
    #[arg(short = 'C', long, global = true, default_value = ".")]
    project: PathBuf,

    /// Log replay and merge detail to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a project from a generated outline
    Init(InitArgs),

    /// Show drafting progress per section
    Status(StatusArgs),

    /// Apply a generated patch (file or stdin)
    Apply(ApplyArgs),

    /// Print the context slice around a section
    Slice(SliceArgs),

    /// List patch log entries
    History,

    /// Check that replaying the log reproduces the working state
    Verify,

    /// Print the current document in canonical form
    Render(RenderArgs),
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let root = cli.project.as_path();
    let result = match cli.command {
        Command::Init(args) => init(args, root),
        Command::Status(args) => status(args, root),
        Command::Apply(args) => apply(args, root),
        Command::Slice(args) => slice(args, root),
        Command::History => history(root),
        Command::Verify => verify(root),
        Command::Render(args) => render(args, root),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
