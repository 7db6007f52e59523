mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    edit, flatten, render, retarget, roundtrip, EditArgs, FlattenArgs, RenderArgs, RetargetArgs,
    RoundtripArgs,
};
use config::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Flatmark CLI - flat run model for inline HTML formatting
#[derive(Parser, Debug)]
#[command(name = "flatmark")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ./flatmark.json when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Flatten an HTML fragment into the run model (JSON)
    Flatten(FlattenArgs),

    /// Render a stored run model back to HTML
    Render(RenderArgs),

    /// Add or remove a tag over a word range of one run
    Edit(EditArgs),

    /// Point every link to one target at another
    Retarget(RetargetArgs),

    /// Flatten and reconstruct an HTML fragment
    Roundtrip(RoundtripArgs),
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let config = Config::load(&cwd, cli.config.as_deref())?;

    match cli.command {
        Command::Flatten(args) => flatten(args, &config),
        Command::Render(args) => render(args, &config),
        Command::Edit(args) => edit(args, &config),
        Command::Retarget(args) => retarget(args, &config),
        Command::Roundtrip(args) => roundtrip(args, &config),
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
