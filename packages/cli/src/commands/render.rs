use super::{read_input, write_output};
use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use flatmark_editor::{Document, Reconstructor};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Stored document JSON (`-` for stdin)
    pub input: PathBuf,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn render(args: RenderArgs, config: &Config) -> Result<()> {
    let json = read_input(&args.input)?;
    let document = Document::from_json(&json)
        .with_context(|| format!("Invalid document in {}", args.input.display()))?;
    let html = Reconstructor::new(&config.schema).render(&document);
    write_output(args.output.as_deref(), &html)
}
