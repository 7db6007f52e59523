use super::{read_input, write_output};
use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use flatmark_editor::{parse_fragment, Flattener, Reconstructor};
use serde_json::json;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct FlattenArgs {
    /// HTML fragment to flatten (`-` for stdin)
    pub input: PathBuf,

    /// Include the `n-<i>` correlation id of every run
    #[arg(long)]
    pub ids: bool,

    /// Pretty-print the JSON (overrides config)
    #[arg(long)]
    pub pretty: bool,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn flatten(args: FlattenArgs, config: &Config) -> Result<()> {
    let html = read_input(&args.input)?;
    let tree = parse_fragment(&html)
        .with_context(|| format!("Failed to parse {}", args.input.display()))?;
    let flattened = Flattener::new(&config.schema).flatten_annotated(&tree);

    let value = if args.ids {
        json!({
            "document": flattened.document,
            "nodeIds": flattened.node_ids,
        })
    } else {
        serde_json::to_value(&flattened.document)?
    };

    let out = if args.pretty || config.pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };

    write_output(args.output.as_deref(), &out)
}

#[derive(Debug, Args)]
pub struct RoundtripArgs {
    /// HTML fragment (`-` for stdin)
    pub input: PathBuf,
}

/// Flatten and immediately reconstruct, showing the normalized markup
pub fn roundtrip(args: RoundtripArgs, config: &Config) -> Result<()> {
    let html = read_input(&args.input)?;
    let tree = parse_fragment(&html)
        .with_context(|| format!("Failed to parse {}", args.input.display()))?;
    let document = Flattener::new(&config.schema).flatten(&tree);
    write_output(None, &Reconstructor::new(&config.schema).render(&document))
}
