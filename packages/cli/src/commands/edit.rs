use super::{read_input, write_output};
use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::Colorize;
use flatmark_editor::{EditSession, Mutation, ANCHOR};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Stored document JSON (`-` for stdin)
    pub input: PathBuf,

    /// Tag to add over the word range
    #[arg(long, conflicts_with = "remove")]
    pub add: Option<String>,

    /// Tag to remove from the word range (`a` removes any link)
    #[arg(long)]
    pub remove: Option<String>,

    /// Index of the run to edit
    #[arg(long)]
    pub run: usize,

    /// Words from the range start to the end of the run
    #[arg(long)]
    pub from_end: usize,

    /// Words in the range
    #[arg(long, default_value_t = 1)]
    pub count: usize,

    /// Link target when adding `a`
    #[arg(long)]
    pub href: Option<String>,

    /// Print the rendered HTML instead of the updated document
    #[arg(long)]
    pub html: bool,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn edit(args: EditArgs, config: &Config) -> Result<()> {
    let json = read_input(&args.input)?;
    let mut session = EditSession::load(&json, config.schema.clone())
        .with_context(|| format!("Invalid document in {}", args.input.display()))?;

    let mutation = match (&args.add, &args.remove) {
        (Some(tag), None) => Mutation::AddTag {
            run: args.run,
            count_from_end: args.from_end,
            count: args.count,
            tag: tag.clone(),
            attributes: add_attributes(tag, args.href.as_deref())?,
        },
        (None, Some(_)) if args.href.is_some() => {
            return Err(anyhow!("--href only applies when adding a link"));
        }
        (None, Some(tag)) => Mutation::RemoveTag {
            run: args.run,
            count_from_end: args.from_end,
            count: args.count,
            tag: tag.clone(),
        },
        _ => return Err(anyhow!("Pass exactly one of --add or --remove")),
    };

    let result = session.apply(mutation)?;
    if result.changed {
        eprintln!(
            "{} {} run(s) inserted",
            "✓".green(),
            result.inserted
        );
    } else {
        eprintln!("{} nothing to change", "•".yellow());
    }

    emit(&mut session, args.html, args.output, config.pretty)
}

/// Attributes for an added tag. `--href` is required for links and rejected
/// for everything else.
fn add_attributes(tag: &str, href: Option<&str>) -> Result<BTreeMap<String, String>> {
    let mut attributes = BTreeMap::new();
    match (tag == ANCHOR, href) {
        (true, Some(href)) => {
            attributes.insert("href".to_string(), href.to_string());
        }
        (true, None) => return Err(anyhow!("Adding a link requires --href")),
        (false, Some(_)) => return Err(anyhow!("--href only applies to `a`, not `{}`", tag)),
        (false, None) => {}
    }
    Ok(attributes)
}

#[derive(Debug, Args)]
pub struct RetargetArgs {
    /// Stored document JSON (`-` for stdin)
    pub input: PathBuf,

    /// Current link target
    #[arg(long)]
    pub from: String,

    /// New link target
    #[arg(long)]
    pub to: String,

    /// Print the rendered HTML instead of the updated document
    #[arg(long)]
    pub html: bool,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Point every link to one target at another
pub fn retarget(args: RetargetArgs, config: &Config) -> Result<()> {
    let json = read_input(&args.input)?;
    let mut session = EditSession::load(&json, config.schema.clone())
        .with_context(|| format!("Invalid document in {}", args.input.display()))?;

    let updated = session.retarget_link(&args.from, &args.to)?;
    eprintln!("{} {} run(s) retargeted", "✓".green(), updated);

    emit(&mut session, args.html, args.output, config.pretty)
}

fn emit(session: &mut EditSession, html: bool, output: Option<PathBuf>, pretty: bool) -> Result<()> {
    let out = if html {
        session.render().to_string()
    } else if pretty {
        session.document().to_json_pretty()?
    } else {
        session.store()?
    };
    write_output(output.as_deref(), &out)
}
