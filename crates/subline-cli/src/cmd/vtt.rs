use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use subline_core::io::atomic_write;
use subline_core::vtt::{self, Segment};
use subline_core::SublineError;

#[derive(Subcommand)]
pub enum VttSubcommand {
    /// List the cues of a WebVTT file
    Parse { file: PathBuf },
    /// Build a WebVTT document from a JSON array of segments
    Build {
        file: PathBuf,
        /// Emit cue numbers before each timing line
        #[arg(long)]
        numbered: bool,
        /// Write to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Set the translation of one cue and rewrite the document
    Translate {
        file: PathBuf,
        /// Zero-based cue index
        #[arg(long)]
        index: usize,
        #[arg(long)]
        text: String,
        #[arg(long)]
        numbered: bool,
        /// Write to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

pub fn run(subcmd: VttSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        VttSubcommand::Parse { file } => parse(&file, json),
        VttSubcommand::Build {
            file,
            numbered,
            out,
        } => build(&file, numbered, out.as_deref()),
        VttSubcommand::Translate {
            file,
            index,
            text,
            numbered,
            out,
        } => translate(&file, index, &text, numbered, out.as_deref()),
    }
}

fn read(file: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))
}

/// Parse `file`, treating a document without cues as an error.
fn read_segments(file: &Path) -> anyhow::Result<Vec<Segment>> {
    let segments = vtt::parse(&read(file)?);
    if segments.is_empty() {
        return Err(SublineError::NoSegments).with_context(|| file.display().to_string());
    }
    Ok(segments)
}

fn parse(file: &Path, json: bool) -> anyhow::Result<()> {
    let segments = read_segments(file)?;
    if json {
        return print_json(&segments);
    }
    let rows = segments
        .iter()
        .enumerate()
        .map(|(i, s)| {
            vec![
                i.to_string(),
                s.start_time.clone(),
                s.end_time.clone(),
                s.text.replace('\n', " / "),
            ]
        })
        .collect();
    print_table(&["#", "START", "END", "TEXT"], rows);
    Ok(())
}

fn render(segments: &[Segment], numbered: bool) -> String {
    let none = HashMap::new();
    if numbered {
        vtt::build_numbered(segments, &none)
    } else {
        vtt::build(segments, &none)
    }
}

fn emit(content: &str, out: Option<&Path>) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            atomic_write(path, content.as_bytes())
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => print!("{content}"),
    }
    Ok(())
}

fn build(file: &Path, numbered: bool, out: Option<&Path>) -> anyhow::Result<()> {
    let segments: Vec<Segment> =
        serde_json::from_str(&read(file)?).context("expected a JSON array of segments")?;
    vtt::validate_segments(&segments)?;
    emit(&render(&segments, numbered), out)
}

fn translate(
    file: &Path,
    index: usize,
    text: &str,
    numbered: bool,
    out: Option<&Path>,
) -> anyhow::Result<()> {
    let mut segments = read_segments(file)?;
    vtt::set_translation(&mut segments, index, text)?;
    emit(&render(&segments, numbered), out)
}
