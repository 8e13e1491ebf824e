//! `udiff-view`: classify a unified diff and print a per-file summary, or
//! dump raw classification records as JSON.

use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use udiff_document::{DiffDocument, OutlineTree, ParseSession, StyleTag};
use udiff_parser::{LineReader, ParserState, UDiffParser};

#[derive(Parser)]
#[command(name = "udiff-view", version, about = "Classify and summarize unified-diff text")]
struct Args {
    /// Diff file to read; stdin when omitted.
    file: Option<PathBuf>,

    /// Emit one JSON classification record per input line instead of a
    /// summary.
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let source: Box<dyn Read> = match &args.file {
        Some(path) => Box::new(
            File::open(path).with_context(|| format!("cannot open {}", path.display()))?,
        ),
        None => Box::new(io::stdin().lock()),
    };

    if args.json {
        dump_json(source)
    } else {
        summarize(source)
    }
}

/// Streams the source through the classifier, one JSON record per line.
fn dump_json(source: Box<dyn Read>) -> anyhow::Result<()> {
    let parser = UDiffParser::new();
    let mut state = ParserState::new();
    let mut reader = LineReader::new(source);
    let stdout = io::stdout().lock();
    let mut out = io::BufWriter::new(stdout);

    while let Some(line) = reader.next_line().context("reading diff source")? {
        let result = parser.classify(&mut state, &line);
        serde_json::to_writer(&mut out, &result)?;
        io::Write::write_all(&mut out, b"\n")?;
    }
    Ok(())
}

/// Runs a full parse session and prints per-file addition/deletion counts
/// in document order.
fn summarize(source: Box<dyn Read>) -> anyhow::Result<()> {
    let mut session = ParseSession::new(DiffDocument::new(), OutlineTree::new());
    session.parse_reader(source).context("reading diff source")?;
    let (doc, outline) = session.finish()?;

    log::debug!(
        "parsed {} lines, {} files",
        doc.paragraph_count(),
        outline.paths().len()
    );

    // (path, additions, deletions), keyed by the FILE attribute of the
    // enclosing file entry.
    let mut files: Vec<(String, usize, usize)> = Vec::new();
    let mut current: Option<usize> = None;

    for index in 0..doc.paragraph_count() {
        let paragraph = doc.paragraph(index);
        if let Some(path) = &paragraph.attrs().file {
            match files.iter().position(|(p, _, _)| p == path) {
                Some(i) => current = Some(i),
                None => {
                    files.push((path.clone(), 0, 0));
                    current = Some(files.len() - 1);
                }
            }
        }
        let Some(i) = current else { continue };
        match paragraph.style() {
            StyleTag::InsertedLine => files[i].1 += 1,
            StyleTag::DeletedLine => files[i].2 += 1,
            _ => {}
        }
    }

    let (mut total_added, mut total_deleted) = (0, 0);
    for (path, added, deleted) in &files {
        println!("{path}  +{added} -{deleted}");
        total_added += added;
        total_deleted += deleted;
    }
    println!(
        "{} file(s), +{total_added} -{total_deleted}",
        files.len()
    );
    Ok(())
}
