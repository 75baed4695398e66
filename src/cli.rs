//! One-shot CLI commands: `ask`, `search`, and `chunk`.
//!
//! Each command builds a fresh in-memory session, loads the given files,
//! and prints to stdout. Per-file problems go to stderr and do not stop
//! the run.

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::chunk::chunk_text;
use crate::config::Config;
use crate::extract::extract_text;
use crate::models::{Document, SourceFile};
use crate::retrieve::retrieve;
use crate::session::{IngestReport, Session};
use crate::sources::{read_file, scan_dir};
use crate::synthesizer::{create_synthesizer, DisabledSynthesizer, Synthesizer};

/// Collects `--file` paths and the contents of `--dir`, in that order.
pub fn collect_sources(
    config: &Config,
    files: &[PathBuf],
    dir: Option<&Path>,
) -> Result<Vec<SourceFile>> {
    let mut sources = Vec::new();
    for path in files {
        sources.push(read_file(path)?);
    }
    if let Some(dir) = dir {
        sources.extend(scan_dir(dir, &config.sources)?);
    }
    Ok(sources)
}

async fn load_session(
    config: &Config,
    synthesizer: Arc<dyn Synthesizer>,
    sources: Vec<SourceFile>,
) -> Result<Session> {
    let session = Session::new(synthesizer, config.retrieval.clone());
    let report = session.ingest_files(sources).await?;
    print_ingest_problems(&report);
    Ok(session)
}

fn print_ingest_problems(report: &IngestReport) {
    for name in &report.duplicates {
        eprintln!("skipped {}: already added", name);
    }
    for (name, reason) in &report.failed {
        eprintln!("failed {}: {}", name, reason);
    }
}

/// `docent ask`: ingest, ask once, print the reply.
pub async fn run_ask(config: &Config, question: &str, sources: Vec<SourceFile>) -> Result<()> {
    if question.trim().is_empty() {
        bail!("question must not be empty");
    }
    let synthesizer: Arc<dyn Synthesizer> = Arc::from(create_synthesizer(&config.synthesizer)?);
    let session = load_session(config, synthesizer, sources).await?;

    let reply = session.send_message(question).await?;
    if let Some(error) = session.snapshot().error.clone() {
        bail!(error);
    }
    if let Some(reply) = reply {
        println!("{}", reply.content);
    }
    Ok(())
}

/// `docent search`: print the fragments a question would retrieve.
/// Never contacts the model.
pub async fn run_search(
    config: &Config,
    question: &str,
    sources: Vec<SourceFile>,
    limit: Option<usize>,
) -> Result<()> {
    let mut params = config.retrieval.clone();
    if let Some(limit) = limit {
        if limit == 0 {
            bail!("--limit must be >= 1");
        }
        params.top_k = limit;
    }

    let session = load_session(config, Arc::new(DisabledSynthesizer), sources).await?;
    let snapshot = session.snapshot();
    let hits = retrieve(question, snapshot.store.all(), &params);

    if hits.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, hit) in hits.iter().enumerate() {
        println!("{}. [{}] {}", i + 1, hit.score, hit.fragment.source);
        println!(
            "    excerpt: \"{}\"",
            excerpt(&hit.fragment.content, 240).replace('\n', " ")
        );
        println!("    id: {}", hit.fragment.id);
        println!();
    }
    Ok(())
}

/// `docent chunk`: print the fragments one file produces.
///
/// Extraction runs on the blocking pool, as in the session, so a panic
/// inside the PDF parser surfaces as an error instead of aborting.
pub async fn run_chunk(path: &Path) -> Result<()> {
    let file = read_file(path)?;
    let (file, extracted) = tokio::task::spawn_blocking(move || {
        let extracted = extract_text(&file.bytes, &file.mime_type, &file.name);
        (file, extracted)
    })
    .await
    .map_err(|e| anyhow::anyhow!("extraction task failed: {}", e))?;
    let text = extracted?;
    let document = Document::new(&file.name, chrono::Utc::now().timestamp_millis());
    let fragments = chunk_text(&document.id, &document.name, &text);

    println!("{}: {} fragments", file.name, fragments.len());
    for (i, fragment) in fragments.iter().enumerate() {
        println!("--- [{}] ---", i);
        println!("{}", fragment.content);
    }
    Ok(())
}

fn excerpt(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        out.push_str("...");
    }
    out
}
