//! Batch processing command for a folder of documents.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::Local;
use clap::Args;
use console::style;
use glob::{glob_with, MatchOptions, Pattern};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use invex_core::archive::archive_document;
use invex_core::invoice::rules::format_german_decimal;
use invex_core::output::{
    summarize_amounts, write_document_csv, AggregateWriter, AmountSummary, CsvLayout,
};
use invex_core::{DocumentPipeline, DocumentType, ExtractionError, InvexError};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Folder with the PDF documents to process
    input: PathBuf,

    /// Folder that receives successfully processed documents
    archive: PathBuf,

    /// Folder for the per-document CSV files
    output: PathBuf,

    /// CSV file collecting the rows of every processed document
    aggregate: PathBuf,

    /// Document type: invoice or orderConfirmation
    document_type: DocumentType,

    /// Number of parallel workers (default from config)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Leave processed documents in the input folder
    #[arg(long)]
    no_archive: bool,
}

/// Shared state of one batch run.
struct BatchContext {
    pipeline: DocumentPipeline,
    layout: CsvLayout,
    aggregate: Mutex<AggregateWriter>,
    archive_dir: Option<PathBuf>,
    output_dir: PathBuf,
    document_type: DocumentType,
}

/// What happened to one file.
enum Outcome {
    Processed {
        identifier: String,
        rows: usize,
        amounts: AmountSummary,
    },
    Skipped(String),
    Failed(String),
}

struct FileResult {
    path: PathBuf,
    outcome: Outcome,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    if !args.input.is_dir() {
        anyhow::bail!("Input folder not found: {}", args.input.display());
    }

    let files = find_documents(&args.input)?;
    if files.is_empty() {
        println!(
            "{} No PDF files found in {}",
            style("ℹ").blue(),
            args.input.display()
        );
        return Ok(());
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    fs::create_dir_all(&args.output)?;

    let layout = CsvLayout::from_config(&config)?;
    let archive_enabled = config.batch.archive_on_success && !args.no_archive;
    let ctx = Arc::new(BatchContext {
        pipeline: DocumentPipeline::new(&config.extraction),
        aggregate: Mutex::new(AggregateWriter::new(&args.aggregate, layout.clone())),
        layout,
        archive_dir: archive_enabled.then(|| args.archive.clone()),
        output_dir: args.output.clone(),
        document_type: args.document_type,
    });

    let jobs = args.jobs.unwrap_or(config.batch.jobs).max(1);
    debug!("Processing with {} workers", jobs);

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let semaphore = Arc::new(Semaphore::new(jobs));
    let mut tasks = JoinSet::new();

    for path in files {
        let permit = semaphore.clone().acquire_owned().await?;
        let ctx = Arc::clone(&ctx);
        tasks.spawn(async move {
            let result = run_isolated(path, move |path| process_file(path, &ctx)).await;
            drop(permit);
            result
        });
    }

    let mut results = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(result) => results.push(result),
            Err(e) => error!("Worker task failed: {}", e),
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    results.sort_by(|a, b| a.path.cmp(&b.path));
    print_summary(&results, &args.aggregate, start);

    Ok(())
}

/// Run `work` on the blocking pool. A panicking worker becomes a failed outcome for
/// `path` so the file still shows up in the summary.
async fn run_isolated<F>(path: PathBuf, work: F) -> FileResult
where
    F: FnOnce(&Path) -> Outcome + Send + 'static,
{
    let worker_path = path.clone();
    let outcome = match tokio::task::spawn_blocking(move || work(&worker_path)).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Worker for {} failed: {}", path.display(), e);
            Outcome::Failed(format!("worker failed: {}", e))
        }
    };
    FileResult { path, outcome }
}

/// Every `*.pdf` directly inside `dir`, extension matched case-insensitively.
fn find_documents(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let pattern = format!("{}/*.pdf", Pattern::escape(&dir.to_string_lossy()));
    let options = MatchOptions {
        case_sensitive: false,
        ..MatchOptions::new()
    };

    let mut files: Vec<PathBuf> = glob_with(&pattern, options)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    Ok(files)
}

fn process_file(path: &Path, ctx: &BatchContext) -> Outcome {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            warn!("Cannot read {}: {}", path.display(), e);
            return Outcome::Failed(e.to_string());
        }
    };

    let processed = match ctx.pipeline.process_pdf(&data, ctx.document_type) {
        Ok(processed) => processed,
        Err(InvexError::Extraction(
            e @ (ExtractionError::VendorNotIdentified | ExtractionError::NoParserRegistered { .. }),
        )) => {
            warn!("Skipping {}: {}", path.display(), e);
            return Outcome::Skipped(e.to_string());
        }
        Err(e) => {
            warn!("Failed to process {}: {}", path.display(), e);
            return Outcome::Failed(e.to_string());
        }
    };

    let document = &processed.document;
    let timestamp = ctx.layout.timestamp(Local::now());

    if let Err(e) = persist(document, &timestamp, ctx) {
        error!("Failed to write output for {}: {}", path.display(), e);
        return Outcome::Failed(e.to_string());
    }

    if let Some(archive_dir) = &ctx.archive_dir {
        if let Err(e) = archive_document(path, archive_dir, &document.invoice_identifier, &timestamp) {
            // Output is already written; the file stays in the input folder.
            error!("Failed to archive {}: {}", path.display(), e);
        }
    }

    info!(
        "{} -> {} {} ({} rows)",
        path.display(),
        processed.vendor,
        document.invoice_identifier,
        document.len()
    );

    Outcome::Processed {
        identifier: document.invoice_identifier.clone(),
        rows: document.len(),
        amounts: summarize_amounts(&document.items),
    }
}

fn persist(
    document: &invex_core::ParsedDocument,
    timestamp: &str,
    ctx: &BatchContext,
) -> invex_core::Result<()> {
    let path = write_document_csv(&ctx.output_dir, document, &ctx.layout, timestamp)?;
    debug!("Wrote {}", path.display());

    let aggregate = ctx.aggregate.lock().map_err(|_| InvexError::Persistence {
        path: "aggregate".to_string(),
        reason: "writer lock poisoned".to_string(),
    })?;
    aggregate.append(document)
}

fn print_summary(results: &[FileResult], aggregate: &Path, start: Instant) {
    let mut processed = 0;
    let mut rows = 0;
    let mut net = AmountSummary::default();
    let mut skipped = Vec::new();
    let mut failed = Vec::new();

    for result in results {
        match &result.outcome {
            Outcome::Processed {
                identifier,
                rows: count,
                amounts,
            } => {
                debug!("{}: {} ({} rows)", result.path.display(), identifier, count);
                processed += 1;
                rows += count;
                net.total_net += amounts.total_net;
                net.counted += amounts.counted;
                net.skipped += amounts.skipped;
            }
            Outcome::Skipped(reason) => skipped.push((&result.path, reason)),
            Outcome::Failed(reason) => failed.push((&result.path, reason)),
        }
    }

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} skipped, {} failed",
        style(processed).green(),
        style(skipped.len()).yellow(),
        style(failed.len()).red()
    );

    if processed > 0 {
        println!(
            "   {} rows, net total {} written to {}",
            rows,
            format_german_decimal(net.total_net, 2),
            aggregate.display()
        );
        if net.skipped > 0 {
            println!(
                "   {} rows without amount left out of the total",
                style(net.skipped).yellow()
            );
        }
    }

    for (title, entries) in [("Skipped files:", &skipped), ("Failed files:", &failed)] {
        if entries.is_empty() {
            continue;
        }
        println!();
        println!("{}", style(title).yellow());
        for (path, reason) in entries {
            println!("  - {}: {}", path.display(), reason);
        }
    }
}
