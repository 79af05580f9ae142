//! Process command - extract line items from a single document.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use invex_core::output::{summarize_amounts, CsvLayout};
use invex_core::invoice::rules::format_german_decimal;
use invex_core::{DocumentPipeline, DocumentType, InvexConfig, ProcessedDocument};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF, or extracted text as .txt)
    #[arg(required = true)]
    input: PathBuf,

    /// Document type: invoice or orderConfirmation
    #[arg(short = 't', long, default_value = "invoice")]
    document_type: DocumentType,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    // Check input file exists
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    // Determine file type
    let extension = args
        .input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    info!("Processing file: {}", args.input.display());

    let pipeline = DocumentPipeline::new(&config.extraction);
    let processed = match extension.as_str() {
        "pdf" => {
            let data = fs::read(&args.input)?;
            pipeline.process_pdf(&data, args.document_type)?
        }
        "txt" => {
            let text = fs::read_to_string(&args.input)?;
            pipeline.process_text(&text, args.document_type)?
        }
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    };

    // Format output
    let output = format_document(&processed, args.format, &config)?;

    // Write output
    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn format_document(
    processed: &ProcessedDocument,
    format: OutputFormat,
    config: &InvexConfig,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(processed)?),
        OutputFormat::Csv => {
            let layout = CsvLayout::from_config(config)?;
            Ok(layout.to_csv_string(&processed.document.items)?)
        }
        OutputFormat::Text => Ok(format_text(processed, config)),
    }
}

fn format_text(processed: &ProcessedDocument, config: &InvexConfig) -> String {
    let document = &processed.document;
    let missing = config.output.missing_value.as_str();
    let mut output = String::new();

    output.push_str(&format!(
        "{} {}: {}\n",
        processed.vendor.display_name(),
        processed.document_type,
        document.invoice_identifier
    ));
    output.push_str(&format!("Creditor: {}\n", processed.vendor.creditor_number()));

    if let Some(first) = document.items.first() {
        let date = |d: Option<chrono::NaiveDate>| {
            d.map(|d| d.format(&config.extraction.date_format).to_string())
                .unwrap_or_else(|| missing.to_string())
        };
        output.push_str(&format!("Date: {}\n", date(first.invoice_date)));
        output.push_str(&format!("Due: {}\n", date(first.due_date)));
    }
    output.push('\n');

    output.push_str("Items:\n");
    for (index, item) in document.items.iter().enumerate() {
        output.push_str(&format!(
            "  {:>3}. {:<14} {:>8} x {:>10}  {}\n",
            index + 1,
            item.vendor_article_number.as_deref().unwrap_or(missing),
            item.quantity.as_deref().unwrap_or(missing),
            item.unit_price_net.as_deref().unwrap_or(missing),
            item.description
        ));
        if let Some(note) = &item.note {
            output.push_str(&format!("       {}\n", note));
        }
    }

    let summary = summarize_amounts(&document.items);
    output.push('\n');
    output.push_str(&format!("Net total: {}\n", format_german_decimal(summary.total_net, 2)));
    if summary.skipped > 0 {
        output.push_str(&format!("Rows without amount: {}\n", summary.skipped));
    }

    output
}
