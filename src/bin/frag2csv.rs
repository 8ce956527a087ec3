use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use fragment_tables::{
    DEFAULT_CONTINUATION_PREFIX, DocumentReport, PipelineOptions, SummaryRecord,
    convert_fragments_file_as, unique_source_labels, write_combined_summary,
};
use rayon::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "frag2csv",
    version,
    about = "Reconcile extracted table fragments into per-table CSV files and a combined summary"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Convert fragment JSON files into CSV tables.
    Convert(ConvertArgs),
}

#[derive(Debug, Args)]
struct ConvertArgs {
    /// Fragment JSON file produced by the table extractor. Repeatable.
    #[arg(short, long = "input", required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory for CSV files.
    #[arg(short, long)]
    output: PathBuf,

    /// Output delimiter character.
    #[arg(long, default_value = ",")]
    delimiter: char,

    /// Header prefix marking a fragment as the continuation of the previous table.
    #[arg(long, default_value = DEFAULT_CONTINUATION_PREFIX)]
    continuation_prefix: String,

    /// Skip the combined Sample / ng/ul / 260/280 summary.
    #[arg(long)]
    no_summary: bool,

    /// Enable verbose warning output.
    #[arg(short, long)]
    verbose: bool,
}

fn parse_options(args: &ConvertArgs) -> Result<PipelineOptions> {
    if !args.delimiter.is_ascii() {
        anyhow::bail!("delimiter must be a single ASCII character");
    }

    let options = PipelineOptions {
        delimiter: args.delimiter as u8,
        continuation_prefix: args.continuation_prefix.clone(),
        include_summary: !args.no_summary,
        summary_stamp: Local::now(),
    };
    options.validate().context("invalid options")?;
    Ok(options)
}

fn log_report(report: &DocumentReport, verbose: bool) {
    if report.warnings.is_empty() {
        return;
    }

    eprintln!(
        "warning: {}: {} issue(s) detected",
        report.source,
        report.warnings.len()
    );
    if verbose {
        for warning in &report.warnings {
            eprintln!(
                "  - {:?} fragment={:?} table_id={:?}: {}",
                warning.code, warning.fragment, warning.table_id, warning.message
            );
        }
    }
}

fn run_convert(args: &ConvertArgs) -> Result<ExitCode> {
    let options = parse_options(args)?;
    fs::create_dir_all(&args.output).with_context(|| {
        format!(
            "failed to create output directory '{}'",
            args.output.display()
        )
    })?;

    let labels = unique_source_labels(&args.inputs);
    let results = args
        .inputs
        .par_iter()
        .zip(labels.par_iter())
        .map(|(input, label)| convert_fragments_file_as(input, label, &args.output, &options))
        .collect::<Vec<_>>();

    let mut summary: Vec<SummaryRecord> = Vec::new();
    let mut succeeded = 0_usize;
    for (input, result) in args.inputs.iter().zip(results) {
        match result {
            Ok(report) if report.succeeded() => {
                println!("{}\tSuccess\t{}", input.display(), report.message);
                log_report(&report, args.verbose);
                summary.extend(report.summary);
                succeeded += 1;
            }
            Ok(report) => {
                println!("{}\tFailed\t{}", input.display(), report.message);
                log_report(&report, args.verbose);
            }
            Err(error) => {
                println!("{}\tError\t{error}", input.display());
            }
        }
    }

    if options.include_summary && !summary.is_empty() {
        let path = write_combined_summary(&args.output, &summary, &options)
            .context("failed to write combined summary")?;
        let rows = summary.iter().map(|record| record.entries.len()).sum::<usize>();
        println!(
            "Created combined summary with {rows} rows: {}",
            path.display()
        );
    }

    println!(
        "Successfully processed {succeeded}/{} files",
        args.inputs.len()
    );

    Ok(if succeeded > 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

fn main() -> ExitCode {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("fragment_tables=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Convert(args) => match run_convert(&args) {
            Ok(code) => code,
            Err(error) => {
                eprintln!("error: {error:#}");
                ExitCode::from(1)
            }
        },
    }
}
