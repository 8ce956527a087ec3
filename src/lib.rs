mod csv_out;
mod error;
mod fragment_reader;
mod model;
mod numeric;
mod options;
mod reconcile;
mod summary;
mod warning;

use std::collections::HashSet;
use std::fmt::Display;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use rayon::prelude::*;
use tracing::info;

use crate::reconcile::reconcile_fragments;

pub use csv_out::{
    SOURCE_FILE_HEADER, summary_csv_string, table_csv_string, write_summary_csv, write_table_csv,
};
pub use error::PipelineError;
pub use fragment_reader::{read_fragments, read_fragments_from_bytes, source_label};
pub use model::{
    CellValue, DocumentInput, LogicalTable, RawFragment, SummaryEntry, SummaryField,
    SummaryRecord,
};
pub use numeric::{normalize_cell, normalize_table};
pub use options::{DEFAULT_CONTINUATION_PREFIX, PipelineOptions};
pub use reconcile::reconcile;
pub use summary::{
    CONCENTRATION_HEADER_VARIANTS, PURITY_RATIO_HEADER_VARIANTS, SAMPLE_HEADER_VARIANTS,
    find_source_column, resolve,
};
pub use warning::{PipelineWarning, WarningCode as PipelineWarningCode};

/// Result of running one document through reconcile, normalize and resolve.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedDocument {
    pub source: String,
    pub tables: Vec<LogicalTable>,
    pub summary: Vec<SummaryRecord>,
    pub warnings: Vec<PipelineWarning>,
}

impl ProcessedDocument {
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.tables.iter().map(LogicalTable::row_count).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentReport {
    pub source: String,
    pub table_count: usize,
    pub row_count: usize,
    pub summary: Vec<SummaryRecord>,
    pub outputs: Vec<PathBuf>,
    pub warnings: Vec<PipelineWarning>,
    pub message: String,
}

impl DocumentReport {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        !self.outputs.is_empty()
    }
}

pub fn process_document(
    source: &str,
    fragments: &[RawFragment],
    options: &PipelineOptions,
) -> Result<ProcessedDocument, PipelineError> {
    options.validate()?;
    Ok(document_pass(source, fragments, options))
}

fn document_pass(
    source: &str,
    fragments: &[RawFragment],
    options: &PipelineOptions,
) -> ProcessedDocument {
    let mut warnings = Vec::new();
    let mut tables = reconcile_fragments(fragments, &options.continuation_prefix, &mut warnings);
    if tables.is_empty() {
        warnings.push(PipelineWarning::new(
            PipelineWarningCode::NoTablesDetected,
            "document produced no tables",
        ));
    }

    let mut summary = Vec::new();
    for (index, table) in tables.iter_mut().enumerate() {
        normalize_table(table);
        if !options.include_summary {
            continue;
        }
        match resolve(table, source) {
            Some(record) => summary.push(record),
            None => warnings.push(missing_summary_warning(table).with_table_id(index + 1)),
        }
    }

    info!(
        source,
        tables = tables.len(),
        summary_records = summary.len(),
        "document processed"
    );

    ProcessedDocument {
        source: source.to_string(),
        tables,
        summary,
        warnings: warnings
            .into_iter()
            .map(|warning| warning.with_source(source))
            .collect(),
    }
}

fn missing_summary_warning(table: &LogicalTable) -> PipelineWarning {
    let has_summary_column = SummaryField::ALL
        .into_iter()
        .any(|field| find_source_column(&table.headers, field).is_some());
    if has_summary_column {
        PipelineWarning::new(
            PipelineWarningCode::NoSummaryRows,
            "summary columns found but the table has no rows",
        )
    } else {
        PipelineWarning::new(
            PipelineWarningCode::NoSummaryColumns,
            "no sample, concentration or purity ratio column found",
        )
    }
}

/// Process independent documents in parallel. Results keep input order.
pub fn process_documents(
    inputs: &[DocumentInput],
    options: &PipelineOptions,
) -> Result<Vec<ProcessedDocument>, PipelineError> {
    options.validate()?;
    Ok(inputs
        .par_iter()
        .map(|input| document_pass(&input.source, &input.fragments, options))
        .collect())
}

/// Source labels for a batch of input files. Repeated stems get a `_2`, `_3`,
/// ... suffix so no two documents write the same output files.
#[must_use]
pub fn unique_source_labels(inputs: &[PathBuf]) -> Vec<String> {
    let mut taken = HashSet::new();
    inputs
        .iter()
        .map(|input| {
            let stem = source_label(input);
            let mut label = stem.clone();
            let mut counter = 1_usize;
            while !taken.insert(label.clone()) {
                counter += 1;
                label = format!("{stem}_{counter}");
            }
            label
        })
        .collect()
}

/// Every summary record of every document, in document then table order.
#[must_use]
pub fn combined_summary(documents: &[ProcessedDocument]) -> Vec<SummaryRecord> {
    documents
        .iter()
        .flat_map(|document| document.summary.iter().cloned())
        .collect()
}

#[must_use]
pub fn sheet_names(table_count: usize) -> Vec<String> {
    if table_count == 1 {
        return vec!["Sheet1".to_string()];
    }
    (1..=table_count).map(|index| format!("Table_{index}")).collect()
}

fn table_file_names(source: &str, table_count: usize) -> Vec<String> {
    if table_count == 1 {
        return vec![format!("{source}.csv")];
    }
    sheet_names(table_count)
        .into_iter()
        .map(|sheet| format!("{source}_{sheet}.csv"))
        .collect()
}

#[must_use]
pub fn combined_summary_file_name<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("combined_summary_{}.csv", at.format("%Y%m%d_%H%M%S"))
}

/// Write the combined summary into `output_dir`, named after
/// `options.summary_stamp`.
pub fn write_combined_summary(
    output_dir: &Path,
    records: &[SummaryRecord],
    options: &PipelineOptions,
) -> Result<PathBuf, PipelineError> {
    let path = output_dir.join(combined_summary_file_name(&options.summary_stamp));
    write_summary_csv(&path, records, options.delimiter)?;
    Ok(path)
}

pub fn convert_fragments_file(
    input: &Path,
    output_dir: &Path,
    options: &PipelineOptions,
) -> Result<DocumentReport, PipelineError> {
    convert_fragments_file_as(input, &source_label(input), output_dir, options)
}

/// Like [`convert_fragments_file`], with an explicit source label that also
/// names the output files.
pub fn convert_fragments_file_as(
    input: &Path,
    source: &str,
    output_dir: &Path,
    options: &PipelineOptions,
) -> Result<DocumentReport, PipelineError> {
    options.validate()?;

    let fragments = read_fragments(input)?;
    let document = process_document(source, &fragments, options)?;

    let mut outputs = Vec::with_capacity(document.tables.len());
    for (table, file_name) in document
        .tables
        .iter()
        .zip(table_file_names(source, document.tables.len()))
    {
        let path = output_dir.join(file_name);
        write_table_csv(&path, table, options.delimiter)?;
        outputs.push(path);
    }

    let message = if document.tables.is_empty() {
        let file_name = input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("No tables found in {file_name}")
    } else {
        format!("Successfully processed {} table(s)", document.tables.len())
    };

    Ok(DocumentReport {
        table_count: document.tables.len(),
        row_count: document.row_count(),
        source: document.source,
        summary: document.summary,
        outputs,
        warnings: document.warnings,
        message,
    })
}
