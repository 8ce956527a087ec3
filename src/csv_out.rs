use std::io;
use std::path::Path;

use csv::{Writer, WriterBuilder};

use crate::error::PipelineError;
use crate::model::{LogicalTable, SummaryField, SummaryRecord};

pub const SOURCE_FILE_HEADER: &str = "Source File";

struct Sheet {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Rows are padded to the widest of header and data. Data wider than the
/// header (a misaligned continuation) gets `col_{n}` headers.
fn table_sheet(table: &LogicalTable) -> Sheet {
    let width = table
        .rows
        .iter()
        .map(Vec::len)
        .max()
        .unwrap_or(0)
        .max(table.headers.len());

    let mut headers = table.headers.clone();
    let first_extra = headers.len() + 1;
    headers.extend((first_extra..=width).map(|index| format!("col_{index}")));

    let rows = table
        .rows
        .iter()
        .map(|row| {
            let mut out = row.iter().map(ToString::to_string).collect::<Vec<_>>();
            out.resize(width, String::new());
            out
        })
        .collect();

    Sheet { headers, rows }
}

fn summary_sheet(records: &[SummaryRecord]) -> Sheet {
    let fields = SummaryField::ALL
        .into_iter()
        .filter(|field| records.iter().any(|record| record.has_field(*field)))
        .collect::<Vec<_>>();

    let mut headers = vec![SOURCE_FILE_HEADER.to_string()];
    headers.extend(fields.iter().map(|field| field.label().to_string()));

    let rows = records
        .iter()
        .flat_map(|record| {
            record.entries.iter().map(|entry| {
                let mut row = Vec::with_capacity(fields.len() + 1);
                row.push(record.source.clone());
                row.extend(
                    fields
                        .iter()
                        .map(|field| entry.get(*field).map(ToString::to_string).unwrap_or_default()),
                );
                row
            })
        })
        .collect();

    Sheet { headers, rows }
}

fn write_sheet<W: io::Write>(writer: &mut Writer<W>, sheet: &Sheet) -> Result<(), PipelineError> {
    writer.write_record(&sheet.headers)?;
    for row in &sheet.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_sheet_to_path(path: &Path, sheet: &Sheet, delimiter: u8) -> Result<(), PipelineError> {
    let mut writer = WriterBuilder::new().delimiter(delimiter).from_path(path)?;
    write_sheet(&mut writer, sheet)
}

fn write_sheet_to_string(sheet: &Sheet, delimiter: u8) -> Result<String, PipelineError> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::<u8>::new());
    write_sheet(&mut writer, sheet)?;

    let bytes = writer
        .into_inner()
        .map_err(|error| PipelineError::Csv(error.into_error().into()))?;
    String::from_utf8(bytes)
        .map_err(|error| PipelineError::InvalidOutput(format!("invalid utf-8 csv output: {error}")))
}

pub fn write_table_csv(
    path: &Path,
    table: &LogicalTable,
    delimiter: u8,
) -> Result<(), PipelineError> {
    write_sheet_to_path(path, &table_sheet(table), delimiter)
}

pub fn table_csv_string(table: &LogicalTable, delimiter: u8) -> Result<String, PipelineError> {
    write_sheet_to_string(&table_sheet(table), delimiter)
}

pub fn write_summary_csv(
    path: &Path,
    records: &[SummaryRecord],
    delimiter: u8,
) -> Result<(), PipelineError> {
    write_sheet_to_path(path, &summary_sheet(records), delimiter)
}

pub fn summary_csv_string(
    records: &[SummaryRecord],
    delimiter: u8,
) -> Result<String, PipelineError> {
    write_sheet_to_string(&summary_sheet(records), delimiter)
}
