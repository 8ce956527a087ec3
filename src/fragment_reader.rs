use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::PipelineError;
use crate::model::{CellValue, RawFragment};

#[derive(Debug, Deserialize)]
struct FragmentRecord {
    headers: Vec<String>,
    #[serde(default)]
    rows: Vec<RowRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RowRecord {
    Positional(Vec<CellValue>),
    Keyed(HashMap<String, CellValue>),
}

pub fn read_fragments(path: &Path) -> Result<Vec<RawFragment>, PipelineError> {
    let bytes = fs::read(path)?;
    read_fragments_from_bytes(&bytes)
}

pub fn read_fragments_from_bytes(bytes: &[u8]) -> Result<Vec<RawFragment>, PipelineError> {
    let records = serde_json::from_slice::<Vec<FragmentRecord>>(bytes)?;
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| into_fragment(index, record))
        .collect()
}

/// Label attached to every summary row of a document: its file name without
/// extension.
#[must_use]
pub fn source_label(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn into_fragment(index: usize, record: FragmentRecord) -> Result<RawFragment, PipelineError> {
    let FragmentRecord { headers, rows } = record;
    let width = headers.len();

    let rows = rows
        .into_iter()
        .enumerate()
        .map(|(row_index, row)| match row {
            RowRecord::Positional(cells) if cells.len() == width => Ok(cells),
            RowRecord::Positional(cells) => Err(PipelineError::InvalidFragment {
                fragment: index,
                reason: format!(
                    "row {row_index} has {} cells for {width} headers",
                    cells.len()
                ),
            }),
            RowRecord::Keyed(mut cells) => {
                let row = headers
                    .iter()
                    .map(|header| cells.remove(header).unwrap_or(CellValue::Empty))
                    .collect::<Vec<_>>();
                if let Some(unknown) = cells.keys().next() {
                    return Err(PipelineError::InvalidFragment {
                        fragment: index,
                        reason: format!("row {row_index} has unknown column '{unknown}'"),
                    });
                }
                Ok(row)
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RawFragment::new(headers, rows))
}
