use std::fmt::{self, Display, Formatter};

use serde::Deserialize;

/// A single extracted cell. Extractors hand over text, already-parsed numbers
/// or a missing marker; nothing else is accepted at the boundary.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Empty,
}

impl CellValue {
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

impl Display for CellValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
            Self::Empty => Ok(()),
        }
    }
}

/// One extractor output for a detected table region. Rows hold one cell per
/// header, in header order.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFragment {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawFragment {
    #[must_use]
    pub fn new(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self { headers, rows }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A complete table, possibly stitched together from several fragments.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl LogicalTable {
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

impl From<RawFragment> for LogicalTable {
    fn from(fragment: RawFragment) -> Self {
        Self {
            headers: fragment.headers,
            rows: fragment.rows,
        }
    }
}

/// The fragments of one document together with the label its summary rows carry.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentInput {
    pub source: String,
    pub fragments: Vec<RawFragment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SummaryField {
    Sample,
    Concentration,
    PurityRatio,
}

impl SummaryField {
    pub const ALL: [Self; 3] = [Self::Sample, Self::Concentration, Self::PurityRatio];

    /// Column name used in the combined summary output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sample => "Sample",
            Self::Concentration => "ng/ul",
            Self::PurityRatio => "260/280",
        }
    }
}

/// One summary row. A field stays `None` when the table had no column for it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryEntry {
    pub sample: Option<CellValue>,
    pub concentration: Option<CellValue>,
    pub purity_ratio: Option<CellValue>,
}

impl SummaryEntry {
    #[must_use]
    pub fn get(&self, field: SummaryField) -> Option<&CellValue> {
        match field {
            SummaryField::Sample => self.sample.as_ref(),
            SummaryField::Concentration => self.concentration.as_ref(),
            SummaryField::PurityRatio => self.purity_ratio.as_ref(),
        }
    }

    pub(crate) fn slot_mut(&mut self, field: SummaryField) -> &mut Option<CellValue> {
        match field {
            SummaryField::Sample => &mut self.sample,
            SummaryField::Concentration => &mut self.concentration,
            SummaryField::PurityRatio => &mut self.purity_ratio,
        }
    }
}

/// Summary extracted from one logical table of one document.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRecord {
    pub source: String,
    pub fields: Vec<SummaryField>,
    pub entries: Vec<SummaryEntry>,
}

impl SummaryRecord {
    #[must_use]
    pub fn has_field(&self, field: SummaryField) -> bool {
        self.fields.contains(&field)
    }
}
