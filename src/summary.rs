use crate::model::{CellValue, LogicalTable, SummaryEntry, SummaryField, SummaryRecord};
use crate::numeric::normalize_cell;

pub const SAMPLE_HEADER_VARIANTS: &[&str] = &["Sample", "sample", "Sample Name", "sample name"];
pub const CONCENTRATION_HEADER_VARIANTS: &[&str] =
    &["ng/ul", "ng/uL", "ng/µl", "Concentration", "concentration"];
pub const PURITY_RATIO_HEADER_VARIANTS: &[&str] = &["260/280", "260 / 280", "A260/A280", "Ratio"];

impl SummaryField {
    /// Substrings that identify this field in a table header, checked in order.
    #[must_use]
    pub const fn header_variants(self) -> &'static [&'static str] {
        match self {
            Self::Sample => SAMPLE_HEADER_VARIANTS,
            Self::Concentration => CONCENTRATION_HEADER_VARIANTS,
            Self::PurityRatio => PURITY_RATIO_HEADER_VARIANTS,
        }
    }
}

/// Index of the leftmost header containing any variant of `field`.
#[must_use]
pub fn find_source_column(headers: &[String], field: SummaryField) -> Option<usize> {
    let variants = field.header_variants();
    headers
        .iter()
        .position(|header| variants.iter().any(|variant| header.contains(variant)))
}

/// Pull the sample / concentration / purity columns out of a table. Each field
/// resolves on its own, so one column may feed several fields.
#[must_use]
pub fn resolve(table: &LogicalTable, source_label: &str) -> Option<SummaryRecord> {
    let columns = SummaryField::ALL
        .into_iter()
        .filter_map(|field| find_source_column(&table.headers, field).map(|index| (field, index)))
        .collect::<Vec<_>>();

    if columns.is_empty() || table.rows.is_empty() {
        return None;
    }

    let entries = table
        .rows
        .iter()
        .map(|row| {
            let mut entry = SummaryEntry::default();
            for &(field, index) in &columns {
                let cell = row.get(index).cloned().unwrap_or(CellValue::Empty);
                *entry.slot_mut(field) = Some(normalize_cell(cell));
            }
            entry
        })
        .collect();

    Some(SummaryRecord {
        source: source_label.to_string(),
        fields: columns.into_iter().map(|(field, _)| field).collect(),
        entries,
    })
}
