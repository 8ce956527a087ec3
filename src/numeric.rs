use std::sync::LazyLock;

use regex::Regex;

use crate::model::{CellValue, LogicalTable};

static DECIMAL_CANDIDATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+[,.]\d+").expect("hardcoded decimal candidate regex is valid")
});

/// Rewrite a decimal-comma text cell as a number. Anything that does not
/// convert cleanly is returned untouched.
#[must_use]
pub fn normalize_cell(value: CellValue) -> CellValue {
    match value {
        CellValue::Text(text) => match convert_decimal_text(&text) {
            Some(number) => CellValue::Number(number),
            None => CellValue::Text(text),
        },
        other => other,
    }
}

/// Normalize every text cell of the table in place. Headers and row layout
/// are left alone.
pub fn normalize_table(table: &mut LogicalTable) {
    for cell in table.rows.iter_mut().flatten() {
        if let CellValue::Text(text) = cell
            && let Some(number) = convert_decimal_text(text)
        {
            *cell = CellValue::Number(number);
        }
    }
}

fn convert_decimal_text(text: &str) -> Option<f64> {
    if !DECIMAL_CANDIDATE_RE.is_match(text) {
        return None;
    }

    let commas = text.matches(',').count();
    let periods = text.matches('.').count();
    match (commas, periods) {
        (1, 0) => parse_decimal(&text.replace(',', ".")),
        // OCR artifact: "173,0.71" is read back as "173.71".
        (1, 1) => parse_decimal(&drop_split_digit(&text.replace(',', "."))),
        _ => None,
    }
}

fn drop_split_digit(dotted: &str) -> String {
    let parts = dotted.split('.').collect::<Vec<_>>();
    if let [whole, middle, fraction] = parts.as_slice()
        && middle.chars().count() == 1
    {
        return format!("{whole}.{fraction}");
    }
    dotted.to_string()
}

fn parse_decimal(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok()
}
