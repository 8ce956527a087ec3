use tracing::{debug, warn};

use crate::model::{LogicalTable, RawFragment};
use crate::options::DEFAULT_CONTINUATION_PREFIX;
use crate::warning::{PipelineWarning, WarningCode};

/// Merge page-split fragments into logical tables using the default
/// continuation prefix.
#[must_use]
pub fn reconcile(fragments: &[RawFragment]) -> Vec<LogicalTable> {
    reconcile_fragments(fragments, DEFAULT_CONTINUATION_PREFIX, &mut Vec::new())
}

/// Greedy single pass: a closed table is never reopened, even if a later
/// fragment would have matched it.
pub(crate) fn reconcile_fragments(
    fragments: &[RawFragment],
    continuation_prefix: &str,
    warnings: &mut Vec<PipelineWarning>,
) -> Vec<LogicalTable> {
    if fragments.len() <= 1 {
        return fragments.iter().cloned().map(LogicalTable::from).collect();
    }

    let mut tables = Vec::new();
    let mut current: Option<LogicalTable> = None;

    for (index, fragment) in fragments.iter().enumerate() {
        if fragment.is_empty() {
            debug!(fragment = index, "skipping fragment without rows");
            warnings.push(
                PipelineWarning::new(
                    WarningCode::EmptyFragmentSkipped,
                    "fragment has no rows; skipped",
                )
                .with_fragment(index),
            );
            continue;
        }

        let continues = current
            .as_ref()
            .is_some_and(|open| is_continuation(open, fragment, continuation_prefix));

        if continues && let Some(open) = current.as_mut() {
            if fragment.headers.len() != open.headers.len() {
                warn!(
                    fragment = index,
                    expected = open.headers.len(),
                    found = fragment.headers.len(),
                    "continuation fragment column count differs; rows appended as-is"
                );
                warnings.push(
                    PipelineWarning::new(
                        WarningCode::ContinuationWidthMismatch,
                        format!(
                            "continuation has {} columns but the table has {}; cells may be misaligned",
                            fragment.headers.len(),
                            open.headers.len()
                        ),
                    )
                    .with_fragment(index)
                    .with_table_id(tables.len() + 1),
                );
            }
            debug!(fragment = index, rows = fragment.rows.len(), "appending continuation");
            open.rows.extend(fragment.rows.iter().cloned());
            continue;
        }

        debug!(fragment = index, "opening new table");
        if let Some(finished) = current.replace(LogicalTable::from(fragment.clone())) {
            tables.push(finished);
        }
    }

    tables.extend(current);
    tables
}

fn is_continuation(open: &LogicalTable, fragment: &RawFragment, continuation_prefix: &str) -> bool {
    fragment.headers == open.headers
        || fragment
            .headers
            .first()
            .is_some_and(|header| header.starts_with(continuation_prefix))
}
