use chrono::{DateTime, Local};

use crate::error::PipelineError;

/// Header prefix the extractor gives to columns it could not label. A fragment
/// whose first header starts with it continues the previous table.
pub const DEFAULT_CONTINUATION_PREFIX: &str = "Unnamed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    pub delimiter: u8,
    pub continuation_prefix: String,
    pub include_summary: bool,
    /// Timestamp in the combined summary file name.
    pub summary_stamp: DateTime<Local>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            continuation_prefix: DEFAULT_CONTINUATION_PREFIX.to_string(),
            include_summary: true,
            summary_stamp: Local::now(),
        }
    }
}

impl PipelineOptions {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !self.delimiter.is_ascii() {
            return Err(PipelineError::InvalidOption(
                "delimiter must be a single ASCII character".to_string(),
            ));
        }
        if self.continuation_prefix.is_empty() {
            return Err(PipelineError::InvalidOption(
                "continuation prefix cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
