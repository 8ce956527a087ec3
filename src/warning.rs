#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningCode {
    EmptyFragmentSkipped,
    ContinuationWidthMismatch,
    NoTablesDetected,
    NoSummaryColumns,
    NoSummaryRows,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineWarning {
    pub code: WarningCode,
    pub message: String,
    pub source: Option<String>,
    pub fragment: Option<usize>,
    pub table_id: Option<usize>,
}

impl PipelineWarning {
    #[must_use]
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
            fragment: None,
            table_id: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn with_fragment(mut self, fragment: usize) -> Self {
        self.fragment = Some(fragment);
        self
    }

    #[must_use]
    pub fn with_table_id(mut self, table_id: usize) -> Self {
        self.table_id = Some(table_id);
        self
    }
}
