use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Unexpected status {status} from {url}")]
    Status { status: StatusCode, url: String },
    #[error("Giving up on {url} after {attempts} attempts, last status {status}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        status: StatusCode,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a table row produced no record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    #[error("row has {found} cells, expected at least {expected}")]
    TooFewCells { found: usize, expected: usize },
    #[error("<{element}> is missing its `{attr}` attribute")]
    MissingAttribute {
        element: &'static str,
        attr: &'static str,
    },
}

impl SkipReason {
    /// Short rows are spacer/ad rows and are dropped without a warning.
    pub fn is_silent(&self) -> bool {
        matches!(self, SkipReason::TooFewCells { .. })
    }
}
