use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid row file {0}: expected a JSON array of classified rows")]
    RowFile(String),

    #[error("Unknown issue kind: {0} (expected 'token' or 'market')")]
    UnknownIssueKind(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, WalterError>;
