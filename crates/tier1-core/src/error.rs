use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Tier1Error {
    #[error("table extraction failed: {0}")]
    Extraction(String),

    #[error("pdftotext not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    PdftotextNotFound,

    #[error("pdftotext failed with exit code {code}: {stderr}")]
    PdftotextFailed { code: i32, stderr: String },

    #[error("unsupported guideline document: {0}")]
    UnsupportedDocument(String),

    #[error("failed to parse input: {0}")]
    ParseError(String),

    #[error("invalid page range '{0}' (expected e.g. \"43-48\" or \"12\")")]
    InvalidPageRange(String),

    #[error("failed to load comparison rules from {path}: {reason}")]
    RulesLoad { path: PathBuf, reason: String },

    #[error("invalid comparison rules: {0}")]
    RulesInvalid(String),

    #[error("table '{table}' is missing required column '{column}'")]
    MissingColumn { table: String, column: String },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
