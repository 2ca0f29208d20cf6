use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Warehouse error: {0}")]
    Warehouse(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Metric '{metric}' registered by both '{first}' and '{second}'")]
    DuplicateMetric {
        metric: String,
        first:  String,
        second: String,
    },

    #[error("Flag evaluation failed for '{flag}': {detail}")]
    FlagEvaluation { flag: String, detail: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;
