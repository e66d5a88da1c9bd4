use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("Cannot connect to database {path}: {source}")]
    Connect {
        path: PathBuf,
        #[source]
        source: duckdb::Error,
    },

    #[error("Query error: {0}")]
    Query(#[from] duckdb::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl DashboardError {
    /// True when the database could not be reached at all, as opposed to a
    /// query that ran and failed.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, DashboardError::Connect { .. })
    }

    /// Message shown to the user when a pass is aborted.
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::Connect { path, source } => format!(
                "Could not connect to the database at {}: {}",
                path.display(),
                source
            ),
            DashboardError::Query(e) => format!("The query failed: {}", e),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
