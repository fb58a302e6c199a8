//! hn-results: recorded time series and the on-disk run store.

pub mod hash;
pub mod recorder;
pub mod store;
pub mod types;

pub use hash::compute_run_id;
pub use recorder::{Frame, ProfileHistory, Recorder, RecorderLayout};
pub use store::RunStore;
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Run not found: {run_id}")]
    RunNotFound { run_id: String },

    #[error("Table {table} expects {expected} values per row, got {got}")]
    Shape {
        table: String,
        expected: usize,
        got: usize,
    },

    #[error("Malformed table {table}: {reason}")]
    Malformed { table: String, reason: String },
}
