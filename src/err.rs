/// Errors raised by the session operations.
///
/// Every variant is turned into a message for the operator at the operation
/// boundary; none of them ends an interactive session.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The input file could not be read or parsed.
    #[error("Failed to load data: {0}")]
    DataLoad(String),
    /// Required columns are absent from the input.
    #[error("Required columns are missing in the data: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("No sample selected")]
    NoSampleSelected,
    #[error("No data loaded")]
    NoDataLoaded,
    /// The sample does not occur in the loaded data.
    #[error("Sample {0} not found in the data")]
    UnknownSample(String),
    /// The marker is not part of the active panel and cannot be edited.
    #[error("Marker {0} is not part of the active panel")]
    MarkerNotInPanel(String),
    /// Another operation of the same kind is still running.
    #[error("{0} already in progress")]
    AlreadyInProgress(&'static str),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// A background task failed to complete.
    #[error("background task failed: {0}")]
    Task(String),
}
