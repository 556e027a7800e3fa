/// Every failure the store, the analytics and the collaborators can raise.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A series with zero records where at least one was required.
    EmptySeries,
    /// `reset_to_live` called before any successful ingestion.
    NoLiveData,
    InvalidInput(String),
    /// Network failure, timeout or non-success status from a collaborator.
    BackendUnavailable(String),
    /// The collaborator answered, but not in the expected JSON shape.
    MalformedResponse(String),
    /// The predictor answered with `status: "error"`.
    PredictionRejected(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Worth retrying: the collaborator may just be cold-starting.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::BackendUnavailable(_))
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptySeries => write!(f, "empty_series: no complete OHLCV records"),
            Self::NoLiveData => write!(f, "no_live_data: nothing has been ingested yet"),
            Self::InvalidInput(msg) => write!(f, "invalid_input: {msg}"),
            Self::BackendUnavailable(msg) => write!(f, "backend_unavailable: {msg}"),
            Self::MalformedResponse(msg) => write!(f, "malformed_response: {msg}"),
            Self::PredictionRejected(msg) => write!(f, "prediction_rejected: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::MalformedResponse(e.to_string())
    }
}
