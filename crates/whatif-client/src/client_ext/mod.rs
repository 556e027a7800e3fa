/// Daily price history from the Yahoo! Finance chart API.
pub mod yahoo_finance;

/// The remote `/predict` endpoint.
pub mod predictor;

pub use reqwest::Client;

use whatif_core::Error;

/// Transport failures (refused connections, timeouts, truncated bodies) all
/// mean the collaborator could not be reached.
pub(crate) fn unavailable(url: &str, e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::BackendUnavailable(format!("{url} timed out: {e}"))
    } else {
        Error::BackendUnavailable(format!("{url}: {e}"))
    }
}
