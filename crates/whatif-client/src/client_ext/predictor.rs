use super::unavailable;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use whatif_core::analytics::percentage_return;
use whatif_core::prediction::{Confidence, PredictionRequest, PredictionResult};
use whatif_core::{Error, Result};

/// `{base}/predict`, whether or not `base` ends in a slash.
pub fn predict_url(base: &str) -> String {
    format!("{}/predict", base.trim_end_matches('/'))
}

pub trait ClientPredictExt {
    fn predict(
        &self,
        url: &str,
        request: &PredictionRequest,
    ) -> impl Future<Output = Result<PredictionResult>> + Send;
}

impl ClientPredictExt for Client {
    /// POST the trailing window and read back the forecast.
    async fn predict(&self, url: &str, request: &PredictionRequest) -> Result<PredictionResult> {
        log::debug!("Requesting prediction for {} days from {url}", request.recent_data.len());
        let response = self
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| unavailable(url, e))?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| unavailable(url, e))?;

        // the backend reports model errors as `status: "error"`, sometimes with a 5xx
        let parsed = serde_json::from_slice::<PredictionResponse>(&body);
        if let Ok(PredictionResponse { status: Some(s), message, .. }) = &parsed {
            if s == "error" {
                let message = message.clone().unwrap_or_else(|| "no detail given".into());
                log::warn!("Predictor rejected the request: {message}");
                return Err(Error::PredictionRejected(message));
            }
        }
        if !status.is_success() {
            return Err(Error::BackendUnavailable(format!("{url} answered {status}")));
        }

        let base_close = request.recent_data.last().map(|row| row[3]);
        parsed?.into_result(base_close)
    }
}

/// Response of the `/predict` endpoint.
///
/// ```json
/// {
///     "predicted_price": 196.42,
///     "predicted_return_percentage": 1.23,
///     "confidence": "MEDIUM"
/// }
/// ```
///
/// or, on failure, `{ "status": "error", "message": "..." }`.
#[derive(Deserialize, Serialize, Debug, Default)]
pub struct PredictionResponse {
    pub predicted_price: Option<f64>,
    pub predicted_return_percentage: Option<f64>,
    pub confidence: Option<Confidence>,
    pub status: Option<String>,
    pub message: Option<String>,
}

impl PredictionResponse {
    /// Validate the fields a successful prediction must carry. A missing
    /// return is recomputed from `base_close` when one is known.
    pub fn into_result(self, base_close: Option<f64>) -> Result<PredictionResult> {
        if self.status.as_deref() == Some("error") {
            return Err(Error::PredictionRejected(
                self.message.unwrap_or_else(|| "no detail given".into()),
            ));
        }

        let predicted_price = self
            .predicted_price
            .ok_or_else(|| Error::MalformedResponse("missing predicted_price".into()))?;
        if !(predicted_price.is_finite() && predicted_price > 0.0) {
            return Err(Error::MalformedResponse(format!(
                "predicted_price must be a positive price, got {predicted_price}"
            )));
        }
        let confidence = self
            .confidence
            .ok_or_else(|| Error::MalformedResponse("missing confidence".into()))?;
        let predicted_return_pct = match (self.predicted_return_percentage, base_close) {
            (Some(pct), _) => pct,
            (None, Some(base)) => {
                log::debug!("Predictor sent no return; computing it from close {base}");
                percentage_return(base, predicted_price)?
            }
            (None, None) => {
                return Err(Error::MalformedResponse(
                    "missing predicted_return_percentage".into(),
                ))
            }
        };

        Ok(PredictionResult {
            predicted_price,
            predicted_return_pct,
            confidence,
        })
    }
}
