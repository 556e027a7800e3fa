mod common;

use serde_json::json;
use std::time::Duration;
use whatif_client::dashboard::{Dashboard, FeedStatus, HttpMarketSource, HttpPredictor, Predictor};
use whatif_client::prelude::*;
use whatif_core::prediction::{Confidence, PredictionRequest};
use whatif_core::{Error, WhatIf};

fn client() -> Client {
    build_client("whatif-tests", Duration::from_secs(5)).unwrap()
}

fn chart(days: usize, null_volume_at: Option<usize>) -> String {
    let timestamps: Vec<i64> = (0..days as i64).map(|i| 1_700_000_000 + i * 86_400).collect();
    let closes: Vec<f64> = (0..days).map(|i| 180.0 + i as f64).collect();
    let volume: Vec<serde_json::Value> = (0..days)
        .map(|i| {
            if Some(i) == null_volume_at {
                serde_json::Value::Null
            } else {
                json!(40_000_000 + i)
            }
        })
        .collect();
    json!({
        "chart": {
            "result": [{
                "meta": { "currency": "USD", "symbol": "AAPL" },
                "timestamp": timestamps,
                "indicators": {
                    "quote": [{
                        "open": closes.iter().map(|c| c - 0.5).collect::<Vec<_>>(),
                        "high": closes.iter().map(|c| c + 1.5).collect::<Vec<_>>(),
                        "low": closes.iter().map(|c| c - 1.5).collect::<Vec<_>>(),
                        "close": closes,
                        "volume": volume,
                    }]
                }
            }],
            "error": null
        }
    })
    .to_string()
}

fn request(days: usize) -> PredictionRequest {
    PredictionRequest {
        recent_data: (0..days)
            .map(|i| [100.0, 101.0, 99.0, 100.0 + i as f64, 1_000.0])
            .collect(),
    }
}

#[tokio::test]
async fn market_feed_drops_incomplete_days() {
    let (url, server) = common::serve(vec![(200, chart(10, Some(4)))]).await;

    let series = client().fetch_series(&url).await.unwrap();

    assert_eq!(series.len(), 9);
    assert!(!series.closes().contains(&184.0));
    assert_eq!(series.last().unwrap().close, 189.0);
    server.await.unwrap();
}

#[tokio::test]
async fn unknown_ticker_is_reported_as_unavailable() {
    let body = json!({
        "chart": {
            "result": null,
            "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" }
        }
    })
    .to_string();
    let (url, _server) = common::serve(vec![(404, body)]).await;

    match client().fetch_series(&url).await {
        Err(Error::BackendUnavailable(msg)) => assert!(msg.contains("delisted"), "{msg}"),
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test]
async fn garbage_market_body_is_malformed() {
    let (url, _server) = common::serve(vec![(200, "<html>proxy error</html>".into())]).await;

    assert!(matches!(
        client().fetch_series(&url).await,
        Err(Error::MalformedResponse(_))
    ));
}

#[tokio::test]
async fn prediction_posts_the_window_verbatim() {
    let body = json!({
        "predicted_price": 175.5,
        "predicted_return_percentage": 0.75,
        "confidence": "MEDIUM"
    })
    .to_string();
    let (url, server) = common::serve(vec![(200, body)]).await;

    let result = client().predict(&url, &request(3)).await.unwrap();
    assert_eq!(result.predicted_price, 175.5);
    assert_eq!(result.confidence, Confidence::Medium);

    let sent: serde_json::Value = serde_json::from_str(&server.await.unwrap()[0]).unwrap();
    assert_eq!(sent["recent_data"].as_array().unwrap().len(), 3);
    assert_eq!(sent["recent_data"][2], json!([100.0, 101.0, 99.0, 102.0, 1000.0]));
}

#[tokio::test]
async fn error_status_is_a_rejection_even_with_a_500() {
    let body = json!({ "status": "error", "message": "Input contains NaN" }).to_string();
    let (url, _server) = common::serve(vec![(500, body)]).await;

    assert_eq!(
        client().predict(&url, &request(3)).await,
        Err(Error::PredictionRejected("Input contains NaN".into()))
    );
}

#[tokio::test]
async fn plain_503_is_unavailable() {
    let (url, _server) = common::serve(vec![(503, "Service waking up".into())]).await;

    assert!(matches!(
        client().predict(&url, &request(3)).await,
        Err(Error::BackendUnavailable(_))
    ));
}

#[tokio::test]
async fn silent_backend_times_out() {
    let url = common::black_hole().await;
    let client = build_client("whatif-tests", Duration::from_millis(200)).unwrap();

    let err = client.predict(&url, &request(3)).await.unwrap_err();
    assert!(err.is_transient(), "{err:?}");
}

#[tokio::test]
async fn predictor_retries_a_cold_start() {
    let ok = json!({
        "predicted_price": 101.0,
        "predicted_return_percentage": 1.0,
        "confidence": "HIGH"
    })
    .to_string();
    let (url, server) = common::serve(vec![(503, String::new()), (200, ok)]).await;
    let predictor = HttpPredictor {
        client: client(),
        url,
        retries: 1,
        retry_delay: Duration::from_millis(10),
    };

    let result = predictor.predict(&request(5)).await.unwrap();
    assert_eq!(result.confidence, Confidence::High);
    assert_eq!(server.await.unwrap().len(), 2);
}

#[tokio::test]
async fn rejections_are_not_retried() {
    let body = json!({ "status": "error", "message": "bad window" }).to_string();
    let (url, _server) = common::serve(vec![(200, body)]).await;
    let predictor = HttpPredictor {
        client: client(),
        url,
        retries: 3,
        retry_delay: Duration::from_millis(10),
    };

    assert_eq!(
        predictor.predict(&request(5)).await,
        Err(Error::PredictionRejected("bad window".into()))
    );
}

#[tokio::test]
async fn dashboard_runs_a_full_cycle() {
    let (market_url, _market) = common::serve(vec![(200, chart(80, None))]).await;
    let forecast = json!({
        "predicted_price": 262.0,
        "predicted_return_percentage": 0.3,
        "confidence": "LOW"
    })
    .to_string();
    let (predict_url, predictor) = common::serve(vec![(200, forecast)]).await;

    let mut dashboard = Dashboard::new(
        HttpMarketSource {
            client: client(),
            url: market_url,
        },
        HttpPredictor {
            client: client(),
            url: predict_url,
            retries: 0,
            retry_delay: Duration::from_millis(10),
        },
    );

    dashboard.refresh().await.unwrap();
    assert_eq!(dashboard.status(), &FeedStatus::Ready);
    assert_eq!(dashboard.store().latest_close(), Some(259.0));

    let result = dashboard
        .predict(WhatIf::new(258.0, 262.0, 255.0, 1_000_000.0))
        .await
        .unwrap();
    assert_eq!(result.signal().to_string(), "NEUTRAL");

    let sent: serde_json::Value = serde_json::from_str(&predictor.await.unwrap()[0]).unwrap();
    let rows = sent["recent_data"].as_array().unwrap();
    assert_eq!(rows.len(), 70);
    assert_eq!(rows[69], json!([258.0, 262.0, 255.0, 259.0, 1000000.0]));

    let frame = dashboard.chart_frame().unwrap();
    assert_eq!(frame.candles.len(), 80);
    assert_eq!(frame.forecast.unwrap().index, 80);
    assert!(frame.sma[19].is_some());
}
