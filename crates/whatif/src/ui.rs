use chrono::DateTime;
use colored::{ColoredString, Colorize};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use whatif_client::dashboard::FeedStatus;
use whatif_core::analytics::{simple_moving_average, Signal};
use whatif_core::chart::{Gauge, GAUGE_RANGE, SMA_WINDOW};
use whatif_core::prediction::PredictionResult;
use whatif_core::{Error, Series};

const GAUGE_WIDTH: usize = 41;

pub fn spinner(msg: &str) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner} {msg} [{elapsed}]")?);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    Ok(pb)
}

pub fn status(status: &FeedStatus, ticker: &str, latest_close: Option<f64>) {
    let badge = match status {
        FeedStatus::Ready => status.to_string().on_green(),
        FeedStatus::Loading => status.to_string().normal(),
        FeedStatus::DataError(_) => status.to_string().on_red(),
    };
    match latest_close {
        Some(close) => println!("{} ${close:.2}  {badge}", ticker.to_uppercase().bold()),
        None => println!("{} --  {badge}", ticker.to_uppercase().bold()),
    }
}

fn date(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.date_naive().to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

/// The last `days` rows of `series`, with the SMA overlay alongside.
pub fn quote_table(series: &Series, days: usize) -> anyhow::Result<()> {
    let sma = simple_moving_average(&series.closes(), SMA_WINDOW)?;
    let start = series.len().saturating_sub(days);

    println!(
        "{:<12} {:>10} {:>10} {:>10} {:>10} {:>14} {:>10}",
        "date", "open", "high", "low", "close", "volume", format!("sma{SMA_WINDOW}")
    );
    for (record, avg) in series.records()[start..].iter().zip(&sma[start..]) {
        let avg = avg.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".into());
        println!(
            "{:<12} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>14} {:>10}",
            date(record.timestamp),
            record.open,
            record.high,
            record.low,
            record.close,
            record.volume,
            avg
        );
    }
    Ok(())
}

fn paint(text: String, signal: Signal) -> ColoredString {
    match signal {
        Signal::StrongBuy => text.green().bold(),
        Signal::StrongSell => text.red().bold(),
        Signal::Neutral => text.yellow(),
    }
}

pub fn prediction(result: &PredictionResult, latest_close: Option<f64>) {
    let signal = result.signal();
    println!();
    println!("  predicted price  {}", format!("${:.2}", result.predicted_price).bold());
    if let Some(close) = latest_close {
        println!("  last close       ${close:.2}");
    }
    println!(
        "  expected return  {}",
        paint(format!("{:+.2}%", result.predicted_return_pct), signal)
    );
    println!("  signal           {}", paint(signal.to_string(), signal));
    println!("  confidence       {}", result.confidence);
    println!("  {}", gauge(&Gauge::new(result.predicted_return_pct)));
}

/// `-5% [-----|--+--|-----] +5%`, needle at the predicted return.
fn gauge(gauge: &Gauge) -> String {
    let half = (GAUGE_WIDTH / 2) as f64;
    let position = (half + gauge.needle / GAUGE_RANGE * half).round() as usize;
    let bar: String = (0..GAUGE_WIDTH)
        .map(|i| if i == position { '|' } else { '-' })
        .collect();
    format!(
        "-{GAUGE_RANGE:.0}% [{}] +{GAUGE_RANGE:.0}%",
        paint(bar, gauge.signal)
    )
}

pub fn failure(e: &Error) {
    eprintln!("{} {e}", "Prediction failed:".red().bold());
    if e.is_transient() {
        eprintln!("Is the prediction backend awake? It sleeps after a period of inactivity; try again with --retries.");
    }
}
