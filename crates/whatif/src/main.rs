use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use whatif_client::prelude::*;
use whatif_core::chart::ChartFrame;
use whatif_core::WhatIf;

mod cli;
mod ui;

fn preprocess(level: log::LevelFilter) {
    // grant access to .env
    dotenv::dotenv().ok();

    // initialise logger
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn write_chart(frame: &ChartFrame, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            serde_json::to_writer_pretty(file, frame)?;
            log::info!("Chart frame written to {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(frame)?),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    preprocess(cli.trace.into());
    log::debug!("Command line input recorded: {cli:#?}");

    let config = cli.configure(Config::from_env());
    log::debug!("Configuration: {config:#?}");
    let mut dashboard = Dashboard::from_config(&config)?;

    // every command starts from a fresh fetch
    let pb = ui::spinner(&format!("Fetching {} ...", config.ticker))?;
    let refreshed = dashboard.refresh().await;
    pb.finish_and_clear();

    // cli framework:
    // "> whatif <COMMAND>"
    match &cli.command {
        // "> whatif quote [--days N]"
        cli::Commands::Quote { days } => {
            ui::status(dashboard.status(), &config.ticker, dashboard.store().latest_close());
            refreshed?;
            ui::quote_table(dashboard.store().live(), *days)?;
        }

        // "> whatif predict [--open O --high H --low L --volume V] [--chart FILE] [--json]"
        cli::Commands::Predict {
            open,
            high,
            low,
            volume,
            chart,
            json,
        } => {
            if !json {
                ui::status(dashboard.status(), &config.ticker, dashboard.store().latest_close());
            }
            refreshed?;

            let last_day = dashboard
                .current_what_if()
                .context("no trading days to override")?;
            let what_if = WhatIf::new(
                open.unwrap_or(last_day.open),
                high.unwrap_or(last_day.high),
                low.unwrap_or(last_day.low),
                volume.unwrap_or(last_day.volume),
            );
            log::info!("What-if for the last trading day: {what_if:?}");

            let pb = ui::spinner("Processing ...")?;
            let outcome = dashboard.predict(what_if).await;
            pb.finish_and_clear();

            let result = match outcome {
                Ok(result) => result,
                Err(e) => {
                    ui::failure(&e);
                    return Err(e.into());
                }
            };

            if *json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                ui::prediction(&result, dashboard.store().latest_close());
            }
            if let Some(path) = chart {
                write_chart(&dashboard.chart_frame()?, Some(path.as_path()))?;
            }
        }

        // "> whatif chart [-o FILE]"
        cli::Commands::Chart { output } => {
            refreshed?;
            write_chart(&dashboard.chart_frame()?, output.as_deref())?;
        }
    }

    Ok(())
}
