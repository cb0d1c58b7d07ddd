use crate::commands::request_spinner;
use crate::context::AppContext;
use crate::models::{ApiEnvelope, PortfolioBacktestData};
use crate::params::{PortfolioBacktestRequest, StockAllocation};
use crate::report::render_portfolio_summary;
use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Where a portfolio result set comes from: a fresh run with CLI parameters,
/// a server-side named configuration, or a previously archived response.
pub enum PortfolioSource {
    Request(Box<PortfolioBacktestRequest>),
    Config(String),
    File(PathBuf),
}

pub async fn run(app: &AppContext, source: PortfolioSource) -> Result<()> {
    let date_range = date_range_of(&source);
    let data = execute(app, source).await?;
    print!("{}", render_portfolio_summary(&data, date_range));
    Ok(())
}

/// Fetch (or load) the portfolio result set. Shared with the daily-trades
/// report, which shapes the same payload differently.
pub async fn execute(app: &AppContext, source: PortfolioSource) -> Result<PortfolioBacktestData> {
    match source {
        PortfolioSource::Request(request) => {
            request.validate()?;
            let backend = app.backend()?;
            info!(
                "Running portfolio backtest for {} stock(s) ({} - {})",
                request.stocks.len(),
                request.start_date,
                request.end_date
            );
            let spinner = request_spinner("Running portfolio backtest");
            let outcome = backend.portfolio_backtest(&request.to_payload()).await;
            spinner.finish_and_clear();
            Ok(outcome?)
        }
        PortfolioSource::Config(name) => {
            let backend = app.backend()?;
            info!("Running portfolio backtest from server config '{}'", name);
            let spinner = request_spinner(&format!("Running config backtest '{}'", name));
            let outcome = backend.config_backtest(&name).await;
            spinner.finish_and_clear();
            Ok(outcome?)
        }
        PortfolioSource::File(path) => load_response_file(&path),
    }
}

fn date_range_of(source: &PortfolioSource) -> Option<(NaiveDate, NaiveDate)> {
    let PortfolioSource::Request(request) = source else {
        return None;
    };
    let start = NaiveDate::parse_from_str(&request.start_date, "%Y-%m-%d").ok()?;
    let end = NaiveDate::parse_from_str(&request.end_date, "%Y-%m-%d").ok()?;
    Some((start, end))
}

/// Archived responses come in two shapes: the raw result object, or the full
/// `{success, data}` envelope as saved by the test runner.
fn load_response_file(path: &Path) -> Result<PortfolioBacktestData> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read response file {}", path.display()))?;

    let value: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;

    if value.get("success").is_some() {
        let envelope: ApiEnvelope<PortfolioBacktestData> = serde_json::from_value(value)
            .with_context(|| format!("{} is not a backtest response envelope", path.display()))?;
        if !envelope.success {
            return Err(anyhow!(
                "archived response records a failed run: {}",
                envelope.error.unwrap_or_else(|| "unknown error".to_string())
            ));
        }
        return envelope
            .data
            .ok_or_else(|| anyhow!("archived response contains no result data"));
    }

    serde_json::from_value(value)
        .with_context(|| format!("{} is not a portfolio result object", path.display()))
}

/// Parse `SYMBOL:PCT,...` allocations; bare symbols split the portfolio
/// equally.
pub fn parse_allocations(raw: &str) -> Result<Vec<StockAllocation>> {
    let entries: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect();
    if entries.is_empty() {
        return Err(anyhow!("no stock symbols given"));
    }

    let explicit = entries.iter().any(|entry| entry.contains(':'));
    let equal_share = 100.0 / entries.len() as f64;

    entries
        .into_iter()
        .map(|entry| match entry.split_once(':') {
            Some((symbol, pct)) => {
                let allocation_pct: f64 = pct
                    .trim()
                    .parse()
                    .map_err(|_| anyhow!("invalid allocation '{}'", entry))?;
                Ok(StockAllocation {
                    symbol: symbol.trim().to_uppercase(),
                    allocation_pct,
                })
            }
            None if explicit => Err(anyhow!(
                "mixing weighted and bare symbols is ambiguous ('{}')",
                entry
            )),
            None => Ok(StockAllocation {
                symbol: entry.to_uppercase(),
                allocation_pct: equal_share,
            }),
        })
        .collect()
}
