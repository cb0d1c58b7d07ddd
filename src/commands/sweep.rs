use crate::commands::request_spinner;
use crate::context::AppContext;
use crate::models::BatchResultEntry;
use crate::params::{decimal_to_percent, SweepRequest};
use crate::ranking::{self, Rankable};
use crate::stats::summarize_returns;
use anyhow::{anyhow, Result};
use futures::future::join_all;
use log::{info, warn};

/// One sweep result row after tagging with its symbol: the unit the top-N
/// ranking operates on.
#[derive(Debug, Clone)]
pub struct SweepRow {
    pub symbol: String,
    pub grid_spacing_pct: f64,
    pub profit_target_pct: f64,
    pub momentum: bool,
    pub total_return: Option<f64>,
    pub sharpe_ratio: f64,
    pub num_trades: i64,
}

impl SweepRow {
    fn from_entry(symbol: &str, entry: &BatchResultEntry) -> Self {
        Self {
            symbol: symbol.to_string(),
            grid_spacing_pct: decimal_to_percent(entry.parameters.grid_spacing),
            profit_target_pct: decimal_to_percent(entry.parameters.profit_target),
            momentum: entry.parameters.enable_momentum_sell,
            total_return: entry.total_return,
            sharpe_ratio: entry.sharpe_ratio,
            num_trades: entry.num_trades,
        }
    }
}

impl Rankable for SweepRow {
    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn ranking_figure(&self) -> Option<f64> {
        self.total_return
    }
}

pub struct SweepArgs {
    pub symbols: Vec<String>,
    pub start_date: String,
    pub end_date: String,
    pub initial_capital: f64,
    pub grid_spacings: Vec<f64>,
    pub profit_targets: Vec<f64>,
    pub with_momentum_variants: bool,
    pub top: usize,
    pub per_symbol: bool,
}

pub async fn run(app: &AppContext, args: &SweepArgs) -> Result<()> {
    if args.symbols.is_empty() {
        return Err(anyhow!("sweep needs at least one symbol"));
    }
    let backend = app.backend()?;

    let requests: Vec<SweepRequest> = args
        .symbols
        .iter()
        .map(|symbol| SweepRequest {
            symbol: symbol.clone(),
            start_date: args.start_date.clone(),
            end_date: args.end_date.clone(),
            initial_capital: args.initial_capital,
            grid_spacings: args.grid_spacings.clone(),
            profit_targets: args.profit_targets.clone(),
            momentum_variants: if args.with_momentum_variants {
                vec![false, true]
            } else {
                vec![false]
            },
        })
        .collect();
    for request in &requests {
        request.validate()?;
    }

    let combinations: usize = requests.iter().map(SweepRequest::combination_count).sum();
    info!(
        "Sweeping {} combination(s) across {} symbol(s)",
        combinations,
        requests.len()
    );

    let spinner = request_spinner("Running parameter sweep");
    let batches = join_all(requests.iter().map(|request| {
        let backend = &backend;
        async move {
            (
                request.symbol.clone(),
                backend.batch_backtest(&request.to_payload()).await,
            )
        }
    }))
    .await;
    spinner.finish_and_clear();

    let mut rows: Vec<SweepRow> = Vec::new();
    let mut failed = 0usize;
    for (symbol, outcome) in batches {
        match outcome {
            Ok(result_set) => rows.extend(
                result_set
                    .results
                    .iter()
                    .map(|entry| SweepRow::from_entry(&symbol, entry)),
            ),
            Err(error) => {
                failed += 1;
                warn!("Sweep failed for {}: {}", symbol, error);
            }
        }
    }
    if rows.is_empty() {
        return Err(anyhow!(
            "sweep produced no results ({} symbol(s) failed)",
            failed
        ));
    }

    let top = if args.per_symbol {
        ranking::top_per_symbol(&rows, args.top)
    } else {
        ranking::top_overall(&rows, args.top)
    };

    println!(
        "{:<8} {:>9} {:>9} {:>9} {:>10} {:>8} {:>7}",
        "Symbol", "Grid %", "Target %", "Momentum", "Return %", "Sharpe", "Trades"
    );
    for row in &top {
        println!(
            "{:<8} {:>9.2} {:>9.2} {:>9} {:>10.2} {:>8.3} {:>7}",
            row.symbol,
            row.grid_spacing_pct,
            row.profit_target_pct,
            if row.momentum { "yes" } else { "no" },
            row.total_return.unwrap_or(0.0),
            row.sharpe_ratio,
            row.num_trades
        );
    }

    let returns: Vec<f64> = rows.iter().filter_map(|row| row.total_return).collect();
    let summary = summarize_returns(&returns);
    println!(
        "\n{} result(s): mean {:.2}%, median {:.2}%, best {:.2}%, worst {:.2}%",
        summary.count, summary.mean, summary.median, summary.best, summary.worst
    );

    Ok(())
}
