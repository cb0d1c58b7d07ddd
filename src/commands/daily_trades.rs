use crate::commands::portfolio::{execute, PortfolioSource};
use crate::context::AppContext;
use crate::daily_trades::{build_daily_report, validate_date_keys, SortOrder, TradeFilter};
use crate::report::render_daily_report;
use anyhow::Result;
use log::warn;

pub async fn run(
    app: &AppContext,
    source: PortfolioSource,
    starting_capital: Option<f64>,
    filter: TradeFilter,
    order: SortOrder,
) -> Result<()> {
    let data = execute(app, source).await?;

    let starting_capital = starting_capital
        .or_else(|| {
            data.portfolio_summary
                .as_ref()
                .map(|summary| summary.starting_capital)
                .filter(|value| *value > 0.0)
        })
        .unwrap_or_else(|| {
            warn!("No starting capital given or found in the result; cash walk seeds from 0");
            0.0
        });

    let suspect_dates = validate_date_keys(&data.stock_results);
    for date in &suspect_dates {
        warn!("Non-standard transaction date key: {}", date);
    }

    let days = build_daily_report(&data.stock_results, starting_capital, filter, order);
    print!("{}", render_daily_report(&days, starting_capital));
    Ok(())
}
