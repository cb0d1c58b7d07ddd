use crate::daily_trades::DailyAggregate;
use crate::models::{DcaBacktestData, PortfolioBacktestData, StockResult};
use crate::stats::cagr_from_return_percent;
use chrono::NaiveDate;
use std::fmt::Write;

/// Render the daily trade report as a fixed-width table. Cash columns are the
/// values fixed by the chronological walk; row order is whatever the caller
/// asked for.
pub fn render_daily_report(days: &[DailyAggregate], starting_capital: f64) -> String {
    let mut out = String::new();
    writeln!(out, "Starting capital: {:.2}", starting_capital).ok();

    if days.is_empty() {
        writeln!(out, "No trading days match the current filter.").ok();
        return out;
    }

    writeln!(
        out,
        "{:<12} {:>7} {:>6} {:>6} {:>14} {:>14} {:>14} {:>14} {:>14} {:>14}",
        "Date",
        "Trades",
        "Buys",
        "Sells",
        "Buy total",
        "Sell total",
        "Net flow",
        "Realized P&L",
        "Cash before",
        "Cash after"
    )
    .ok();

    let mut total_pnl = 0.0;
    let mut total_trades = 0usize;
    for day in days {
        writeln!(
            out,
            "{:<12} {:>7} {:>6} {:>6} {:>14.2} {:>14.2} {:>14.2} {:>14.2} {:>14.2} {:>14.2}",
            day.date,
            day.trade_count,
            day.buy_count,
            day.sell_count,
            day.total_buy_amount,
            day.total_sell_amount,
            day.net_cash_flow,
            day.daily_realized_pnl,
            day.cash_before,
            day.cash_after
        )
        .ok();
        total_pnl += day.daily_realized_pnl;
        total_trades += day.trade_count;
    }

    writeln!(
        out,
        "{} day(s), {} visible trade(s), realized P&L {:.2}",
        days.len(),
        total_trades,
        total_pnl
    )
    .ok();

    out
}

/// Portfolio summary plus the per-stock breakdown. When the run's date range
/// is known, a back-calculated CAGR column is included.
pub fn render_portfolio_summary(
    data: &PortfolioBacktestData,
    date_range: Option<(NaiveDate, NaiveDate)>,
) -> String {
    let mut out = String::new();

    if let Some(summary) = &data.portfolio_summary {
        writeln!(out, "Total realized P&L: {:.2}", summary.total_realized_pnl).ok();
        writeln!(out, "Total ROI:          {:.2}%", summary.total_roi).ok();
        if summary.final_capital != 0.0 {
            writeln!(out, "Final capital:      {:.2}", summary.final_capital).ok();
        }
        if summary.max_drawdown != 0.0 {
            writeln!(out, "Max drawdown:       {:.2}%", summary.max_drawdown).ok();
        }
    } else {
        writeln!(out, "No portfolio summary returned.").ok();
    }

    if data.stock_results.is_empty() {
        writeln!(out, "No per-stock results returned.").ok();
        return out;
    }

    writeln!(
        out,
        "\n{:<8} {:>10} {:>10} {:>8} {:>14}",
        "Symbol", "Return %", "CAGR %", "Trades", "Realized P&L"
    )
    .ok();
    for stock in &data.stock_results {
        writeln!(out, "{}", render_stock_row(stock, date_range)).ok();
    }

    if !data.rejected_orders.is_empty() {
        writeln!(
            out,
            "\n{} order(s) rejected for insufficient capital:",
            data.rejected_orders.len()
        )
        .ok();
        for order in &data.rejected_orders {
            writeln!(
                out,
                "  {} {} required {:.2}, available {:.2}",
                order.date, order.symbol, order.required_capital, order.available_cash
            )
            .ok();
        }
    }

    out
}

fn render_stock_row(stock: &StockResult, date_range: Option<(NaiveDate, NaiveDate)>) -> String {
    let summary = stock.summary.clone().unwrap_or_default();
    let cagr = date_range
        .map(|(start, end)| cagr_from_return_percent(summary.total_return, start, end))
        .map(|value| format!("{:>10.2}", value))
        .unwrap_or_else(|| format!("{:>10}", "-"));

    format!(
        "{:<8} {:>10.2} {} {:>8} {:>14.2}",
        stock.symbol(),
        summary.total_return,
        cagr,
        summary.num_trades,
        summary.total_realized_pnl
    )
}

pub fn render_dca_metrics(symbol: &str, data: &DcaBacktestData) -> String {
    let mut out = String::new();
    writeln!(out, "Backtest metrics for {}", symbol).ok();
    writeln!(out, "  Total return:     {:.2}%", data.total_return).ok();
    writeln!(out, "  Max drawdown:     {:.2}%", data.max_drawdown).ok();
    writeln!(out, "  Sharpe ratio:     {:.3}", data.sharpe_ratio).ok();
    writeln!(out, "  Trades:           {}", data.num_trades).ok();
    writeln!(out, "  Final capital:    {:.2}", data.final_capital).ok();
    writeln!(
        out,
        "  Suitability:      {:.1} ({})",
        data.dca_suitability_score,
        interpret_suitability(data.dca_suitability_score)
    )
    .ok();
    writeln!(
        out,
        "  Buys/sells:       {}/{} (avg {:.2} / {:.2})",
        data.total_buys, data.total_sells, data.avg_buy_price, data.avg_sell_price
    )
    .ok();
    out
}

fn interpret_suitability(score: f64) -> &'static str {
    if score < 30.0 {
        "poor candidate"
    } else if score < 50.0 {
        "fair candidate"
    } else if score < 70.0 {
        "good candidate"
    } else {
        "excellent candidate"
    }
}
