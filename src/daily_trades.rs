use crate::models::{StockResult, Transaction};
use log::warn;
use std::collections::HashMap;

/// Which transactions the report makes visible. Cash accounting always uses
/// the full transaction set regardless of this filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TradeFilter {
    #[default]
    All,
    Buys,
    Sells,
}

/// Presentation order of the finished report. The cash walk itself always
/// runs oldest-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// A transaction tagged with the symbol of the stock result it came from.
#[derive(Debug, Clone)]
pub struct TaggedTransaction {
    pub symbol: String,
    pub transaction: Transaction,
}

/// One calendar day of trading activity with its slice of the running cash
/// balance. Rebuilt from scratch on every call; never persisted.
#[derive(Debug, Clone)]
pub struct DailyAggregate {
    pub date: String,
    /// Transactions surviving the display filter, in flattening order.
    pub transactions: Vec<TaggedTransaction>,
    pub trade_count: usize,
    pub buy_count: usize,
    pub sell_count: usize,
    pub total_buy_amount: f64,
    pub total_sell_amount: f64,
    pub net_cash_flow: f64,
    pub daily_realized_pnl: f64,
    pub cash_before: f64,
    pub cash_after: f64,
    pub cash_change: f64,
}

/// Build the date-ordered daily trade report with a running cash balance.
///
/// The cash walk iterates days oldest-first regardless of `order`, seeds from
/// `starting_capital`, and folds in the *unfiltered* net cash flow of every
/// day, including days the display filter later hides. `cashAfter` of day N
/// therefore always equals `cashBefore` of day N+1 across the chronological
/// sequence.
pub fn build_daily_report(
    stock_results: &[StockResult],
    starting_capital: f64,
    filter: TradeFilter,
    order: SortOrder,
) -> Vec<DailyAggregate> {
    // Step 1: flatten, tag with symbol, drop aborted transactions.
    let mut flattened: Vec<TaggedTransaction> = Vec::new();
    for result in stock_results {
        let symbol = result.symbol();
        for transaction in &result.transactions {
            if transaction.is_aborted() {
                continue;
            }
            flattened.push(TaggedTransaction {
                symbol: symbol.to_string(),
                transaction: transaction.clone(),
            });
        }
    }

    // Step 2: group by the verbatim date string.
    let mut buckets: HashMap<String, Vec<TaggedTransaction>> = HashMap::new();
    for tagged in flattened {
        buckets
            .entry(tagged.transaction.date.clone())
            .or_default()
            .push(tagged);
    }

    let mut days: Vec<DailyAggregate> = buckets
        .into_iter()
        .map(|(date, unfiltered)| {
            // Step 4: monetary figures always come from the unfiltered set.
            let mut total_buy_amount = 0.0;
            let mut total_sell_amount = 0.0;
            let mut daily_realized_pnl = 0.0;
            for tagged in &unfiltered {
                let transaction = &tagged.transaction;
                if transaction.is_buy() {
                    total_buy_amount += transaction.value;
                } else if transaction.is_sell() {
                    total_sell_amount += transaction.value;
                    daily_realized_pnl += transaction.realized_pnl_from_trade.unwrap_or(0.0);
                }
            }
            let net_cash_flow = total_sell_amount - total_buy_amount;

            // Step 3: the filtered view drives only the visible list/counts.
            let visible: Vec<TaggedTransaction> = unfiltered
                .into_iter()
                .filter(|tagged| match filter {
                    TradeFilter::All => true,
                    TradeFilter::Buys => tagged.transaction.is_buy(),
                    TradeFilter::Sells => tagged.transaction.is_sell(),
                })
                .collect();
            let buy_count = visible.iter().filter(|t| t.transaction.is_buy()).count();
            let sell_count = visible.iter().filter(|t| t.transaction.is_sell()).count();

            DailyAggregate {
                date,
                trade_count: visible.len(),
                buy_count,
                sell_count,
                transactions: visible,
                total_buy_amount,
                total_sell_amount,
                net_cash_flow,
                daily_realized_pnl,
                cash_before: 0.0,
                cash_after: 0.0,
                cash_change: 0.0,
            }
        })
        .collect();

    // Steps 5-6: ascending walk fixes the cash fields for every day.
    days.sort_by(|a, b| a.date.cmp(&b.date));
    let mut running_cash = starting_capital;
    for day in days.iter_mut() {
        day.cash_before = running_cash;
        day.cash_after = running_cash + day.net_cash_flow;
        day.cash_change = day.net_cash_flow;
        running_cash = day.cash_after;
    }

    // Step 7: hide days with no visible trades; their cash effect already
    // flowed into later days.
    days.retain(|day| day.trade_count > 0);

    // Step 8: presentation re-sort, cash fields untouched.
    if order == SortOrder::Desc {
        days.reverse();
    }

    days
}

/// Flag mixed date-key formats at the ingestion boundary. Grouping is raw
/// string equality, so a backend emitting `2024-01-02` alongside
/// `2024-01-02T00:00:00` silently fragments one trading day; surface that
/// instead of normalizing.
pub fn validate_date_keys(stock_results: &[StockResult]) -> Vec<String> {
    let mut suspect: Vec<String> = stock_results
        .iter()
        .flat_map(|result| result.transactions.iter())
        .filter(|transaction| !transaction.is_aborted())
        .map(|transaction| transaction.date.as_str())
        .filter(|date| !is_plain_date(date))
        .map(|date| date.to_string())
        .collect();
    suspect.sort();
    suspect.dedup();

    if !suspect.is_empty() {
        warn!(
            "Found {} transaction date key(s) not in YYYY-MM-DD form; same-day trades may split across buckets",
            suspect.len()
        );
    }

    suspect
}

fn is_plain_date(date: &str) -> bool {
    let bytes = date.as_bytes();
    if bytes.len() != 10 {
        return false;
    }
    bytes.iter().enumerate().all(|(index, byte)| match index {
        4 | 7 => *byte == b'-',
        _ => byte.is_ascii_digit(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transaction(date: &str, kind: &str, value: f64, pnl: Option<f64>) -> Transaction {
        Transaction {
            date: date.to_string(),
            kind: kind.to_string(),
            price: 0.0,
            shares: 0.0,
            value,
            realized_pnl_from_trade: pnl,
        }
    }

    fn stock(symbol: &str, transactions: Vec<Transaction>) -> StockResult {
        StockResult {
            symbol: Some(symbol.to_string()),
            transactions,
            ..StockResult::default()
        }
    }

    #[test]
    fn concrete_two_day_scenario() {
        let results = vec![stock(
            "AAPL",
            vec![
                transaction("2024-01-01", "BUY", 1000.0, None),
                transaction("2024-01-02", "SELL", 1200.0, Some(200.0)),
            ],
        )];

        let days = build_daily_report(&results, 100_000.0, TradeFilter::All, SortOrder::Asc);
        assert_eq!(days.len(), 2);

        assert_eq!(days[0].date, "2024-01-01");
        assert!((days[0].cash_before - 100_000.0).abs() < 1e-9);
        assert!((days[0].net_cash_flow + 1000.0).abs() < 1e-9);
        assert!((days[0].cash_after - 99_000.0).abs() < 1e-9);

        assert_eq!(days[1].date, "2024-01-02");
        assert!((days[1].cash_before - 99_000.0).abs() < 1e-9);
        assert!((days[1].net_cash_flow - 1200.0).abs() < 1e-9);
        assert!((days[1].cash_after - 100_200.0).abs() < 1e-9);
        assert!((days[1].daily_realized_pnl - 200.0).abs() < 1e-9);
    }

    #[test]
    fn cash_continuity_holds_across_many_days_and_symbols() {
        let results = vec![
            stock(
                "AAPL",
                vec![
                    transaction("2024-01-03", "SELL", 500.0, Some(40.0)),
                    transaction("2024-01-01", "BUY", 300.0, None),
                ],
            ),
            stock(
                "MSFT",
                vec![
                    transaction("2024-01-02", "BUY", 450.0, None),
                    transaction("2024-01-04", "SELL", 700.0, Some(90.0)),
                ],
            ),
        ];

        let days = build_daily_report(&results, 10_000.0, TradeFilter::All, SortOrder::Asc);
        assert_eq!(days.len(), 4);
        assert!((days[0].cash_before - 10_000.0).abs() < 1e-9);
        for pair in days.windows(2) {
            assert!((pair[0].cash_after - pair[1].cash_before).abs() < 1e-9);
        }
    }

    #[test]
    fn aborted_transactions_change_nothing() {
        let base = vec![stock(
            "AAPL",
            vec![
                transaction("2024-01-01", "BUY", 1000.0, None),
                transaction("2024-01-02", "SELL", 1200.0, Some(200.0)),
            ],
        )];
        let with_aborted = vec![stock(
            "AAPL",
            vec![
                transaction("2024-01-01", "BUY", 1000.0, None),
                transaction("2024-01-01", "BUY (ABORTED)", 9999.0, None),
                transaction("2024-01-02", "SELL", 1200.0, Some(200.0)),
                transaction("2024-01-02", "SELL (ABORTED)", 5000.0, Some(999.0)),
            ],
        )];

        let expected = build_daily_report(&base, 50_000.0, TradeFilter::All, SortOrder::Asc);
        let actual = build_daily_report(&with_aborted, 50_000.0, TradeFilter::All, SortOrder::Asc);

        assert_eq!(expected.len(), actual.len());
        for (left, right) in expected.iter().zip(actual.iter()) {
            assert_eq!(left.trade_count, right.trade_count);
            assert_eq!(left.buy_count, right.buy_count);
            assert_eq!(left.sell_count, right.sell_count);
            assert!((left.total_buy_amount - right.total_buy_amount).abs() < 1e-9);
            assert!((left.total_sell_amount - right.total_sell_amount).abs() < 1e-9);
            assert!((left.cash_before - right.cash_before).abs() < 1e-9);
            assert!((left.cash_after - right.cash_after).abs() < 1e-9);
            assert!((left.daily_realized_pnl - right.daily_realized_pnl).abs() < 1e-9);
        }
    }

    #[test]
    fn display_filter_does_not_move_cash() {
        let results = vec![stock(
            "AAPL",
            vec![
                transaction("2024-01-01", "BUY", 1000.0, None),
                transaction("2024-01-02", "SELL", 1200.0, Some(200.0)),
                transaction("2024-01-03", "BUY", 800.0, None),
            ],
        )];

        let all = build_daily_report(&results, 100_000.0, TradeFilter::All, SortOrder::Asc);
        let sells = build_daily_report(&results, 100_000.0, TradeFilter::Sells, SortOrder::Asc);

        assert_eq!(sells.len(), 1);
        assert_eq!(sells[0].date, "2024-01-02");
        let all_day = all.iter().find(|d| d.date == "2024-01-02").unwrap();
        assert!((sells[0].cash_before - all_day.cash_before).abs() < 1e-9);
        assert!((sells[0].cash_after - all_day.cash_after).abs() < 1e-9);
        // The hidden buy on day 1 still reached day 2's opening balance.
        assert!((sells[0].cash_before - 99_000.0).abs() < 1e-9);
        // Monetary figures stay unfiltered even under a sells-only view.
        assert_eq!(sells[0].buy_count, 0);
        assert!((sells[0].total_sell_amount - 1200.0).abs() < 1e-9);
    }

    #[test]
    fn descending_order_carries_cash_fields_unchanged() {
        let results = vec![stock(
            "AAPL",
            vec![
                transaction("2024-01-01", "BUY", 1000.0, None),
                transaction("2024-01-02", "SELL", 1200.0, Some(200.0)),
            ],
        )];

        let asc = build_daily_report(&results, 100_000.0, TradeFilter::All, SortOrder::Asc);
        let desc = build_daily_report(&results, 100_000.0, TradeFilter::All, SortOrder::Desc);

        assert_eq!(desc[0].date, "2024-01-02");
        assert!((desc[0].cash_before - asc[1].cash_before).abs() < 1e-9);
        assert!((desc[1].cash_after - asc[0].cash_after).abs() < 1e-9);
    }

    #[test]
    fn aggregator_is_idempotent() {
        let results = vec![stock(
            "AAPL",
            vec![
                transaction("2024-01-01", "BUY", 1000.0, None),
                transaction("2024-01-02", "SELL", 1200.0, Some(200.0)),
            ],
        )];

        let first = build_daily_report(&results, 100_000.0, TradeFilter::All, SortOrder::Asc);
        let second = build_daily_report(&results, 100_000.0, TradeFilter::All, SortOrder::Asc);

        assert_eq!(first.len(), second.len());
        for (left, right) in first.iter().zip(second.iter()) {
            assert_eq!(left.date, right.date);
            assert!((left.cash_after - right.cash_after).abs() < 1e-9);
            assert_eq!(left.trade_count, right.trade_count);
        }
    }

    #[test]
    fn empty_inputs_yield_empty_report() {
        let empty: Vec<StockResult> = Vec::new();
        assert!(build_daily_report(&empty, 100_000.0, TradeFilter::All, SortOrder::Asc).is_empty());

        let no_transactions = vec![stock("AAPL", Vec::new()), stock("MSFT", Vec::new())];
        assert!(
            build_daily_report(&no_transactions, 100_000.0, TradeFilter::All, SortOrder::Asc)
                .is_empty()
        );
    }

    #[test]
    fn missing_value_contributes_zero() {
        let results = vec![stock(
            "AAPL",
            vec![
                transaction("2024-01-01", "BUY", 0.0, None),
                transaction("2024-01-01", "SELL", 0.0, None),
            ],
        )];

        let days = build_daily_report(&results, 1_000.0, TradeFilter::All, SortOrder::Asc);
        assert_eq!(days.len(), 1);
        assert!((days[0].net_cash_flow).abs() < 1e-9);
        assert!((days[0].daily_realized_pnl).abs() < 1e-9);
        assert!((days[0].cash_after - 1_000.0).abs() < 1e-9);
    }

    #[test]
    fn mixed_date_formats_fragment_into_separate_buckets() {
        let results = vec![stock(
            "AAPL",
            vec![
                transaction("2024-01-02", "BUY", 100.0, None),
                transaction("2024-01-02T00:00:00", "BUY", 100.0, None),
            ],
        )];

        let days = build_daily_report(&results, 1_000.0, TradeFilter::All, SortOrder::Asc);
        assert_eq!(days.len(), 2);

        let flagged = validate_date_keys(&results);
        assert_eq!(flagged, vec!["2024-01-02T00:00:00".to_string()]);
    }
}
