use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One executed (or attempted) trade as reported by the backend. Immutable
/// once produced; the `date` string is kept verbatim and used as a grouping
/// key without normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default)]
    pub date: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default, alias = "quantity")]
    pub shares: f64,
    #[serde(default)]
    pub value: f64,
    #[serde(default, rename = "realizedPNLFromTrade")]
    pub realized_pnl_from_trade: Option<f64>,
}

impl Transaction {
    /// Aborted transactions represent attempted-but-not-executed actions and
    /// must not affect any count, total, or cash figure.
    pub fn is_aborted(&self) -> bool {
        self.kind.to_ascii_uppercase().contains("ABORTED")
    }

    pub fn side(&self) -> Option<TradeSide> {
        let upper = self.kind.to_ascii_uppercase();
        if upper.contains("BUY") {
            Some(TradeSide::Buy)
        } else if upper.contains("SELL") {
            Some(TradeSide::Sell)
        } else {
            None
        }
    }

    pub fn is_buy(&self) -> bool {
        matches!(self.side(), Some(TradeSide::Buy))
    }

    pub fn is_sell(&self) -> bool {
        matches!(self.side(), Some(TradeSide::Sell))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeSide {
    Buy,
    Sell,
}

/// Per-run parameters echoed back by the backend inside each stock result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRunParameters {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub grid_spacing: Option<f64>,
    #[serde(default)]
    pub profit_target: Option<f64>,
    #[serde(default)]
    pub beta: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockSummary {
    #[serde(default)]
    pub total_return: f64,
    #[serde(default)]
    pub total_realized_pnl: f64,
    #[serde(default)]
    pub num_trades: i64,
    #[serde(default)]
    pub final_capital: f64,
    #[serde(default)]
    pub max_drawdown: f64,
}

/// One stock's full simulation output. `transactions` may be missing or even
/// non-list in older archived responses; both decode as empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockResult {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub parameters: Option<StockRunParameters>,
    #[serde(default, deserialize_with = "lenient_transactions")]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub summary: Option<StockSummary>,
}

impl StockResult {
    pub fn symbol(&self) -> &str {
        if let Some(symbol) = self.symbol.as_deref() {
            return symbol;
        }
        self.parameters
            .as_ref()
            .and_then(|p| p.symbol.as_deref())
            .unwrap_or("?")
    }
}

fn lenient_transactions<'de, D>(deserializer: D) -> Result<Vec<Transaction>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    match raw {
        Some(Value::Array(entries)) => {
            let mut transactions = Vec::with_capacity(entries.len());
            for entry in entries {
                match serde_json::from_value::<Transaction>(entry) {
                    Ok(transaction) => transactions.push(transaction),
                    Err(error) => warn!("Skipping undecodable transaction: {}", error),
                }
            }
            Ok(transactions)
        }
        Some(other) if !other.is_null() => {
            warn!("Ignoring non-list transactions value: {}", other);
            Ok(Vec::new())
        }
        _ => Ok(Vec::new()),
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    #[serde(default)]
    pub total_realized_pnl: f64,
    #[serde(default)]
    pub total_roi: f64,
    #[serde(default)]
    pub final_capital: f64,
    #[serde(default)]
    pub max_drawdown: f64,
    #[serde(default)]
    pub starting_capital: f64,
}

/// A buy signal the backend could not execute due to insufficient capital.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedOrder {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub required_capital: f64,
    #[serde(default)]
    pub available_cash: f64,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub value: f64,
}

/// Full portfolio backtest payload: summary, per-stock results, and the
/// portfolio-level time series the charts were fed from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioBacktestData {
    #[serde(default, alias = "summary")]
    pub portfolio_summary: Option<PortfolioSummary>,
    #[serde(default)]
    pub stock_results: Vec<StockResult>,
    #[serde(default)]
    pub rejected_orders: Vec<RejectedOrder>,
    #[serde(default)]
    pub portfolio_composition: Vec<SeriesPoint>,
    #[serde(default)]
    pub capital_utilization: Vec<SeriesPoint>,
    #[serde(default)]
    pub capital_deployment: Vec<SeriesPoint>,
}

/// Single-stock DCA backtest metrics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DcaBacktestData {
    #[serde(default)]
    pub total_return: f64,
    #[serde(default)]
    pub max_drawdown: f64,
    #[serde(default)]
    pub sharpe_ratio: f64,
    #[serde(default)]
    pub num_trades: i64,
    #[serde(default)]
    pub final_capital: f64,
    #[serde(default)]
    pub dca_suitability_score: f64,
    #[serde(default)]
    pub total_buys: i64,
    #[serde(default)]
    pub total_sells: i64,
    #[serde(default)]
    pub avg_buy_price: f64,
    #[serde(default)]
    pub avg_sell_price: f64,
    #[serde(default, deserialize_with = "lenient_transactions")]
    pub transactions: Vec<Transaction>,
}

/// One row of a parameter sweep, as returned by the batch endpoint. The
/// backend sends these pre-sorted by the ranking figure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResultEntry {
    #[serde(default)]
    pub parameters: SweepParameters,
    #[serde(default)]
    pub total_return: Option<f64>,
    #[serde(default)]
    pub max_drawdown: f64,
    #[serde(default)]
    pub sharpe_ratio: f64,
    #[serde(default)]
    pub num_trades: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepParameters {
    #[serde(default)]
    pub grid_spacing: f64,
    #[serde(default)]
    pub profit_target: f64,
    #[serde(default)]
    pub enable_momentum_sell: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResultSet {
    #[serde(default)]
    pub results: Vec<BatchResultEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveRecord {
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub test_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub folder: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomatedTestData {
    #[serde(default)]
    pub archive_path: String,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub frontend_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetaInfo {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub beta: Option<f64>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetaCalculation {
    #[serde(default)]
    pub beta: f64,
    #[serde(default)]
    pub correlation: f64,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockListing {
    #[serde(default)]
    pub stocks: Vec<String>,
    #[serde(default)]
    pub total_count: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockInfo {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub beta: Option<f64>,
    #[serde(default)]
    pub first_date: Option<String>,
    #[serde(default)]
    pub last_date: Option<String>,
    #[serde(default)]
    pub total_days: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    #[serde(default)]
    pub database: bool,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub uptime: f64,
}

/// JSON envelope every backend endpoint wraps its payload in. A missing
/// payload on success is the "no data" condition, not a decode error.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default, alias = "results", alias = "archives")]
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}
