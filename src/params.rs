use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Human-facing percentage (`10` meaning 10%) to the decimal fraction the
/// backend expects (`0.10`). Applied exactly once, at submission.
pub fn percent_to_decimal(percent: f64) -> f64 {
    percent * 0.01
}

/// Inverse conversion, applied when loading backend values for editing.
pub fn decimal_to_percent(decimal: f64) -> f64 {
    decimal * 100.0
}

/// Strategy parameters in human (percentage) form. The long/short split is a
/// tagged union rather than a field-probed map: the two modes carry different
/// knobs and the discriminant travels on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum StrategyParams {
    #[serde(rename = "long")]
    Long(LongStrategyParams),
    #[serde(rename = "short")]
    Short(ShortStrategyParams),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LongStrategyParams {
    /// Grid spacing between staged buys, percent.
    pub grid_spacing: f64,
    /// Per-lot profit target, percent.
    pub profit_target: f64,
    #[serde(default)]
    pub enable_momentum_sell: bool,
    #[serde(default)]
    pub momentum_lookback_period: Option<u32>,
    #[serde(default)]
    pub enable_trailing_stop_buy: bool,
    /// Trailing stop distance below the local low, percent.
    #[serde(default)]
    pub trailing_stop_buy_distance: Option<f64>,
}

impl Default for LongStrategyParams {
    fn default() -> Self {
        Self {
            grid_spacing: 10.0,
            profit_target: 5.0,
            enable_momentum_sell: false,
            momentum_lookback_period: Some(20),
            enable_trailing_stop_buy: false,
            trailing_stop_buy_distance: Some(5.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortStrategyParams {
    /// Grid spacing between staged short entries, percent.
    pub grid_spacing: f64,
    /// Per-lot cover target, percent.
    pub cover_target: f64,
    #[serde(default)]
    pub enable_momentum_cover: bool,
    /// Trailing stop distance above the local high, percent.
    #[serde(default)]
    pub trailing_stop_short_distance: Option<f64>,
}

impl StrategyParams {
    pub fn validate(&self) -> Result<()> {
        let (grid, target, label) = match self {
            StrategyParams::Long(params) => {
                (params.grid_spacing, params.profit_target, "profit target")
            }
            StrategyParams::Short(params) => {
                (params.grid_spacing, params.cover_target, "cover target")
            }
        };
        if !grid.is_finite() || grid <= 0.0 || grid > 100.0 {
            return Err(anyhow!(
                "grid spacing must be a percentage in (0, 100] (value: {})",
                grid
            ));
        }
        if !target.is_finite() || target <= 0.0 || target > 100.0 {
            return Err(anyhow!(
                "{} must be a percentage in (0, 100] (value: {})",
                label,
                target
            ));
        }
        Ok(())
    }

    /// Wire form: every percentage field scaled to its decimal fraction.
    /// Field names match the backend contract verbatim.
    pub fn to_payload(&self) -> Value {
        match self {
            StrategyParams::Long(params) => json!({
                "mode": "long",
                "gridSpacing": percent_to_decimal(params.grid_spacing),
                "profitTarget": percent_to_decimal(params.profit_target),
                "enableMomentumSell": params.enable_momentum_sell,
                "momentumLookbackPeriod": params.momentum_lookback_period,
                "enableTrailingStopBuy": params.enable_trailing_stop_buy,
                "trailingStopBuyDistance": params
                    .trailing_stop_buy_distance
                    .map(percent_to_decimal),
            }),
            StrategyParams::Short(params) => json!({
                "mode": "short",
                "gridSpacing": percent_to_decimal(params.grid_spacing),
                "coverTarget": percent_to_decimal(params.cover_target),
                "enableMomentumCover": params.enable_momentum_cover,
                "trailingStopShortDistance": params
                    .trailing_stop_short_distance
                    .map(percent_to_decimal),
            }),
        }
    }
}

/// Per-stock slice of a portfolio request. Allocation is edited as a percent
/// of portfolio capital and submitted as a fraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAllocation {
    pub symbol: String,
    pub allocation_pct: f64,
}

/// Portfolio backtest request in human form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioBacktestRequest {
    pub stocks: Vec<StockAllocation>,
    pub start_date: String,
    pub end_date: String,
    pub initial_capital: f64,
    pub enable_beta_capital_allocation: bool,
    pub params: StrategyParams,
    /// Set when the parameter values were loaded from a backend payload and
    /// are already decimal-scaled. The payload builder then forces the
    /// beta-scaling flag off so the backend cannot scale them a second time.
    #[serde(default)]
    pub parameters_prescaled: bool,
}

impl PortfolioBacktestRequest {
    pub fn validate(&self) -> Result<()> {
        if self.stocks.is_empty() {
            return Err(anyhow!("portfolio requires at least one stock"));
        }
        if !self.initial_capital.is_finite() || self.initial_capital < 0.0 {
            return Err(anyhow!(
                "initial capital must be non-negative (value: {})",
                self.initial_capital
            ));
        }
        let total: f64 = self.stocks.iter().map(|stock| stock.allocation_pct).sum();
        if !(99.9..=100.1).contains(&total) {
            return Err(anyhow!(
                "stock allocations must sum to 100% (got {:.2}%)",
                total
            ));
        }
        self.params.validate()
    }

    pub fn to_payload(&self) -> Value {
        let stocks: Vec<Value> = self
            .stocks
            .iter()
            .map(|stock| {
                json!({
                    "symbol": stock.symbol,
                    "allocation": percent_to_decimal(stock.allocation_pct),
                })
            })
            .collect();

        // Already-scaled parameters must never be beta-scaled again.
        let enable_beta_scaling = !self.parameters_prescaled;

        json!({
            "stocks": stocks,
            "startDate": self.start_date,
            "endDate": self.end_date,
            "initialCapital": self.initial_capital,
            "enableBetaCapitalAllocation": self.enable_beta_capital_allocation,
            "enableBetaScaling": enable_beta_scaling,
            "parameters": self.params.to_payload(),
        })
    }
}

/// Single-stock DCA backtest request. This endpoint predates the portfolio
/// one and takes snake_case keys; the mismatch is part of the contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DcaBacktestRequest {
    pub symbol: String,
    pub start_date: String,
    pub end_date: String,
    pub initial_capital: f64,
    pub params: StrategyParams,
}

impl DcaBacktestRequest {
    pub fn validate(&self) -> Result<()> {
        if self.symbol.trim().is_empty() {
            return Err(anyhow!("symbol must not be empty"));
        }
        if !self.initial_capital.is_finite() || self.initial_capital < 0.0 {
            return Err(anyhow!(
                "initial capital must be non-negative (value: {})",
                self.initial_capital
            ));
        }
        self.params.validate()
    }

    pub fn to_payload(&self) -> Result<Value> {
        let StrategyParams::Long(params) = &self.params else {
            return Err(anyhow!("the single-stock endpoint only runs long DCA"));
        };

        Ok(json!({
            "symbol": self.symbol,
            "start_date": self.start_date,
            "end_date": self.end_date,
            "initial_capital": self.initial_capital,
            "grid_spacing": percent_to_decimal(params.grid_spacing),
            "profit_target": percent_to_decimal(params.profit_target),
            "enable_momentum_sell": params.enable_momentum_sell,
            "momentum_lookback_period": params.momentum_lookback_period,
            "enable_trailing_stop_buy": params.enable_trailing_stop_buy,
            "trailing_stop_buy_distance": params
                .trailing_stop_buy_distance
                .map(percent_to_decimal),
        }))
    }
}

/// Batch sweep over a grid of long-strategy parameter combinations, all in
/// percent form. The cross product goes to the backend in one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepRequest {
    pub symbol: String,
    pub start_date: String,
    pub end_date: String,
    pub initial_capital: f64,
    pub grid_spacings: Vec<f64>,
    pub profit_targets: Vec<f64>,
    #[serde(default)]
    pub momentum_variants: Vec<bool>,
}

impl SweepRequest {
    pub fn validate(&self) -> Result<()> {
        if self.symbol.trim().is_empty() {
            return Err(anyhow!("symbol must not be empty"));
        }
        if self.grid_spacings.is_empty() || self.profit_targets.is_empty() {
            return Err(anyhow!(
                "sweep needs at least one grid spacing and one profit target"
            ));
        }
        for value in self.grid_spacings.iter().chain(self.profit_targets.iter()) {
            if !value.is_finite() || *value <= 0.0 || *value > 100.0 {
                return Err(anyhow!(
                    "sweep values must be percentages in (0, 100] (value: {})",
                    value
                ));
            }
        }
        Ok(())
    }

    pub fn combination_count(&self) -> usize {
        let momentum = self.momentum_variants.len().max(1);
        self.grid_spacings.len() * self.profit_targets.len() * momentum
    }

    pub fn to_payload(&self) -> Value {
        let momentum_variants: &[bool] = if self.momentum_variants.is_empty() {
            &[false]
        } else {
            &self.momentum_variants
        };

        let mut combinations = Vec::with_capacity(self.combination_count());
        for spacing in &self.grid_spacings {
            for target in &self.profit_targets {
                for momentum in momentum_variants {
                    combinations.push(json!({
                        "gridSpacing": percent_to_decimal(*spacing),
                        "profitTarget": percent_to_decimal(*target),
                        "enableMomentumSell": momentum,
                    }));
                }
            }
        }

        json!({
            "symbol": self.symbol,
            "startDate": self.start_date,
            "endDate": self.end_date,
            "initialCapital": self.initial_capital,
            "parameterCombinations": combinations,
        })
    }
}
