use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use dca_console::commands::portfolio::{parse_allocations, PortfolioSource};
use dca_console::commands::sweep::SweepArgs;
use dca_console::commands::{
    archives, backtest, beta, daily_trades, health, portfolio, stocks, sweep, testing,
};
use dca_console::context::AppContext;
use dca_console::daily_trades::{SortOrder, TradeFilter};
use dca_console::params::{
    DcaBacktestRequest, LongStrategyParams, PortfolioBacktestRequest, ShortStrategyParams,
    StrategyParams,
};
use log::info;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dca-console")]
#[command(about = "Console for a DCA backtest service: run backtests and shape their results")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Strategy knobs, edited in percent form and converted to decimal fractions
/// at the API boundary.
#[derive(Args, Clone)]
struct StrategyArgs {
    /// Grid spacing between staged entries, percent
    #[arg(long, default_value_t = 10.0)]
    grid_spacing: f64,
    /// Per-lot profit target, percent
    #[arg(long, default_value_t = 5.0)]
    profit_target: f64,
    /// Enable momentum-based selling
    #[arg(long)]
    momentum_sell: bool,
    /// Days in the momentum lookback window
    #[arg(long, default_value_t = 20)]
    momentum_lookback: u32,
    /// Enable trailing-stop buy orders
    #[arg(long)]
    trailing_stop_buy: bool,
    /// Trailing stop distance, percent
    #[arg(long, default_value_t = 5.0)]
    trailing_stop_distance: f64,
    /// Run the short-side strategy variant
    #[arg(long)]
    short: bool,
    /// Per-lot cover target for the short variant, percent
    #[arg(long, default_value_t = 4.0)]
    cover_target: f64,
}

impl StrategyArgs {
    fn to_params(&self) -> StrategyParams {
        if self.short {
            StrategyParams::Short(ShortStrategyParams {
                grid_spacing: self.grid_spacing,
                cover_target: self.cover_target,
                enable_momentum_cover: self.momentum_sell,
                trailing_stop_short_distance: Some(self.trailing_stop_distance),
            })
        } else {
            StrategyParams::Long(LongStrategyParams {
                grid_spacing: self.grid_spacing,
                profit_target: self.profit_target,
                enable_momentum_sell: self.momentum_sell,
                momentum_lookback_period: Some(self.momentum_lookback),
                enable_trailing_stop_buy: self.trailing_stop_buy,
                trailing_stop_buy_distance: Some(self.trailing_stop_distance),
            })
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Check backend and database health
    Health,
    /// Stock inventory and per-symbol metadata
    Stocks {
        #[command(subcommand)]
        command: StocksCommands,
    },
    /// Beta metadata: fetch, override, or recompute
    Beta {
        #[command(subcommand)]
        command: BetaCommands,
    },
    /// Run a single-stock DCA backtest
    Backtest {
        /// Stock ticker symbol
        symbol: String,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start_date: String,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end_date: String,
        /// Initial capital in USD
        #[arg(long, default_value_t = 10_000.0)]
        capital: f64,
        #[command(flatten)]
        strategy: StrategyArgs,
    },
    /// Run a portfolio backtest from CLI parameters or a named server config
    Portfolio {
        /// Server-side portfolio config name
        #[arg(long, conflicts_with = "stocks")]
        config: Option<String>,
        /// Stocks with allocations, e.g. "AAPL:60,MSFT:40" (bare symbols split equally)
        #[arg(long)]
        stocks: Option<String>,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<String>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end_date: Option<String>,
        /// Initial capital in USD
        #[arg(long, default_value_t = 50_000.0)]
        capital: f64,
        /// Scale per-stock capital by beta
        #[arg(long)]
        beta_allocation: bool,
        #[command(flatten)]
        strategy: StrategyArgs,
    },
    /// Daily trade report with a running cash balance
    DailyTrades {
        /// Previously archived api-response.json (no network)
        #[arg(long, conflicts_with_all = ["config", "stocks"])]
        input: Option<PathBuf>,
        /// Server-side portfolio config name
        #[arg(long, conflicts_with = "stocks")]
        config: Option<String>,
        /// Stocks with allocations, e.g. "AAPL:60,MSFT:40"
        #[arg(long)]
        stocks: Option<String>,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<String>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end_date: Option<String>,
        /// Initial capital in USD
        #[arg(long, default_value_t = 50_000.0)]
        capital: f64,
        /// Seed for the cash walk (defaults to the run's starting capital)
        #[arg(long)]
        starting_capital: Option<f64>,
        /// Which trades to show; cash accounting always covers all of them
        #[arg(long, value_enum, default_value_t = TradeFilter::All)]
        filter: TradeFilter,
        /// Presentation order of the finished report
        #[arg(long, value_enum, default_value_t = SortOrder::Asc)]
        order: SortOrder,
        #[command(flatten)]
        strategy: StrategyArgs,
    },
    /// Sweep a parameter grid and rank the results
    Sweep {
        /// Symbols to sweep
        #[arg(long, value_delimiter = ',', num_args = 1..)]
        symbols: Vec<String>,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start_date: String,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end_date: String,
        /// Initial capital in USD
        #[arg(long, default_value_t = 10_000.0)]
        capital: f64,
        /// Grid spacing values to test, percent
        #[arg(long, value_delimiter = ',', num_args = 1.., default_values_t = [5.0, 10.0, 15.0])]
        grid_spacings: Vec<f64>,
        /// Profit target values to test, percent
        #[arg(long, value_delimiter = ',', num_args = 1.., default_values_t = [3.0, 5.0, 7.0])]
        profit_targets: Vec<f64>,
        /// Also test each combination with momentum selling enabled
        #[arg(long)]
        momentum_variants: bool,
        /// How many results to keep
        #[arg(long, default_value_t = 5)]
        top: usize,
        /// Keep the top N per symbol instead of overall
        #[arg(long)]
        per_symbol: bool,
    },
    /// List archived test runs
    Archives,
    /// Execute a named portfolio config and archive the reproduction kit
    Test {
        /// Server-side portfolio config name
        config: String,
        /// Human description of the run
        description: String,
    },
    /// Trigger the backend's own automated test execution
    AutomatedTest {
        /// Human description of the run
        description: String,
    },
}

#[derive(Subcommand)]
enum StocksCommands {
    /// List available stock symbols
    List {
        #[arg(long, default_value_t = 100)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Detailed information about one stock
    Info { symbol: String },
}

#[derive(Subcommand)]
enum BetaCommands {
    /// Fetch stored beta for one or more symbols
    Get {
        #[arg(value_delimiter = ',', num_args = 1..)]
        symbols: Vec<String>,
    },
    /// Override the stored beta for a symbol
    Set {
        symbol: String,
        beta: f64,
        /// Where the override came from
        #[arg(long)]
        source: Option<String>,
    },
    /// Recompute beta from price history
    Calculate {
        symbol: String,
        /// Trading days in the calculation window
        #[arg(long, default_value_t = 252)]
        period: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let app = AppContext::initialize()?;
    info!(
        "DCA console targeting {}",
        app.settings().backend_url
    );

    match cli.command {
        Commands::Health => health::run(&app).await?,
        Commands::Stocks { command } => match command {
            StocksCommands::List { limit, offset } => stocks::run_list(&app, limit, offset).await?,
            StocksCommands::Info { symbol } => stocks::run_info(&app, &symbol).await?,
        },
        Commands::Beta { command } => match command {
            BetaCommands::Get { symbols } => beta::run_get(&app, &symbols).await?,
            BetaCommands::Set {
                symbol,
                beta: value,
                source,
            } => beta::run_set(&app, &symbol, value, source.as_deref()).await?,
            BetaCommands::Calculate { symbol, period } => {
                beta::run_calculate(&app, &symbol, period).await?
            }
        },
        Commands::Backtest {
            symbol,
            start_date,
            end_date,
            capital,
            strategy,
        } => {
            let request = DcaBacktestRequest {
                symbol,
                start_date,
                end_date,
                initial_capital: capital,
                params: strategy.to_params(),
            };
            backtest::run(&app, &request).await?;
        }
        Commands::Portfolio {
            config,
            stocks,
            start_date,
            end_date,
            capital,
            beta_allocation,
            strategy,
        } => {
            let source = resolve_portfolio_source(
                None,
                config,
                stocks,
                start_date,
                end_date,
                capital,
                beta_allocation,
                &strategy,
            )?;
            portfolio::run(&app, source).await?;
        }
        Commands::DailyTrades {
            input,
            config,
            stocks,
            start_date,
            end_date,
            capital,
            starting_capital,
            filter,
            order,
            strategy,
        } => {
            let starting_capital = starting_capital.or(if input.is_none() && config.is_none() {
                // A fresh CLI-parameter run seeds the walk from its own capital.
                Some(capital)
            } else {
                None
            });
            let source = resolve_portfolio_source(
                input,
                config,
                stocks,
                start_date,
                end_date,
                capital,
                false,
                &strategy,
            )?;
            daily_trades::run(&app, source, starting_capital, filter, order).await?;
        }
        Commands::Sweep {
            symbols,
            start_date,
            end_date,
            capital,
            grid_spacings,
            profit_targets,
            momentum_variants,
            top,
            per_symbol,
        } => {
            let args = SweepArgs {
                symbols,
                start_date,
                end_date,
                initial_capital: capital,
                grid_spacings,
                profit_targets,
                with_momentum_variants: momentum_variants,
                top,
                per_symbol,
            };
            sweep::run(&app, &args).await?;
        }
        Commands::Archives => archives::run(&app).await?,
        Commands::Test {
            config,
            description,
        } => testing::run_archive(&app, &config, &description).await?,
        Commands::AutomatedTest { description } => {
            testing::run_automated(&app, &description).await?
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn resolve_portfolio_source(
    input: Option<PathBuf>,
    config: Option<String>,
    stocks: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    capital: f64,
    beta_allocation: bool,
    strategy: &StrategyArgs,
) -> Result<PortfolioSource> {
    if let Some(path) = input {
        return Ok(PortfolioSource::File(path));
    }
    if let Some(name) = config {
        return Ok(PortfolioSource::Config(name));
    }
    let Some(stocks) = stocks else {
        return Err(anyhow!("no portfolio source given (use --config or --stocks)"));
    };
    let (Some(start_date), Some(end_date)) = (start_date, end_date) else {
        return Err(anyhow!("--start-date and --end-date are required with --stocks"));
    };

    Ok(PortfolioSource::Request(Box::new(
        PortfolioBacktestRequest {
            stocks: parse_allocations(&stocks)?,
            start_date,
            end_date,
            initial_capital: capital,
            enable_beta_capital_allocation: beta_allocation,
            params: strategy.to_params(),
            parameters_prescaled: false,
        },
    )))
}
