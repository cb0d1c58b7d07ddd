use crate::commands::request_spinner;
use crate::context::AppContext;
use crate::params::DcaBacktestRequest;
use crate::report::render_dca_metrics;
use anyhow::Result;
use log::info;

pub async fn run(app: &AppContext, request: &DcaBacktestRequest) -> Result<()> {
    request.validate()?;
    let payload = request.to_payload()?;
    let backend = app.backend()?;

    info!(
        "Running DCA backtest for {} ({} - {})",
        request.symbol, request.start_date, request.end_date
    );

    let spinner = request_spinner(&format!("Backtesting {}", request.symbol));
    let outcome = backend.dca_backtest(&payload).await;
    spinner.finish_and_clear();

    let data = outcome?;
    print!("{}", render_dca_metrics(&request.symbol, &data));
    Ok(())
}
