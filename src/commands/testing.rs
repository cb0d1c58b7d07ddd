use crate::archive::{create_archive_folder, save_artifacts, ArchiveArtifacts};
use crate::commands::request_spinner;
use crate::context::AppContext;
use crate::models::PortfolioBacktestData;
use anyhow::Result;
use chrono::Local;
use log::info;
use serde_json::json;

/// Execute a named portfolio config and archive the full reproduction kit
/// locally: README, frontend URL, curl script, raw response, metadata.
pub async fn run_archive(app: &AppContext, config_name: &str, description: &str) -> Result<()> {
    let settings = app.settings();
    let backend = app.backend()?;
    let now = Local::now();

    let archive_path = create_archive_folder(&settings.archive_dir, description, now)?;
    info!(
        "Created archive folder {}",
        archive_path.file_name().unwrap_or_default().to_string_lossy()
    );

    let spinner = request_spinner(&format!("Running config backtest '{}'", config_name));
    let outcome = backend.config_backtest(config_name).await;
    spinner.finish_and_clear();

    // Failed runs are archived too; the artifact records what happened.
    let (api_response, success, data) = match outcome {
        Ok(data) => {
            let response = json!({ "success": true, "data": &data });
            (response, true, Some(data))
        }
        Err(error) => (
            json!({ "success": false, "error": error.to_string() }),
            false,
            None,
        ),
    };

    let stock_count = data
        .as_ref()
        .map(|data| data.stock_results.len())
        .unwrap_or(0);
    let artifacts = ArchiveArtifacts {
        config_name,
        description,
        backend_url: &settings.backend_url,
        frontend_url: &settings.frontend_url,
        api_response: &api_response,
        success,
        stock_count,
    };
    save_artifacts(&archive_path, &artifacts, now)?;

    match data {
        Some(data) => print_success_summary(&data, &archive_path.display().to_string()),
        None => {
            println!("Test failed; details archived in {}", archive_path.display());
        }
    }

    Ok(())
}

fn print_success_summary(data: &PortfolioBacktestData, archive_path: &str) {
    println!("Stocks tested: {}", data.stock_results.len());
    if let Some(summary) = &data.portfolio_summary {
        println!("Total P&L:     {:.2}", summary.total_realized_pnl);
        println!("Total ROI:     {:.2}%", summary.total_roi);
    }
    println!("Results archived in {}", archive_path);
}

/// Trigger the backend's own automated test execution and archival.
pub async fn run_automated(app: &AppContext, description: &str) -> Result<()> {
    let backend = app.backend()?;

    let spinner = request_spinner("Running automated test");
    let outcome = backend.automated_test(description).await;
    spinner.finish_and_clear();

    let data = outcome?;
    println!("Archive:  {}", data.archive_path);
    println!("Duration: {:.1}s", data.duration);
    println!("Results:  {}", data.frontend_url);
    Ok(())
}
