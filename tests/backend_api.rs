use dca_console::backend::BackendClient;
use dca_console::error::BackendError;
use dca_console::params::{
    LongStrategyParams, PortfolioBacktestRequest, StockAllocation, StrategyParams,
};
use mockito::Matcher;
use serde_json::json;
use std::time::Duration;

fn client_for(server: &mockito::ServerGuard) -> BackendClient {
    BackendClient::new(&server.url(), Duration::from_secs(5)).unwrap()
}

fn sample_request() -> PortfolioBacktestRequest {
    PortfolioBacktestRequest {
        stocks: vec![
            StockAllocation {
                symbol: "AAPL".to_string(),
                allocation_pct: 60.0,
            },
            StockAllocation {
                symbol: "MSFT".to_string(),
                allocation_pct: 40.0,
            },
        ],
        start_date: "2020-01-01".to_string(),
        end_date: "2024-12-31".to_string(),
        initial_capital: 50_000.0,
        enable_beta_capital_allocation: false,
        params: StrategyParams::Long(LongStrategyParams::default()),
        parameters_prescaled: false,
    }
}

#[tokio::test]
async fn portfolio_backtest_sends_scaled_payload_and_decodes_results() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/portfolio-backtest")
        .match_body(Matcher::PartialJson(json!({
            "initialCapital": 50000.0,
            "stocks": [
                {"symbol": "AAPL", "allocation": 0.6},
                {"symbol": "MSFT", "allocation": 0.4},
            ],
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "success": true,
                "data": {
                    "portfolioSummary": {"totalRealizedPnl": 1500.0, "totalRoi": 3.0},
                    "stockResults": [
                        {
                            "symbol": "AAPL",
                            "transactions": [
                                {"date": "2024-01-01", "type": "BUY", "value": 1000.0}
                            ]
                        }
                    ],
                    "rejectedOrders": []
                }
            }"#,
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let data = client
        .portfolio_backtest(&sample_request().to_payload())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(data.stock_results.len(), 1);
    assert_eq!(data.stock_results[0].transactions.len(), 1);
    let summary = data.portfolio_summary.unwrap();
    assert!((summary.total_realized_pnl - 1500.0).abs() < 1e-9);
}

#[tokio::test]
async fn backend_reported_failure_surfaces_its_message() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/portfolio-backtest")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success": false, "error": "no price data for XYZ"}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let error = client
        .portfolio_backtest(&sample_request().to_payload())
        .await
        .unwrap_err();

    match error {
        BackendError::Rejected(message) => assert_eq!(message, "no price data for XYZ"),
        other => panic!("expected Rejected, got {:?}", other),
    }
}

#[tokio::test]
async fn http_error_status_carries_backend_error_field() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/backtest/portfolio/config/missing")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": "config not found"}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let error = client.config_backtest("missing").await.unwrap_err();

    match error {
        BackendError::Api { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "config not found");
        }
        other => panic!("expected Api, got {:?}", other),
    }
}

#[tokio::test]
async fn successful_envelope_without_payload_is_missing_data() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/stocks/AAPL/beta")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success": true}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let error = client.get_beta("AAPL").await.unwrap_err();
    assert!(matches!(error, BackendError::MissingData));
}

#[tokio::test]
async fn beta_override_round_trips() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("PUT", "/api/stocks/TSLA/beta")
        .match_body(Matcher::PartialJson(json!({"beta": 1.85})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success": true, "data": {"symbol": "TSLA", "beta": 1.85}}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let info = client.put_beta("TSLA", 1.85, Some("manual")).await.unwrap();

    mock.assert_async().await;
    assert_eq!(info.beta, Some(1.85));
}

#[tokio::test]
async fn archives_list_decodes_under_its_own_key() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/test/archives")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "success": true,
                "archives": [
                    {
                        "timestamp": "2025-03-14T15:09:26Z",
                        "testType": "portfolio",
                        "description": "high beta sweep",
                        "folder": "2025-03-14_150926_high-beta-sweep"
                    }
                ]
            }"#,
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let records = client.archives().await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].test_type, "portfolio");
    assert_eq!(records[0].folder, "2025-03-14_150926_high-beta-sweep");
}

#[tokio::test]
async fn automated_test_posts_description() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/test/automated")
        .match_body(Matcher::PartialJson(json!({"description": "smoke run"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "success": true,
                "data": {
                    "archivePath": "test-results/2025-03-14_150926_smoke-run",
                    "duration": 12.5,
                    "frontendUrl": "http://localhost:3000/portfolio-backtest?config=smoke"
                }
            }"#,
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let data = client.automated_test("smoke run").await.unwrap();

    mock.assert_async().await;
    assert_eq!(data.archive_path, "test-results/2025-03-14_150926_smoke-run");
    assert!((data.duration - 12.5).abs() < 1e-9);
}

#[tokio::test]
async fn health_decodes_without_an_envelope() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/health")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"database": true, "version": "1.4.2", "uptime": 3600}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let status = client.health().await.unwrap();

    assert!(status.database);
    assert_eq!(status.version.as_deref(), Some("1.4.2"));
}
