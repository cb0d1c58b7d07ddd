use crate::error::BackendError;
use crate::models::{
    ApiEnvelope, ArchiveRecord, AutomatedTestData, BatchResultSet, BetaCalculation, BetaInfo,
    DcaBacktestData, HealthStatus, PortfolioBacktestData, StockInfo, StockListing,
};
use anyhow::{Context, Result};
use log::debug;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;

const MAX_ERROR_BODY_CHARS: usize = 2048;

/// Typed client over the DCA backtest backend. One request per call, a
/// configurable timeout, and no retry: a failed call is reported once and the
/// caller decides what to show.
pub struct BackendClient {
    http: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health(&self) -> Result<HealthStatus, BackendError> {
        self.request(Method::GET, "/api/health", None).await
    }

    pub async fn list_stocks(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<StockListing, BackendError> {
        let path = format!("/api/stocks?limit={}&offset={}", limit, offset);
        self.request(Method::GET, &path, None).await
    }

    pub async fn stock_info(&self, symbol: &str) -> Result<StockInfo, BackendError> {
        let path = format!("/api/stocks/{}", symbol);
        self.request_enveloped(Method::GET, &path, None).await
    }

    pub async fn get_beta(&self, symbol: &str) -> Result<BetaInfo, BackendError> {
        let path = format!("/api/stocks/{}/beta", symbol);
        self.request_enveloped(Method::GET, &path, None).await
    }

    pub async fn put_beta(
        &self,
        symbol: &str,
        beta: f64,
        source: Option<&str>,
    ) -> Result<BetaInfo, BackendError> {
        let path = format!("/api/stocks/{}/beta", symbol);
        let body = json!({ "beta": beta, "source": source });
        self.request_enveloped(Method::PUT, &path, Some(&body)).await
    }

    pub async fn calculate_beta(
        &self,
        symbol: &str,
        period: u32,
    ) -> Result<BetaCalculation, BackendError> {
        let body = json!({ "symbol": symbol, "period": period });
        self.request_enveloped(Method::POST, "/api/beta/calculate", Some(&body))
            .await
    }

    pub async fn dca_backtest(&self, payload: &Value) -> Result<DcaBacktestData, BackendError> {
        self.request_enveloped(Method::POST, "/api/backtest/dca", Some(payload))
            .await
    }

    pub async fn portfolio_backtest(
        &self,
        payload: &Value,
    ) -> Result<PortfolioBacktestData, BackendError> {
        self.request_enveloped(Method::POST, "/api/portfolio-backtest", Some(payload))
            .await
    }

    pub async fn config_backtest(
        &self,
        config_name: &str,
    ) -> Result<PortfolioBacktestData, BackendError> {
        let path = format!("/api/backtest/portfolio/config/{}", config_name);
        self.request_enveloped(Method::GET, &path, None).await
    }

    pub async fn batch_backtest(&self, payload: &Value) -> Result<BatchResultSet, BackendError> {
        self.request_enveloped(Method::POST, "/api/backtest/batch", Some(payload))
            .await
    }

    pub async fn archives(&self) -> Result<Vec<ArchiveRecord>, BackendError> {
        self.request_enveloped(Method::GET, "/api/test/archives", None)
            .await
    }

    pub async fn automated_test(
        &self,
        description: &str,
    ) -> Result<AutomatedTestData, BackendError> {
        let body = json!({ "description": description });
        self.request_enveloped(Method::POST, "/api/test/automated", Some(&body))
            .await
    }

    async fn request_enveloped<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T, BackendError> {
        let envelope: ApiEnvelope<T> = self.request(method, path, body).await?;
        if !envelope.success {
            return Err(BackendError::Rejected(
                envelope
                    .error
                    .unwrap_or_else(|| "unknown backend failure".to_string()),
            ));
        }
        envelope.data.ok_or(BackendError::MissingData)
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T, BackendError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);

        let mut request = self.http.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(BackendError::Api {
                status: status.as_u16(),
                message: extract_error_message(&text, status),
            });
        }

        serde_json::from_str(&text).map_err(BackendError::Decode)
    }
}

/// Prefer the backend's own `error` field; fall back to the (truncated) raw
/// body or the status line when the body is empty.
fn extract_error_message(body: &str, status: StatusCode) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(message) = value.get("error").and_then(Value::as_str) {
            return message.to_string();
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string();
    }
    truncate_for_log(trimmed, MAX_ERROR_BODY_CHARS)
}

fn truncate_for_log(value: &str, max_chars: usize) -> String {
    let mut iter = value.chars();
    let mut out = String::new();
    for _ in 0..max_chars {
        let Some(ch) = iter.next() else {
            return value.to_string();
        };
        out.push(ch);
    }
    if iter.next().is_some() {
        out.push('…');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_backend_error_field() {
        let message = extract_error_message(
            r#"{"success":false,"error":"config not found"}"#,
            StatusCode::NOT_FOUND,
        );
        assert_eq!(message, "config not found");
    }

    #[test]
    fn error_message_falls_back_to_status_reason() {
        let message = extract_error_message("", StatusCode::BAD_GATEWAY);
        assert_eq!(message, "Bad Gateway");
    }

    #[test]
    fn long_plain_bodies_are_truncated() {
        let body = "x".repeat(MAX_ERROR_BODY_CHARS + 10);
        let message = extract_error_message(&body, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message.chars().count(), MAX_ERROR_BODY_CHARS + 1);
        assert!(message.ends_with('…'));
    }
}
