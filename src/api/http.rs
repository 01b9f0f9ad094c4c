use super::{
    types::{ApiErrorBody, LogRequestEnvelope, LogRequestInfo, RequestId},
    LogsApi,
};
use crate::{config::Config, error::ApiError, request::ReportRequest};
use anyhow::{Context, Result};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, info, warn};

const RETRY_STATUSES: [StatusCode; 5] = [
    StatusCode::TOO_MANY_REQUESTS,
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

/// Blocking client for one counter, authenticated with an OAuth token.
pub struct HttpLogsApi {
    client: Client,
    base_url: String,
    counter_id: String,
    token: String,
    max_retries: u32,
    backoff: Duration,
}

impl std::fmt::Debug for HttpLogsApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpLogsApi")
            .field("base_url", &self.base_url)
            .field("counter_id", &self.counter_id)
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl HttpLogsApi {
    pub fn new(cfg: &Config, token: &str, counter_id: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.api.timeout_seconds))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .build()
            .with_context(|| "building HTTP client")?;

        Ok(Self {
            client,
            base_url: cfg.api.base_url.trim_end_matches('/').to_string(),
            counter_id: counter_id.to_string(),
            token: token.to_string(),
            max_retries: cfg.api.max_retries,
            backoff: Duration::from_millis(cfg.api.retry_backoff_ms),
        })
    }

    fn counter_url(&self, path: &str) -> String {
        format!("{}/counter/{}/{}", self.base_url, self.counter_id, path)
    }

    fn auth(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header(reqwest::header::AUTHORIZATION, format!("OAuth {}", self.token))
    }

    /// Sends the request, retrying 429/5xx responses with exponential backoff.
    /// Transport errors are returned as-is; callers decide whether to retry them.
    fn send(&self, what: &str, build: impl Fn() -> RequestBuilder) -> Result<Response, ApiError> {
        let mut attempt = 0u32;
        loop {
            debug!("{what}: attempt {}", attempt + 1);
            let resp = self
                .auth(build())
                .send()
                .map_err(|e| ApiError::Transport(e.to_string()))?;

            let status = resp.status();
            if !RETRY_STATUSES.contains(&status) || attempt >= self.max_retries {
                return Ok(resp);
            }

            let delay = self.backoff.saturating_mul(2u32.saturating_pow(attempt));
            warn!("{what}: HTTP {status}, retrying in {delay:?}");
            std::thread::sleep(delay);
            attempt += 1;
        }
    }

    fn parse_log_request(what: &str, resp: Response) -> Result<LogRequestInfo, ApiError> {
        let envelope: LogRequestEnvelope = resp
            .json()
            .map_err(|e| ApiError::Malformed(format!("{what}: {e}")))?;
        Ok(envelope.log_request)
    }
}

/// Turns an unsuccessful response into `ApiError::Status`, preferring the
/// vendor's structured error messages over the raw body and the raw body
/// over the status reason.
fn status_error(resp: Response) -> ApiError {
    let status = resp.status();
    let reason = status.canonical_reason().unwrap_or("unknown status");
    let text = match resp.text() {
        Ok(text) => text,
        Err(err) => {
            return ApiError::Status {
                status: status.as_u16(),
                message: format!("{reason} (body unreadable: {err})"),
            };
        }
    };
    let message = match serde_json::from_str::<ApiErrorBody>(&text) {
        Ok(body) if !body.describe().is_empty() => body.describe(),
        _ if text.trim().is_empty() => reason.to_string(),
        _ => text,
    };
    ApiError::Status { status: status.as_u16(), message }
}

impl LogsApi for HttpLogsApi {
    fn verify_token(&self) -> Result<(), ApiError> {
        let url = format!("{}/counters", self.base_url);
        let resp = self.send("verify token", || self.client.get(&url))?;
        if !resp.status().is_success() {
            return Err(status_error(resp));
        }
        info!("token is valid");
        Ok(())
    }

    fn create_request(&self, req: &ReportRequest) -> Result<LogRequestInfo, ApiError> {
        let url = self.counter_url("logrequests");
        let query = req.query();
        debug!(?query, "create log request");
        let resp = self.send("create log request", || self.client.post(&url).query(&query))?;
        if resp.status() != StatusCode::OK {
            return Err(status_error(resp));
        }
        Self::parse_log_request("create log request", resp)
    }

    fn request_info(&self, id: &RequestId) -> Result<LogRequestInfo, ApiError> {
        let url = self.counter_url(&format!("logrequest/{id}"));
        let resp = self.send("log request status", || self.client.get(&url))?;
        if !resp.status().is_success() {
            return Err(status_error(resp));
        }
        Self::parse_log_request("log request status", resp)
    }

    fn download_part(&self, id: &RequestId, part: u32) -> Result<String, ApiError> {
        let url = self.counter_url(&format!("logrequest/{id}/part/{part}/download"));
        info!("downloading {url}");
        let resp = self.send("download part", || self.client.get(&url))?;
        if !resp.status().is_success() {
            return Err(status_error(resp));
        }
        resp.text().map_err(|e| ApiError::Transport(e.to_string()))
    }

    fn clean_request(&self, id: &RequestId) -> Result<(), ApiError> {
        let url = self.counter_url(&format!("logrequest/{id}/clean"));
        let resp = self.send("clean log request", || self.client.post(&url))?;
        if !resp.status().is_success() {
            return Err(status_error(resp));
        }
        Ok(())
    }
}
