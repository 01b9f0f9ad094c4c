#![allow(dead_code)]

use metrika_logs::{
    api::{LogPart, LogRequestInfo, LogStatus, LogsApi, RequestId},
    config::Config,
    download::ReportRow,
    error::ApiError,
    request::ReportRequest,
};
use std::cell::RefCell;
use std::collections::VecDeque;

/// Scripted `LogsApi`: each call pops the next queued answer.
#[derive(Default)]
pub struct FakeApi {
    pub token: Option<ApiError>,
    pub create: RefCell<VecDeque<Result<LogRequestInfo, ApiError>>>,
    pub statuses: RefCell<VecDeque<Result<LogRequestInfo, ApiError>>>,
    pub downloads: RefCell<VecDeque<Result<String, ApiError>>>,
    pub clean: Option<ApiError>,
    pub calls: RefCell<Vec<String>>,
}

impl FakeApi {
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls.borrow().iter().filter(|c| c.starts_with(prefix)).count()
    }

    pub fn with_create(self, r: Result<LogRequestInfo, ApiError>) -> Self {
        self.create.borrow_mut().push_back(r);
        self
    }

    pub fn with_status(self, r: Result<LogRequestInfo, ApiError>) -> Self {
        self.statuses.borrow_mut().push_back(r);
        self
    }

    pub fn with_download(self, r: Result<String, ApiError>) -> Self {
        self.downloads.borrow_mut().push_back(r);
        self
    }
}

fn exhausted(what: &str) -> ApiError {
    ApiError::Malformed(format!("no scripted answer for {what}"))
}

impl LogsApi for FakeApi {
    fn verify_token(&self) -> Result<(), ApiError> {
        self.calls.borrow_mut().push("verify".into());
        self.token.clone().map_or(Ok(()), Err)
    }

    fn create_request(&self, req: &ReportRequest) -> Result<LogRequestInfo, ApiError> {
        self.calls
            .borrow_mut()
            .push(format!("create {}", req.report_type));
        self.create
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(exhausted("create")))
    }

    fn request_info(&self, id: &RequestId) -> Result<LogRequestInfo, ApiError> {
        self.calls.borrow_mut().push(format!("status {id}"));
        self.statuses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(exhausted("status")))
    }

    fn download_part(&self, id: &RequestId, part: u32) -> Result<String, ApiError> {
        self.calls.borrow_mut().push(format!("download {id} {part}"));
        self.downloads
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(exhausted("download")))
    }

    fn clean_request(&self, id: &RequestId) -> Result<(), ApiError> {
        self.calls.borrow_mut().push(format!("clean {id}"));
        self.clean.clone().map_or(Ok(()), Err)
    }
}

pub fn info(id: &str, status: &str, parts: &[u32]) -> LogRequestInfo {
    LogRequestInfo {
        request_id: Some(RequestId(id.to_string())),
        status: LogStatus::from(status.to_string()),
        parts: parts
            .iter()
            .map(|&n| LogPart {
                part_number: n,
                size: 0,
            })
            .collect(),
    }
}

/// Default config with every delay set to zero.
pub fn fast_config() -> Config {
    let mut cfg = Config::default();
    cfg.polling.poll_delay_ms = 0;
    cfg.polling.processing_delay_ms = 0;
    cfg.download.retry_delay_ms = 0;
    cfg
}

pub fn row(pairs: &[(&str, &str)]) -> ReportRow {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn transport(msg: &str) -> ApiError {
    ApiError::Transport(msg.to_string())
}
