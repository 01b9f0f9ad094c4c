use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a log request. The API sends it as a number; it is kept as
/// text since it is only ever echoed back in URLs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawId", into = "String")]
pub struct RequestId(pub String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Num(u64),
    Text(String),
}

impl From<RawId> for RequestId {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Num(n) => RequestId(n.to_string()),
            RawId::Text(s) => RequestId(s),
        }
    }
}

impl From<RequestId> for String {
    fn from(id: RequestId) -> Self {
        id.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LogStatus {
    Created,
    Processing,
    Processed,
    /// Anything else the API reports (`canceled`, `processing_failed`, ...).
    Other(String),
}

impl From<String> for LogStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "created" => LogStatus::Created,
            "processing" => LogStatus::Processing,
            "processed" => LogStatus::Processed,
            _ => LogStatus::Other(s),
        }
    }
}

impl From<LogStatus> for String {
    fn from(status: LogStatus) -> Self {
        status.to_string()
    }
}

impl fmt::Display for LogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogStatus::Created => f.write_str("created"),
            LogStatus::Processing => f.write_str("processing"),
            LogStatus::Processed => f.write_str("processed"),
            LogStatus::Other(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogPart {
    pub part_number: u32,
    #[serde(default)]
    pub size: u64,
}

/// The `log_request` object returned by create and status calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRequestInfo {
    #[serde(default)]
    pub request_id: Option<RequestId>,
    pub status: LogStatus,
    #[serde(default)]
    pub parts: Vec<LogPart>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogRequestEnvelope {
    pub log_request: LogRequestInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Vec<ApiErrorItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorItem {
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiErrorBody {
    /// Top-level message followed by one `- <message>` line per listed error.
    pub fn describe(&self) -> String {
        let mut out = self.message.clone().unwrap_or_default();
        for msg in self.errors.iter().filter_map(|e| e.message.as_deref()) {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str("- ");
            out.push_str(msg);
        }
        out
    }
}
