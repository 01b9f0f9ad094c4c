pub mod http;
pub mod types;

use crate::{error::ApiError, request::ReportRequest};

pub use http::HttpLogsApi;
pub use types::{LogPart, LogRequestInfo, LogStatus, RequestId};

/// Calls against one counter of the Logs API.
pub trait LogsApi {
    fn verify_token(&self) -> Result<(), ApiError>;
    fn create_request(&self, req: &ReportRequest) -> Result<LogRequestInfo, ApiError>;
    fn request_info(&self, id: &RequestId) -> Result<LogRequestInfo, ApiError>;
    /// Raw tab-separated body of one part.
    fn download_part(&self, id: &RequestId, part: u32) -> Result<String, ApiError>;
    fn clean_request(&self, id: &RequestId) -> Result<(), ApiError>;
}
