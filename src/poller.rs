use crate::{
    api::{LogRequestInfo, LogStatus, LogsApi, RequestId},
    config::Polling,
    error::ExportError,
};
use tracing::{error, info};

/// Blocks until the log request reaches `processed`.
///
/// Each poll is preceded by `poll_delay`; while the request is `created` or
/// `processing` an extra `processing_delay` is slept before the next poll.
/// API errors propagate on the first occurrence.
pub fn wait_until_processed<A: LogsApi + ?Sized>(
    api: &A,
    id: &RequestId,
    cfg: &Polling,
) -> Result<LogRequestInfo, ExportError> {
    let mut polls = 0u32;
    loop {
        if cfg.max_polls > 0 && polls >= cfg.max_polls {
            return Err(ExportError::PollLimit { polls });
        }

        std::thread::sleep(cfg.poll_delay());
        let info = api.request_info(id)?;
        polls += 1;
        info!("request {id} status: {}", info.status);

        match &info.status {
            LogStatus::Processed => return Ok(info),
            LogStatus::Created | LogStatus::Processing => {
                std::thread::sleep(cfg.processing_delay());
            }
            LogStatus::Other(status) => {
                error!("unexpected log request status: {status}");
                return Err(ExportError::UnexpectedStatus(status.clone()));
            }
        }
    }
}
