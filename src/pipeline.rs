use crate::{
    api::{LogsApi, RequestId},
    config::Config,
    dates::format_date,
    download::{self, ReportRow},
    error::ExportError,
    poller,
    request::ReportRequest,
};
use std::time::Instant;
use tracing::{error, info, warn};

/// Runs one export: token check, create, poll, download, cleanup.
pub struct Exporter<A: LogsApi> {
    cfg: Config,
    api: A,
}

#[derive(Debug, Clone)]
pub struct ExportOutput {
    pub request_id: RequestId,
    pub parts: usize,
    pub rows: Vec<ReportRow>,
}

impl<A: LogsApi> Exporter<A> {
    pub fn new(cfg: &Config, api: A) -> Self {
        Self {
            cfg: cfg.clone(),
            api,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn run(&self, req: &ReportRequest) -> Result<ExportOutput, ExportError> {
        let started = Instant::now();
        let out = self.run_inner(req);
        match &out {
            Ok(o) => info!(
                "export finished: request={} rows={} elapsed={:?}",
                o.request_id,
                o.rows.len(),
                started.elapsed()
            ),
            Err(err) => error!("export failed: {err}"),
        }
        out
    }

    fn run_inner(&self, req: &ReportRequest) -> Result<ExportOutput, ExportError> {
        if self.cfg.api.verify_token {
            self.api.verify_token().map_err(ExportError::InvalidToken)?;
        }

        info!(
            "export {} {}..{} attribution={} fields={}",
            req.report_type,
            format_date(req.date1),
            format_date(req.date2),
            req.attribution,
            req.fields.join(", ")
        );

        let request_id = self.create_job(req)?;
        let job = poller::wait_until_processed(&self.api, &request_id, &self.cfg.polling)?;
        info!("request {request_id} ready, {} part(s)", job.parts.len().max(1));

        let rows = download::download_all(&self.api, &request_id, &job.parts, &self.cfg.download)?;

        self.clean_up(&request_id);

        Ok(ExportOutput {
            request_id,
            parts: job.parts.len().max(1),
            rows,
        })
    }

    /// Submits the log request and returns its identifier.
    pub fn create_job(&self, req: &ReportRequest) -> Result<RequestId, ExportError> {
        let created = self.api.create_request(req)?;
        let id = created.request_id.ok_or(ExportError::MissingRequestId)?;
        info!("created {} log request {id}", req.report_type);
        Ok(id)
    }

    fn clean_up(&self, id: &RequestId) {
        match self.api.clean_request(id) {
            Ok(()) => info!("request {id} cleaned"),
            Err(err) => warn!("failed to clean request {id}: {err}"),
        }
    }
}
