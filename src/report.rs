use crate::{
    catalog::{Attribution, ReportType},
    request::ReportRequest,
};
use serde::Serialize;

/// Printed after an export.
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    pub request_id: String,
    pub report_type: ReportType,
    pub attribution: Attribution,
    pub date1: String,
    pub date2: String,
    pub fields: usize,
    pub parts: usize,
    pub rows: usize,
    pub columns: usize,
    pub goal_columns: usize,
    pub output: Option<String>,
    pub started: String,
    pub finished: String,
}

impl ExportSummary {
    pub fn for_request(req: &ReportRequest) -> Self {
        Self {
            request_id: String::new(),
            report_type: req.report_type,
            attribution: req.attribution,
            date1: crate::dates::format_date(req.date1),
            date2: crate::dates::format_date(req.date2),
            fields: req.fields.len(),
            parts: 0,
            rows: 0,
            columns: 0,
            goal_columns: 0,
            output: None,
            started: String::new(),
            finished: String::new(),
        }
    }
}
