use crate::{
    catalog::{self, Attribution, ReportType},
    dates,
    error::ValidationError,
};
use serde::Serialize;
use time::Date;
use tracing::info;

/// A validated export job request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRequest {
    pub report_type: ReportType,
    pub fields: Vec<String>,
    #[serde(serialize_with = "ser_date")]
    pub date1: Date,
    #[serde(serialize_with = "ser_date")]
    pub date2: Date,
    pub attribution: Attribution,
}

/// Unvalidated input, as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct RequestParams {
    pub report_type: ReportType,
    pub fields: Vec<String>,
    pub date1: String,
    pub date2: String,
    pub attribution: Attribution,
    pub ensure_required_metrics: bool,
}

impl ReportRequest {
    pub fn new(params: &RequestParams, today: Date) -> Result<Self, ValidationError> {
        let mut fields: Vec<String> = Vec::with_capacity(params.fields.len());
        for f in params.fields.iter().map(|f| f.trim()).filter(|f| !f.is_empty()) {
            if !fields.iter().any(|x| x == f) {
                fields.push(f.to_string());
            }
        }

        let report_type = catalog::validate_fields(&fields, params.report_type)?;
        if report_type != params.report_type {
            info!(
                "report type adjusted from {} to {report_type} based on metrics",
                params.report_type
            );
        }

        if params.ensure_required_metrics {
            fields = catalog::with_required_metrics(report_type, fields);
        }

        let (date1, date2) = dates::resolve_range(&params.date1, &params.date2, today)?;

        Ok(Self {
            report_type,
            fields,
            date1,
            date2,
            attribution: params.attribution,
        })
    }

    /// Query parameters of the create call.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("date1", dates::format_date(self.date1)),
            ("date2", dates::format_date(self.date2)),
            ("fields", self.fields.join(",")),
            ("source", self.report_type.source().to_string()),
            ("attribution", self.attribution.token().to_string()),
        ]
    }
}

fn ser_date<S: serde::Serializer>(date: &Date, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&dates::format_date(*date))
}
