use thiserror::Error;

/// Rejected input: bad metric selection or bad dates. Never retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("fields must be a non-empty list")]
    EmptyFields,

    #[error(
        "cannot mix metrics from different report types; \
         use either 'ym:s:' (visits) or 'ym:pv:' (hits) metrics"
    )]
    MixedFamilies,

    #[error("following metrics are not available for {report_type}: {}", fields.join(", "))]
    UnknownMetrics {
        report_type: String,
        fields: Vec<String>,
    },

    #[error("invalid date '{0}': use YYYY-MM-DD, today, yesterday or NdaysAgo")]
    InvalidDate(String),

    #[error("start date {start} is after end date {end}")]
    DateOrder { start: String, end: String },

    #[error("missing {0}")]
    Missing(&'static str),
}

/// Failure talking to the Logs API.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("network error: {0}")]
    Transport(String),

    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed API response: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("token rejected by the API: {0}")]
    InvalidToken(#[source] ApiError),

    #[error("API did not return a request_id")]
    MissingRequestId,

    #[error("unexpected log request status: {0}")]
    UnexpectedStatus(String),

    #[error("log request not processed after {polls} polls")]
    PollLimit { polls: u32 },

    #[error("download of part {part} failed after {attempts} attempts: {source}")]
    Download {
        part: u32,
        attempts: u32,
        #[source]
        source: ApiError,
    },
}
