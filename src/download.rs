use crate::{
    api::{LogPart, LogsApi, RequestId},
    config::Download,
    error::{ApiError, ExportError},
};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// One record of the export: raw field name to value.
pub type ReportRow = BTreeMap<String, String>;

/// Downloads every part of a processed request and concatenates the rows.
/// A request that lists no parts is read as part 0.
pub fn download_all<A: LogsApi + ?Sized>(
    api: &A,
    id: &RequestId,
    parts: &[LogPart],
    cfg: &Download,
) -> Result<Vec<ReportRow>, ExportError> {
    let numbers: Vec<u32> = if parts.is_empty() {
        vec![0]
    } else {
        parts.iter().map(|p| p.part_number).collect()
    };

    let mut rows = Vec::new();
    for part in numbers {
        let body = download_with_retry(api, id, part, cfg)?;
        let parsed = parse_tsv(&body)?;
        info!("part {part}: {} rows", parsed.len());
        rows.extend(parsed);
    }
    info!("downloaded {} rows", rows.len());
    Ok(rows)
}

/// Fetches one part, trying up to `max_attempts` times with a fixed delay
/// between attempts. The last error is returned once attempts run out.
pub fn download_with_retry<A: LogsApi + ?Sized>(
    api: &A,
    id: &RequestId,
    part: u32,
    cfg: &Download,
) -> Result<String, ExportError> {
    let attempts = cfg.max_attempts.max(1);
    let mut attempt = 1u32;
    loop {
        info!("downloading part {part}, attempt {attempt}/{attempts}");
        match api.download_part(id, part) {
            Ok(body) => return Ok(body),
            Err(source) if attempt >= attempts => {
                return Err(ExportError::Download {
                    part,
                    attempts,
                    source,
                });
            }
            Err(err) => {
                warn!(
                    "attempt {attempt} failed: {err}; retrying in {:?}",
                    cfg.retry_delay()
                );
                std::thread::sleep(cfg.retry_delay());
                attempt += 1;
            }
        }
    }
}

/// Parses a tab-separated body: first line is the header, each following line
/// one record. Lines whose width differs from the header are skipped.
pub fn parse_tsv(body: &str) -> Result<Vec<ReportRow>, ApiError> {
    if body.trim().is_empty() {
        warn!("empty response body");
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .flexible(true)
        .has_headers(true)
        .from_reader(body.trim_end_matches(['\r', '\n']).as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| ApiError::Malformed(format!("TSV header: {e}")))?
        .clone();
    info!("headers: {}", headers.iter().collect::<Vec<_>>().join(", "));

    let mut rows: Vec<ReportRow> = Vec::new();
    let mut skipped = 0usize;
    for record in reader.records() {
        let record = record.map_err(|e| ApiError::Malformed(format!("TSV record: {e}")))?;
        if record.len() != headers.len() {
            skipped += 1;
            continue;
        }
        rows.push(
            headers
                .iter()
                .zip(record.iter())
                .map(|(h, v)| (h.to_string(), v.to_string()))
                .collect(),
        );
    }

    if skipped > 0 {
        warn!("skipped {skipped} lines with a column count different from the header");
    }
    Ok(rows)
}
