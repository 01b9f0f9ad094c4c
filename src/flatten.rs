use crate::{
    catalog::{strip_prefix, Attribution, ATTRIBUTION_PLACEHOLDER},
    download::ReportRow,
};
use anyhow::{Context, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{info, warn};

pub const GOAL_COLUMN_PREFIX: &str = "goalsID_";
pub const GOAL_REACHED: &str = "1";
/// Written for goals a row did not reach, so goal columns are never empty.
pub const GOAL_MISSED: &str = "--";

const GOALS_FIELD: &str = "goalsID";

/// Rows ready for CSV, with a fixed column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatTable {
    pub headers: Vec<String>,
    pub rows: Vec<BTreeMap<String, String>>,
    pub goal_columns: usize,
}

impl FlatTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// `ym:s:<attribution>UTMSource` -> `lastUTMSource`.
pub fn clean_header(raw: &str, attribution: Attribution) -> String {
    strip_prefix(raw).replace(ATTRIBUTION_PLACEHOLDER, attribution.token())
}

/// Splits a goal list such as `[123, 456]` into its non-empty IDs.
pub fn parse_goal_ids(value: &str) -> Vec<String> {
    value
        .trim()
        .trim_matches(|c| c == '[' || c == ']')
        .split(',')
        .map(|id| id.replace(' ', ""))
        .filter(|id| !id.is_empty())
        .collect()
}

fn row_goals(row: &ReportRow) -> Vec<String> {
    row.iter()
        .filter(|(k, v)| strip_prefix(k) == GOALS_FIELD && !v.is_empty())
        .flat_map(|(_, v)| parse_goal_ids(v))
        .collect()
}

pub fn flatten(rows: &[ReportRow], attribution: Attribution) -> FlatTable {
    let goal_ids: BTreeSet<String> = rows.iter().flat_map(row_goals).collect();

    let mut used: BTreeSet<String> = BTreeSet::new();
    let mut out = Vec::with_capacity(rows.len());

    for row in rows {
        let mut clean: BTreeMap<String, String> = row
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (clean_header(k, attribution), v.clone()))
            .collect();

        let reached: BTreeSet<String> = row_goals(row).into_iter().collect();
        for goal in &goal_ids {
            let value = if reached.contains(goal) {
                GOAL_REACHED
            } else {
                GOAL_MISSED
            };
            clean.insert(format!("{GOAL_COLUMN_PREFIX}{goal}"), value.to_string());
        }

        used.extend(clean.keys().cloned());
        out.push(clean);
    }

    let mut headers: Vec<String> = used.into_iter().collect();
    headers.sort_by(|a, b| {
        (a.starts_with(GOAL_COLUMN_PREFIX), a).cmp(&(b.starts_with(GOAL_COLUMN_PREFIX), b))
    });

    FlatTable {
        headers,
        rows: out,
        goal_columns: goal_ids.len(),
    }
}

pub fn write_csv<W: std::io::Write>(table: &FlatTable, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&table.headers)?;
    for row in &table.rows {
        wtr.write_record(
            table
                .headers
                .iter()
                .map(|h| row.get(h).map(String::as_str).unwrap_or("")),
        )?;
    }
    wtr.flush().context("failed to flush CSV writer")?;
    Ok(())
}

/// Writes the table to `path`. Returns `false` without touching the
/// filesystem when there is nothing to write.
pub fn save_csv(table: &FlatTable, path: &Path) -> Result<bool> {
    if table.is_empty() {
        warn!("no data to save");
        return Ok(false);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        crate::util::ensure_dir(parent)?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("create CSV: {}", path.display()))?;
    write_csv(table, std::io::BufWriter::new(file))
        .with_context(|| format!("write CSV: {}", path.display()))?;

    info!("saved {} rows to {}", table.rows.len(), path.display());
    info!(
        "columns: {}, goal columns: {}",
        table.headers.len(),
        table.goal_columns
    );
    Ok(true)
}
