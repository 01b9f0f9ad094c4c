use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

pub fn ensure_dir(p: &Path) -> Result<()> {
    std::fs::create_dir_all(p).with_context(|| format!("create_dir_all {}", p.display()))
}

fn now_local() -> time::OffsetDateTime {
    time::OffsetDateTime::now_local().unwrap_or_else(|_| time::OffsetDateTime::now_utc())
}

pub fn now_rfc3339() -> String {
    now_local()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

/// `<dir>/report_YYYYMMDD_HHMMSS.csv`
pub fn default_report_path(dir: &Path) -> PathBuf {
    let stamp = now_local()
        .format(format_description!("[year][month][day]_[hour][minute][second]"))
        .unwrap_or_else(|_| "00000000_000000".to_string());
    dir.join(format!("report_{stamp}.csv"))
}

/// Keeps the first and last two characters of a secret.
pub fn mask_secret(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 6 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{head}***{tail}")
}
