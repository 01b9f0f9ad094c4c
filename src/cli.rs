use crate::{
    api::{HttpLogsApi, LogsApi},
    catalog::{self, Attribution, ReportType},
    config::Config,
    dates::local_today,
    error::ValidationError,
    flatten,
    pipeline::Exporter,
    report::ExportSummary,
    request::{ReportRequest, RequestParams},
    settings::Settings,
    util::{default_report_path, ensure_dir, now_rfc3339},
};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "metrika-logs")]
#[command(about = "Export Yandex Metrika Logs API data (visits or hits) to CSV")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./metrika-logs.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a log request, wait for it, download and write CSV.
    Export(ExportArgs),
    /// List the fields available for a report type.
    Metrics {
        #[arg(long, value_enum, default_value_t = ReportType::Visits)]
        report_type: ReportType,
    },
    /// List attribution models.
    Attributions {},
    /// Check that the token is accepted by the API.
    Check(Credentials),
}

/// Falls back to the settings file for anything not given.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct Credentials {
    #[arg(long, env = "METRIKA_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
    #[arg(long)]
    pub counter: Option<String>,
    #[arg(long)]
    pub login: Option<String>,
}

impl Credentials {
    fn as_settings(&self) -> Settings {
        Settings {
            token: self.token.clone().unwrap_or_default(),
            counter_id: self.counter.clone().unwrap_or_default(),
            login: self.login.clone().unwrap_or_default(),
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub credentials: Credentials,

    #[arg(long, value_enum)]
    pub report_type: Option<ReportType>,

    /// Field to export; repeat or separate with commas.
    #[arg(long = "metric", short = 'm', value_delimiter = ',', required = true)]
    pub metrics: Vec<String>,

    /// today, yesterday, NdaysAgo or YYYY-MM-DD.
    #[arg(long)]
    pub date1: Option<String>,

    #[arg(long)]
    pub date2: Option<String>,

    #[arg(long, value_enum)]
    pub attribution: Option<Attribution>,

    /// CSV path. Defaults to <output.dir>/report_YYYYMMDD_HHMMSS.csv.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn dispatch(args: Args) -> Result<()> {
    // Nothing is listening on tracing until logging is up.
    let (cfg, _guard) = match setup(&args) {
        Ok(ready) => ready,
        Err(err) => {
            eprintln!("error: {err:#}");
            return Err(err);
        }
    };

    match &args.cmd {
        Command::Export(export_args) => export(&cfg, export_args),
        Command::Metrics { report_type } => {
            for metric in catalog::available_metrics(*report_type) {
                println!("{metric}");
            }
            Ok(())
        }
        Command::Attributions {} => {
            for a in Attribution::ALL {
                println!("{} - {}", a.token(), a.label());
            }
            Ok(())
        }
        Command::Check(creds) => check(&cfg, creds),
    }
}

fn setup(args: &Args) -> Result<(Config, Option<WorkerGuard>)> {
    let cfg = match resolve_config_path(args.config.as_deref()) {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };
    let guard = init_logging(args, &cfg)?;
    Ok((cfg, guard))
}

fn resolve_config_path(user: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = user {
        return Some(p.to_path_buf());
    }
    let default = PathBuf::from("metrika-logs.toml");
    default.exists().then_some(default)
}

fn init_logging(args: &Args, cfg: &Config) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if cfg.logging.write_to_file {
        let dir = Path::new(&cfg.logging.dir);
        ensure_dir(dir)?;
        let appender = tracing_appender::rolling::daily(dir, &cfg.logging.file_prefix);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn resolve_credentials(cfg: &Config, given: &Credentials, need_counter: bool) -> Result<Settings> {
    let path = PathBuf::from(&cfg.settings.path);
    let stored = Settings::load(&path).unwrap_or_else(|err| {
        warn!("ignoring unreadable settings: {err:#}");
        Settings::default()
    });
    let creds = stored.merged_with(&given.as_settings());

    if creds.token.is_empty() {
        return Err(ValidationError::Missing("token (--token, METRIKA_TOKEN or settings)").into());
    }
    if need_counter && creds.counter_id.is_empty() {
        return Err(ValidationError::Missing("counter id (--counter or settings)").into());
    }
    Ok(creds)
}

fn remember(cfg: &Config, creds: &Settings) {
    if !cfg.settings.remember {
        return;
    }
    if let Err(err) = creds.save(Path::new(&cfg.settings.path)) {
        warn!("failed to save settings: {err:#}");
    }
}

fn check(cfg: &Config, given: &Credentials) -> Result<()> {
    let creds = resolve_credentials(cfg, given, false)?;
    let api = HttpLogsApi::new(cfg, &creds.token, &creds.counter_id)?;
    api.verify_token().context("token check failed")?;
    remember(cfg, &creds);
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "counter_id": creds.counter_id,
            "status": "ok"
        }))?
    );
    Ok(())
}

fn export(cfg: &Config, args: &ExportArgs) -> Result<()> {
    let creds = resolve_credentials(cfg, &args.credentials, true)?;

    let params = RequestParams {
        report_type: args.report_type.unwrap_or(cfg.report.report_type),
        fields: args.metrics.clone(),
        date1: args.date1.clone().unwrap_or_else(|| cfg.report.date1.clone()),
        date2: args.date2.clone().unwrap_or_else(|| cfg.report.date2.clone()),
        attribution: args.attribution.unwrap_or(cfg.report.attribution),
        ensure_required_metrics: cfg.report.ensure_required_metrics,
    };
    let req = ReportRequest::new(&params, local_today())?;

    info!("counter_id={} report_type={}", creds.counter_id, req.report_type);

    let mut summary = ExportSummary::for_request(&req);
    summary.started = now_rfc3339();

    let api = HttpLogsApi::new(cfg, &creds.token, &creds.counter_id)?;
    let exporter = Exporter::new(cfg, api);
    let out = exporter.run(&req)?;

    remember(cfg, &creds);

    let table = flatten::flatten(&out.rows, req.attribution);
    let path = args
        .out
        .clone()
        .unwrap_or_else(|| default_report_path(Path::new(&cfg.output.dir)));
    let saved = flatten::save_csv(&table, &path)?;

    summary.request_id = out.request_id.to_string();
    summary.parts = out.parts;
    summary.rows = table.rows.len();
    summary.columns = table.headers.len();
    summary.goal_columns = table.goal_columns;
    summary.output = saved.then(|| path.display().to_string());
    summary.finished = now_rfc3339();

    if cfg.output.print_summary {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}
