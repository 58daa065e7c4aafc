use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use insight_forecast::{
    can_forecast_with, forecast_summary, series_from_records, smart_forecast, ForecastResult,
};
use insight_infer::analysis::{
    analyze_trend, detect_anomalies, identify_top_drivers, Anomaly, TopDriver, TrendAnalysis,
};
use insight_infer::{
    choose_sheet, infer_column_roles_with, select_best_sheet, ColumnRole, ColumnRoles,
    SheetChoice,
};
use insight_model::load_sheets;
use serde::Serialize;

mod config;

use config::Config;

const INSIGHT_LIMIT: usize = 3;

#[derive(Debug, Parser)]
#[command(name = "insight")]
#[command(about = "Recover tables from messy spreadsheets and project their metrics forward.")]
struct Cli {
    /// Log inference decisions to stderr (`RUST_LOG` still applies).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Pick the most tabular sheet and report its headers, column roles, and parser decisions.
    Inspect(InspectArgs),
    /// Forecast one column of the chosen sheet against another.
    Forecast(ForecastArgs),
}

#[derive(Debug, Args)]
struct SourceArgs {
    /// CSV, TSV, or workbook (xlsx/xlsm/xlsb/xls/ods).
    path: PathBuf,

    /// Use this sheet instead of the best-scoring one.
    #[arg(long)]
    sheet: Option<String>,

    /// JSON file with inference/roles/scoring/forecast/csv overrides.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Args)]
struct InspectArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Also report the overall trend, anomalies, and top drivers.
    #[arg(long)]
    insights: bool,
}

#[derive(Debug, Args)]
struct ForecastArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Column holding the time axis.
    #[arg(long = "x")]
    x_field: String,

    /// Column holding the metric to project.
    #[arg(long = "y")]
    y_field: String,

    /// Number of periods to project.
    #[arg(long, default_value_t = 3)]
    horizon: usize,
}

#[derive(Debug, Serialize)]
struct ParserDecisions {
    header_row: usize,
    trimmed_footers: usize,
}

#[derive(Debug, Serialize)]
struct InspectOutput {
    sheet: String,
    score: f64,
    headers: Vec<String>,
    roles: ColumnRoles,
    parser: ParserDecisions,
    row_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    insights: Option<Insights>,
}

#[derive(Debug, Serialize)]
struct Insights {
    trend: Option<TrendAnalysis>,
    anomalies: Vec<Anomaly>,
    top_drivers: Vec<TopDriver>,
}

#[derive(Debug, Serialize)]
struct ForecastOutput {
    sheet: String,
    x: String,
    y: String,
    points: usize,
    /// Whether the x axis looks like time; the forecast is produced either way.
    time_axis: bool,
    summary: String,
    result: ForecastResult,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Inspect(args) => inspect(args),
        Command::Forecast(args) => forecast(args),
    }
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if verbose { "debug" } else { "warn" }),
    );
    builder.format_timestamp(None).target(env_logger::Target::Stderr);
    builder.init();
}

fn inspect(args: InspectArgs) -> Result<()> {
    let config = Config::load(args.source.config.as_deref())?;
    let choice = pick_sheet(&args.source, &config)?;
    let roles = infer_column_roles_with(&choice.table, &config.roles);

    let insights = args.insights.then(|| {
        let date_col = roles.columns_with(ColumnRole::Date).next();
        let metric_col = roles.columns_with(ColumnRole::Metric).next();
        let trend = match (date_col, metric_col) {
            (Some(date), Some(metric)) => analyze_trend(&choice.table, date, metric),
            _ => None,
        };
        Insights {
            trend,
            anomalies: detect_anomalies(&choice.table, INSIGHT_LIMIT),
            top_drivers: identify_top_drivers(&choice.table, INSIGHT_LIMIT),
        }
    });

    let table = choice.table;
    let output = InspectOutput {
        sheet: choice.name,
        score: choice.score,
        parser: ParserDecisions {
            header_row: table.header_row_index,
            trimmed_footers: table.trimmed_footer_rows,
        },
        row_count: table.rows.len(),
        headers: table.headers,
        roles,
        insights,
    };
    print_json(&output, args.source.pretty)
}

fn forecast(args: ForecastArgs) -> Result<()> {
    let config = Config::load(args.source.config.as_deref())?;
    let choice = pick_sheet(&args.source, &config)?;
    let table = &choice.table;

    for field in [&args.x_field, &args.y_field] {
        if table.column_index(field).is_none() {
            bail!(
                "column `{field}` not found in sheet `{}` (columns: {})",
                choice.name,
                table.headers.join(", ")
            );
        }
    }

    let series = series_from_records(table, &args.x_field, &args.y_field);
    let first_x = series.first().map(|p| p.t.to_string()).unwrap_or_default();
    let time_axis = can_forecast_with(
        &args.x_field,
        &first_x,
        series.len(),
        config.forecast.min_points,
    );
    if !time_axis {
        log::warn!("`{}` does not look like a time axis", args.x_field);
    }

    let result = smart_forecast(&series, args.horizon, &config.forecast).with_context(|| {
        format!("forecast `{}` against `{}`", args.y_field, args.x_field)
    })?;

    let output = ForecastOutput {
        summary: forecast_summary(&result, &args.y_field),
        sheet: choice.name.clone(),
        x: args.x_field,
        y: args.y_field,
        points: series.len(),
        time_axis,
        result,
    };
    print_json(&output, args.source.pretty)
}

fn pick_sheet(source: &SourceArgs, config: &Config) -> Result<SheetChoice> {
    // A named sheet may sit past the candidate cap.
    let max_sheets = if source.sheet.is_some() {
        usize::MAX
    } else {
        config.scoring.max_candidate_sheets
    };
    let sheets = load_sheets(&source.path, config.csv.as_ref(), max_sheets)
        .with_context(|| format!("load {}", display(&source.path)))?;

    let choice = match &source.sheet {
        Some(name) => choose_sheet(&sheets, name, &config.inference, &config.scoring)
            .with_context(|| format!("sheet `{name}` not found in {}", display(&source.path)))?,
        None => select_best_sheet(&sheets, &config.inference, &config.scoring)
            .with_context(|| format!("no sheets in {}", display(&source.path)))?,
    };
    log::debug!("using sheet `{}` (score {})", choice.name, choice.score);
    Ok(choice)
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

fn print_json(output: &impl Serialize, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(output)
    } else {
        serde_json::to_string(output)
    }
    .context("serialize output")?;

    let mut stdout = io::stdout().lock();
    match writeln!(stdout, "{json}") {
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other.context("write output"),
    }
}
