use log::{debug, error, info, warn};

use registration_stats::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::dashboard::cache::DatasetCache;
use crate::dashboard::config_reader::*;

pub mod cache;
pub mod config_reader;
mod io_common;
mod io_csv;
mod io_excel;
mod report;
mod session;

pub const DEFAULT_INPUT_FILE: &str = "PAGO DE ANTORCHA 2026.xlsx";
pub const DEFAULT_TITLE: &str = "ANTORCHA 2026";

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DashboardError {
    #[snafu(display("Error opening spreadsheet {path}"))]
    OpeningExcel {
        source: calamine::Error,
        path: String,
    },
    #[snafu(display("The spreadsheet {path} has no worksheet or no header row"))]
    EmptyExcel { path: String },
    #[snafu(display("The spreadsheet {path} has no worksheet named {name}"))]
    MissingWorksheet { path: String, name: String },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("The CSV file {path} is empty"))]
    EmptyCsv { path: String },
    #[snafu(display("Could not parse line {lineno} of the CSV file"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("No encuentro el archivo: {path}"))]
    MissingSource { path: String },
    // The cause is kept for the logs, the user only sees one message.
    #[snafu(display("Error cargando archivo."))]
    LoadFailed {
        path: String,
        #[snafu(source(from(DashboardError, Box::new)))]
        source: Box<DashboardError>,
    },
    #[snafu(display("Error reading JSON file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing the output to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error reading the commands"))]
    ReadingInput { source: std::io::Error },
    #[snafu(display("Not a date (expected YYYY-MM-DD): {value}"))]
    InvalidDate { value: String },
    #[snafu(display("Unknown grouping column {value} (expected category or ticketType)"))]
    InvalidGroupBy { value: String },
    #[snafu(display("Unknown command: {line}"))]
    UnknownCommand { line: String },
    #[snafu(display("Difference detected between the dashboard and the reference {path}"))]
    ReferenceMismatch { path: String },
}

pub type DashResult<T> = Result<T, DashboardError>;

/// Where and how to read the registrations.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct InputOptions {
    pub path: String,
    pub worksheet: Option<String>,
    pub columns: ColumnNames,
    pub date_formats: Vec<String>,
}

/// Everything the dashboard needs, once the flags and the configuration file are merged.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Settings {
    pub title: String,
    pub input: InputOptions,
    pub display: DisplayOptions,
    pub selection: FilterSelection,
}

pub fn parse_cli_date(s: &str) -> DashResult<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .ok()
        .context(InvalidDateSnafu { value: s })
}

/// Merges the command line flags with the configuration file (if any).
///
/// The flags take precedence over the file, which takes precedence over the defaults.
pub fn build_settings(args: &Args) -> DashResult<Settings> {
    let (config, config_dir): (DashboardConfig, Option<PathBuf>) = match &args.config {
        Some(p) => {
            let c = read_config(p)?;
            let dir = Path::new(p).parent().map(|d| d.to_path_buf());
            (c, dir)
        }
        None => (DashboardConfig::default(), None),
    };
    debug!("build_settings: config: {:?}", config);

    let input_cfg = config.input.clone().unwrap_or_default();
    let display_cfg = config.display.clone().unwrap_or_default();

    let path: String = match (&args.input, &input_cfg.file_path) {
        (Some(p), _) => p.clone(),
        (None, Some(p)) => match &config_dir {
            Some(dir) if Path::new(p).is_relative() => dir.join(p).display().to_string(),
            _ => p.clone(),
        },
        (None, None) => DEFAULT_INPUT_FILE.to_string(),
    };

    let group_by = match args.group_by.as_ref().or(display_cfg.group_by.as_ref()) {
        Some(s) => parse_group_by(s)?,
        None => GroupBy::Category,
    };

    let defaults = DisplayOptions::default();
    let display = DisplayOptions {
        truncate_length: args
            .truncate
            .or(display_cfg.truncate_length)
            .unwrap_or(defaults.truncate_length),
        group_by,
        colors: display_cfg
            .colors
            .as_ref()
            .map(|c| c.color_scheme())
            .unwrap_or(defaults.colors),
        all_label: display_cfg.all_label.clone().unwrap_or(defaults.all_label),
    };

    let mut dates: Vec<chrono::NaiveDate> = Vec::new();
    for d in [&args.from, &args.to].iter().copied().flatten() {
        dates.push(parse_cli_date(d)?);
    }
    let selection = FilterSelection {
        dates: DateRange::from_dates(&dates),
        leader: args
            .leader
            .as_ref()
            .map(|s| Choice::parse(s, &display.all_label))
            .unwrap_or(Choice::All),
        category: args
            .category
            .as_ref()
            .map(|s| Choice::parse(s, &display.all_label))
            .unwrap_or(Choice::All),
    };

    Ok(Settings {
        title: display_cfg.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        input: InputOptions {
            path,
            worksheet: args
                .excel_worksheet_name
                .clone()
                .or(input_cfg.excel_worksheet_name),
            columns: input_cfg.columns.unwrap_or_default(),
            date_formats: input_cfg.date_formats.unwrap_or_else(|| {
                io_common::DEFAULT_DATE_FORMATS
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            }),
        },
        display,
        selection,
    })
}

fn is_csv(path: &str) -> bool {
    Path::new(path)
        .extension()
        .map(|e| e.to_string_lossy().eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

/// Reads a registration file into a dataset.
pub fn load_dataset(path: &str, input: &InputOptions) -> DashResult<Dataset> {
    info!("Attempting to read registration file {:?}", path);
    let table = if is_csv(path) {
        io_csv::read_csv_table(path)?
    } else {
        io_excel::read_excel_table(path, input.worksheet.as_deref())?
    };
    let dataset = io_common::to_dataset(&table, &input.columns, &input.date_formats);
    info!(
        "Read {} registrations from {} (columns: {:?})",
        dataset.len(),
        io_common::simplify_file_name(path),
        dataset.fields()
    );
    Ok(dataset)
}

/// Returns the dataset for the configured file, reading it only if the cache does not have it.
///
/// A missing file is reported as such. Every other problem is logged with its
/// cause and reported as a single load failure.
pub fn open_dataset(cache: &mut DatasetCache, input: &InputOptions) -> DashResult<Rc<Dataset>> {
    let path = input.path.as_str();
    ensure!(Path::new(path).exists(), MissingSourceSnafu { path });
    cache
        .get_or_load(Path::new(path), |_| load_dataset(path, input))
        .map_err(|e| {
            error!("Failed to load {:?}: {:?}", path, e);
            e
        })
        .context(LoadFailedSnafu { path })
}

fn summary_to_json(s: &Summary) -> JSValue {
    json!({
        "registrations": s.total,
        "leaders": s.distinct_leaders,
        "topCategory": s.top_category,
        "topCategoryCount": s.top_category_count,
        "progress": format!("{:.1}%", s.percentage),
    })
}

fn chart_to_json(c: &ChartTable) -> JSValue {
    let rows: Vec<JSValue> = c
        .rows
        .iter()
        .map(|r| {
            json!({
                "leader": r.leader,
                "label": r.label,
                "total": r.total,
                "shortLeader": r.short_leader,
                "color": r.color,
            })
        })
        .collect();
    let ranking: Vec<JSValue> = c
        .ranking
        .iter()
        .map(|(leader, total)| json!({"leader": leader, "total": total}))
        .collect();
    json!({"rows": rows, "ranking": ranking})
}

pub fn view_to_json(title: &str, selection: &FilterSelection, view: &DashboardView) -> JSValue {
    let date_js = |d: Option<&chrono::NaiveDate>| d.map(|x| x.format("%Y-%m-%d").to_string());
    let (start, end) = match selection.dates {
        DateRange::Unset => (None, None),
        DateRange::Partial(s) => (date_js(Some(&s)), None),
        DateRange::Full(s, e) => (date_js(Some(&s)), date_js(Some(&e))),
    };
    let bounds = view
        .controls
        .date_bounds
        .map(|(lo, hi)| json!([date_js(Some(&lo)), date_js(Some(&hi))]));
    let only = |c: &Choice| match c {
        Choice::All => None,
        other => Some(other.label(ALL_LABEL).to_string()),
    };
    json!({
        "title": title,
        "selection": {
            "from": start,
            "to": end,
            "leader": only(&selection.leader),
            "category": only(&selection.category),
        },
        "summary": summary_to_json(&view.summary),
        "table": {"headers": view.table.headers, "rows": view.table.rows},
        "chart": view.chart.as_ref().map(chart_to_json),
        "warning": view.warning,
        "controls": {
            "leaders": view.controls.leaders,
            "categories": view.controls.categories,
            "dateBounds": bounds,
        },
    })
}

pub fn read_reference(path: &str) -> DashResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

fn write_output(out: &str, pretty: &str) -> DashResult<()> {
    if out == "stdout" {
        println!("{}", pretty);
        Ok(())
    } else {
        info!("Writing dashboard to {:?}", out);
        fs::write(out, pretty).context(WritingOutputSnafu { path: out })
    }
}

/// Renders the dashboard once for the selection given on the command line.
pub fn run_dashboard(args: &Args) -> DashResult<()> {
    let settings = build_settings(args)?;
    info!("settings: {:?}", settings);

    let mut cache = DatasetCache::new();
    if args.interactive {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        return session::run_session(&settings, &mut cache, stdin.lock(), stdout.lock());
    }

    let dataset = open_dataset(&mut cache, &settings.input)?;
    let selection = seed_dates(&settings.selection, &dataset);
    let view = render(&dataset, &selection, &settings.display);

    if args.out.is_none() {
        let stdout = std::io::stdout();
        report::write_report(&mut stdout.lock(), &settings.title, &view)
            .context(WritingOutputSnafu { path: "stdout" })?;
    }

    let view_js = view_to_json(&settings.title, &selection, &view);
    let pretty_js = serde_json::to_string_pretty(&view_js).context(ParsingJsonSnafu {})?;
    if let Some(out) = &args.out {
        write_output(out, &pretty_js)?;
    }

    // The reference dashboard, if provided for comparison
    if let Some(reference_p) = &args.reference {
        let reference = read_reference(reference_p)?;
        let pretty_reference =
            serde_json::to_string_pretty(&reference).context(ParsingJsonSnafu {})?;
        if pretty_reference != pretty_js {
            warn!("Found differences with the reference dashboard");
            print_diff(pretty_reference.as_str(), pretty_js.as_str(), "\n");
            return ReferenceMismatchSnafu { path: reference_p }.fail();
        }
    }

    Ok(())
}
