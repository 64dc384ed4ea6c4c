pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_xlsx;
pub mod sink;

use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use survey_split::builder::Builder;
use survey_split::*;

use std::fs;
use std::path::{Path, PathBuf};

use crate::args::Args;
use crate::split::config_reader::*;
use crate::split::io_common::{resolve_path, Provider};
use crate::split::sink::FsSink;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum QualsplitError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The workbook {path} does not have any worksheet"))]
    EmptyExcel { path: String },
    #[snafu(display("The workbook {path} does not have a worksheet named {name:?}"))]
    MissingWorksheet { path: String, name: String },
    #[snafu(display("Error opening file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of {path}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("The file {path} is empty"))]
    EmptyInput { path: String },
    #[snafu(display("Error opening configuration file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the configuration"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("The field {field} should be a non-negative number"))]
    ParsingJsonNumber { field: String },
    #[snafu(display("Cannot create the output directory {path}"))]
    OutputDirectory {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("No input file: use --input or add a source to the configuration"))]
    MissingInput {},
    #[snafu(display("No PIC column: use --pic-index or set picIndex in the configuration"))]
    MissingPicIndex {},

    #[snafu(context(false), display("{source}"))]
    Split { source: SplitError },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type QsResult<T> = Result<T, QualsplitError>;

/// Everything needed for one run, once the configuration file and the command line are merged.
#[derive(Debug, Clone)]
struct RunSettings {
    input: String,
    provider: Provider,
    worksheet: Option<String>,
    output_directory: PathBuf,
    structured_file_name: Option<String>,
    options_prefix: String,
    hide_timestamp: bool,
    pic_index: Option<usize>,
    specs: Vec<QuestionSpec>,
    jobs: usize,
}

/// Sends the progress of the run to the logs.
struct LogProgress;

impl ProgressReporter for LogProgress {
    fn report(&self, percent: f64) {
        info!("progress: {:.0}%", percent);
    }
}

fn parse_link_arg(s: &str) -> QsResult<QuestionSpec> {
    let (idx_s, link) = match s.split_once(':') {
        Some((i, l)) => (i, Some(l.to_string())),
        None => (s, None),
    };
    let index = match idx_s.trim().parse::<usize>() {
        Ok(x) => x,
        Err(_) => whatever!("cannot read the question index in --link {:?}", s),
    };
    Ok(QuestionSpec {
        index,
        classification: Classification::Qualitative,
        has_link: true,
        link,
    })
}

/// Changes the classification of a question, keeping the link it already has.
fn reclassify(specs: &[QuestionSpec], index: usize, classification: Classification) -> QuestionSpec {
    let previous = specs.iter().rev().find(|s| s.index == index);
    QuestionSpec {
        index,
        classification,
        has_link: previous.map(|s| s.has_link).unwrap_or(false),
        link: previous.and_then(|s| s.link.clone()),
    }
}

fn merge_settings(args: &Args) -> QsResult<RunSettings> {
    let config = match &args.config {
        Some(p) => read_config(p)?,
        None => SplitConfig::default(),
    };
    // Relative paths in the configuration are relative to the configuration file.
    let root: PathBuf = args
        .config
        .as_ref()
        .and_then(|p| Path::new(p).parent().map(|x| x.to_path_buf()))
        .unwrap_or_default();

    let (input, config_provider, config_worksheet) = match (&args.input, &config.source) {
        (Some(i), _) => (i.clone(), None, None),
        (None, Some(src)) => (
            resolve_path(&root, &src.file_path),
            src.provider.clone(),
            src.excel_worksheet_name.clone(),
        ),
        (None, None) => return MissingInputSnafu {}.fail(),
    };
    let provider = match args.input_type.clone().or(config_provider) {
        Some(p) => p.parse::<Provider>()?,
        None => Provider::from_path(&input),
    };

    let output_directory: PathBuf = match (&args.out, &config.output_settings.output_directory) {
        (Some(o), _) => PathBuf::from(o),
        (None, Some(o)) => PathBuf::from(resolve_path(&root, o)),
        (None, None) => root.clone(),
    };

    let mut specs: Vec<QuestionSpec> = Vec::new();
    for q in config.questions.iter() {
        specs.push(q.to_spec()?);
    }
    // The command line comes last, it overrides the configuration file.
    for idx in args.demographic.iter() {
        let spec = reclassify(&specs, *idx, Classification::Demographic);
        specs.push(spec);
    }
    for idx in args.qualitative.iter() {
        let spec = reclassify(&specs, *idx, Classification::Qualitative);
        specs.push(spec);
    }
    for l in args.link.iter() {
        specs.push(parse_link_arg(l)?);
    }

    Ok(RunSettings {
        input,
        provider,
        worksheet: args.excel_worksheet_name.clone().or(config_worksheet),
        output_directory,
        structured_file_name: config.output_settings.structured_file_name.clone(),
        options_prefix: args
            .prefix
            .clone()
            .or_else(|| config.output_settings.qualitative_prefix.clone())
            .unwrap_or_default(),
        hide_timestamp: args.hide_timestamp
            || config.output_settings.hide_timestamp.unwrap_or(false),
        pic_index: args.pic_index.or(config.pic_index()?),
        specs,
        jobs: args.jobs.unwrap_or(0),
    })
}

fn read_table(settings: &RunSettings) -> QsResult<ResponseTable> {
    info!(
        "Attempting to read survey file {:?} ({:?})",
        settings.input, settings.provider
    );
    match settings.provider {
        Provider::Csv => io_csv::read_csv_table(&settings.input),
        Provider::Xlsx => io_xlsx::read_xlsx_table(&settings.input, settings.worksheet.as_deref()),
    }
}

fn build_model(table: &ResponseTable, specs: &[QuestionSpec]) -> QsResult<QuestionModel> {
    let mut builder = Builder::new(table.header())?;
    for spec in specs.iter() {
        debug!("build_model: {:?}", spec);
        builder = builder.apply(spec)?;
    }
    Ok(builder.build()?)
}

/// Prints the columns of the input, in the order used by all the index options.
pub fn list_columns(args: &Args) -> QsResult<Vec<String>> {
    let settings = merge_settings(args)?;
    let table = read_table(&settings)?;
    let lines: Vec<String> = table
        .header()
        .iter()
        .enumerate()
        .map(|(idx, label)| format!("{}\t{}", idx, label))
        .collect();
    Ok(lines)
}

/// Runs the split described by the command line and the optional configuration file.
pub fn run_survey_split(args: &Args) -> QsResult<SplitReport> {
    let settings = merge_settings(args)?;
    info!("settings: {:?}", settings);

    let table = read_table(&settings)?;
    info!(
        "Read {} respondents and {} questions",
        table.num_respondents(),
        table.num_questions()
    );

    // All the configuration is checked before anything gets written.
    let model = build_model(&table, &settings.specs)?;
    let pic_index = settings.pic_index.context(MissingPicIndexSnafu {})?;
    let options = Options {
        hide_timestamp: settings.hide_timestamp,
        pic_index,
        qualitative_prefix: settings.options_prefix.clone(),
    };
    check_options(&model, &options)?;

    let out_dir = settings.output_directory.clone();
    if !out_dir.as_os_str().is_empty() {
        fs::create_dir_all(&out_dir).context(OutputDirectorySnafu {
            path: out_dir.display().to_string(),
        })?;
    }
    let structured_name = settings
        .structured_file_name
        .clone()
        .unwrap_or_else(|| format!("{} StructuredData.csv", options.qualitative_prefix));
    let sink = FsSink::new(&out_dir, &structured_name);

    let report = run_split(&model, &table, &options, &sink, &LogProgress, settings.jobs)?;
    for failure in report.failures() {
        if let Err(e) = &failure.result {
            warn!("Document {:?} was not written: {}", failure.name, e);
        }
    }
    Ok(report)
}
