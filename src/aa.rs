use log::{debug, info, warn};

use answer_agreement::*;
use snafu::prelude::*;

use std::fs;
use std::io::Write;

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;

pub mod io_common;
mod io_csv;
mod io_excel;
pub mod io_xlsform;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AaError {
    #[snafu(display(
        "Unable to create dataset from {path:?}. Known extensions are .csv, .xls, and .xlsx"
    ))]
    UnsupportedExtension { path: String },
    #[snafu(display("Error opening CSV file {path}: {source}"))]
    OpeningCsv { source: csv::Error, path: String },
    #[snafu(display("Error parsing line {lineno} of {path}: {source}"))]
    CsvRecord {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Error opening workbook {path}: {source}"))]
    OpeningWorkbook {
        source: calamine::Error,
        path: String,
    },
    #[snafu(display("Workbook {path} has no data"))]
    EmptyWorkbook { path: String },
    #[snafu(display("Workbook {path} has no \"survey\" sheet"))]
    MissingSurveySheet { path: String },
    #[snafu(display("The survey sheet of {path} has no header row"))]
    EmptySurveySheet { path: String },
    #[snafu(display("No {column:?} column in the survey sheet of {path}"))]
    MissingFormColumn { column: String, path: String },
    #[snafu(display("{source}"))]
    Agreement { source: AgreementError },
    #[snafu(display("Error reading JSON file {path}: {source}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON: {source}"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing to {path}: {source}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Difference detected between calculated summary and reference summary"))]
    ReferenceMismatch {},
}

pub type AaResult<T> = Result<T, AaError>;

/// The options of an analysis, as echoed in the JSON summary.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    pub datafile: String,
    pub xlsform: Option<String>,
    pub group_column: Option<String>,
    pub first: Option<String>,
    pub last: Option<String>,
    pub separator: String,
}

impl OutputSettings {
    pub fn from_args(args: &Args) -> OutputSettings {
        OutputSettings {
            datafile: args.datafile.clone(),
            xlsform: args.xlsform.clone(),
            group_column: args.group_column.clone(),
            first: args.first.clone(),
            last: args.last.clone(),
            separator: separator(args).as_str().to_string(),
        }
    }
}

fn separator(args: &Args) -> Separator {
    if args.separator {
        Separator::Hyphen
    } else {
        Separator::Colon
    }
}

/// Builds the column mask of a dataset.
///
/// With an XlsForm, only the questions of the form are candidates. The
/// first and last columns always clip the mask.
pub fn build_mask(table: &Table, args: &Args) -> AaResult<ColumnMask> {
    let candidates = match &args.xlsform {
        Some(form_path) => MaskCandidates::Names(io_xlsform::read_form_candidates(
            form_path,
            separator(args),
        )?),
        None => MaskCandidates::All,
    };
    let mask = ColumnMask::build(
        &table.column_names(),
        &candidates,
        args.first.as_deref(),
        args.last.as_deref(),
    )
    .context(AgreementSnafu)?;
    info!("build_mask: {} columns to compare", mask.len());
    debug!("build_mask: {:?}", mask.columns());
    Ok(mask)
}

/// Reads the dataset and runs the analysis for all the groups.
pub fn analyze(args: &Args) -> AaResult<DatasetAgreement> {
    let table = io_common::read_dataset(&args.datafile)?;
    let mask = build_mask(&table, args)?;
    DatasetAgreement::new(table, args.group_column.as_deref(), Some(mask)).context(AgreementSnafu)
}

fn cell_to_json(cell: &Cell) -> JSValue {
    match cell {
        Cell::Missing => JSValue::Null,
        Cell::Boolean(b) => json!(b),
        Cell::Integer(i) => json!(i),
        // Infinite numbers are not valid JSON and become null.
        Cell::Number(x) => json!(x),
        Cell::Text(s) => json!(s),
    }
}

fn group_to_json(group: &GroupAgreement) -> JSValue {
    let questions: Vec<JSValue> = group
        .results()
        .iter()
        .map(|(column, qa)| {
            json!({
                "column": column,
                "correct_answer": qa.correct_answer.as_ref().map(cell_to_json),
                "all_missing": qa.all_missing,
                "group_all_correct": qa.group_all_correct,
                "correct_answer_count": qa.correct_answer_count,
                "percent_correct": qa.percent_correct,
            })
        })
        .collect();
    json!({
        "group_id": group.group_id().map(cell_to_json),
        "group_size": group.group_size(),
        "comparisons": group.comparisons(),
        "total_agreement": group.total_agreement(),
        "questions": questions,
    })
}

pub fn build_summary_js(settings: &OutputSettings, agreement: &DatasetAgreement) -> JSValue {
    let results: Vec<JSValue> = agreement.iter().map(group_to_json).collect();
    json!({
        "config": settings,
        "results": results,
        "unaccounted": agreement.unaccounted().map(|t| t.num_rows()),
    })
}

pub fn read_summary(path: &str) -> AaResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

fn write_output(out: &str, contents: &str) -> AaResult<()> {
    if out == "stdout" {
        println!("{}", contents);
        Ok(())
    } else {
        info!("Writing summary to {:?}", out);
        fs::write(out, contents).context(WritingOutputSnafu { path: out })
    }
}

/// Compares the summary with a reference summary and prints the differences.
pub fn check_reference(pretty_js_stats: &str, reference_path: &str) -> AaResult<()> {
    let summary_ref = read_summary(reference_path)?;
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference summary {:?}", reference_path);
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        return ReferenceMismatchSnafu {}.fail();
    }
    info!("The summary matches the reference {:?}", reference_path);
    Ok(())
}

/// Lists the questions on which the members of a group do not all agree.
pub fn write_disagreements<W: Write>(
    group: &GroupAgreement,
    out: &mut W,
) -> std::io::Result<()> {
    let columns = group.disagreeing_columns().column_names();
    if columns.is_empty() {
        writeln!(out, "- Disagreement on: none")
    } else {
        writeln!(out, "- Disagreement on: {}", columns.join(", "))
    }
}

pub fn run_analysis(args: &Args) -> AaResult<()> {
    let settings = OutputSettings::from_args(args);
    info!("settings: {:?}", settings);

    let agreement = analyze(args)?;

    for group in agreement.iter() {
        group
            .print_summary()
            .context(WritingOutputSnafu { path: "stdout" })?;
        if args.disagreements {
            write_disagreements(group, &mut std::io::stdout().lock())
                .context(WritingOutputSnafu { path: "stdout" })?;
        }
    }
    if let Some(unaccounted) = agreement.unaccounted() {
        if unaccounted.num_rows() > 0 {
            warn!(
                "{} rows have no value in the group column and were not analyzed",
                unaccounted.num_rows()
            );
        }
    }

    if args.out.is_none() && args.reference.is_none() {
        return Ok(());
    }

    let result_js = build_summary_js(&settings, &agreement);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    if let Some(out) = &args.out {
        write_output(out, &pretty_js_stats)?;
    }

    // The reference summary, if provided for comparison
    if let Some(reference) = &args.reference {
        check_reference(&pretty_js_stats, reference)?;
    }

    Ok(())
}
