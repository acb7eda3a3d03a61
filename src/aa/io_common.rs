// Primitives shared by the readers: file types and cell typing.

use std::path::Path;

use answer_agreement::{Cell, Table};

use crate::aa::{io_csv, io_excel, *};

/// The markers read as missing values in text files.
pub const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum DataFormat {
    Csv,
    Excel,
}

pub fn data_format(path: &str) -> AaResult<DataFormat> {
    if path.ends_with(".csv") {
        Ok(DataFormat::Csv)
    } else if path.ends_with(".xls") || path.ends_with(".xlsx") {
        Ok(DataFormat::Excel)
    } else {
        UnsupportedExtensionSnafu { path }.fail()
    }
}

/// Reads a dataset, choosing the reader from the file extension.
pub fn read_dataset(path: &str) -> AaResult<Table> {
    let format = data_format(path)?;
    info!(
        "Attempting to read dataset {:?} ({:?})",
        simplify_file_name(path),
        format
    );
    let table = match format {
        DataFormat::Csv => io_csv::read_csv_table(path)?,
        DataFormat::Excel => io_excel::read_excel_table(path)?,
    };
    info!(
        "read_dataset: {} rows, {} columns",
        table.num_rows(),
        table.num_columns()
    );
    Ok(table)
}

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

/// The name of a column, as found in the header row.
pub fn header_name(idx: usize, raw: &str) -> String {
    if raw.is_empty() {
        format!("Unnamed: {}", idx)
    } else {
        raw.to_string()
    }
}

pub fn is_na(s: &str) -> bool {
    NA_VALUES.contains(&s)
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Types a column of text cells.
///
/// All the cells of a column get the same type: integers, then numbers, then
/// booleans, then text as a fallback. Missing markers do not count.
pub fn infer_text_column(raw: &[String]) -> Vec<Cell> {
    let present: Vec<&str> = raw
        .iter()
        .map(|s| s.as_str())
        .filter(|s| !is_na(s))
        .collect();

    let convert: Box<dyn Fn(&str) -> Cell> =
        if present.iter().all(|s| s.trim().parse::<i64>().is_ok()) {
            Box::new(|s: &str| {
                s.trim()
                    .parse::<i64>()
                    .map(Cell::Integer)
                    .unwrap_or(Cell::Missing)
            })
        } else if present.iter().all(|s| s.trim().parse::<f64>().is_ok()) {
            Box::new(|s: &str| {
                s.trim()
                    .parse::<f64>()
                    .map(Cell::Number)
                    .unwrap_or(Cell::Missing)
            })
        } else if present.iter().all(|s| parse_bool(s).is_some()) {
            Box::new(|s: &str| parse_bool(s).map(Cell::Boolean).unwrap_or(Cell::Missing))
        } else {
            Box::new(Cell::text)
        };

    raw.iter()
        .map(|s| if is_na(s) { Cell::Missing } else { convert(s.as_str()) })
        .collect()
}

/// Unifies the numeric cells of a column read from a workbook.
///
/// Spreadsheets store all numbers as floats. A column where all of them are
/// whole numbers holds integers. A column mixing both holds floats.
pub fn normalize_numeric_column(cells: Vec<Cell>) -> Vec<Cell> {
    let numeric: Vec<&Cell> = cells
        .iter()
        .filter(|c| matches!(c, Cell::Integer(_) | Cell::Number(_)))
        .collect();
    if numeric.is_empty() {
        return cells;
    }
    let all_whole = numeric.iter().all(|c| match c {
        Cell::Number(x) => x.fract() == 0.0 && x.abs() < i64::MAX as f64,
        _ => true,
    });
    cells
        .into_iter()
        .map(|c| match c {
            Cell::Number(x) if all_whole => Cell::Integer(x as i64),
            Cell::Integer(i) if !all_whole => Cell::Number(i as f64),
            other => other,
        })
        .collect()
}
