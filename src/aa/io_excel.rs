// Primitives for reading Excel workbooks (.xls and .xlsx).

use answer_agreement::{Cell, Column, Table};
use calamine::{open_workbook_auto, DataType, Range, Reader};
use snafu::{OptionExt, ResultExt};

use crate::aa::{
    io_common::{header_name, is_na, normalize_numeric_column},
    *,
};

/// Reads the first worksheet of a workbook. The first row is the header.
pub fn read_excel_table(path: &str) -> AaResult<Table> {
    let wrange = get_first_range(path)?;
    let mut iter = wrange.rows();
    let header = iter.next().context(EmptyWorkbookSnafu { path })?;
    debug!("read_excel_table: header: {:?}", header);
    let headers: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(idx, c)| header_name(idx, &cell_to_string(c)))
        .collect();

    let mut cells: Vec<Vec<Cell>> = headers.iter().map(|_| Vec::new()).collect();
    for (idx, row) in iter.enumerate() {
        debug!("read_excel_table: idx: {:?} row: {:?}", idx, row);
        for (col, elt) in cells.iter_mut().zip(row.iter()) {
            col.push(read_cell(elt));
        }
    }

    let columns: Vec<Column> = headers
        .iter()
        .zip(cells)
        .map(|(name, col)| Column::new(name, normalize_numeric_column(col)))
        .collect();
    Table::new(columns).context(AgreementSnafu)
}

pub fn read_cell(cell: &DataType) -> Cell {
    match cell {
        DataType::Int(i) => Cell::Integer(*i),
        DataType::Float(f) if f.is_nan() => Cell::Missing,
        DataType::Float(f) => Cell::Number(*f),
        DataType::DateTime(f) => Cell::Number(*f),
        DataType::Bool(b) => Cell::Boolean(*b),
        DataType::String(s) if is_na(s) => Cell::Missing,
        DataType::String(s) => Cell::Text(s.clone()),
        // Empty cells and formula errors
        _ => Cell::Missing,
    }
}

/// The text content of a cell, for headers and form definitions.
pub fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.clone(),
        DataType::Empty => "".to_string(),
        DataType::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        DataType::Float(f) | DataType::DateTime(f) => f.to_string(),
        DataType::Int(i) => i.to_string(),
        DataType::Bool(b) => b.to_string(),
        _ => "".to_string(),
    }
}

fn get_first_range(path: &str) -> AaResult<Range<DataType>> {
    let mut workbook = open_workbook_auto(path).context(OpeningWorkbookSnafu { path })?;
    debug!(
        "get_first_range: path: {:?} worksheets: {:?}",
        path,
        workbook.sheet_names()
    );
    workbook
        .worksheet_range_at(0)
        .context(EmptyWorkbookSnafu { path })?
        .context(OpeningWorkbookSnafu { path })
}
