// Primitives for reading CSV files.

use answer_agreement::{Column, Table};
use snafu::ResultExt;

use crate::aa::{
    io_common::{header_name, infer_text_column},
    *,
};

/// Reads a CSV file with a header row.
///
/// Every line must have as many fields as the header.
pub fn read_csv_table(path: &str) -> AaResult<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .context(OpeningCsvSnafu { path })?;

    let headers: Vec<String> = rdr
        .headers()
        .context(OpeningCsvSnafu { path })?
        .iter()
        .enumerate()
        .map(|(idx, h)| header_name(idx, h.trim_start_matches('\u{feff}')))
        .collect();
    debug!("read_csv_table: headers: {:?}", headers);

    let mut raw_columns: Vec<Vec<String>> = headers.iter().map(|_| Vec::new()).collect();
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvRecordSnafu { path, lineno })?;
        debug!("read_csv_table: lineno: {:?} row: {:?}", lineno, line);
        for (col, field) in raw_columns.iter_mut().zip(line.iter()) {
            col.push(field.to_string());
        }
    }

    let columns: Vec<Column> = headers
        .iter()
        .zip(raw_columns.iter())
        .map(|(name, raw)| Column::new(name, infer_text_column(raw)))
        .collect();
    Table::new(columns).context(AgreementSnafu)
}
