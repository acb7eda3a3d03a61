pub use crate::config::*;
use crate::table::{Column, Table};

/// A builder for assembling a dataset row by row.
///
/// File readers produce rows, while the analysis works on columns. The
/// builder does the transposition.
///
/// ```
/// use answer_agreement::builder::TableBuilder;
/// use answer_agreement::Cell;
/// # use answer_agreement::AgreementError;
///
/// let mut builder = TableBuilder::new(&["group_id".to_string(), "q1".to_string()]);
///
/// builder.add_row(vec![Cell::text("A"), Cell::Integer(1)])?;
/// builder.add_row(vec![Cell::text("A"), Cell::Missing])?;
///
/// let table = builder.build()?;
/// assert_eq!(table.num_rows(), 2);
///
/// # Ok::<(), AgreementError>(())
/// ```
pub struct Builder {
    pub(crate) _headers: Vec<String>,
    pub(crate) _columns: Vec<Vec<Cell>>,
    pub(crate) _num_rows: usize,
}

pub type TableBuilder = Builder;

impl Builder {
    pub fn new(headers: &[String]) -> Builder {
        Builder {
            _headers: headers.to_vec(),
            _columns: headers.iter().map(|_| Vec::new()).collect(),
            _num_rows: 0,
        }
    }

    pub fn num_rows(&self) -> usize {
        self._num_rows
    }

    /// Adds a row. It must have exactly one cell per header.
    pub fn add_row(&mut self, cells: Vec<Cell>) -> AgreementResult<()> {
        if cells.len() != self._headers.len() {
            return Err(AgreementError::RowLength {
                row: self._num_rows,
                expected: self._headers.len(),
                found: cells.len(),
            });
        }
        for (col, cell) in self._columns.iter_mut().zip(cells) {
            col.push(cell);
        }
        self._num_rows += 1;
        Ok(())
    }

    /// Adds a row, converting each value into a cell.
    pub fn add_values<T: Into<Cell> + Clone>(&mut self, values: &[T]) -> AgreementResult<()> {
        self.add_row(values.iter().cloned().map(Into::into).collect())
    }

    pub fn build(self) -> AgreementResult<Table> {
        let columns = self
            ._headers
            .iter()
            .zip(self._columns)
            .map(|(name, cells)| Column {
                name: name.clone(),
                cells,
            })
            .collect();
        Table::new(columns)
    }
}
