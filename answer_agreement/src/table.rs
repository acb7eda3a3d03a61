use log::debug;
use snafu::{ensure, OptionExt};
use std::collections::{BTreeMap, HashSet};

use crate::config::*;

/// A named column of cells.
#[derive(PartialEq, Debug, Clone)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Cell>,
}

impl Column {
    pub fn new(name: &str, cells: Vec<Cell>) -> Column {
        Column {
            name: name.to_string(),
            cells,
        }
    }
}

/// A dataset: ordered, uniquely named columns of the same length.
///
/// The order of the columns is the order of the source file. It matters for
/// building column masks.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Table {
    columns: Vec<Column>,
    num_rows: usize,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> AgreementResult<Table> {
        let num_rows = columns.first().map(|c| c.cells.len()).unwrap_or(0);
        let mut seen: HashSet<&str> = HashSet::new();
        for c in columns.iter() {
            ensure!(
                seen.insert(c.name.as_str()),
                DuplicateColumnSnafu {
                    column: c.name.clone()
                }
            );
            ensure!(
                c.cells.len() == num_rows,
                RaggedTableSnafu {
                    column: c.name.clone(),
                    expected: num_rows,
                    found: c.cells.len(),
                }
            );
        }
        Ok(Table { columns, num_rows })
    }

    pub fn empty() -> Table {
        Table::default()
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// The rows at the given positions, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> AgreementResult<Table> {
        if let Some(row) = indices.iter().find(|idx| **idx >= self.num_rows) {
            return MissingRowSnafu {
                row: *row,
                num_rows: self.num_rows,
            }
            .fail();
        }
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                cells: indices.iter().map(|idx| c.cells[*idx].clone()).collect(),
            })
            .collect();
        Ok(Table {
            columns,
            num_rows: indices.len(),
        })
    }

    /// The columns with the given names, in the order of `names`.
    pub fn select_columns(&self, names: &[String]) -> AgreementResult<Table> {
        let mut columns: Vec<Column> = Vec::new();
        for name in names {
            let c = self.column(name).context(MissingColumnSnafu {
                column: name.clone(),
            })?;
            columns.push(c.clone());
        }
        Table::new(columns).map(|t| Table {
            num_rows: self.num_rows,
            ..t
        })
    }

    /// The columns accepted by `pred`, in table order.
    pub fn retain_columns<F>(&self, pred: F) -> Table
    where
        F: Fn(&Column) -> bool,
    {
        Table {
            columns: self.columns.iter().filter(|c| pred(c)).cloned().collect(),
            num_rows: self.num_rows,
        }
    }

    /// Splits the rows by the distinct values of a column.
    ///
    /// Groups come out sorted by key. Within a group, rows keep their
    /// relative order. The rows where the key is missing are returned
    /// separately.
    pub fn group_by(&self, name: &str) -> AgreementResult<(Vec<(Cell, Table)>, Table)> {
        let key_column = self.column(name).context(MissingColumnSnafu {
            column: name.to_string(),
        })?;
        let mut grouped: BTreeMap<&Cell, Vec<usize>> = BTreeMap::new();
        let mut unaccounted: Vec<usize> = Vec::new();
        for (idx, key) in key_column.cells.iter().enumerate() {
            if key.is_missing() {
                unaccounted.push(idx);
            } else {
                grouped.entry(key).or_default().push(idx);
            }
        }
        debug!(
            "group_by: column {:?}: {} groups, {} rows without a group",
            name,
            grouped.len(),
            unaccounted.len()
        );
        let mut groups: Vec<(Cell, Table)> = Vec::new();
        for (key, rows) in grouped {
            groups.push((key.clone(), self.select_rows(&rows)?));
        }
        Ok((groups, self.select_rows(&unaccounted)?))
    }
}
