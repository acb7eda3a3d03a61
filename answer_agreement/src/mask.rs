use log::debug;
use snafu::ensure;
use std::collections::HashSet;

use crate::config::*;

/// The columns that may take part in a mask, before clipping.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum MaskCandidates {
    /// Every column of the dataset.
    All,
    /// Only these labels. Their order does not matter.
    Names(Vec<String>),
}

/// The ordered list of columns to analyze.
///
/// A mask is always a subsequence of the dataset columns: it follows the
/// order of the dataset, never the order in which candidates were given.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ColumnMask {
    columns: Vec<String>,
}

impl ColumnMask {
    /// Builds a mask from the columns of a dataset.
    ///
    /// Arguments:
    /// * `full_columns` the columns of the dataset, in order
    /// * `candidates` the columns allowed in the mask
    /// * `first` the first column that may be kept (inclusive). It does not
    /// have to be a candidate. If not provided, start at the first column.
    /// * `last` the last column that may be kept (inclusive). If not
    /// provided, go through the last column.
    ///
    /// A `first` or `last` label that is not a column of the dataset is an
    /// error, checked before anything else.
    pub fn build(
        full_columns: &[String],
        candidates: &MaskCandidates,
        first: Option<&str>,
        last: Option<&str>,
    ) -> AgreementResult<ColumnMask> {
        for bound in [first, last].into_iter().flatten() {
            ensure!(
                full_columns.iter().any(|c| c == bound),
                MissingColumnSnafu { column: bound }
            );
        }

        let lookup: Option<HashSet<&str>> = match candidates {
            MaskCandidates::All => None,
            MaskCandidates::Names(names) => Some(names.iter().map(|s| s.as_str()).collect()),
        };

        let mut can_collect = first.is_none();
        let mut columns: Vec<String> = Vec::new();
        for column in full_columns {
            if Some(column.as_str()) == first {
                can_collect = true;
            }
            let is_candidate = lookup
                .as_ref()
                .map(|l| l.contains(column.as_str()))
                .unwrap_or(true);
            if can_collect && is_candidate {
                columns.push(column.clone());
            }
            if Some(column.as_str()) == last {
                can_collect = false;
            }
        }
        debug!(
            "ColumnMask::build: first: {:?} last: {:?} kept {} of {} columns",
            first,
            last,
            columns.len(),
            full_columns.len()
        );
        Ok(ColumnMask { columns })
    }

    /// A mask with every column.
    pub fn all(full_columns: &[String]) -> ColumnMask {
        ColumnMask {
            columns: full_columns.to_vec(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}
