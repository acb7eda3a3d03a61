/*!
Answer agreement analysis.

Each member of a group records the answers of the same respondent. All the
members of all the groups submit their surveys, which form one dataset. For
every question and every group, this crate finds the answer most members
agree on, and measures how much they agree.

```
use answer_agreement::builder::TableBuilder;
use answer_agreement::{Cell, DatasetAgreement};
# use answer_agreement::AgreementError;

let headers = ["group_id", "q1", "q2"].map(String::from);
let mut builder = TableBuilder::new(&headers);
builder.add_row(vec![Cell::text("A"), Cell::Integer(1), Cell::Integer(1)])?;
builder.add_row(vec![Cell::text("A"), Cell::Integer(1), Cell::Integer(2)])?;
builder.add_row(vec![Cell::text("A"), Cell::Integer(1), Cell::Integer(1)])?;
let table = builder.build()?;

let agreement = DatasetAgreement::new(table, Some("group_id"), None)?;
let group = agreement.group(Some(&Cell::text("A")))?;
assert_eq!(group.result("q2").unwrap().correct_answer_count, 2);

# Ok::<(), AgreementError>(())
```

See the [manual] for the command line program.
*/

mod config;
pub mod builder;
pub mod form;
pub mod manual;
pub mod mask;
pub mod table;

use log::{debug, info};

use snafu::{ensure, OptionExt};
use std::collections::HashMap;
use std::io::Write;
use std::ops::Index;

pub use crate::config::*;
pub use crate::form::{qualified_names, qualify_fields, FormField};
pub use crate::mask::{ColumnMask, MaskCandidates};
pub use crate::table::{Column, Table};

/// Analyzes the answers of a group to one question.
///
/// This is the voting procedure:
/// - the answers are tallied, missing answers are ignored
/// - the most popular answer is the correct one, unless the two most popular
/// answers have the same number of votes. Ties further down do not matter.
/// - everybody agrees if there is a single answer and nobody skipped the
/// question.
///
/// Answers with the same count are ranked by order of first appearance.
///
/// The size of the group is the number of values, including the missing ones.
/// It must not be zero.
pub fn analyze_answer_votes(values: &[Cell]) -> AgreementResult<QuestionAgreement> {
    let group_size = values.len();
    ensure!(group_size > 0, EmptyGroupSnafu {});

    let counts = tally(values);

    let (correct_answer, all_missing, group_all_correct, correct_answer_count) =
        match counts.as_slice() {
            // All answers are missing.
            [] => (None, true, false, 0),
            // A single answer. It is unanimous if nobody skipped.
            [(answer, count)] => (
                Some((*answer).clone()),
                false,
                *count == group_size,
                *count,
            ),
            // The top two answers have the same number of votes.
            [(_, c1), (_, c2), ..] if c1 == c2 => (None, false, false, 0),
            // One answer has more votes than any other.
            [(answer, count), ..] => (Some((*answer).clone()), false, false, *count),
        };

    Ok(QuestionAgreement {
        correct_answer,
        all_missing,
        group_all_correct,
        correct_answer_count,
        percent_correct: correct_answer_count as f64 / group_size as f64,
    })
}

// The distinct non-missing values and their counts, most popular first.
// The sort is stable: equal counts stay in order of first appearance.
fn tally(values: &[Cell]) -> Vec<(&Cell, usize)> {
    let mut positions: HashMap<&Cell, usize> = HashMap::new();
    let mut counts: Vec<(&Cell, usize)> = Vec::new();
    for v in values.iter().filter(|v| !v.is_missing()) {
        let pos = *positions.entry(v).or_insert_with(|| {
            counts.push((v, 0));
            counts.len() - 1
        });
        counts[pos].1 += 1;
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// The analysis of one group within a dataset.
///
/// All the results are computed at construction.
#[derive(PartialEq, Debug, Clone)]
pub struct GroupAgreement {
    table: Table,
    group_id: Option<Cell>,
    column_mask: ColumnMask,
    group_size: usize,
    results: Vec<(String, QuestionAgreement)>,
    total_agreement: Option<f64>,
    comparisons: usize,
}

impl GroupAgreement {
    /// Analyzes the masked columns of a group.
    ///
    /// Arguments:
    /// * `table` the rows of this group
    /// * `group_id` the value of the group column for these rows. `None` if
    /// the whole dataset is one group.
    /// * `column_mask` the columns to analyze. All of them must be in `table`.
    pub fn new(
        table: Table,
        group_id: Option<Cell>,
        column_mask: &ColumnMask,
    ) -> AgreementResult<GroupAgreement> {
        let group_size = table.num_rows();
        ensure!(group_size > 0, EmptyGroupSnafu {});

        let masked = table.select_columns(column_mask.columns())?;
        let mut results: Vec<(String, QuestionAgreement)> = Vec::new();
        for column in masked.columns() {
            let qa = analyze_answer_votes(&column.cells)?;
            debug!(
                "GroupAgreement: group {:?} column {:?}: {:?}",
                group_id, column.name, qa
            );
            results.push((column.name.clone(), qa));
        }

        let completed: Vec<&QuestionAgreement> = results
            .iter()
            .map(|(_, qa)| qa)
            .filter(|qa| !qa.all_missing)
            .collect();
        let comparisons = completed.len();
        let total_agreement = if comparisons == 0 {
            None
        } else {
            let agreed = completed.iter().filter(|qa| qa.group_all_correct).count();
            Some(agreed as f64 / comparisons as f64)
        };

        info!(
            "GroupAgreement: group {:?}: {} members, {} comparisons, total agreement {:?}",
            group_id, group_size, comparisons, total_agreement
        );

        Ok(GroupAgreement {
            table,
            group_id,
            column_mask: column_mask.clone(),
            group_size,
            results,
            total_agreement,
            comparisons,
        })
    }

    pub fn group_id(&self) -> Option<&Cell> {
        self.group_id.as_ref()
    }

    /// The number of members in this group.
    pub fn group_size(&self) -> usize {
        self.group_size
    }

    /// The number of questions with at least one answer.
    pub fn comparisons(&self) -> usize {
        self.comparisons
    }

    /// The proportion of questions, among those with at least one answer,
    /// on which every member agrees.
    ///
    /// `None` if no question was answered at all, which is different from
    /// no agreement.
    pub fn total_agreement(&self) -> Option<f64> {
        self.total_agreement
    }

    /// The analysis of every masked column, in mask order.
    pub fn results(&self) -> &[(String, QuestionAgreement)] {
        &self.results
    }

    pub fn result(&self, column: &str) -> Option<&QuestionAgreement> {
        self.results
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, qa)| qa)
    }

    /// All the rows of this group.
    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn column_mask(&self) -> &ColumnMask {
        &self.column_mask
    }

    /// The rows of this group, restricted to the masked columns.
    pub fn masked_table(&self) -> Table {
        self.table.retain_columns(|c| self.column_mask.contains(&c.name))
    }

    /// The masked columns with at least one answer, on which the members do
    /// not all agree.
    pub fn disagreeing_columns(&self) -> Table {
        self.table.retain_columns(|c| {
            self.result(&c.name)
                .map(|qa| !qa.all_missing && !qa.group_all_correct)
                .unwrap_or(false)
        })
    }

    pub fn write_summary<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        let id = self
            .group_id
            .as_ref()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "None".to_string());
        let total = self
            .total_agreement
            .map(|x| format!("{:?}", x))
            .unwrap_or_else(|| "NaN".to_string());
        writeln!(out, "*** Summary for group {}", id)?;
        writeln!(out, "- Points of comparison: {}", self.comparisons)?;
        writeln!(out, "- Total agreement: {}", total)
    }

    /// Prints a summary of the results to the standard output.
    pub fn print_summary(&self) -> std::io::Result<()> {
        self.write_summary(&mut std::io::stdout().lock())
    }
}

/// The analysis of a whole dataset, one group at a time.
#[derive(PartialEq, Debug, Clone)]
pub struct DatasetAgreement {
    group_column: Option<String>,
    column_mask: ColumnMask,
    unaccounted: Option<Table>,
    groups: Vec<GroupAgreement>,
}

impl DatasetAgreement {
    /// Splits a dataset into groups and analyzes each of them.
    ///
    /// Arguments:
    /// * `table` the full dataset
    /// * `group_column` the column that tells which rows belong to which
    /// group. If not provided, the entire dataset is one group.
    /// * `column_mask` the columns to analyze. If not provided, all the
    /// columns are analyzed.
    ///
    /// The rows with a missing group value do not belong to any group. They
    /// are kept apart, see [DatasetAgreement::unaccounted].
    pub fn new(
        table: Table,
        group_column: Option<&str>,
        column_mask: Option<ColumnMask>,
    ) -> AgreementResult<DatasetAgreement> {
        let column_mask =
            column_mask.unwrap_or_else(|| ColumnMask::all(&table.column_names()));
        info!(
            "DatasetAgreement: {} rows, {} columns, {} masked, group column: {:?}",
            table.num_rows(),
            table.num_columns(),
            column_mask.len(),
            group_column
        );

        let mut groups: Vec<GroupAgreement> = Vec::new();
        let unaccounted = match group_column {
            None => {
                groups.push(GroupAgreement::new(table, None, &column_mask)?);
                None
            }
            Some(name) => {
                let (grouped, unaccounted) = table.group_by(name)?;
                for (key, group_table) in grouped {
                    groups.push(GroupAgreement::new(group_table, Some(key), &column_mask)?);
                }
                if unaccounted.num_rows() > 0 {
                    info!(
                        "DatasetAgreement: {} rows without a value in {:?}",
                        unaccounted.num_rows(),
                        name
                    );
                }
                Some(unaccounted)
            }
        };

        Ok(DatasetAgreement {
            group_column: group_column.map(|s| s.to_string()),
            column_mask,
            unaccounted,
            groups,
        })
    }

    /// Returns a group by id.
    ///
    /// If no key is provided, returns the first group. This is the way to
    /// access the single group of a dataset analyzed without group column.
    pub fn group(&self, key: Option<&Cell>) -> AgreementResult<&GroupAgreement> {
        match key {
            None => self.groups.first().context(EmptyGroupSnafu {}),
            Some(k) => self
                .groups
                .iter()
                .find(|g| g.group_id() == Some(k))
                .context(UnknownGroupSnafu { key: k.clone() }),
        }
    }

    pub fn group_ids(&self) -> Vec<Option<Cell>> {
        self.groups.iter().map(|g| g.group_id.clone()).collect()
    }

    pub fn groups(&self) -> &[GroupAgreement] {
        &self.groups
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GroupAgreement> {
        self.groups.iter()
    }

    /// The number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// The rows that do not belong to any group, because their value in the
    /// group column is missing. `None` if there is no group column.
    pub fn unaccounted(&self) -> Option<&Table> {
        self.unaccounted.as_ref()
    }

    pub fn group_column(&self) -> Option<&str> {
        self.group_column.as_deref()
    }

    pub fn column_mask(&self) -> &ColumnMask {
        &self.column_mask
    }

    pub fn write_summary<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        for g in self.groups.iter() {
            g.write_summary(out)?;
        }
        Ok(())
    }

    /// Prints a summary of every group to the standard output.
    pub fn print_summary(&self) -> std::io::Result<()> {
        self.write_summary(&mut std::io::stdout().lock())
    }
}

impl Index<usize> for DatasetAgreement {
    type Output = GroupAgreement;
    fn index(&self, idx: usize) -> &GroupAgreement {
        &self.groups[idx]
    }
}

impl<'a> IntoIterator for &'a DatasetAgreement {
    type Item = &'a GroupAgreement;
    type IntoIter = std::slice::Iter<'a, GroupAgreement>;
    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::builder::TableBuilder;
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn i(x: i64) -> Cell {
        Cell::Integer(x)
    }

    fn t(s: &str) -> Cell {
        Cell::text(s)
    }

    const M: Cell = Cell::Missing;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn table(names: &[&str], rows: Vec<Vec<Cell>>) -> Table {
        let mut b = TableBuilder::new(&headers(names));
        for r in rows {
            b.add_row(r).unwrap();
        }
        b.build().unwrap()
    }

    #[test]
    fn unanimous() {
        let qa = analyze_answer_votes(&[i(4), i(4), i(4)]).unwrap();
        assert_eq!(
            qa,
            QuestionAgreement {
                correct_answer: Some(i(4)),
                all_missing: false,
                group_all_correct: true,
                correct_answer_count: 3,
                percent_correct: 1.0,
            }
        );
    }

    #[test]
    fn single_answer_with_skips_is_not_unanimous() {
        let qa = analyze_answer_votes(&[t("yes"), M, t("yes"), M]).unwrap();
        assert_eq!(qa.correct_answer, Some(t("yes")));
        assert!(!qa.all_missing);
        assert!(!qa.group_all_correct);
        assert_eq!(qa.correct_answer_count, 2);
        assert_eq!(qa.percent_correct, 0.5);
    }

    #[test]
    fn all_missing() {
        let qa = analyze_answer_votes(&[M, M, M, M]).unwrap();
        assert_eq!(qa.correct_answer, None);
        assert!(qa.all_missing);
        assert!(!qa.group_all_correct);
        assert_eq!(qa.correct_answer_count, 0);
        assert_eq!(qa.percent_correct, 0.0);
    }

    #[test]
    fn top_two_tied() {
        let qa = analyze_answer_votes(&[i(1), i(2), i(2), i(1), i(3)]).unwrap();
        assert_eq!(qa.correct_answer, None);
        assert!(!qa.all_missing);
        assert!(!qa.group_all_correct);
        assert_eq!(qa.correct_answer_count, 0);
    }

    #[test]
    fn lower_ties_do_not_matter() {
        let qa = analyze_answer_votes(&[i(7), i(7), i(7), i(1), i(2)]).unwrap();
        assert_eq!(qa.correct_answer, Some(i(7)));
        assert_eq!(qa.correct_answer_count, 3);
        assert_eq!(qa.percent_correct, 0.6);
    }

    #[test]
    fn empty_votes() {
        assert_eq!(
            analyze_answer_votes(&[]),
            Err(AgreementError::EmptyGroup {})
        );
    }

    #[test]
    fn tally_keeps_first_seen_order_on_ties() {
        let values = [t("b"), t("a"), t("a"), t("c"), t("b"), M];
        let counts = tally(&values);
        let names: Vec<&Cell> = counts.iter().map(|(c, _)| *c).collect();
        assert_eq!(names, vec![&t("b"), &t("a"), &t("c")]);
    }

    #[test]
    fn plurality_of_three() {
        init();
        let data = table(
            &["group_id", "q1", "q2"],
            vec![
                vec![t("A"), i(1), i(1)],
                vec![t("A"), i(1), i(2)],
                vec![t("A"), i(1), i(1)],
            ],
        );
        let agreement = DatasetAgreement::new(data, Some("group_id"), None).unwrap();
        let g = agreement.group(Some(&t("A"))).unwrap();
        let q1 = g.result("q1").unwrap();
        assert!(!q1.all_missing);
        assert!(q1.group_all_correct);
        assert_eq!(q1.correct_answer_count, 3);
        assert_eq!(q1.percent_correct, 1.0);
        let q2 = g.result("q2").unwrap();
        assert!(!q2.all_missing);
        assert!(!q2.group_all_correct);
        assert_eq!(q2.correct_answer, Some(i(1)));
        assert_eq!(q2.correct_answer_count, 2);
        assert!((q2.percent_correct - 0.667).abs() < 1e-3);
        // The group column itself is in the default mask.
        assert_eq!(g.comparisons(), 3);
        assert_eq!(g.total_agreement(), Some(2.0 / 3.0));
    }

    #[test]
    fn missing_column_is_not_compared() {
        init();
        let data = table(
            &["q1", "q2"],
            vec![
                vec![i(1), M],
                vec![i(1), M],
                vec![i(2), M],
                vec![i(1), M],
            ],
        );
        let g = GroupAgreement::new(data.clone(), None, &ColumnMask::all(&data.column_names()))
            .unwrap();
        let q2 = g.result("q2").unwrap();
        assert!(q2.all_missing);
        assert_eq!(q2.correct_answer_count, 0);
        assert_eq!(q2.percent_correct, 0.0);
        assert_eq!(g.comparisons(), 1);
        assert_eq!(g.total_agreement(), Some(0.0));
        assert_eq!(g.group_size(), 4);
    }

    #[test]
    fn total_agreement_undefined() {
        let data = table(&["q1"], vec![vec![M], vec![M]]);
        let g = GroupAgreement::new(data, Some(t("X")), &ColumnMask::all(&headers(&["q1"])))
            .unwrap();
        assert_eq!(g.comparisons(), 0);
        assert_eq!(g.total_agreement(), None);
        let mut out: Vec<u8> = Vec::new();
        g.write_summary(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "*** Summary for group 'X'\n- Points of comparison: 0\n- Total agreement: NaN\n"
        );
    }

    #[test]
    fn negative_zero_is_zero() {
        let qa = analyze_answer_votes(&[
            Cell::Number(0.0),
            Cell::Number(-0.0),
            Cell::Number(1.5),
        ])
        .unwrap();
        assert_eq!(qa.correct_answer, Some(Cell::Number(0.0)));
        assert_eq!(qa.correct_answer_count, 2);
        assert_eq!(Cell::Number(-0.0), Cell::Number(0.0));
    }

    #[test]
    fn summary_prints_floats() {
        let data = table(&["q1", "q2"], vec![vec![i(1), i(1)], vec![i(1), i(1)]]);
        let g = GroupAgreement::new(data, Some(t("A")), &ColumnMask::all(&headers(&["q1", "q2"])))
            .unwrap();
        let mut out: Vec<u8> = Vec::new();
        g.write_summary(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "*** Summary for group 'A'\n- Points of comparison: 2\n- Total agreement: 1.0\n"
        );

        let data = table(&["q1", "q2"], vec![vec![i(1), i(1)], vec![i(1), i(2)]]);
        let g = GroupAgreement::new(data, Some(i(7)), &ColumnMask::all(&headers(&["q1", "q2"])))
            .unwrap();
        let mut out: Vec<u8> = Vec::new();
        g.write_summary(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "*** Summary for group 7\n- Points of comparison: 2\n- Total agreement: 0.5\n"
        );
    }

    #[test]
    fn unaccounted_rows() {
        init();
        let data = table(
            &["team", "q"],
            vec![
                vec![t("B"), i(1)],
                vec![t("A"), i(1)],
                vec![M, i(9)],
                vec![t("A"), i(1)],
                vec![t("B"), i(2)],
                vec![t("A"), i(1)],
            ],
        );
        let agreement = DatasetAgreement::new(data, Some("team"), None).unwrap();
        assert_eq!(agreement.len(), 2);
        assert_eq!(agreement.group_ids(), vec![Some(t("A")), Some(t("B"))]);
        assert_eq!(agreement[0].group_size(), 3);
        assert_eq!(agreement[1].group_size(), 2);
        let unaccounted = agreement.unaccounted().unwrap();
        assert_eq!(unaccounted.num_rows(), 1);
        assert_eq!(unaccounted.column("q").unwrap().cells, vec![i(9)]);
    }

    #[test]
    fn group_lookup() {
        let data = table(&["g", "q"], vec![vec![i(2), i(1)], vec![i(1), i(1)]]);
        let agreement = DatasetAgreement::new(data, Some("g"), None).unwrap();
        // The first group is the smallest key.
        assert_eq!(agreement.group(None).unwrap().group_id(), Some(&i(1)));
        assert_eq!(agreement.group(Some(&i(2))).unwrap().group_id(), Some(&i(2)));
        assert_eq!(
            agreement.group(Some(&i(3))).unwrap_err(),
            AgreementError::UnknownGroup { key: i(3) }
        );
    }

    #[test]
    fn no_group_column() {
        let data = table(&["g", "q"], vec![vec![i(2), i(1)], vec![i(1), i(1)]]);
        let agreement = DatasetAgreement::new(data, None, None).unwrap();
        assert_eq!(agreement.len(), 1);
        assert!(agreement.unaccounted().is_none());
        let g = agreement.group(None).unwrap();
        assert_eq!(g.group_id(), None);
        assert_eq!(g.group_size(), 2);
        let mut out: Vec<u8> = Vec::new();
        agreement.write_summary(&mut out).unwrap();
        assert!(String::from_utf8(out)
            .unwrap()
            .starts_with("*** Summary for group None\n"));
    }

    #[test]
    fn unknown_group_column() {
        let data = table(&["g"], vec![vec![i(1)]]);
        assert_eq!(
            DatasetAgreement::new(data, Some("team"), None).unwrap_err(),
            AgreementError::MissingColumn {
                column: "team".to_string()
            }
        );
    }

    #[test]
    fn mask_restricts_analysis() {
        let data = table(
            &["g", "a", "b", "c"],
            vec![vec![t("x"), i(1), i(1), i(1)], vec![t("x"), i(1), i(2), i(3)]],
        );
        let mask = ColumnMask::build(
            &data.column_names(),
            &MaskCandidates::Names(headers(&["c", "b"])),
            Some("a"),
            None,
        )
        .unwrap();
        let agreement = DatasetAgreement::new(data, Some("g"), Some(mask)).unwrap();
        let g = agreement.group(None).unwrap();
        let columns: Vec<&str> = g.results().iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(columns, vec!["b", "c"]);
        assert_eq!(g.masked_table().column_names(), vec!["b", "c"]);
        assert_eq!(g.disagreeing_columns().column_names(), vec!["b", "c"]);
        assert_eq!(g.table().num_columns(), 4);
    }

    #[test]
    fn disagreeing_columns_skip_agreement_and_missing() {
        let data = table(
            &["a", "b", "c"],
            vec![vec![i(1), i(1), M], vec![i(1), i(2), M]],
        );
        let g = GroupAgreement::new(data.clone(), None, &ColumnMask::all(&data.column_names()))
            .unwrap();
        let d = g.disagreeing_columns();
        assert_eq!(d.column_names(), vec!["b"]);
        assert_eq!(d.column("b").unwrap().cells, vec![i(1), i(2)]);
    }

    #[test]
    fn mask_with_unknown_column() {
        let data = table(&["a"], vec![vec![i(1)]]);
        let mask = ColumnMask::all(&headers(&["a", "zz"]));
        assert_eq!(
            GroupAgreement::new(data, None, &mask).unwrap_err(),
            AgreementError::MissingColumn {
                column: "zz".to_string()
            }
        );
    }

    #[test]
    fn empty_dataset() {
        let data = table(&["a"], vec![]);
        assert_eq!(
            DatasetAgreement::new(data, None, None).unwrap_err(),
            AgreementError::EmptyGroup {}
        );
    }

    #[test]
    fn construction_is_deterministic() {
        let data = table(
            &["g", "q"],
            vec![vec![t("a"), t("x")], vec![t("a"), t("y")], vec![t("a"), t("x")]],
        );
        let first = DatasetAgreement::new(data.clone(), Some("g"), None).unwrap();
        let second = DatasetAgreement::new(data, Some("g"), None).unwrap();
        assert_eq!(first, second);
    }
}
