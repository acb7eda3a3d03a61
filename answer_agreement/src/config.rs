// ********* Input data structures ***********

use std::cmp::Ordering;
use std::fmt::Display;
use std::hash::{Hash, Hasher};

use snafu::Snafu;

/// The content of one cell of a dataset.
///
/// Loaders are responsible for typing the cells. A `Missing` cell never
/// takes part in a vote.
#[derive(Debug, Clone)]
pub enum Cell {
    /// An empty cell, or a value the loader recognized as not available.
    Missing,
    Boolean(bool),
    Integer(i64),
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    pub fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    // Ordering between variants: Missing < Boolean < Integer < Number < Text
    fn rank(&self) -> u8 {
        match self {
            Cell::Missing => 0,
            Cell::Boolean(_) => 1,
            Cell::Integer(_) => 2,
            Cell::Number(_) => 3,
            Cell::Text(_) => 4,
        }
    }
}

// Negative zero is the same answer as zero.
fn unsigned_zero(x: f64) -> f64 {
    if x == 0.0 {
        0.0
    } else {
        x
    }
}

impl Ord for Cell {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Cell::Boolean(a), Cell::Boolean(b)) => a.cmp(b),
            (Cell::Integer(a), Cell::Integer(b)) => a.cmp(b),
            (Cell::Number(a), Cell::Number(b)) => {
                unsigned_zero(*a).total_cmp(&unsigned_zero(*b))
            }
            (Cell::Text(a), Cell::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Cell {}

impl Hash for Cell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Cell::Missing => {}
            Cell::Boolean(b) => b.hash(state),
            Cell::Integer(i) => i.hash(state),
            // total_cmp equality is bitwise equality
            Cell::Number(f) => unsigned_zero(*f).to_bits().hash(state),
            Cell::Text(s) => s.hash(state),
        }
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Missing => write!(f, "NaN"),
            Cell::Boolean(true) => write!(f, "True"),
            Cell::Boolean(false) => write!(f, "False"),
            Cell::Integer(i) => write!(f, "{}", i),
            Cell::Number(x) => write!(f, "{:?}", x),
            Cell::Text(s) => write!(f, "'{}'", s),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }
}

impl From<i64> for Cell {
    fn from(i: i64) -> Cell {
        Cell::Integer(i)
    }
}

impl From<f64> for Cell {
    fn from(x: f64) -> Cell {
        Cell::Number(x)
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Cell {
        Cell::Boolean(b)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(o: Option<T>) -> Cell {
        o.map(Into::into).unwrap_or(Cell::Missing)
    }
}

// ******** Output data structures *********

/// Agreement statistics for one question within one group.
#[derive(PartialEq, Debug, Clone)]
pub struct QuestionAgreement {
    /// The plurality answer. `None` if all the answers are missing or if the
    /// two most popular answers are tied.
    pub correct_answer: Option<Cell>,
    pub all_missing: bool,
    /// Every member of the group recorded the same, non-missing, answer.
    pub group_all_correct: bool,
    pub correct_answer_count: usize,
    /// `correct_answer_count` divided by the size of the group. Members who
    /// did not answer still count in the denominator.
    pub percent_correct: f64,
}

/// Errors that prevent the analysis from completing successfully.
#[derive(Debug, Snafu, PartialEq, Eq, Clone)]
#[snafu(visibility(pub(crate)))]
pub enum AgreementError {
    #[snafu(display("Column {column:?} not found in dataset"))]
    MissingColumn { column: String },

    #[snafu(display("Column {column:?} appears more than once"))]
    DuplicateColumn { column: String },

    #[snafu(display("Column {column:?} has {found} cells, expected {expected}"))]
    RaggedTable {
        column: String,
        expected: usize,
        found: usize,
    },

    #[snafu(display("Row {row} has {found} cells, expected {expected}"))]
    RowLength {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[snafu(display("Row {row} is out of range, the table has {num_rows} rows"))]
    MissingRow { row: usize, num_rows: usize },

    #[snafu(display("A group must contain at least one row"))]
    EmptyGroup {},

    #[snafu(display("No group with id {key}"))]
    UnknownGroup { key: Cell },

    #[snafu(display("Form row {row} closes a group or repeat that was never opened"))]
    UnbalancedForm { row: usize },
}

pub type AgreementResult<T> = Result<T, AgreementError>;

// ********* Configuration **********

/// Field types of a form that never take part in a comparison.
///
/// Some of them have no value (notes, groups), the others are computed or
/// filled in by the device (calculations, metadata).
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct SkipRules {
    /// Types skipped on exact match.
    pub exact: &'static [&'static str],
    /// Types skipped when they start with one of these.
    pub prefixes: &'static [&'static str],
}

impl SkipRules {
    /// The types skipped in ODK XlsForms.
    pub const ODK_DEFAULT: SkipRules = SkipRules {
        exact: &[
            "type",
            "calculate",
            "note",
            "start",
            "end",
            "deviceid",
            "simserial",
            "phonenumber",
            "hidden",
            "",
        ],
        prefixes: &["hidden ", "begin ", "end "],
    };

    pub fn is_skipped(&self, field_type: &str) -> bool {
        self.exact.iter().any(|t| *t == field_type)
            || self.prefixes.iter().any(|p| field_type.starts_with(p))
    }
}

/// The separator between the group prefixes of a fully qualified name.
///
/// ODK Aggregate exports use a colon, ODK Briefcase uses a hyphen.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub enum Separator {
    #[default]
    Colon,
    Hyphen,
}

impl Separator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Separator::Colon => ":",
            Separator::Hyphen => "-",
        }
    }
}
