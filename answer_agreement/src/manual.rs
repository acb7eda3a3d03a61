/*!

This is the long-form manual for `answer_agreement` and `aa`.

## The experiment

Each member of a group records the answers from the same respondent. All
members of all groups submit their surveys to form a dataset. A column of the
dataset tells which submitted surveys belong to which group. The simplest way
to do this is to have a `group_id` column.

For each group and each question, the answer recorded by the most members is
the "correct" answer. When the two most popular answers are tied, there is no
correct answer. A group agrees on a question when every member recorded the
same answer.

## Input formats

The dataset is read according to its extension:
* `.csv` comma separated values, with a header row
* `.xls`, `.xlsx` Excel workbooks. The first worksheet is used, with a header row.

Other extensions are rejected.

Empty cells are missing answers. The usual text markers for
unavailable data (`NA`, `N/A`, `NaN`, `null`, `None`, ...) are missing
answers as well. A column where all the answers are integers holds integers
(`1` and `1.0` are the same answer), otherwise numbers, booleans or text.

### XlsForm

When the dataset was collected with ODK, the XlsForm of the survey tells
which columns are real questions. Pass it with `--xlsform`. The `survey`
sheet is read, using the `type`, `name` and first `label` columns.

The following types are not compared:
* `calculate`, `note`, `hidden` and all the types starting with `hidden `
* the metadata `start`, `end`, `deviceid`, `simserial`, `phonenumber`
* groups and repeats, which only prefix the names of the fields they contain

ODK Aggregate exports prefix the fields with their groups using a colon
(`household:age`), ODK Briefcase uses a hyphen (`household-age`). Use
`--separator` for the hyphen.

## Selecting the columns

By default, every column is compared, including the group column. The
options `--first` and `--last` restrict the comparison to a range of columns,
both ends included. They do not need to be questions of the XlsForm, but they
must be columns of the dataset.

## Output

For each group:

```text
*** Summary for group 'A'
- Points of comparison: 12
- Total agreement: 0.75
```

The points of comparison are the questions that were answered by at least
one member. The total agreement is the share of these questions on which all
the members agree. It is `NaN` when no question was answered.

`--disagreements` lists, after each summary, the questions on which the
members of the group do not all agree.

The rows without a group are reported in the logs and in the JSON summary.

### JSON summary

`--out <file>` writes all the computed values in JSON format (`--out stdout`
to print them). `--reference <file>` compares the JSON summary to a
previously saved one and fails if they differ.

### Logging

Set `RUST_LOG` or pass `--verbose` to see the details of each question.
*/
