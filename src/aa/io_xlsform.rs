// Reading the field definitions of an XlsForm.

use answer_agreement::{qualified_names, FormField, Separator, SkipRules};
use calamine::{open_workbook_auto, DataType, Reader};
use snafu::{OptionExt, ResultExt};

use crate::aa::{io_excel::cell_to_string, *};

pub const SURVEY_SHEET: &str = "survey";

/// Reads the type, name and label of every row of the `survey` sheet.
///
/// The label is taken from the first column whose header starts with
/// `label`, which is the default language when there are translations.
pub fn read_form_fields(path: &str) -> AaResult<Vec<FormField>> {
    let mut workbook = open_workbook_auto(path).context(OpeningWorkbookSnafu { path })?;
    let survey = workbook
        .worksheet_range(SURVEY_SHEET)
        .context(MissingSurveySheetSnafu { path })?
        .context(OpeningWorkbookSnafu { path })?;

    let mut rows = survey.rows();
    let header: Vec<String> = rows
        .next()
        .context(EmptySurveySheetSnafu { path })?
        .iter()
        .map(cell_to_string)
        .collect();
    debug!("read_form_fields: header: {:?}", header);

    let type_idx = column_index(&header, path, |h| h == "type", "type")?;
    let name_idx = column_index(&header, path, |h| h == "name", "name")?;
    let label_idx = column_index(&header, path, |h| h.starts_with("label"), "label")?;

    let fields: Vec<FormField> = rows
        .map(|row| FormField {
            field_type: text_at(row, type_idx),
            name: text_at(row, name_idx),
            label: text_at(row, label_idx),
        })
        .collect();
    info!("read_form_fields: {} rows in {:?}", fields.len(), path);
    Ok(fields)
}

/// The fully qualified names of the questions of an XlsForm, which are the
/// column names of the comparable questions in an exported dataset.
pub fn read_form_candidates(path: &str, separator: Separator) -> AaResult<Vec<String>> {
    let fields = read_form_fields(path)?;
    let names =
        qualified_names(&fields, &SkipRules::ODK_DEFAULT, separator).context(AgreementSnafu)?;
    debug!("read_form_candidates: {:?}", names);
    Ok(names)
}

fn column_index<F>(header: &[String], path: &str, pred: F, column: &str) -> AaResult<usize>
where
    F: Fn(&str) -> bool,
{
    header
        .iter()
        .position(|h| pred(h.as_str()))
        .context(MissingFormColumnSnafu { path, column })
}

fn text_at(row: &[DataType], idx: usize) -> String {
    row.get(idx).map(cell_to_string).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn label_column_is_the_first_label() {
        let h = header(&["type", "name", "hint", "label::English", "label::French"]);
        assert_eq!(
            column_index(&h, "f.xlsx", |h| h.starts_with("label"), "label").unwrap(),
            3
        );
    }

    #[test]
    fn missing_name_column() {
        let h = header(&["type", "label"]);
        let err = column_index(&h, "f.xlsx", |h| h == "name", "name").unwrap_err();
        assert_eq!(
            err.to_string(),
            "No \"name\" column in the survey sheet of f.xlsx"
        );
    }

    #[test]
    fn short_rows() {
        let row = vec![DataType::String("integer".to_string())];
        assert_eq!(text_at(&row, 0), "integer");
        assert_eq!(text_at(&row, 2), "");
    }

    fn data_path(name: &str) -> String {
        format!("{}/tests/data/{}", env!("CARGO_MANIFEST_DIR"), name)
    }

    #[test]
    fn reads_survey_sheet() {
        let fields = read_form_fields(&data_path("household_form.xlsx")).unwrap();
        assert_eq!(fields.len(), 8);
        assert_eq!(fields[1], FormField::new("text", "q1", "Name"));
        assert_eq!(fields[2], FormField::new("begin group", "hh", "Household"));
        assert_eq!(fields[5], FormField::new("end group", "", ""));
    }

    #[test]
    fn candidates_are_qualified() {
        let path = data_path("household_form.xlsx");
        assert_eq!(
            read_form_candidates(&path, Separator::Colon).unwrap(),
            vec!["q1", "hh:age", "q3"]
        );
        assert_eq!(
            read_form_candidates(&path, Separator::Hyphen).unwrap(),
            vec!["q1", "hh-age", "q3"]
        );
    }

    #[test]
    fn survey_without_header() {
        let err = read_form_fields(&data_path("empty_form.xlsx")).unwrap_err();
        assert!(matches!(err, AaError::EmptySurveySheet { .. }));
    }

    #[test]
    fn dataset_is_not_a_form() {
        let err = read_form_fields(&data_path("household.xlsx")).unwrap_err();
        assert!(matches!(err, AaError::MissingSurveySheet { .. }));
    }

    #[test]
    fn missing_form() {
        let err = read_form_fields("tests/data/no_form.xlsx").unwrap_err();
        assert!(matches!(err, AaError::OpeningWorkbook { .. }));
    }
}
