use log::debug;
use snafu::OptionExt;

use crate::config::*;

/// One row of the `survey` sheet of an XlsForm.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FormField {
    pub field_type: String,
    pub name: String,
    pub label: String,
}

impl FormField {
    pub fn new(field_type: &str, name: &str, label: &str) -> FormField {
        FormField {
            field_type: field_type.to_string(),
            name: name.to_string(),
            label: label.to_string(),
        }
    }
}

/// Keeps the fields that hold comparable answers, and gives them the name
/// they have as columns of an exported dataset.
///
/// Groups and repeats prefix the names of the fields they contain:
/// `hh_roster` > `age` becomes `hh_roster:age`.
pub fn qualify_fields(
    fields: &[FormField],
    rules: &SkipRules,
    separator: Separator,
) -> AgreementResult<Vec<FormField>> {
    let mut parents: Vec<&str> = Vec::new();
    let mut res: Vec<FormField> = Vec::new();
    for (row, field) in fields.iter().enumerate() {
        match field.field_type.as_str() {
            "begin group" | "begin repeat" => parents.push(field.name.as_str()),
            "end group" | "end repeat" => {
                parents.pop().context(UnbalancedFormSnafu { row })?;
            }
            t if rules.is_skipped(t) => {
                debug!("qualify_fields: row {}: skipping {:?}", row, field);
            }
            _ => {
                let mut segments = parents.clone();
                segments.push(field.name.as_str());
                res.push(FormField {
                    field_type: field.field_type.clone(),
                    name: segments.join(separator.as_str()),
                    label: field.label.clone(),
                });
            }
        }
    }
    Ok(res)
}

/// The qualified names of the comparable fields.
pub fn qualified_names(
    fields: &[FormField],
    rules: &SkipRules,
    separator: Separator,
) -> AgreementResult<Vec<String>> {
    Ok(qualify_fields(fields, rules, separator)?
        .into_iter()
        .map(|f| f.name)
        .collect())
}
