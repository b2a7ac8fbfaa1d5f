use std::borrow::Cow;

use validator::{ValidationError, ValidationErrors};

pub const REQUIRED_CODE: &str = "required";
pub const ALL_FIELDS_REQUIRED: &str = "All fields are required.";

/// Rejects empty and whitespace-only values
pub fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new(REQUIRED_CODE);
        err.message = Some(Cow::Borrowed(ALL_FIELDS_REQUIRED));
        return Err(err);
    }
    Ok(())
}

/// Reduce validator output to the single notice shown on the form.
///
/// A blank field anywhere wins over every other problem; after that the first
/// failing field in `field_order` decides.
pub fn first_message(errors: &ValidationErrors, field_order: &[&str]) -> String {
    let field_errors = errors.field_errors();

    let any_blank = field_errors
        .values()
        .flat_map(|errs| errs.iter())
        .any(|e| e.code == REQUIRED_CODE);
    if any_blank {
        return ALL_FIELDS_REQUIRED.to_string();
    }

    field_order
        .iter()
        .find_map(|name| {
            field_errors
                .iter()
                .find(|(field, _)| field.to_string() == *name)
                .and_then(|(field, errs)| {
                    errs.first().map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("Invalid value for {}.", field))
                    })
                })
        })
        .unwrap_or_else(|| ALL_FIELDS_REQUIRED.to_string())
}
