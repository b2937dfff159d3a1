//! Local preconditions checked before any remote call.

use crate::error::SeatingError;
use crate::model::DepartmentSelection;
use std::path::Path;

const EXCEL_EXTENSIONS: [&str; 2] = ["xls", "xlsx"];

pub fn is_excel_file_name(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| {
            EXCEL_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

/// File must be present and carry an `.xls`/`.xlsx` suffix.
pub fn validate_file(file: Option<&Path>) -> Result<&Path, SeatingError> {
    let path = file.ok_or_else(|| SeatingError::validation("Please select a file!"))?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    if name.is_empty() {
        return Err(SeatingError::validation("Please select a file!"));
    }
    if !is_excel_file_name(name) {
        return Err(SeatingError::validation(
            "Please upload an Excel file (.xlsx or .xls)",
        ));
    }
    Ok(path)
}

pub fn validate_file_size(len: u64, max: u64) -> Result<(), SeatingError> {
    if len == 0 {
        return Err(SeatingError::validation("The selected file is empty"));
    }
    if len > max {
        return Err(SeatingError::validation(format!(
            "File is too large ({len} bytes, limit {max} bytes)"
        )));
    }
    Ok(())
}

pub fn validate_selection(selection: &DepartmentSelection) -> Result<Vec<String>, SeatingError> {
    let selected = selection.selected();
    if selected.is_empty() {
        return Err(SeatingError::validation(
            "Please select at least one department!",
        ));
    }
    Ok(selected)
}

/// Why a count field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountError {
    /// Not a number, or below 1.
    Invalid,
    /// A whole number ≥ 1 that does not fit the request field.
    TooLarge,
}

/// Parse a count the way a numeric form field does: any finite number ≥ 1,
/// truncated to its integer part.
pub fn parse_count(raw: &str) -> Result<u32, CountError> {
    let value: f64 = raw.trim().parse().map_err(|_| CountError::Invalid)?;
    if !value.is_finite() || value < 1.0 {
        return Err(CountError::Invalid);
    }
    let int = value.trunc();
    if int > f64::from(u32::MAX) {
        return Err(CountError::TooLarge);
    }
    Ok(int as u32)
}

fn count_error(field: &str, err: CountError) -> SeatingError {
    match err {
        CountError::Invalid => {
            SeatingError::validation(format!("Please enter a valid number of {field} (minimum 1)"))
        }
        CountError::TooLarge => SeatingError::validation(format!(
            "Number of {field} is too large (maximum {})",
            u32::MAX
        )),
    }
}

pub fn validate_classrooms(raw: &str) -> Result<u32, SeatingError> {
    parse_count(raw).map_err(|e| count_error("classrooms", e))
}

pub fn validate_students_per_class(raw: &str) -> Result<u32, SeatingError> {
    parse_count(raw).map_err(|e| count_error("students per class", e))
}
