use crate::error::AppError;

/// Prefix shared by every staged table. Generated names are
/// `csv_<8 hex chars>`, which keeps them inside the identifier allow-list.
pub const STAGING_TABLE_PREFIX: &str = "csv_";

/// Allow-list for identifiers that end up interpolated into SQL text
/// (table, knowledge base and datasource names). These are generated by
/// this service, so anything outside `[a-z_][a-z0-9_]*` is rejected when
/// it comes back from a client.
pub fn is_safe_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_lowercase() || first == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Column names come from CSV headers and are always double-quoted when
/// used in DDL/DML, so the only characters that could break out of the
/// quoting are rejected here.
pub fn validate_column_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::Validation(
            "CSV header contains an empty column name".to_string(),
        ));
    }
    if name.contains('"') || name.chars().any(char::is_control) {
        return Err(AppError::Validation(format!(
            "Invalid column name in CSV header: {name:?}"
        )));
    }
    Ok(())
}
