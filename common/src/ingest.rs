use std::io::Read;

use uuid::Uuid;

use crate::{
    error::AppError,
    utils::ident::{validate_column_name, STAGING_TABLE_PREFIX},
};

pub const CSV_EXTENSION: &str = ".csv";

/// ASCII case-insensitive suffix match, so `DATA.CSV` is accepted.
pub fn has_csv_extension(file_name: &str) -> bool {
    file_name.to_ascii_lowercase().ends_with(CSV_EXTENSION)
}

/// A parsed CSV upload: header-derived column names (all text-typed once
/// staged) plus the data rows, paired with a freshly generated staging
/// table name.
#[derive(Debug, Clone)]
pub struct CsvDocument {
    pub table_name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvDocument {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, AppError> {
        let mut csv_reader = csv::Reader::from_reader(reader);

        let headers: Vec<String> = csv_reader.headers()?.iter().map(str::to_owned).collect();
        if headers.is_empty() || headers.iter().all(|header| header.trim().is_empty()) {
            return Err(AppError::Validation(
                "CSV file has no header row".to_string(),
            ));
        }
        for header in &headers {
            validate_column_name(header)?;
        }

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_owned).collect());
        }

        Ok(Self {
            table_name: generate_table_name(),
            headers,
            rows,
        })
    }
}

/// `csv_` + 8 hex chars of a v4 UUID. Satisfies the identifier allow-list
/// by construction.
pub fn generate_table_name() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{STAGING_TABLE_PREFIX}{}", &id[..8])
}
