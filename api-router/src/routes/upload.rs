use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum_typed_multipart::{FieldData, TryFromMultipart, TypedMultipart};
use common::{
    analytics::statements,
    ingest::{has_csv_extension, CsvDocument},
};
use serde_json::json;
use tempfile::NamedTempFile;
use tracing::info;

use crate::{api_state::ApiState, error::ApiError};

#[derive(Debug, TryFromMultipart)]
pub struct UploadParams {
    // Unlimited at the field level: the route's DefaultBodyLimit, sized
    // from `upload_max_body_bytes`, bounds the whole request.
    #[form_data(limit = "unlimited")]
    pub csvfile: Option<FieldData<NamedTempFile>>,
}

/// Ingestion pipeline: stage the uploaded CSV as a text-typed table, then
/// ask the analytics service for a matching knowledge base. If the
/// knowledge-base call fails the staged table is left behind for
/// inspection; the teardown binary is the recovery path.
pub async fn upload_csv(
    State(state): State<ApiState>,
    TypedMultipart(input): TypedMultipart<UploadParams>,
) -> Result<impl IntoResponse, ApiError> {
    let file = input.csvfile.ok_or_else(|| {
        ApiError::ValidationError("Invalid file. Please upload a CSV.".to_string())
    })?;
    let file_name = file.metadata.file_name.clone().unwrap_or_default();
    if !has_csv_extension(&file_name) {
        return Err(ApiError::ValidationError(
            "Invalid file. Please upload a CSV.".to_string(),
        ));
    }

    let reader = file.contents.reopen().map_err(common::error::AppError::Io)?;
    let document = CsvDocument::from_reader(reader)?;

    info!(
        file_name = %file_name,
        table_name = %document.table_name,
        columns = document.headers.len(),
        rows = document.rows.len(),
        "Staging uploaded CSV"
    );

    state
        .staging
        .create_staged_table(&document.table_name, &document.headers)
        .await?;
    state
        .staging
        .insert_rows(&document.table_name, &document.headers, &document.rows)
        .await?;

    let kb_name = statements::knowledge_base_name(&document.table_name);
    state
        .analytics
        .create_knowledge_base(&kb_name, &state.config)
        .await?;

    info!(knowledge_base = %kb_name, "Created knowledge base for staged table");

    Ok((
        StatusCode::OK,
        Json(json!({
            "kb_name": kb_name,
            "table_name": document.table_name,
            "headers": document.headers,
            "db_name": state.config.pg_database,
        })),
    ))
}
