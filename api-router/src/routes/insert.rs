use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use common::utils::ident::{is_safe_identifier, validate_column_name};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::{api_state::ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct InsertRequest {
    pub kb: Option<String>,
    pub table: Option<String>,
    pub headers: Option<Vec<String>>,
}

/// Linkage step: copy the staged rows into the knowledge base through the
/// registered datasource.
pub async fn insert_into_kb(
    State(state): State<ApiState>,
    Json(request): Json<InsertRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(kb), Some(table), Some(headers)) = (request.kb, request.table, request.headers)
    else {
        return Err(ApiError::ValidationError(
            "Missing kb, table, or headers".to_string(),
        ));
    };

    if !is_safe_identifier(&kb) || !is_safe_identifier(&table) {
        return Err(ApiError::ValidationError(
            "kb and table must be identifiers generated by this service".to_string(),
        ));
    }
    for header in &headers {
        validate_column_name(header)?;
    }

    let datasource = state.config.datasource_name();
    state
        .analytics
        .link_staged_table(&kb, &datasource, &table, &headers)
        .await?;

    info!(knowledge_base = %kb, table = %table, "Linked staged table into knowledge base");

    Ok((
        StatusCode::OK,
        Json(json!({
            "status": "success",
            "inserted_into": kb,
        })),
    ))
}
