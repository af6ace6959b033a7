use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use common::utils::ident::is_safe_identifier;
use serde::Deserialize;
use tracing::info;

use crate::{api_state::ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub kb: Option<String>,
    pub question: Option<String>,
}

/// Query forwarding: the free-text question is matched against the
/// knowledge base's content field and the raw service response is
/// returned unchanged.
pub async fn ask_question(
    State(state): State<ApiState>,
    Json(request): Json<AskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(kb), Some(question)) = (request.kb, request.question) else {
        return Err(ApiError::ValidationError(
            "Missing KB name or question".to_string(),
        ));
    };

    if !is_safe_identifier(&kb) {
        return Err(ApiError::ValidationError(
            "kb must be an identifier generated by this service".to_string(),
        ));
    }

    info!(knowledge_base = %kb, question_bytes = question.len(), "Forwarding question");

    let result = state.analytics.ask(&kb, &question).await?;

    Ok((StatusCode::OK, Json(result)))
}
