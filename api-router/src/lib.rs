use api_state::ApiState;
use axum::{
    extract::{DefaultBodyLimit, FromRef},
    routing::{get, post},
    Router,
};
use routes::{ask::ask_question, index::index_page, insert::insert_into_kb, upload::upload_csv};

pub mod api_state;
pub mod error;
mod routes;

/// Router for the upload/linkage/query surface.
pub fn api_routes<S>(app_state: &ApiState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    ApiState: FromRef<S>,
{
    Router::new()
        .route("/", get(index_page))
        .route(
            "/upload",
            post(upload_csv).layer(DefaultBodyLimit::max(
                app_state.config.upload_max_body_bytes,
            )),
        )
        .route("/insert", post(insert_into_kb))
        .route("/ask", post(ask_question))
}
