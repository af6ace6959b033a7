use api_router::{api_routes, api_state::ApiState};
use axum::Router;
use common::utils::config::get_config;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Set up tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();

    // Get config
    let config = get_config()?;

    let api_state = ApiState::new(&config).await?;

    // Register the staging database with the analytics service once at
    // start. A failure here is not fatal: uploads still stage rows, and
    // /insert surfaces the missing registration to the caller.
    match api_state.analytics.ensure_datasource(&config).await {
        Ok(true) => {
            info!(datasource = %config.datasource_name(), "Registered staging database")
        }
        Ok(false) => {
            info!(datasource = %config.datasource_name(), "Staging database already registered")
        }
        Err(error) => warn!(%error, "Failed to register staging database with analytics service"),
    }

    // Create Axum router
    let app: Router = api_routes(&api_state).with_state(api_state.clone());

    info!("Starting server listening on 0.0.0.0:{}", config.http_port);
    let serve_address = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(serve_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{body::Body, http::Request, http::StatusCode};
    use common::{
        analytics::client::{AnalyticsClient, QueryResponse, QueryTransport},
        error::AppError,
        storage::staging::StagingStore,
        utils::config::AppConfig,
    };
    use std::{sync::Arc, time::Duration};
    use tower::ServiceExt;

    struct AlwaysOkTransport;

    #[async_trait]
    impl QueryTransport for AlwaysOkTransport {
        async fn execute(&self, _query: &str) -> Result<QueryResponse, AppError> {
            Ok(QueryResponse {
                kind: "ok".to_string(),
                data: vec![],
                column_names: None,
                error_message: None,
                extra: serde_json::Map::new(),
            })
        }
    }

    fn smoke_test_state() -> ApiState {
        let pool =
            sqlx::PgPool::connect_lazy("postgres://postgres@localhost/app").expect("lazy pool");
        ApiState {
            config: AppConfig::default(),
            staging: StagingStore::new(pool),
            analytics: AnalyticsClient::with_transport(
                Arc::new(AlwaysOkTransport),
                0,
                Duration::from_millis(1),
            ),
        }
    }

    #[tokio::test]
    async fn smoke_index_page_is_served() {
        let api_state = smoke_test_state();
        let app: Router = api_routes(&api_state).with_state(api_state);

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).expect("request"))
            .await
            .expect("router response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn smoke_ask_round_trips_through_router() {
        let api_state = smoke_test_state();
        let app: Router = api_routes(&api_state).with_state(api_state);

        let request = Request::builder()
            .uri("/ask")
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({"kb": "kb_csv_1a2b3c4d", "question": "hello"}).to_string(),
            ))
            .expect("request");

        let response = app.oneshot(request).await.expect("router response");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
