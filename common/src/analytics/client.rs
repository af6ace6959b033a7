use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_retry::{strategy::FixedInterval, RetryIf};
use tracing::{debug, info};

use super::statements;
use crate::{error::AppError, utils::config::AppConfig};

/// Upstream error-message fragment that marks a transient failure. The
/// service occasionally reports this on an otherwise valid statement and
/// succeeds when the statement is re-sent.
pub const TRANSIENT_FAILURE_MARKER: &str = "Event loop is closed";

/// Retry gate for [`AnalyticsClient::run_query`]. Keyed on the message
/// content, not the error kind: transport failures and ordinary service
/// errors propagate immediately.
pub fn is_transient_failure(error: &AppError) -> bool {
    matches!(error, AppError::QueryFailed(message) if message.contains(TRANSIENT_FAILURE_MARKER))
}

/// JSON envelope returned by the service's `/sql/query` endpoint. Fields
/// beyond the discriminator are kept intact so `/ask` can forward the
/// response unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_names: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl QueryResponse {
    /// First cell of every data row as a string. Listing statements
    /// (`SHOW ...`) put the object name there; some service versions
    /// return bare strings instead of single-element rows.
    pub fn first_column_strings(&self) -> Vec<String> {
        self.data
            .iter()
            .filter_map(|row| match row {
                Value::Array(cells) => cells.first().and_then(Value::as_str).map(str::to_owned),
                Value::String(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }
}

/// Seam between the dispatcher's retry policy and the wire. Lets tests
/// script responses without a live service.
#[async_trait]
pub trait QueryTransport: Send + Sync {
    async fn execute(&self, query: &str) -> Result<QueryResponse, AppError>;
}

pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl QueryTransport for HttpTransport {
    async fn execute(&self, query: &str) -> Result<QueryResponse, AppError> {
        let response = self
            .http
            .post(format!("{}/sql/query", self.base_url))
            .json(&serde_json::json!({ "query": query }))
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<QueryResponse>().await?)
    }
}

/// Sends SQL-like statements to the analytics service and interprets the
/// JSON envelope. A response whose discriminator says `error` becomes
/// [`AppError::QueryFailed`]; a bounded retry applies only when
/// [`is_transient_failure`] matches.
#[derive(Clone)]
pub struct AnalyticsClient {
    transport: Arc<dyn QueryTransport>,
    retries: usize,
    retry_delay: Duration,
}

impl AnalyticsClient {
    pub fn from_config(config: &AppConfig) -> Self {
        Self::with_transport(
            Arc::new(HttpTransport::new(&config.analytics_base_url)),
            config.query_retries,
            Duration::from_millis(config.query_retry_delay_ms),
        )
    }

    pub fn with_transport(
        transport: Arc<dyn QueryTransport>,
        retries: usize,
        retry_delay: Duration,
    ) -> Self {
        Self {
            transport,
            retries,
            retry_delay,
        }
    }

    pub async fn run_query(&self, query: &str) -> Result<QueryResponse, AppError> {
        let strategy = FixedInterval::new(self.retry_delay).take(self.retries);
        RetryIf::spawn(strategy, || self.execute_once(query), is_transient_failure).await
    }

    async fn execute_once(&self, query: &str) -> Result<QueryResponse, AppError> {
        debug!(query, "dispatching statement to analytics service");
        let response = self.transport.execute(query).await?;
        if response.kind == "error" {
            let message = response
                .error_message
                .clone()
                .unwrap_or_else(|| "analytics service error".to_string());
            return Err(AppError::QueryFailed(message));
        }
        Ok(response)
    }

    /// Idempotent registration of the staging database as a datasource.
    /// Returns whether a registration was performed.
    pub async fn ensure_datasource(&self, config: &AppConfig) -> Result<bool, AppError> {
        let name = config.datasource_name();
        let registered = self.run_query(statements::SHOW_DATABASES).await?;
        if registered
            .first_column_strings()
            .iter()
            .any(|existing| existing == &name)
        {
            debug!(datasource = %name, "staging database already registered");
            return Ok(false);
        }

        self.run_query(&statements::create_datasource(config))
            .await?;
        info!(datasource = %name, "registered staging database with analytics service");
        Ok(true)
    }

    pub async fn create_knowledge_base(
        &self,
        kb_name: &str,
        config: &AppConfig,
    ) -> Result<(), AppError> {
        self.run_query(&statements::create_knowledge_base(kb_name, config))
            .await?;
        Ok(())
    }

    /// Linkage step: copy `row_id` plus the listed columns from the
    /// registered-datasource view of the staged table into the knowledge
    /// base. The failing statement text rides along in the error.
    pub async fn link_staged_table(
        &self,
        kb_name: &str,
        datasource: &str,
        table: &str,
        headers: &[String],
    ) -> Result<(), AppError> {
        let query = statements::insert_from_staged(kb_name, datasource, table, headers);
        self.run_query(&query)
            .await
            .map_err(|error| AppError::Linkage {
                details: error.to_string(),
                query,
            })?;
        Ok(())
    }

    /// Query forwarding: the question becomes an equality predicate on the
    /// knowledge base's reserved content field.
    pub async fn ask(&self, kb_name: &str, question: &str) -> Result<QueryResponse, AppError> {
        self.run_query(&statements::semantic_query(kb_name, question))
            .await
            .map_err(|error| AppError::Query(error.to_string()))
    }
}
