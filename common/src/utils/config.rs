use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;

use crate::analytics::statements::DATASOURCE_PREFIX;

#[derive(Clone, Deserialize, Debug)]
pub struct AppConfig {
    pub pg_user: String,
    pub pg_password: String,
    pub pg_database: String,
    #[serde(default = "default_pg_host")]
    pub pg_host: String,
    #[serde(default = "default_pg_port")]
    pub pg_port: u16,
    pub openai_api_key: String,
    #[serde(default = "default_analytics_base_url")]
    pub analytics_base_url: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_embedding_provider")]
    pub embedding_provider: String,
    #[serde(default = "default_embedding_engine")]
    pub embedding_engine: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_embedding_base_url")]
    pub embedding_base_url: String,
    #[serde(default = "default_reranking_provider")]
    pub reranking_provider: String,
    #[serde(default = "default_reranking_model")]
    pub reranking_model: String,
    #[serde(default = "default_content_column")]
    pub content_column: String,
    #[serde(default = "default_metadata_column")]
    pub metadata_column: String,
    #[serde(default = "default_query_retries")]
    pub query_retries: usize,
    #[serde(default = "default_query_retry_delay_ms")]
    pub query_retry_delay_ms: u64,
    #[serde(default = "default_upload_max_body_bytes")]
    pub upload_max_body_bytes: usize,
}

impl AppConfig {
    /// Name under which the staging database is registered with the
    /// analytics service. Shares the prefix matched by the teardown binary.
    pub fn datasource_name(&self) -> String {
        format!("{DATASOURCE_PREFIX}{}", self.pg_database)
    }

    pub fn pg_connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.pg_host)
            .port(self.pg_port)
            .username(&self.pg_user)
            .password(&self.pg_password)
            .database(&self.pg_database)
    }
}

fn default_pg_host() -> String {
    "localhost".to_string()
}

fn default_pg_port() -> u16 {
    5432
}

fn default_analytics_base_url() -> String {
    "http://127.0.0.1:47334/api".to_string()
}

fn default_http_port() -> u16 {
    3000
}

fn default_embedding_provider() -> String {
    "ollama".to_string()
}

fn default_embedding_engine() -> String {
    "ollama_engine".to_string()
}

fn default_embedding_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_embedding_base_url() -> String {
    "http://host.docker.internal:11434".to_string()
}

fn default_reranking_provider() -> String {
    "openai".to_string()
}

fn default_reranking_model() -> String {
    "gpt-4o".to_string()
}

fn default_content_column() -> String {
    "prompt".to_string()
}

fn default_metadata_column() -> String {
    "act".to_string()
}

fn default_query_retries() -> usize {
    1
}

fn default_query_retry_delay_ms() -> u64 {
    1000
}

fn default_upload_max_body_bytes() -> usize {
    26_214_400
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pg_user: "postgres".to_string(),
            pg_password: String::new(),
            pg_database: "app".to_string(),
            pg_host: default_pg_host(),
            pg_port: default_pg_port(),
            openai_api_key: String::new(),
            analytics_base_url: default_analytics_base_url(),
            http_port: default_http_port(),
            embedding_provider: default_embedding_provider(),
            embedding_engine: default_embedding_engine(),
            embedding_model: default_embedding_model(),
            embedding_base_url: default_embedding_base_url(),
            reranking_provider: default_reranking_provider(),
            reranking_model: default_reranking_model(),
            content_column: default_content_column(),
            metadata_column: default_metadata_column(),
            query_retries: default_query_retries(),
            query_retry_delay_ms: default_query_retry_delay_ms(),
            upload_max_body_bytes: default_upload_max_body_bytes(),
        }
    }
}

pub fn get_config() -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(Environment::default())
        .build()?;

    config.try_deserialize()
}
