//! Builders for the SQL-like statements sent to the analytics service.
//!
//! Identifiers interpolated here are either generated by this service or
//! validated against the allow-list in `utils::ident` before they reach a
//! builder. User-supplied *data* (the question on `/ask`) never travels as
//! an identifier: it is escaped so it cannot terminate the string literal.

use serde_json::json;

use crate::utils::config::AppConfig;

/// Prefix for knowledge bases, applied to the staged table name.
pub const KNOWLEDGE_BASE_PREFIX: &str = "kb_";

/// Prefix for datasources registered with the analytics service. Teardown
/// only drops datasources carrying this prefix.
pub const DATASOURCE_PREFIX: &str = "pg_";

pub const SHOW_KNOWLEDGE_BASES: &str = "SHOW KNOWLEDGE BASES;";
pub const SHOW_DATABASES: &str = "SHOW DATABASES;";

pub fn knowledge_base_name(table: &str) -> String {
    format!("{KNOWLEDGE_BASE_PREFIX}{table}")
}

/// CREATE KNOWLEDGE BASE with the configured embedding and reranking
/// models, keyed on the staged table's synthetic `row_id`.
pub fn create_knowledge_base(kb_name: &str, config: &AppConfig) -> String {
    let embedding_model = json!({
        "provider": config.embedding_provider,
        "engine": config.embedding_engine,
        "model_name": config.embedding_model,
        "base_url": config.embedding_base_url,
    });
    let reranking_model = json!({
        "provider": config.reranking_provider,
        "model_name": config.reranking_model,
        "api_key": config.openai_api_key,
    });
    format!(
        "CREATE KNOWLEDGE BASE {kb_name} USING embedding_model = {embedding_model}, reranking_model = {reranking_model}, metadata_columns = ['{metadata}'], content_columns = ['{content}'], id_column = 'row_id';",
        metadata = config.metadata_column,
        content = config.content_column,
    )
}

/// INSERT-SELECT copying `row_id` plus the listed columns from the
/// registered-datasource view of the staged table into the knowledge base.
pub fn insert_from_staged(
    kb_name: &str,
    datasource: &str,
    table: &str,
    headers: &[String],
) -> String {
    let mut columns = Vec::with_capacity(headers.len() + 1);
    columns.push("row_id".to_string());
    columns.extend(headers.iter().cloned());
    format!(
        "INSERT INTO {kb_name} SELECT {columns} FROM {datasource}.{table};",
        columns = columns.join(", "),
    )
}

/// SELECT against the knowledge base's reserved `content` field. The
/// question is user-supplied data, so embedded single quotes are doubled.
pub fn semantic_query(kb_name: &str, question: &str) -> String {
    let escaped = question.replace('\'', "''");
    format!("SELECT * FROM {kb_name} WHERE content = '{escaped}';")
}

pub fn drop_knowledge_base(kb_name: &str) -> String {
    format!("DROP KNOWLEDGE_BASE IF EXISTS {kb_name};")
}

pub fn drop_datasource(name: &str) -> String {
    format!("DROP DATABASE {name};")
}

/// Registers the staging database as a datasource, mirroring the
/// relational-store connection settings.
pub fn create_datasource(config: &AppConfig) -> String {
    let parameters = json!({
        "user": config.pg_user,
        "password": config.pg_password,
        "host": config.pg_host,
        "port": config.pg_port,
        "database": config.pg_database,
    });
    format!(
        "CREATE DATABASE {name} WITH ENGINE = 'postgres', PARAMETERS = {parameters};",
        name = config.datasource_name(),
    )
}
