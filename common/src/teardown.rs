//! Administrative reset: removes every knowledge base, every registered
//! datasource carrying the staging prefix, and every staged table. Each
//! deletion is best-effort — failures are logged and counted, never
//! propagated, so one broken object cannot shield the rest.

use tracing::{info, warn};

use crate::{
    analytics::{client::AnalyticsClient, statements},
    storage::staging::StagingStore,
    utils::ident::is_safe_identifier,
};

/// System datasources the analytics service relies on; never dropped.
pub const PROTECTED_DATASOURCES: [&str; 4] = ["information_schema", "log", "mindsdb", "files"];

#[derive(Debug, Default, PartialEq, Eq)]
pub struct TeardownReport {
    pub knowledge_bases_dropped: usize,
    pub datasources_dropped: usize,
    pub tables_dropped: usize,
    pub failures: usize,
}

pub async fn run(analytics: &AnalyticsClient, staging: &StagingStore) -> TeardownReport {
    let mut report = TeardownReport::default();
    drop_knowledge_bases(analytics, &mut report).await;
    drop_registered_datasources(analytics, &mut report).await;
    drop_staged_tables(staging, &mut report).await;
    report
}

async fn drop_knowledge_bases(analytics: &AnalyticsClient, report: &mut TeardownReport) {
    let listed = match analytics.run_query(statements::SHOW_KNOWLEDGE_BASES).await {
        Ok(response) => response.first_column_strings(),
        Err(error) => {
            warn!(%error, "failed to list knowledge bases");
            report.failures += 1;
            return;
        }
    };

    for name in listed {
        if !is_safe_identifier(&name) {
            warn!(knowledge_base = %name, "skipping knowledge base with unexpected name");
            report.failures += 1;
            continue;
        }
        match analytics
            .run_query(&statements::drop_knowledge_base(&name))
            .await
        {
            Ok(_) => {
                info!(knowledge_base = %name, "dropped knowledge base");
                report.knowledge_bases_dropped += 1;
            }
            Err(error) => {
                warn!(knowledge_base = %name, %error, "failed to drop knowledge base");
                report.failures += 1;
            }
        }
    }
}

async fn drop_registered_datasources(analytics: &AnalyticsClient, report: &mut TeardownReport) {
    let listed = match analytics.run_query(statements::SHOW_DATABASES).await {
        Ok(response) => response.first_column_strings(),
        Err(error) => {
            warn!(%error, "failed to list registered datasources");
            report.failures += 1;
            return;
        }
    };

    for name in listed {
        let matches_prefix = name.starts_with(statements::DATASOURCE_PREFIX);
        if !matches_prefix || PROTECTED_DATASOURCES.contains(&name.as_str()) {
            continue;
        }
        if !is_safe_identifier(&name) {
            warn!(datasource = %name, "skipping datasource with unexpected name");
            report.failures += 1;
            continue;
        }
        match analytics
            .run_query(&statements::drop_datasource(&name))
            .await
        {
            Ok(_) => {
                info!(datasource = %name, "dropped registered datasource");
                report.datasources_dropped += 1;
            }
            Err(error) => {
                warn!(datasource = %name, %error, "failed to drop registered datasource");
                report.failures += 1;
            }
        }
    }
}

async fn drop_staged_tables(staging: &StagingStore, report: &mut TeardownReport) {
    let listed = match staging.list_staged_tables().await {
        Ok(tables) => tables,
        Err(error) => {
            warn!(%error, "failed to list staged tables");
            report.failures += 1;
            return;
        }
    };

    for table in listed {
        match staging.drop_staged_table(&table).await {
            Ok(()) => {
                info!(table = %table, "dropped staged table");
                report.tables_dropped += 1;
            }
            Err(error) => {
                warn!(table = %table, %error, "failed to drop staged table");
                report.failures += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::client::{QueryResponse, QueryTransport};
    use crate::error::AppError;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn ok_response(data: Vec<Value>) -> QueryResponse {
        QueryResponse {
            kind: "table".to_string(),
            data,
            column_names: None,
            error_message: None,
            extra: serde_json::Map::new(),
        }
    }

    fn error_response(message: &str) -> QueryResponse {
        QueryResponse {
            kind: "error".to_string(),
            data: vec![],
            column_names: None,
            error_message: Some(message.to_string()),
            extra: serde_json::Map::new(),
        }
    }

    /// Replays scripted responses and records every statement sent.
    struct RecordingTransport {
        script: Mutex<Vec<QueryResponse>>,
        statements: Mutex<Vec<String>>,
    }

    impl RecordingTransport {
        fn new(script: Vec<QueryResponse>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script),
                statements: Mutex::new(Vec::new()),
            })
        }

        fn statements(&self) -> Vec<String> {
            self.statements.lock().expect("statement lock").clone()
        }
    }

    #[async_trait]
    impl QueryTransport for RecordingTransport {
        async fn execute(&self, query: &str) -> Result<QueryResponse, AppError> {
            self.statements
                .lock()
                .expect("statement lock")
                .push(query.to_string());
            let mut script = self.script.lock().expect("script lock");
            assert!(!script.is_empty(), "transport called more than scripted");
            Ok(script.remove(0))
        }
    }

    fn client(transport: Arc<RecordingTransport>) -> AnalyticsClient {
        AnalyticsClient::with_transport(transport, 0, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn drops_every_listed_knowledge_base() {
        let transport = RecordingTransport::new(vec![
            ok_response(vec![json!(["kb_csv_1a2b3c4d"]), json!(["kb_csv_9f8e7d6c"])]),
            ok_response(vec![]),
            ok_response(vec![]),
        ]);
        let mut report = TeardownReport::default();
        drop_knowledge_bases(&client(transport.clone()), &mut report).await;

        assert_eq!(report.knowledge_bases_dropped, 2);
        assert_eq!(report.failures, 0);
        let statements = transport.statements();
        assert!(statements[1].contains("DROP KNOWLEDGE_BASE IF EXISTS kb_csv_1a2b3c4d"));
        assert!(statements[2].contains("DROP KNOWLEDGE_BASE IF EXISTS kb_csv_9f8e7d6c"));
    }

    #[tokio::test]
    async fn empty_listing_is_a_clean_run() {
        let transport = RecordingTransport::new(vec![ok_response(vec![])]);
        let mut report = TeardownReport::default();
        drop_knowledge_bases(&client(transport.clone()), &mut report).await;

        assert_eq!(report, TeardownReport::default());
        assert_eq!(transport.statements().len(), 1);
    }

    #[tokio::test]
    async fn spares_protected_and_unprefixed_datasources() {
        let transport = RecordingTransport::new(vec![
            ok_response(vec![
                json!(["information_schema"]),
                json!(["mindsdb"]),
                json!(["files"]),
                json!(["my_other_db"]),
                json!(["pg_app"]),
            ]),
            ok_response(vec![]),
        ]);
        let mut report = TeardownReport::default();
        drop_registered_datasources(&client(transport.clone()), &mut report).await;

        assert_eq!(report.datasources_dropped, 1);
        assert_eq!(report.failures, 0);
        let statements = transport.statements();
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[1], "DROP DATABASE pg_app;");
    }

    #[tokio::test]
    async fn one_failed_drop_does_not_halt_the_rest() {
        let transport = RecordingTransport::new(vec![
            ok_response(vec![json!(["kb_csv_1a2b3c4d"]), json!(["kb_csv_9f8e7d6c"])]),
            error_response("KB is busy"),
            ok_response(vec![]),
        ]);
        let mut report = TeardownReport::default();
        drop_knowledge_bases(&client(transport.clone()), &mut report).await;

        assert_eq!(report.knowledge_bases_dropped, 1);
        assert_eq!(report.failures, 1);
        assert_eq!(transport.statements().len(), 3);
    }

    #[tokio::test]
    async fn listing_failure_is_counted_not_propagated() {
        let transport = RecordingTransport::new(vec![error_response("service down")]);
        let mut report = TeardownReport::default();
        drop_knowledge_bases(&client(transport), &mut report).await;

        assert_eq!(report.knowledge_bases_dropped, 0);
        assert_eq!(report.failures, 1);
    }
}
