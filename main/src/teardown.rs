use common::{
    analytics::client::AnalyticsClient, storage::staging::StagingStore, teardown,
    utils::config::get_config,
};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Set up tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();

    let config = get_config()?;

    let staging = StagingStore::connect(&config).await?;
    let analytics = AnalyticsClient::from_config(&config);

    info!("Starting cleanup of knowledge bases, registered datasources and staged tables");
    let report = teardown::run(&analytics, &staging).await;
    info!(
        knowledge_bases = report.knowledge_bases_dropped,
        datasources = report.datasources_dropped,
        tables = report.tables_dropped,
        failures = report.failures,
        "Cleanup complete"
    );

    Ok(())
}
