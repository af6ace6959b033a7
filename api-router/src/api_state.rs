use common::{
    analytics::client::AnalyticsClient, error::AppError, storage::staging::StagingStore,
    utils::config::AppConfig,
};

#[derive(Clone)]
pub struct ApiState {
    pub config: AppConfig,
    pub staging: StagingStore,
    pub analytics: AnalyticsClient,
}

impl ApiState {
    pub async fn new(config: &AppConfig) -> Result<Self, AppError> {
        let staging = StagingStore::connect(config).await?;
        let analytics = AnalyticsClient::from_config(config);

        Ok(Self {
            config: config.clone(),
            staging,
            analytics,
        })
    }
}
