use std::sync::Arc;

use anyhow::Context;

use crate::api::{ApiClient, CalorieApi};
use crate::config::ClientConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ClientConfig>,
    pub api: Arc<dyn CalorieApi>,
}

impl AppState {
    pub fn init(config: ClientConfig) -> anyhow::Result<Self> {
        let api = Arc::new(ApiClient::new(&config).context("build API client")?) as Arc<dyn CalorieApi>;
        Ok(Self::from_parts(Arc::new(config), api))
    }

    pub fn from_parts(config: Arc<ClientConfig>, api: Arc<dyn CalorieApi>) -> Self {
        Self { config, api }
    }

    #[cfg(test)]
    pub fn fake() -> (Self, Arc<crate::api::fake::FakeApi>) {
        use crate::api::fake::FakeApi;

        let api = Arc::new(FakeApi::new());
        let config = Arc::new(ClientConfig::for_base_url("http://fake.local"));
        let state = Self::from_parts(config, api.clone() as Arc<dyn CalorieApi>);
        (state, api)
    }
}
