use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::Store;
use crate::services::{Assistant, OpenAiAssistant, WeatherService};

/// Shared handles cloned into every request
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
    pub weather: Arc<WeatherService>,
    pub assistant: Arc<dyn Assistant>,
}

impl AppState {
    /// Wire the provider clients from configuration.
    pub fn new(store: Arc<dyn Store>, config: AppConfig) -> Self {
        let weather = Arc::new(WeatherService::new(config.weather.clone()));
        let assistant: Arc<dyn Assistant> =
            Arc::new(OpenAiAssistant::new(config.assistant.clone()));
        Self {
            store,
            config: Arc::new(config),
            weather,
            assistant,
        }
    }

    /// Swap the assistant implementation (tests use a canned one).
    pub fn with_assistant(mut self, assistant: Arc<dyn Assistant>) -> Self {
        self.assistant = assistant;
        self
    }
}
