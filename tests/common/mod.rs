#![allow(dead_code)]

use std::sync::Arc;

use agrobagual_api::auth::{generate_jwt, Claims};
use agrobagual_api::config::AppConfig;
use agrobagual_api::database::models::UpsertUser;
use agrobagual_api::database::{MemoryStore, Store};
use agrobagual_api::services::{Assistant, UpstreamError};
use agrobagual_api::{app, AppState};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-test-secret";
pub const CANNED_CHAT: &str = "Plante milho no início das chuvas.";
pub const CANNED_ANALYSIS: &str = "Folhas com sinais de ferrugem.";

/// Assistant that answers without leaving the process
pub struct CannedAssistant;

#[async_trait]
impl Assistant for CannedAssistant {
    async fn chat(&self, _message: &str) -> Result<String, UpstreamError> {
        Ok(CANNED_CHAT.to_string())
    }

    async fn analyze_image(
        &self,
        image: &[u8],
        content_type: &str,
    ) -> Result<String, UpstreamError> {
        assert!(!image.is_empty());
        assert!(content_type.starts_with("image/"));
        Ok(CANNED_ANALYSIS.to_string())
    }
}

/// Assistant whose provider is always down
pub struct BrokenAssistant;

#[async_trait]
impl Assistant for BrokenAssistant {
    async fn chat(&self, _message: &str) -> Result<String, UpstreamError> {
        Err(UpstreamError::NotConfigured("OPENAI_API_KEY"))
    }

    async fn analyze_image(
        &self,
        _image: &[u8],
        _content_type: &str,
    ) -> Result<String, UpstreamError> {
        Err(UpstreamError::NotConfigured("OPENAI_API_KEY"))
    }
}

/// Development preset with a fixed secret and no provider keys
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.security.jwt_secret = TEST_SECRET.to_string();
    config.api.enable_request_logging = false;
    config.weather.api_key = None;
    config.assistant.api_key = None;
    config
}

/// One server per test, backed by its own memory store
pub struct TestApp {
    pub base_url: String,
    pub store: Arc<MemoryStore>,
    pub client: Client,
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(test_config(), Arc::new(CannedAssistant)).await
    }

    pub async fn spawn_with(config: AppConfig, assistant: Arc<dyn Assistant>) -> Result<Self> {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), config).with_assistant(assistant);

        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        Ok(Self {
            base_url: format!("http://127.0.0.1:{}", port),
            store,
            client: Client::new(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Register a fresh user and return a bearer token for it.
    pub async fn login(&self, email: &str) -> Result<String> {
        let id = Uuid::new_v4();
        self.store
            .upsert_user(UpsertUser {
                id,
                email: Some(email.to_string()),
                first_name: Some("Produtor".to_string()),
                ..UpsertUser::default()
            })
            .await?;
        Ok(generate_jwt(&Claims::new(id, Some(email.to_string()), 1), TEST_SECRET)?)
    }

    pub fn get(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(token)
    }

    pub fn post(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(token)
    }

    pub fn patch(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.patch(self.url(path)).bearer_auth(token)
    }

    pub fn delete(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.delete(self.url(path)).bearer_auth(token)
    }
}
