use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::AssistantConfig;
use crate::services::{check_status, http_client, UpstreamError};

const CHAT_SYSTEM_PROMPT: &str = "Você é a SemeIA, uma assistente especializada em agronegócio. \
Você deve responder perguntas sobre:
- Agricultura (plantio, colheita, pragas, doenças)
- Pecuária (manejo, alimentação, reprodução, saúde animal)
- Mercado agrícola (preços, commodities, tendências)
- Tecnologia agrícola (equipamentos, GPS, automação)
- Sustentabilidade e práticas agrícolas

Sempre forneça respostas práticas, técnicas e úteis. Seja concisa mas detalhada.
Use linguagem profissional mas acessível. Foque em soluções práticas.";

const VISION_SYSTEM_PROMPT: &str = "Você é a SemeIA, especialista em análise visual agrícola. \
Analise esta imagem e identifique:
- Plantas, culturas ou pragas presentes
- Doenças ou problemas visíveis
- Recomendações de tratamento ou prevenção
- Identificação de equipamentos agrícolas
- Condições do solo ou clima

Forneça uma análise técnica detalhada com recomendações práticas.";

const VISION_USER_PROMPT: &str =
    "Analise esta imagem agrícola e forneça um diagnóstico detalhado com recomendações.";

pub const CHAT_FALLBACK: &str = "Desculpe, não consegui processar sua pergunta.";
pub const VISION_FALLBACK: &str = "Não foi possível analisar a imagem.";

/// The SemeIA agronomy assistant
#[async_trait]
pub trait Assistant: Send + Sync {
    async fn chat(&self, message: &str) -> Result<String, UpstreamError>;

    async fn analyze_image(&self, image: &[u8], content_type: &str)
        -> Result<String, UpstreamError>;
}

/// OpenAI-compatible chat-completions client
pub struct OpenAiAssistant {
    client: reqwest::Client,
    config: AssistantConfig,
}

#[derive(Debug, Deserialize)]
struct Completion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiAssistant {
    pub fn new(config: AssistantConfig) -> Self {
        Self {
            client: http_client(config.timeout_secs),
            config,
        }
    }

    async fn complete(&self, body: Value) -> Result<Completion, UpstreamError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(UpstreamError::NotConfigured("OPENAI_API_KEY"))?;
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));

        let resp = self.client.post(url).bearer_auth(api_key).json(&body).send().await?;
        Ok(check_status(resp).await?.json::<Completion>().await?)
    }
}

fn chat_request(config: &AssistantConfig, message: &str) -> Value {
    json!({
        "model": config.model,
        "messages": [
            { "role": "system", "content": CHAT_SYSTEM_PROMPT },
            { "role": "user", "content": message }
        ],
        "max_tokens": config.chat_max_tokens,
        "temperature": config.temperature,
    })
}

fn vision_request(config: &AssistantConfig, image: &[u8], content_type: &str) -> Value {
    let encoded = base64::engine::general_purpose::STANDARD.encode(image);
    json!({
        "model": config.model,
        "messages": [
            { "role": "system", "content": VISION_SYSTEM_PROMPT },
            {
                "role": "user",
                "content": [
                    { "type": "text", "text": VISION_USER_PROMPT },
                    {
                        "type": "image_url",
                        "image_url": { "url": format!("data:{};base64,{}", content_type, encoded) }
                    }
                ]
            }
        ],
        "max_tokens": config.vision_max_tokens,
    })
}

/// First choice's text, or `fallback` when the model returned nothing
fn completion_text(completion: Completion, fallback: &str) -> String {
    completion
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|text| !text.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

#[async_trait]
impl Assistant for OpenAiAssistant {
    async fn chat(&self, message: &str) -> Result<String, UpstreamError> {
        let completion = self.complete(chat_request(&self.config, message)).await?;
        Ok(completion_text(completion, CHAT_FALLBACK))
    }

    async fn analyze_image(
        &self,
        image: &[u8],
        content_type: &str,
    ) -> Result<String, UpstreamError> {
        let completion = self
            .complete(vision_request(&self.config, image, content_type))
            .await?;
        Ok(completion_text(completion, VISION_FALLBACK))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_uses_configured_limits() {
        let body = chat_request(&AssistantConfig::default(), "Quando plantar soja?");
        assert_eq!(body["max_tokens"], 500);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Quando plantar soja?");
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn vision_request_embeds_data_url() {
        let body = vision_request(&AssistantConfig::default(), b"abc", "image/png");
        assert_eq!(body["max_tokens"], 600);
        assert_eq!(
            body["messages"][1]["content"][1]["image_url"]["url"],
            "data:image/png;base64,YWJj"
        );
    }

    #[test]
    fn empty_completion_uses_fallback() {
        let empty: Completion = serde_json::from_value(json!({ "choices": [] })).unwrap();
        assert_eq!(completion_text(empty, CHAT_FALLBACK), CHAT_FALLBACK);

        let null = json!({ "choices": [{ "message": { "content": null } }] });
        let null: Completion = serde_json::from_value(null).unwrap();
        assert_eq!(completion_text(null, VISION_FALLBACK), VISION_FALLBACK);

        let ok = json!({ "choices": [{ "message": { "content": "Use calcário." } }] });
        let ok: Completion = serde_json::from_value(ok).unwrap();
        assert_eq!(completion_text(ok, CHAT_FALLBACK), "Use calcário.");
    }

    #[tokio::test]
    async fn missing_key_is_not_configured() {
        let assistant = OpenAiAssistant::new(AssistantConfig::default());
        assert!(matches!(
            assistant.chat("oi").await,
            Err(UpstreamError::NotConfigured(_))
        ));
    }
}
