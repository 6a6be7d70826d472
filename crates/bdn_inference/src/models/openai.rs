use std::fmt;
use std::sync::Arc;
use async_trait::async_trait;
use bdn_core::config::ModelSettings;
use bdn_core::{Error, InferenceModel, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use super::check_response;

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a [String],
    model: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

/// Endpoint and model names used when the settings still carry the Gemini defaults.
struct ProviderDefaults {
    base_url: &'static str,
    chat_model: &'static str,
    embedding_model: &'static str,
    needs_key: bool,
}

fn provider_defaults(provider: &str) -> ProviderDefaults {
    match provider {
        "deepseek" => ProviderDefaults {
            base_url: "https://api.deepseek.com/v1",
            chat_model: "deepseek-chat",
            embedding_model: "deepseek-embedding",
            needs_key: true,
        },
        "ollama" => ProviderDefaults {
            base_url: "http://localhost:11434/v1",
            chat_model: "llama3",
            embedding_model: "nomic-embed-text",
            needs_key: false,
        },
        _ => ProviderDefaults {
            base_url: "https://api.openai.com/v1",
            chat_model: "gpt-4o-mini",
            embedding_model: "text-embedding-3-small",
            needs_key: true,
        },
    }
}

/// Any server speaking the OpenAI `/chat/completions` and `/embeddings` API.
pub struct OpenAiCompatibleModel {
    client: Arc<Client>,
    provider: String,
    api_key: Option<String>,
    base_url: String,
    chat_model: String,
    embedding_model: String,
    temperature: f32,
}

impl OpenAiCompatibleModel {
    pub fn new(settings: &ModelSettings) -> Result<Self> {
        let defaults = provider_defaults(&settings.provider);
        let gemini = ModelSettings::default();

        let api_key = settings.api_key.clone().filter(|key| !key.is_empty());
        if defaults.needs_key && api_key.is_none() {
            return Err(Error::Config(format!(
                "BDN_API_KEY is required for the {} model",
                settings.provider
            )));
        }

        let chat_model = if settings.chat_model == gemini.chat_model {
            defaults.chat_model.to_string()
        } else {
            settings.chat_model.clone()
        };
        let embedding_model = if settings.embedding_model == gemini.embedding_model {
            defaults.embedding_model.to_string()
        } else {
            settings.embedding_model.clone()
        };

        Ok(Self {
            client: Arc::new(Client::new()),
            provider: settings.provider.clone(),
            api_key,
            base_url: settings
                .base_url
                .clone()
                .unwrap_or_else(|| defaults.base_url.to_string()),
            chat_model,
            embedding_model,
            temperature: settings.temperature,
        })
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let request = self
            .client
            .post(format!("{}/{}", self.base_url.trim_end_matches('/'), path));
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}

impl fmt::Debug for OpenAiCompatibleModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiCompatibleModel")
            .field("client", &"<reqwest::Client>")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("chat_model", &self.chat_model)
            .field("embedding_model", &self.embedding_model)
            .finish()
    }
}

#[async_trait]
impl InferenceModel for OpenAiCompatibleModel {
    fn name(&self) -> &str {
        &self.provider
    }

    async fn generate_embeddings(&self, text: &str) -> Result<Vec<f32>> {
        let mut embeddings = self.generate_embeddings_batch(&[text.to_string()]).await?;
        embeddings
            .pop()
            .ok_or_else(|| Error::Inference(format!("{} returned no embedding", self.provider)))
    }

    async fn generate_embeddings_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let request = EmbeddingRequest {
            input: texts,
            model: &self.embedding_model,
        };
        let response = self.post("embeddings").json(&request).send().await?;
        let mut response: EmbeddingResponse =
            check_response(&self.provider, response).await?.json().await?;

        if response.data.len() != texts.len() {
            return Err(Error::Inference(format!(
                "{} returned {} embeddings for {} texts",
                self.provider,
                response.data.len(),
                texts.len()
            )));
        }
        response.data.sort_by_key(|d| d.index);
        Ok(response.data.into_iter().map(|d| d.embedding).collect())
    }

    async fn generate_answer(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.chat_model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
            temperature: self.temperature,
        };
        let response = self.post("chat/completions").json(&request).send().await?;
        let response: ChatResponse = check_response(&self.provider, response).await?.json().await?;

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| Error::Inference(format!("{} returned no choices", self.provider)))
    }
}
