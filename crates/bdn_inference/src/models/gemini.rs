use std::fmt;
use std::sync::Arc;
use async_trait::async_trait;
use bdn_core::config::ModelSettings;
use bdn_core::{Error, InferenceModel, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use super::check_response;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// `batchEmbedContents` accepts at most this many requests per call.
const MAX_BATCH: usize = 100;

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedRequest<'a> {
    model: &'a str,
    content: Content<'a>,
    task_type: &'a str,
}

#[derive(Serialize)]
struct BatchEmbedRequest<'a> {
    requests: Vec<EmbedRequest<'a>>,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<EmbeddingValues>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    fn into_text(self) -> Result<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();
        if text.is_empty() {
            return Err(Error::Inference("Gemini returned no candidates".to_string()));
        }
        Ok(text)
    }
}

/// Google Gemini over the Generative Language REST API.
pub struct GeminiModel {
    client: Arc<Client>,
    api_key: String,
    base_url: String,
    chat_model: String,
    embedding_model: String,
    temperature: f32,
}

impl GeminiModel {
    pub fn new(settings: &ModelSettings) -> Result<Self> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| Error::Config("GOOGLE_API_KEY is required for the Gemini model".to_string()))?;

        Ok(Self {
            client: Arc::new(Client::new()),
            api_key,
            base_url: settings
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            chat_model: qualified(&settings.chat_model),
            embedding_model: qualified(&settings.embedding_model),
            temperature: settings.temperature,
        })
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!("{}/{}:{}", self.base_url.trim_end_matches('/'), model, method)
    }

    fn embed_request<'a>(&'a self, text: &'a str, task_type: &'a str) -> EmbedRequest<'a> {
        EmbedRequest {
            model: &self.embedding_model,
            content: Content { role: None, parts: vec![Part { text }] },
            task_type,
        }
    }

    async fn embed(&self, text: &str, task_type: &str) -> Result<Vec<f32>> {
        let response = self
            .client
            .post(self.endpoint(&self.embedding_model, "embedContent"))
            .header("x-goog-api-key", &self.api_key)
            .json(&self.embed_request(text, task_type))
            .send()
            .await?;
        let response: EmbedResponse = check_response("Gemini", response).await?.json().await?;
        Ok(response.embedding.values)
    }
}

/// Model ids are addressed as `models/<id>`.
fn qualified(model: &str) -> String {
    if model.starts_with("models/") {
        model.to_string()
    } else {
        format!("models/{}", model)
    }
}

impl fmt::Debug for GeminiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("chat_model", &self.chat_model)
            .field("embedding_model", &self.embedding_model)
            .finish()
    }
}

#[async_trait]
impl InferenceModel for GeminiModel {
    fn name(&self) -> &str {
        "Gemini"
    }

    async fn generate_embeddings(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(text, "RETRIEVAL_DOCUMENT").await
    }

    async fn generate_embeddings_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(MAX_BATCH) {
            debug!("🔢 Embedding batch of {} chunks", batch.len());
            let request = BatchEmbedRequest {
                requests: batch
                    .iter()
                    .map(|text| self.embed_request(text, "RETRIEVAL_DOCUMENT"))
                    .collect(),
            };
            let response = self
                .client
                .post(self.endpoint(&self.embedding_model, "batchEmbedContents"))
                .header("x-goog-api-key", &self.api_key)
                .json(&request)
                .send()
                .await?;
            let response: BatchEmbedResponse =
                check_response("Gemini", response).await?.json().await?;

            if response.embeddings.len() != batch.len() {
                return Err(Error::Inference(format!(
                    "Gemini returned {} embeddings for {} texts",
                    response.embeddings.len(),
                    batch.len()
                )));
            }
            embeddings.extend(response.embeddings.into_iter().map(|e| e.values));
        }
        Ok(embeddings)
    }

    async fn generate_query_embedding(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(text, "RETRIEVAL_QUERY").await
    }

    async fn generate_answer(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content { role: Some("user"), parts: vec![Part { text: prompt }] }],
            generation_config: GenerationConfig { temperature: self.temperature },
        };
        let response = self
            .client
            .post(self.endpoint(&self.chat_model, "generateContent"))
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;
        let response: GenerateResponse = check_response("Gemini", response).await?.json().await?;
        response.into_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> ModelSettings {
        ModelSettings {
            api_key: Some("test-key".to_string()),
            ..ModelSettings::default()
        }
    }

    #[test]
    fn test_requires_api_key() {
        let mut settings = settings();
        settings.api_key = None;
        assert!(GeminiModel::new(&settings).is_err());
        settings.api_key = Some(String::new());
        assert!(GeminiModel::new(&settings).is_err());
    }

    #[test]
    fn test_endpoints() {
        let model = GeminiModel::new(&settings()).unwrap();
        assert_eq!(
            model.endpoint(&model.chat_model, "generateContent"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
        assert_eq!(
            model.endpoint(&model.embedding_model, "batchEmbedContents"),
            "https://generativelanguage.googleapis.com/v1beta/models/embedding-001:batchEmbedContents"
        );
    }

    #[test]
    fn test_embed_request_shape() {
        let model = GeminiModel::new(&settings()).unwrap();
        let json = serde_json::to_value(model.embed_request("hello", "RETRIEVAL_QUERY")).unwrap();
        assert_eq!(json["model"], "models/embedding-001");
        assert_eq!(json["taskType"], "RETRIEVAL_QUERY");
        assert_eq!(json["content"]["parts"][0]["text"], "hello");
        assert!(json["content"].get("role").is_none());
    }

    #[test]
    fn test_generate_response_parsing() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"Hello "},{"text":"Dhaka"}]}}]}"#;
        let response: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.into_text().unwrap(), "Hello Dhaka");

        let empty: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(empty.into_text().is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let model = GeminiModel::new(&settings()).unwrap();
        assert!(!format!("{:?}", model).contains("test-key"));
    }
}
