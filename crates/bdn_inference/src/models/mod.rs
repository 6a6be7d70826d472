use std::sync::Arc;
use bdn_core::config::ModelSettings;
use bdn_core::{Error, Result};
pub use bdn_core::InferenceModel;

pub mod dummy;
pub mod gemini;
pub mod openai;

pub use dummy::DummyModel;
pub use gemini::GeminiModel;
pub use openai::OpenAiCompatibleModel;

/// Builds the model named by `settings.provider`.
pub fn create_model(settings: &ModelSettings) -> Result<Arc<dyn InferenceModel>> {
    match settings.provider.as_str() {
        "gemini" => Ok(Arc::new(GeminiModel::new(settings)?)),
        "openai" | "deepseek" | "ollama" => Ok(Arc::new(OpenAiCompatibleModel::new(settings)?)),
        "dummy" => Ok(Arc::new(DummyModel::new())),
        other => Err(Error::Config(format!(
            "Unknown model provider: {} (available: gemini, openai, deepseek, ollama, dummy)",
            other
        ))),
    }
}

/// Turns a non-success response into an inference error carrying the body.
pub(crate) async fn check_response(provider: &str, response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::Inference(format!("{} returned {}: {}", provider, status, body)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_model_by_provider() {
        let mut settings = ModelSettings {
            api_key: Some("test-key".to_string()),
            ..ModelSettings::default()
        };
        assert_eq!(create_model(&settings).unwrap().name(), "Gemini");

        settings.provider = "dummy".to_string();
        assert_eq!(create_model(&settings).unwrap().name(), "Dummy");

        settings.provider = "ollama".to_string();
        assert_eq!(create_model(&settings).unwrap().name(), "ollama");

        settings.provider = "llama.cpp".to_string();
        assert!(create_model(&settings).is_err());
    }
}
