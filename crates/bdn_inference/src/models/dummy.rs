use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use async_trait::async_trait;
use bdn_core::{InferenceModel, Result};

const DIMENSIONS: usize = 256;

/// Offline model: hashed bag-of-words embeddings and an extractive answer.
#[derive(Default)]
pub struct DummyModel;

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self
    }
}

fn bucket(word: &str) -> usize {
    let mut hasher = DefaultHasher::new();
    word.hash(&mut hasher);
    (hasher.finish() % DIMENSIONS as u64) as usize
}

#[async_trait]
impl InferenceModel for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn generate_embeddings(&self, text: &str) -> Result<Vec<f32>> {
        let mut embedding = vec![0.0; DIMENSIONS];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            embedding[bucket(&word.to_lowercase())] += 1.0;
        }

        let norm = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            embedding.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(embedding)
    }

    async fn generate_answer(&self, prompt: &str) -> Result<String> {
        // First 40 words of the retrieved context
        let context = prompt
            .split_once("Context:")
            .map(|(_, rest)| rest.split("Question:").next().unwrap_or(rest))
            .unwrap_or(prompt);
        let words: Vec<&str> = context.split_whitespace().take(40).collect();

        if words.is_empty() {
            return Ok("I don't have enough information from recent news to answer that.".to_string());
        }
        Ok(words.join(" "))
    }
}
