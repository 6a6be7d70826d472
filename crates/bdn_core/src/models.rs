use async_trait::async_trait;
use std::fmt;
use crate::Result;

#[async_trait]
pub trait InferenceModel: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Generate an embedding for a document chunk
    async fn generate_embeddings(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for many chunks. Backends with a native batch
    /// endpoint override this.
    async fn generate_embeddings_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.generate_embeddings(text).await?);
        }
        Ok(embeddings)
    }

    /// Generate an embedding for a search query
    async fn generate_query_embedding(&self, text: &str) -> Result<Vec<f32>> {
        self.generate_embeddings(text).await
    }

    /// Run the generative model on a fully rendered prompt
    async fn generate_answer(&self, prompt: &str) -> Result<String>;
}
