use std::sync::Arc;
use bdn_core::{Error, IndexedChunk, InferenceModel, Result, TextChunk};

pub struct EmbeddingGenerator {
    model: Arc<dyn InferenceModel>,
}

impl EmbeddingGenerator {
    pub fn new(model: Arc<dyn InferenceModel>) -> Self {
        Self { model }
    }

    /// Embeds every chunk. Any failure aborts the whole batch.
    pub async fn embed_chunks(&self, chunks: Vec<TextChunk>) -> Result<Vec<IndexedChunk>> {
        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let embeddings = self.model.generate_embeddings_batch(&texts).await?;

        if embeddings.len() != chunks.len() {
            return Err(Error::Inference(format!(
                "{} produced {} embeddings for {} chunks",
                self.model.name(),
                embeddings.len(),
                chunks.len()
            )));
        }

        Ok(chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexedChunk { chunk, embedding })
            .collect())
    }

    pub async fn embed_query(&self, question: &str) -> Result<Vec<f32>> {
        self.model.generate_query_embedding(question).await
    }
}
