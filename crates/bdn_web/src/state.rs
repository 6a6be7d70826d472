use std::sync::Arc;
use bdn_inference::NewsAssistant;

pub struct AppState {
    pub assistant: Arc<NewsAssistant>,
}

impl AppState {
    pub fn new(assistant: Arc<NewsAssistant>) -> Self {
        Self { assistant }
    }
}
