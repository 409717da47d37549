use async_trait::async_trait;
use reqwest::Client;

use crate::error::{Error, Result};
use crate::models::{CompletionRequest, CompletionResponse};
use crate::qa_service::{build_prompt, upstream_failure, QaService};

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 256;

pub struct OpenAiQaService {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiQaService {
    pub fn new(client: Client, base_url: String, api_key: String, model: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl QaService for OpenAiQaService {
    async fn answer(&self, question: &str, document_text: &str) -> Result<String> {
        let request = CompletionRequest {
            model: self.model.clone(),
            prompt: build_prompt(question, document_text),
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(format!("{}/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(Error::from_transport)?;

        if !response.status().is_success() {
            return Err(upstream_failure("OpenAI", response).await);
        }

        let completion: CompletionResponse =
            response.json().await.map_err(Error::from_transport)?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.text)
            .ok_or_else(|| Error::upstream(None, "OpenAI returned no completion"))
    }

    fn name(&self) -> &str {
        "openai"
    }
}
