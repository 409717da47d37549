use async_trait::async_trait;
use reqwest::Client;

use crate::error::{Error, Result};
use crate::models::*;
use crate::qa_service::{build_prompt, upstream_failure, QaService};

pub struct GeminiQaService {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiQaService {
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
impl QaService for GeminiQaService {
    async fn answer(&self, question: &str, document_text: &str) -> Result<String> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: build_prompt(question, document_text),
                }],
            }],
            generation_config: Some(GeminiGenerationConfig {
                temperature: 0.3,
                max_output_tokens: 1000,
            }),
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(Error::from_transport)?;

        if !response.status().is_success() {
            return Err(upstream_failure("Gemini", response).await);
        }

        let gemini_response: GeminiResponse =
            response.json().await.map_err(Error::from_transport)?;

        gemini_response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .ok_or_else(|| Error::upstream(None, "Gemini returned no candidates"))
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
