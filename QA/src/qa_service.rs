//! Question-answering service seam

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;

use crate::config::{QaConfig, QaProvider};
use crate::error::{Error, Result};
use crate::gemini_service::GeminiQaService;
use crate::openai_service::OpenAiQaService;

/// Answers a question against the full text of one document.
///
/// Implementations:
/// - `OpenAiQaService`: OpenAI completions API
/// - `GeminiQaService`: Google Generative Language API
#[async_trait]
pub trait QaService: Send + Sync {
    /// Single attempt; the generated text is returned verbatim.
    async fn answer(&self, question: &str, document_text: &str) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// Build the configured provider.
pub fn from_config(config: &QaConfig) -> Result<Arc<dyn QaService>> {
    let client = Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

    let service: Arc<dyn QaService> = match config.provider {
        QaProvider::OpenAi => Arc::new(OpenAiQaService::new(
            client,
            config.base_url.clone(),
            config.api_key.clone(),
            config.model.clone(),
        )),
        QaProvider::Gemini => Arc::new(GeminiQaService::new(
            client,
            config.base_url.clone(),
            config.api_key.clone(),
            config.model.clone(),
        )),
    };
    Ok(service)
}

/// "Stuff" prompt: the whole document as context, then the question.
pub fn build_prompt(question: &str, context: &str) -> String {
    format!(
        "Use the following pieces of context to answer the question at the end. \
If you don't know the answer, just say that you don't know, don't try to make up an answer.\n\n\
{context}\n\nQuestion: {question}\nHelpful Answer:"
    )
}

/// Turn a non-success HTTP response into an `UpstreamError`.
pub(crate) async fn upstream_failure(provider: &str, response: reqwest::Response) -> Error {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Error::upstream(Some(status), format!("{} API error: {}", provider, body))
}
