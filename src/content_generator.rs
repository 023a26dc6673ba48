use std::time::Duration;

use anyhow::Context;
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Client for an OpenAI-compatible chat completions endpoint.
#[derive(Clone)]
pub struct ContentGenerator {
    http_client: Client,
    endpoint: Url,
    api_key: SecretString,
    model: String,
}

#[derive(thiserror::Error, Debug)]
pub enum GenerationError {
    #[error("Failed to call the content generation API.")]
    RequestFailed(#[from] reqwest::Error),
    #[error("The content generation API returned no content.")]
    EmptyCompletion,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl ContentGenerator {
    pub fn new(
        base_url: String,
        api_key: SecretString,
        model: String,
        timeout: Duration,
    ) -> Result<Self, anyhow::Error> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build the content generation HTTP client.")?;
        let endpoint = Url::parse(&base_url)
            .and_then(|url| url.join("v1/chat/completions"))
            .with_context(|| format!("{base_url} is not a valid content generation API url."))?;

        Ok(Self {
            http_client,
            endpoint,
            api_key,
            model,
        })
    }

    #[tracing::instrument(name = "Generating issue content", skip_all, fields(model = %self.model))]
    pub async fn generate(&self, system: &str, prompt: &str) -> Result<String, GenerationError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json::<ChatCompletionResponse>()
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(GenerationError::EmptyCompletion)
    }
}
