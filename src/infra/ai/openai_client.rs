use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::core::articles::{Article, ArticleGenerator, GenerationError};

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const SYSTEM_PROMPT: &str = "You are a professional article writer.";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const MAX_TOKENS: u32 = 1500;
const TEMPERATURE: f32 = 0.7;

/// OpenAI chat-completions client that drafts one article per work item.
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(api_key: String) -> Self {
        Self::with_model(api_key, DEFAULT_MODEL.to_string())
    }

    pub fn with_model(api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
        }
    }

    fn build_prompt(topic: &str, description: &str) -> String {
        format!(
            "Write an article about {} based on this description: {}. \
             Provide clear sections with headings.",
            topic, description
        )
    }
}

#[async_trait]
impl ArticleGenerator for OpenAiClient {
    async fn generate(
        &self,
        topic: &str,
        description: &str,
    ) -> Result<Article, GenerationError> {
        let payload = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": Self::build_prompt(topic, description) },
            ],
            "max_tokens": MAX_TOKENS,
            "temperature": TEMPERATURE,
        });

        tracing::debug!(topic, model = %self.model, "Requesting article draft");

        let response = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| GenerationError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(GenerationError(format!(
                "OpenAI API error: {} - {}",
                status, text
            )));
        }

        let response_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GenerationError(e.to_string()))?;

        let content = response_json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| GenerationError("Failed to parse response content".to_string()))?
            .trim();

        Ok(Article::from_generated_text(topic, content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_names_the_topic_and_description() {
        let prompt = OpenAiClient::build_prompt("Cats", "A short history of cats");

        assert!(prompt.contains("Write an article about Cats"));
        assert!(prompt.contains("A short history of cats"));
        assert!(prompt.contains("sections with headings"));
    }

    #[test]
    fn default_model_is_applied() {
        let client = OpenAiClient::new("key".to_string());
        assert_eq!(client.model, DEFAULT_MODEL);
    }
}
