pub mod classifier;
pub mod mock;
pub mod openai;
pub mod types;

pub use classifier::{Classification, Intent, IntentClassifier};
pub use mock::MockAiClient;
pub use openai::OpenAIClient;
pub use types::AiError;

use crate::config::Config;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Language model backend used by the classifier
pub enum AiClient {
    OpenAI(OpenAIClient),
    Mock(MockAiClient),
}

impl AiClient {
    pub fn from_config(config: &Config) -> Result<Self, String> {
        if config.openai_api_key.is_empty() {
            log::warn!("[OPENAI] OPENAI_API_KEY is not set, model requests will be rejected");
        }
        let client = OpenAIClient::new(
            &config.openai_api_key,
            Some(&config.openai_endpoint),
            Some(&config.openai_model),
        )?;
        Ok(AiClient::OpenAI(client))
    }

    pub async fn generate_text(&self, messages: Vec<Message>) -> Result<String, AiError> {
        match self {
            AiClient::OpenAI(client) => client.generate_text(messages).await,
            AiClient::Mock(client) => client.generate_text(messages).await,
        }
    }
}
