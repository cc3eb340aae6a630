//! Chat-model seam used by the SQL agent, and its OpenAI implementation.

use async_trait::async_trait;
use openai_client::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs, LlmError,
    OpenAIClient,
};
use tracing::instrument;

use crate::prompt::{ChatMessage, MessageRole};
use crate::tier::AgentTier;

/// LLM client interface: one completion for a list of messages.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Returns the model reply text for the given messages (system/user/assistant).
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, LlmError>;
}

/// Converts a single [`ChatMessage`] into OpenAI API message format.
fn chat_message_to_openai(msg: &ChatMessage) -> Result<ChatCompletionRequestMessage, LlmError> {
    let content = msg.content.clone();
    let openai_msg: ChatCompletionRequestMessage = match msg.role {
        MessageRole::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        MessageRole::User => ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        MessageRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(content)
            .build()?
            .into(),
    };
    Ok(openai_msg)
}

/// [`LlmClient`] backed by openai-client, bound to one tier's model and temperature.
#[derive(Clone)]
pub struct OpenAILlmClient {
    client: OpenAIClient,
    model: String,
    temperature: f32,
}

impl OpenAILlmClient {
    pub fn new(client: OpenAIClient, tier: &AgentTier) -> Self {
        Self {
            client,
            model: tier.model().to_string(),
            temperature: tier.temperature(),
        }
    }
}

#[async_trait]
impl LlmClient for OpenAILlmClient {
    #[instrument(skip(self, messages), fields(model = %self.model))]
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, LlmError> {
        let openai_messages = messages
            .iter()
            .map(chat_message_to_openai)
            .collect::<Result<Vec<_>, _>>()?;
        self.client
            .chat_completion(&self.model, self.temperature, openai_messages)
            .await
    }
}
