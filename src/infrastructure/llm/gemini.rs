use async_trait::async_trait;
use futures::StreamExt;
use rig::agent::MultiTurnStreamItem;
use rig::client::{CompletionClient, ProviderClient};
use rig::completion::Message;
use rig::providers::gemini;
use rig::streaming::{StreamedAssistantContent, StreamingChat};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::domain::ports::{ChatModel, FragmentStream};
use crate::domain::{ChatRole, ChatTurn, DocumentChunk, DomainError};
use crate::infrastructure::config::AppConfig;

const FRAGMENT_BUFFER: usize = 64;

/// Streaming chat against Google Gemini through rig.
///
/// The client reads `GEMINI_API_KEY` from the environment; callers check it
/// with [`AppConfig::require_api_key`] before constructing this.
pub struct GeminiChat {
    client: gemini::Client,
    model: String,
    system_prompt: String,
}

impl GeminiChat {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: gemini::Client::from_env(),
            model: config.config.llm.model.clone(),
            system_prompt: config.prompts.assistant.system.clone(),
        }
    }
}

fn to_message(turn: &ChatTurn) -> Message {
    match turn.role {
        ChatRole::Human => Message::user(turn.content.clone()),
        ChatRole::Assistant => Message::assistant(turn.content.clone()),
    }
}

#[async_trait]
impl ChatModel for GeminiChat {
    async fn stream_chat(
        &self,
        history: &[ChatTurn],
        question: &str,
        context: &[DocumentChunk],
    ) -> Result<FragmentStream, DomainError> {
        // Chunks are not used to build the prompt; only the history and
        // the question reach the model.
        tracing::debug!(
            model = %self.model,
            history = history.len(),
            chunks = context.len(),
            "opening chat stream"
        );

        let agent = self
            .client
            .agent(&self.model)
            .preamble(&self.system_prompt)
            .build();
        let chat_history: Vec<Message> = history.iter().map(to_message).collect();
        let question = question.to_string();

        let (tx, rx) = mpsc::channel(FRAGMENT_BUFFER);
        tokio::spawn(async move {
            let mut stream = agent.stream_chat(question, chat_history).await;

            while let Some(item) = stream.next().await {
                match item {
                    Ok(MultiTurnStreamItem::StreamAssistantItem(
                        StreamedAssistantContent::Text(text),
                    )) => {
                        if tx.send(Ok(text.text)).await.is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        let _ = tx
                            .send(Err(DomainError::external(format!("Gemini stream failed: {e}"))))
                            .await;
                        break;
                    }
                }
            }
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}
