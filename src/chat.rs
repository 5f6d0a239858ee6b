//! Support chat transcript and conversation flow.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::LocalStore;
use crate::error::ClientError;
use crate::gateway::RemoteGateway;
use crate::models::ChatMessage;

pub const CHAT_HISTORY_KEY: &str = "chatHistory";

pub const WELCOME_TEXT: &str =
    "Hi! I'm your counselling assistant. I'm here to help you with any concerns about your studies, stress management, or just to chat. How are you feeling today?";
pub const CLEARED_WELCOME_TEXT: &str =
    "Hi! I'm your counselling assistant. How can I help you today?";
pub const UNAVAILABLE_TEXT: &str =
    "I'm sorry, I'm having trouble connecting right now. Please try again later.";

const ID_SUFFIX_LEN: usize = 12;

/// Wall-clock milliseconds followed by a random alphanumeric suffix. Unique
/// with overwhelming probability; ids do not sort by creation order.
pub fn new_message_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}{}", Utc::now().timestamp_millis(), &suffix[..ID_SUFFIX_LEN])
}

impl ChatMessage {
    pub fn new(message: impl Into<String>, is_user: bool) -> Self {
        Self {
            id: new_message_id(),
            message: message.into(),
            is_user,
            timestamp: Utc::now(),
        }
    }

    pub fn welcome() -> Self {
        Self::new(WELCOME_TEXT, false)
    }
}

/// Ordered chat transcript persisted under a single key.
#[derive(Clone)]
pub struct ChatHistoryStore {
    store: LocalStore,
}

impl ChatHistoryStore {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    pub fn new_id(&self) -> String {
        new_message_id()
    }

    /// Stored transcript. An unreadable transcript reads as empty.
    pub async fn load(&self) -> Result<Vec<ChatMessage>, ClientError> {
        let Some(raw) = self.store.get(CHAT_HISTORY_KEY).await? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&raw) {
            Ok(messages) => Ok(messages),
            Err(err) => {
                warn!(error = %err, "Ignoring unreadable chat history");
                Ok(Vec::new())
            }
        }
    }

    /// Transcript to render. An empty history shows a welcome message that is
    /// not written back.
    pub async fn load_for_display(&self) -> Result<Vec<ChatMessage>, ClientError> {
        let history = self.load().await?;
        if history.is_empty() {
            return Ok(vec![ChatMessage::welcome()]);
        }
        Ok(history)
    }

    pub async fn append(&self, messages: &[ChatMessage]) -> Result<(), ClientError> {
        let mut history = self.load().await?;
        history.extend_from_slice(messages);
        self.replace(&history).await
    }

    pub async fn replace(&self, messages: &[ChatMessage]) -> Result<(), ClientError> {
        let raw = serde_json::to_string(messages)?;
        self.store.set(CHAT_HISTORY_KEY, &raw).await?;
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), ClientError> {
        self.store.remove(&[CHAT_HISTORY_KEY]).await?;
        Ok(())
    }
}

/// Sends one user message and records both sides of the exchange.
///
/// Blank input is ignored. A failed chat call is answered with an apology
/// message instead of an error.
pub async fn converse(
    gateway: &RemoteGateway,
    history: &ChatHistoryStore,
    text: &str,
) -> Result<Option<ChatMessage>, ClientError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    let user_message = ChatMessage::new(text, true);
    history.append(std::slice::from_ref(&user_message)).await?;

    let reply = match gateway.chat(text).await {
        Ok(response) => ChatMessage::new(response.reply, false),
        Err(err) => {
            info!(error = %err, "Chat service unavailable");
            ChatMessage::new(UNAVAILABLE_TEXT, false)
        }
    };

    history.append(std::slice::from_ref(&reply)).await?;
    Ok(Some(reply))
}
