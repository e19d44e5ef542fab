//! Chat domain types.
//!
//! Chat persistence only; real-time delivery is handled by an external
//! transport and is out of scope for this service.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use clementine_core::{ChatSender, ConversationId, MessageId, StoreId, UserId};

/// A buyer-store conversation. One per (user, store) pair.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Conversation {
    pub id: ConversationId,
    pub user_id: UserId,
    pub store_id: StoreId,
    pub created_at: DateTime<Utc>,
}

/// A persisted chat message.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ChatMessage {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender: ChatSender,
    pub body: String,
    pub created_at: DateTime<Utc>,
}
