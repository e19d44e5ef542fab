//! Chat repository: conversations and persisted messages.

use sqlx::PgPool;

use clementine_core::{ChatSender, ConversationId, StoreId, UserId};

use super::RepositoryError;
use crate::models::{ChatMessage, Conversation};

/// Repository for chat database operations.
pub struct ChatRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ChatRepository<'a> {
    /// Create a new chat repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the (user, store) conversation, creating it on first contact.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_or_create(
        &self,
        user_id: UserId,
        store_id: StoreId,
    ) -> Result<Conversation, RepositoryError> {
        let conversation = sqlx::query_as::<_, Conversation>(
            "INSERT INTO conversation (user_id, store_id)
             VALUES ($1, $2)
             ON CONFLICT (user_id, store_id) DO UPDATE SET user_id = EXCLUDED.user_id
             RETURNING id, user_id, store_id, created_at",
        )
        .bind(user_id)
        .bind(store_id)
        .fetch_one(self.pool)
        .await?;

        Ok(conversation)
    }

    /// Get a conversation by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ConversationId) -> Result<Option<Conversation>, RepositoryError> {
        let conversation = sqlx::query_as::<_, Conversation>(
            "SELECT id, user_id, store_id, created_at FROM conversation WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(conversation)
    }

    /// List a buyer's conversations, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Conversation>, RepositoryError> {
        let conversations = sqlx::query_as::<_, Conversation>(
            "SELECT id, user_id, store_id, created_at
             FROM conversation WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(conversations)
    }

    /// List a store's conversations, newest first (owner view).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_store(
        &self,
        store_id: StoreId,
    ) -> Result<Vec<Conversation>, RepositoryError> {
        let conversations = sqlx::query_as::<_, Conversation>(
            "SELECT id, user_id, store_id, created_at
             FROM conversation WHERE store_id = $1 ORDER BY created_at DESC",
        )
        .bind(store_id)
        .fetch_all(self.pool)
        .await?;

        Ok(conversations)
    }

    /// A conversation's messages, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn messages(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let messages = sqlx::query_as::<_, ChatMessage>(
            "SELECT id, conversation_id, sender, body, created_at
             FROM chat_message WHERE conversation_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(conversation_id)
        .fetch_all(self.pool)
        .await?;

        Ok(messages)
    }

    /// Append a message to a conversation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn add_message(
        &self,
        conversation_id: ConversationId,
        sender: ChatSender,
        body: &str,
    ) -> Result<ChatMessage, RepositoryError> {
        let message = sqlx::query_as::<_, ChatMessage>(
            "INSERT INTO chat_message (conversation_id, sender, body)
             VALUES ($1, $2, $3)
             RETURNING id, conversation_id, sender, body, created_at",
        )
        .bind(conversation_id)
        .bind(sender)
        .bind(body)
        .fetch_one(self.pool)
        .await?;

        Ok(message)
    }
}
