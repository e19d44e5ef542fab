//! Chat route handlers.
//!
//! Persistence only: conversations and messages as rows. A participant is
//! either the buyer who opened the conversation or an owner of the store
//! side; the sender column is derived from which one the caller is.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;

use clementine_core::{ChatSender, ConversationId, StoreId};

use crate::db::{ChatRepository, StoreRepository};
use crate::error::{AppError, Result};
use crate::middleware::{CurrentUser, RequireUser};
use crate::models::{ChatMessage, Conversation};
use crate::state::AppState;

use super::stores::require_owner;

/// Build the chat router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index).post(open))
        .route("/store/{store_id}", get(store_index))
        .route("/{id}/messages", get(messages).post(send))
}

/// Conversation open body.
#[derive(Debug, Deserialize)]
pub struct OpenConversationRequest {
    pub store_id: StoreId,
}

/// Message body.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub body: String,
}

/// Resolve which side of the conversation the caller is on.
///
/// Returns 403 if the caller is neither the buyer nor a store owner.
async fn participant_side(
    state: &AppState,
    conversation: &Conversation,
    user: CurrentUser,
) -> Result<ChatSender> {
    if conversation.user_id == user.id {
        return Ok(ChatSender::Customer);
    }

    let owns = StoreRepository::new(state.pool())
        .is_owner(conversation.store_id, user.id)
        .await?;
    if owns {
        return Ok(ChatSender::Store);
    }

    Err(AppError::Forbidden("not a participant".to_owned()))
}

/// GET /chat - The buyer's conversations.
async fn index(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Conversation>>> {
    let conversations = ChatRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    Ok(Json(conversations))
}

/// POST /chat - Open (or return) the conversation with a store.
async fn open(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Json(body): Json<OpenConversationRequest>,
) -> Result<impl IntoResponse> {
    StoreRepository::new(state.pool())
        .get(body.store_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("store {}", body.store_id)))?;

    let conversation = ChatRepository::new(state.pool())
        .get_or_create(user.id, body.store_id)
        .await?;

    Ok((StatusCode::CREATED, Json(conversation)))
}

/// GET /chat/store/{store_id} - The store's conversations (owner only).
async fn store_index(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(store_id): Path<StoreId>,
) -> Result<Json<Vec<Conversation>>> {
    require_owner(&state, store_id, user.id).await?;

    let conversations = ChatRepository::new(state.pool())
        .list_for_store(store_id)
        .await?;

    Ok(Json(conversations))
}

/// GET /chat/{id}/messages - A conversation's messages (participant only).
async fn messages(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<ConversationId>,
) -> Result<Json<Vec<ChatMessage>>> {
    let repo = ChatRepository::new(state.pool());

    let conversation = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("conversation {id}")))?;
    participant_side(&state, &conversation, user).await?;

    let messages = repo.messages(id).await?;
    Ok(Json(messages))
}

/// POST /chat/{id}/messages - Send a message (participant only).
async fn send(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<ConversationId>,
    Json(body): Json<SendMessageRequest>,
) -> Result<impl IntoResponse> {
    if body.body.trim().is_empty() {
        return Err(AppError::BadRequest("message body is required".to_owned()));
    }

    let repo = ChatRepository::new(state.pool());

    let conversation = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("conversation {id}")))?;
    let sender = participant_side(&state, &conversation, user).await?;

    let message = repo.add_message(id, sender, body.body.trim()).await?;

    Ok((StatusCode::CREATED, Json(message)))
}
