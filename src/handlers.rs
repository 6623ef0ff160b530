use crate::auth::hash_password;
use crate::database::Database;
use crate::error::{AppError, AppResult};
use crate::models::{
    CreateForumMessageRequest, CreateForumRequest, CreateMessageRequest, CreateThemeRequest,
    DeleteResponse, Forum, Message, MessagePage, MessageUri, PageQuery, Theme, UserListQuery,
    UserPayload, UserResponse, UserWithMessages,
};
use crate::validation::{require_message_fields, validate_user_payload, ValidationMode};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
}

// ---------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------

pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> AppResult<Json<Vec<UserWithMessages>>> {
    let users = state.db.list_users(&query).await?;

    let user_ids: Vec<i64> = users.iter().map(|user| user.id).collect();
    let mut message_ids = state.db.message_ids_by_user(&user_ids).await?;

    let response = users
        .into_iter()
        .map(|user| {
            let messages = message_ids
                .remove(&user.id)
                .unwrap_or_default()
                .into_iter()
                .map(MessageUri::for_message)
                .collect();
            UserWithMessages {
                user: user.into(),
                messages,
            }
        })
        .collect();

    Ok(Json(response))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<UserResponse>> {
    let user = state
        .db
        .get_user_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;

    Ok(Json(user.into()))
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<UserPayload>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    validate_user_payload(&payload, ValidationMode::Full)?;

    // Full-mode validation guarantees every field is present
    let password_hash = hash_password(payload.password.as_deref().unwrap_or_default())?;
    let user = state
        .db
        .create_user(
            payload.first_name.as_deref().unwrap_or_default(),
            payload.last_name.as_deref().unwrap_or_default(),
            payload.email.as_deref().unwrap_or_default(),
            &password_hash,
        )
        .await?;

    info!("User created: {} <{}>", user.id, user.email);

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// PUT: validates the complete schema, then replaces every field.
pub async fn replace_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(payload): Json<UserPayload>,
) -> AppResult<Json<UserResponse>> {
    apply_user_update(&state, user_id, payload, ValidationMode::Full).await
}

/// PATCH: validates and applies only the supplied fields.
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(payload): Json<UserPayload>,
) -> AppResult<Json<UserResponse>> {
    apply_user_update(&state, user_id, payload, ValidationMode::Partial).await
}

async fn apply_user_update(
    state: &AppState,
    user_id: i64,
    payload: UserPayload,
    mode: ValidationMode,
) -> AppResult<Json<UserResponse>> {
    validate_user_payload(&payload, mode)?;

    if state.db.get_user_by_id(user_id).await?.is_none() {
        return Err(AppError::NotFound("User not found.".to_string()));
    }

    let password_hash = match payload.password.as_deref() {
        Some(password) => Some(hash_password(password)?),
        None => None,
    };

    state
        .db
        .update_user(
            user_id,
            payload.first_name.as_deref(),
            payload.last_name.as_deref(),
            payload.email.as_deref(),
            password_hash.as_deref(),
        )
        .await?;

    let user = state
        .db
        .get_user_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;

    info!("User updated: {}", user_id);

    Ok(Json(user.into()))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<&'static str> {
    if !state.db.delete_user(user_id).await? {
        return Err(AppError::NotFound("User not found.".to_string()));
    }

    info!("User deleted: {}", user_id);

    Ok("User deleted")
}

// ---------------------------------------------------------------------
// Themes
// ---------------------------------------------------------------------

pub async fn list_themes(State(state): State<AppState>) -> AppResult<Json<Vec<Theme>>> {
    Ok(Json(state.db.list_themes().await?))
}

pub async fn get_theme(
    State(state): State<AppState>,
    Path(theme_id): Path<i64>,
) -> AppResult<Json<Theme>> {
    let theme = state
        .db
        .get_theme_by_id(theme_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Theme not found.".to_string()))?;

    Ok(Json(theme))
}

pub async fn create_theme(
    State(state): State<AppState>,
    Json(request): Json<CreateThemeRequest>,
) -> AppResult<Json<Theme>> {
    let theme = state
        .db
        .create_theme(request.name.as_deref(), request.description.as_deref())
        .await?;

    info!("Theme created: {}", theme.id);

    Ok(Json(theme))
}

pub async fn delete_theme(
    State(state): State<AppState>,
    Path(theme_id): Path<i64>,
) -> AppResult<Json<DeleteResponse>> {
    if !state.db.delete_theme(theme_id).await? {
        return Err(AppError::NotFound("Theme not found.".to_string()));
    }

    info!("Theme deleted: {}", theme_id);

    Ok(Json(DeleteResponse {
        message: "Theme deleted.".to_string(),
    }))
}

// ---------------------------------------------------------------------
// Forums
// ---------------------------------------------------------------------

pub async fn list_forums(State(state): State<AppState>) -> AppResult<Json<Vec<Forum>>> {
    Ok(Json(state.db.list_forums().await?))
}

pub async fn create_forum(
    State(state): State<AppState>,
    Json(request): Json<CreateForumRequest>,
) -> AppResult<Json<Forum>> {
    let forum = state
        .db
        .create_forum(
            &request.title,
            request.description.as_deref(),
            request.theme_id,
        )
        .await?;

    info!("Forum created: {} in theme {}", forum.id, forum.theme_id);

    Ok(Json(forum))
}

/// Creates a root message in a forum. Field validation runs before the
/// forum lookup, so a malformed payload is a 400 even when the forum does
/// not exist.
pub async fn create_forum_message(
    State(state): State<AppState>,
    Path(forum_id): Path<i64>,
    Json(request): Json<CreateForumMessageRequest>,
) -> AppResult<(StatusCode, Json<Message>)> {
    let (subject, body, user_id) = require_message_fields(
        request.subject.as_deref(),
        request.body.as_deref(),
        request.user_id,
    )?;

    if state.db.get_forum_by_id(forum_id).await?.is_none() {
        return Err(AppError::NotFound("Forum not found.".to_string()));
    }

    let message = state
        .db
        .create_message(subject, body, user_id, Some(forum_id), None)
        .await?;

    info!("Root message {} created in forum {}", message.id, forum_id);

    Ok((StatusCode::CREATED, Json(message)))
}

// ---------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------

pub async fn list_messages(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<MessagePage>> {
    let (limit, offset) = query.pagination();

    let total_items = state.db.count_messages().await?;
    let messages = state.db.list_messages_page(limit, offset).await?;

    // Empty page is reported as a 404, matching the established surface.
    if messages.is_empty() {
        return Err(AppError::NotFound("No messages found.".to_string()));
    }

    Ok(Json(MessagePage::new(
        total_items,
        messages,
        query.current_page(),
        limit,
    )))
}

pub async fn get_message(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
) -> AppResult<Json<Message>> {
    let message = state
        .db
        .get_message_by_id(message_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Message not found.".to_string()))?;

    Ok(Json(message))
}

pub async fn list_messages_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<Vec<Message>>> {
    let messages = state.db.list_messages_by_user(user_id).await?;

    // Zero matches is reported as a 404, matching the established surface.
    if messages.is_empty() {
        return Err(AppError::NotFound(
            "No messages found for this user.".to_string(),
        ));
    }

    Ok(Json(messages))
}

pub async fn create_message(
    State(state): State<AppState>,
    Json(request): Json<CreateMessageRequest>,
) -> AppResult<(StatusCode, Json<Message>)> {
    let (subject, body, user_id) = require_message_fields(
        request.subject.as_deref(),
        request.body.as_deref(),
        request.user_id,
    )?;

    let message = state
        .db
        .create_message(
            subject,
            body,
            user_id,
            request.forum_id,
            request.reply_to_message_id,
        )
        .await?;

    info!("Message created: {}", message.id);

    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn delete_message(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
) -> AppResult<Json<DeleteResponse>> {
    if !state.db.delete_message(message_id).await? {
        return Err(AppError::NotFound("Message not found.".to_string()));
    }

    info!("Message deleted: {}", message_id);

    Ok(Json(DeleteResponse {
        message: "Message deleted.".to_string(),
    }))
}
