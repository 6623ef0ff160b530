use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default page size for the paginated message listing.
pub const DEFAULT_PAGE_LIMIT: i64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Bcrypt hash, never serialized into a response.
    #[serde(skip_serializing)]
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User projection returned by the API. The password column never leaves
/// the data layer through this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Hypermedia-style reference to a message, as embedded in the user listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageUri {
    pub uri: String,
}

impl MessageUri {
    pub fn for_message(message_id: i64) -> Self {
        MessageUri {
            uri: format!("/messages/{}", message_id),
        }
    }
}

/// Entry of `GET /users`: the projection plus the URIs of the user's
/// messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWithMessages {
    #[serde(flatten)]
    pub user: UserResponse,
    pub messages: Vec<MessageUri>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub id: i64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Forum {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub theme_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i64,
    pub subject: String,
    pub body: String,
    pub user_id: i64,
    pub forum_id: Option<i64>,
    /// Parent message of a reply; `None` marks a root message. The schema
    /// guarantees the parent exists, cycle freedom is by convention.
    pub reply_to_message_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------

/// Write payload for users. Fields are optional so that the validation
/// component, not body deserialization, decides what "missing" means:
/// POST and PUT validate the full schema, PATCH only the supplied fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateThemeRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateForumRequest {
    pub title: String,
    pub description: Option<String>,
    pub theme_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageRequest {
    pub subject: Option<String>,
    pub body: Option<String>,
    pub user_id: Option<i64>,
    pub forum_id: Option<i64>,
    pub reply_to_message_id: Option<i64>,
}

/// Body of `POST /forums/{forumId}/messages`. The forum comes from the
/// path and the created message is always a root one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateForumMessageRequest {
    pub subject: Option<String>,
    pub body: Option<String>,
    pub user_id: Option<i64>,
}

// ---------------------------------------------------------------------
// Query strings
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListQuery {
    /// Prefix filter on lastName (`value%`, case sensitive).
    pub last_name: Option<String>,
    /// Prefix filter on email (`value%`, case sensitive).
    pub email: Option<String>,
    pub sort_by: Option<String>,
    /// `asc` (default) or `desc`.
    pub sort_order: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    /// Stride pagination: page defaults to 0, limit to 10, offset is
    /// `page * limit`. Not cursor based, so ordering under concurrent
    /// inserts is only as stable as the underlying sort.
    pub fn pagination(&self) -> (i64, i64) {
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_LIMIT).max(1);
        // saturate rather than overflow on absurd page numbers; the stride
        // lands past the end of the table and the listing reports 404
        let offset = self.page.unwrap_or(0).max(0).saturating_mul(limit);
        (limit, offset)
    }

    pub fn current_page(&self) -> i64 {
        self.page.unwrap_or(0).max(0)
    }
}

// ---------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePage {
    pub total_items: i64,
    pub messages: Vec<Message>,
    pub total_pages: i64,
    pub current_page: i64,
}

impl MessagePage {
    pub fn new(total_items: i64, messages: Vec<Message>, current_page: i64, limit: i64) -> Self {
        // ceil(totalItems / limit) without floats
        let total_pages = (total_items + limit - 1) / limit;
        MessagePage {
            total_items,
            messages,
            total_pages,
            current_page,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
}
