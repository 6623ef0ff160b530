/*!
 * Data access module.
 *
 * Owns the SQLite connection pool and exposes typed operations per entity:
 * - user CRUD with filtered/sorted/paginated listing
 * - theme and forum CRUD
 * - threaded message queries (by user, paginated, root creation)
 *
 * Uniqueness is enforced by the store alone: inserts and updates run as a
 * single constrained statement and the unique-index violation surfaces as
 * a conflict through `AppError::from`. Foreign keys are enforced with a
 * RESTRICT policy, so deletes of still-referenced rows fail.
 */

use crate::error::{AppError, AppResult};
use crate::models::{Forum, Message, Theme, User, UserListQuery};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use std::collections::HashMap;
use std::str::FromStr;

/// Columns of `Users` accepted by the `sortBy` query parameter. Anything
/// else is rejected before it reaches SQL.
const USER_SORT_COLUMNS: &[&str] = &[
    "id",
    "firstName",
    "lastName",
    "email",
    "createdAt",
    "updatedAt",
];

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(database_url: &str) -> AppResult<Self> {
        // case_sensitive_like: the prefix filters promise case-sensitive
        // matching, SQLite's LIKE is case-insensitive for ASCII by default
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(AppError::Database)?
            .create_if_missing(true)
            .foreign_keys(true)
            .pragma("case_sensitive_like", "true");
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        Ok(Database { pool })
    }

    pub async fn new_with_migrations(database_url: &str) -> AppResult<Self> {
        let db = Database::new(database_url).await?;
        db.migrate().await?;
        Ok(db)
    }

    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Users
    // ---------------------------------------------------------------------

    /// Inserts a user in a single constrained statement; a duplicate email
    /// comes back as `AppError::Conflict`. `password_hash` must already be
    /// hashed.
    pub async fn create_user(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password_hash: &str,
    ) -> AppResult<User> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO Users (firstName, lastName, email, password, createdAt, updatedAt)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .bind(password_hash)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(User {
            id: result.last_insert_rowid(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            password: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_user_by_id(&self, user_id: i64) -> AppResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, firstName, lastName, email, password, createdAt, updatedAt
            FROM Users
            WHERE id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| map_user(&row)))
    }

    /// Filtered, sorted, paginated user listing. Filters are case-sensitive
    /// prefix matches (`value%`).
    pub async fn list_users(&self, query: &UserListQuery) -> AppResult<Vec<User>> {
        let mut query_builder = QueryBuilder::<Sqlite>::new(
            "SELECT id, firstName, lastName, email, password, createdAt, updatedAt FROM Users WHERE 1 = 1",
        );

        if let Some(last_name) = &query.last_name {
            query_builder
                .push(" AND lastName LIKE ")
                .push_bind(format!("{}%", last_name));
        }

        if let Some(email) = &query.email {
            query_builder
                .push(" AND email LIKE ")
                .push_bind(format!("{}%", email));
        }

        if let Some(sort_by) = &query.sort_by {
            if !USER_SORT_COLUMNS.contains(&sort_by.as_str()) {
                return Err(AppError::Validation(format!(
                    "\"{}\" is not a sortable field",
                    sort_by
                )));
            }
            let direction = match query.sort_order.as_deref() {
                Some("desc") => "DESC",
                _ => "ASC",
            };
            // sort_by is whitelisted above, safe to interpolate
            query_builder.push(format!(" ORDER BY {} {}", sort_by, direction));
        }

        if query.limit.is_some() || query.offset.is_some() {
            // LIMIT -1 is SQLite for "no limit"; OFFSET needs a LIMIT clause
            query_builder
                .push(" LIMIT ")
                .push_bind(query.limit.unwrap_or(-1));
            if let Some(offset) = query.offset {
                query_builder.push(" OFFSET ").push_bind(offset);
            }
        }

        let rows = query_builder.build().fetch_all(&self.pool).await?;
        Ok(rows.iter().map(map_user).collect())
    }

    /// Message ids per user for the given set of users, used to attach
    /// message URIs to the user listing without an N+1 query.
    pub async fn message_ids_by_user(
        &self,
        user_ids: &[i64],
    ) -> AppResult<HashMap<i64, Vec<i64>>> {
        let mut ids_by_user: HashMap<i64, Vec<i64>> = HashMap::new();
        if user_ids.is_empty() {
            return Ok(ids_by_user);
        }

        let mut query_builder =
            QueryBuilder::<Sqlite>::new("SELECT id, userId FROM Messages WHERE userId IN (");
        let mut separated = query_builder.separated(", ");
        for user_id in user_ids {
            separated.push_bind(*user_id);
        }
        query_builder.push(") ORDER BY id");

        let rows = query_builder.build().fetch_all(&self.pool).await?;
        for row in rows {
            ids_by_user
                .entry(row.get("userId"))
                .or_default()
                .push(row.get("id"));
        }
        Ok(ids_by_user)
    }

    /// Applies the supplied fields to an existing user. Fields left `None`
    /// keep their stored value; `updatedAt` always moves. Changing the
    /// email to one owned by another user surfaces as a conflict.
    pub async fn update_user(
        &self,
        user_id: i64,
        first_name: Option<&str>,
        last_name: Option<&str>,
        email: Option<&str>,
        password_hash: Option<&str>,
    ) -> AppResult<bool> {
        let now = Utc::now();

        let mut query_builder = QueryBuilder::<Sqlite>::new("UPDATE Users SET updatedAt = ");
        query_builder.push_bind(now);

        if let Some(first_name) = first_name {
            query_builder.push(", firstName = ").push_bind(first_name);
        }
        if let Some(last_name) = last_name {
            query_builder.push(", lastName = ").push_bind(last_name);
        }
        if let Some(email) = email {
            query_builder.push(", email = ").push_bind(email);
        }
        if let Some(password_hash) = password_hash {
            query_builder.push(", password = ").push_bind(password_hash);
        }

        query_builder.push(" WHERE id = ").push_bind(user_id);

        let result = query_builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_user(&self, user_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM Users WHERE id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---------------------------------------------------------------------
    // Themes
    // ---------------------------------------------------------------------

    pub async fn create_theme(
        &self,
        name: Option<&str>,
        description: Option<&str>,
    ) -> AppResult<Theme> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO Themes (name, description, createdAt, updatedAt)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Theme {
            id: result.last_insert_rowid(),
            name: name.map(str::to_string),
            description: description.map(str::to_string),
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn list_themes(&self) -> AppResult<Vec<Theme>> {
        let rows = sqlx::query(
            "SELECT id, name, description, createdAt, updatedAt FROM Themes",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_theme).collect())
    }

    pub async fn get_theme_by_id(&self, theme_id: i64) -> AppResult<Option<Theme>> {
        let row = sqlx::query(
            "SELECT id, name, description, createdAt, updatedAt FROM Themes WHERE id = ?",
        )
        .bind(theme_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| map_theme(&row)))
    }

    pub async fn delete_theme(&self, theme_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM Themes WHERE id = ?")
            .bind(theme_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---------------------------------------------------------------------
    // Forums
    // ---------------------------------------------------------------------

    pub async fn create_forum(
        &self,
        title: &str,
        description: Option<&str>,
        theme_id: i64,
    ) -> AppResult<Forum> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO Forums (title, description, themeId, createdAt, updatedAt)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(theme_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Forum {
            id: result.last_insert_rowid(),
            title: title.to_string(),
            description: description.map(str::to_string),
            theme_id,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn list_forums(&self) -> AppResult<Vec<Forum>> {
        let rows = sqlx::query(
            "SELECT id, title, description, themeId, createdAt, updatedAt FROM Forums",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_forum).collect())
    }

    pub async fn get_forum_by_id(&self, forum_id: i64) -> AppResult<Option<Forum>> {
        let row = sqlx::query(
            "SELECT id, title, description, themeId, createdAt, updatedAt FROM Forums WHERE id = ?",
        )
        .bind(forum_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| map_forum(&row)))
    }

    // ---------------------------------------------------------------------
    // Messages
    // ---------------------------------------------------------------------

    /// Inserts a message. A missing user, forum or parent message trips the
    /// foreign keys and is reported as a validation error, the same class
    /// of failure as a missing field.
    pub async fn create_message(
        &self,
        subject: &str,
        body: &str,
        user_id: i64,
        forum_id: Option<i64>,
        reply_to_message_id: Option<i64>,
    ) -> AppResult<Message> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO Messages (subject, body, userId, forumId, replyToMessageId, createdAt, updatedAt)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(subject)
        .bind(body)
        .bind(user_id)
        .bind(forum_id)
        .bind(reply_to_message_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|err| match &err {
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                AppError::Validation(
                    "Referenced user, forum or parent message does not exist.".to_string(),
                )
            }
            _ => AppError::from(err),
        })?;

        Ok(Message {
            id: result.last_insert_rowid(),
            subject: subject.to_string(),
            body: body.to_string(),
            user_id,
            forum_id,
            reply_to_message_id,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_message_by_id(&self, message_id: i64) -> AppResult<Option<Message>> {
        let row = sqlx::query(
            r#"
            SELECT id, subject, body, userId, forumId, replyToMessageId, createdAt, updatedAt
            FROM Messages
            WHERE id = ?
            "#,
        )
        .bind(message_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| map_message(&row)))
    }

    pub async fn list_messages_by_user(&self, user_id: i64) -> AppResult<Vec<Message>> {
        let rows = sqlx::query(
            r#"
            SELECT id, subject, body, userId, forumId, replyToMessageId, createdAt, updatedAt
            FROM Messages
            WHERE userId = ?
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_message).collect())
    }

    pub async fn count_messages(&self) -> AppResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM Messages")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("count"))
    }

    /// One page of the global message listing, newest first. The id
    /// tie-break keeps pages deterministic when timestamps collide.
    pub async fn list_messages_page(&self, limit: i64, offset: i64) -> AppResult<Vec<Message>> {
        let rows = sqlx::query(
            r#"
            SELECT id, subject, body, userId, forumId, replyToMessageId, createdAt, updatedAt
            FROM Messages
            ORDER BY createdAt DESC, id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_message).collect())
    }

    pub async fn delete_message(&self, message_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM Messages WHERE id = ?")
            .bind(message_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn map_user(row: &sqlx::sqlite::SqliteRow) -> User {
    User {
        id: row.get("id"),
        first_name: row.get("firstName"),
        last_name: row.get("lastName"),
        email: row.get("email"),
        password: row.get("password"),
        created_at: row.get::<DateTime<Utc>, _>("createdAt"),
        updated_at: row.get::<DateTime<Utc>, _>("updatedAt"),
    }
}

fn map_theme(row: &sqlx::sqlite::SqliteRow) -> Theme {
    Theme {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        created_at: row.get::<DateTime<Utc>, _>("createdAt"),
        updated_at: row.get::<DateTime<Utc>, _>("updatedAt"),
    }
}

fn map_forum(row: &sqlx::sqlite::SqliteRow) -> Forum {
    Forum {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        theme_id: row.get("themeId"),
        created_at: row.get::<DateTime<Utc>, _>("createdAt"),
        updated_at: row.get::<DateTime<Utc>, _>("updatedAt"),
    }
}

fn map_message(row: &sqlx::sqlite::SqliteRow) -> Message {
    Message {
        id: row.get("id"),
        subject: row.get("subject"),
        body: row.get("body"),
        user_id: row.get("userId"),
        forum_id: row.get("forumId"),
        reply_to_message_id: row.get("replyToMessageId"),
        created_at: row.get::<DateTime<Utc>, _>("createdAt"),
        updated_at: row.get::<DateTime<Utc>, _>("updatedAt"),
    }
}
