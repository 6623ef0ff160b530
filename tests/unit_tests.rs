use forum_api::{
    auth::hash_password,
    database::Database,
    error::AppError,
    models::{MessagePage, PageQuery, UserListQuery, UserPayload},
    validation::{require_message_fields, validate_user_payload, ValidationMode},
};
use tempfile::NamedTempFile;

async fn create_test_db() -> (Database, NamedTempFile) {
    let db_file = NamedTempFile::new().unwrap();
    let database_url = format!("sqlite:{}", db_file.path().display());
    let db = Database::new_with_migrations(&database_url).await.unwrap();
    (db, db_file)
}

#[tokio::test]
async fn test_user_crud_flow() {
    let (db, _guard) = create_test_db().await;

    let hash = hash_password("abc123").unwrap();
    let user = db
        .create_user("Jean", "Dupont", "jean@x.com", &hash)
        .await
        .unwrap();
    assert_eq!(user.first_name, "Jean");
    assert_ne!(user.password, "abc123");

    let stored = db.get_user_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(stored.email, "jean@x.com");
    assert!(bcrypt::verify("abc123", &stored.password).unwrap());

    let updated = db
        .update_user(user.id, None, Some("Durand"), None, None)
        .await
        .unwrap();
    assert!(updated);
    let stored = db.get_user_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(stored.last_name, "Durand");
    // Untouched fields keep their values
    assert_eq!(stored.first_name, "Jean");
    assert!(stored.updated_at >= stored.created_at);

    assert!(db.delete_user(user.id).await.unwrap());
    assert!(db.get_user_by_id(user.id).await.unwrap().is_none());
    assert!(!db.delete_user(user.id).await.unwrap());
}

#[tokio::test]
async fn test_duplicate_email_is_conflict_and_inserts_nothing() {
    let (db, _guard) = create_test_db().await;

    let hash = hash_password("abc123").unwrap();
    db.create_user("Jean", "Dupont", "jean@x.com", &hash)
        .await
        .unwrap();

    let err = db
        .create_user("Marie", "Durand", "jean@x.com", &hash)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let users = db.list_users(&UserListQuery::default()).await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].first_name, "Jean");
}

#[tokio::test]
async fn test_update_to_taken_email_is_conflict() {
    let (db, _guard) = create_test_db().await;

    let hash = hash_password("abc123").unwrap();
    db.create_user("Jean", "Dupont", "jean@x.com", &hash)
        .await
        .unwrap();
    let marie = db
        .create_user("Marie", "Durand", "marie@x.com", &hash)
        .await
        .unwrap();

    let err = db
        .update_user(marie.id, None, None, Some("jean@x.com"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let stored = db.get_user_by_id(marie.id).await.unwrap().unwrap();
    assert_eq!(stored.email, "marie@x.com");
}

#[tokio::test]
async fn test_list_users_filter_sort_page() {
    let (db, _guard) = create_test_db().await;

    let hash = hash_password("abc123").unwrap();
    for (first, last, email) in [
        ("Jean", "Dupont", "jean@x.com"),
        ("Marie", "Dupuis", "marie@x.com"),
        ("Pierre", "Martin", "pierre@y.com"),
    ] {
        db.create_user(first, last, email, &hash).await.unwrap();
    }

    // Prefix filter, right-truncated LIKE
    let query = UserListQuery {
        last_name: Some("Dup".to_string()),
        ..Default::default()
    };
    let users = db.list_users(&query).await.unwrap();
    assert_eq!(users.len(), 2);

    // Filter is a prefix match, not a substring match
    let query = UserListQuery {
        last_name: Some("upont".to_string()),
        ..Default::default()
    };
    assert!(db.list_users(&query).await.unwrap().is_empty());

    // Filter is case sensitive: a lowercase prefix matches nothing
    let query = UserListQuery {
        last_name: Some("dup".to_string()),
        ..Default::default()
    };
    assert!(db.list_users(&query).await.unwrap().is_empty());
    let query = UserListQuery {
        email: Some("JEAN".to_string()),
        ..Default::default()
    };
    assert!(db.list_users(&query).await.unwrap().is_empty());

    // Sort descending by lastName
    let query = UserListQuery {
        sort_by: Some("lastName".to_string()),
        sort_order: Some("desc".to_string()),
        ..Default::default()
    };
    let users = db.list_users(&query).await.unwrap();
    let names: Vec<&str> = users.iter().map(|u| u.last_name.as_str()).collect();
    assert_eq!(names, vec!["Martin", "Dupuis", "Dupont"]);

    // Limit + offset
    let query = UserListQuery {
        sort_by: Some("lastName".to_string()),
        limit: Some(1),
        offset: Some(1),
        ..Default::default()
    };
    let users = db.list_users(&query).await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].last_name, "Dupuis");

    // Offset applies on its own, without a limit
    let query = UserListQuery {
        sort_by: Some("lastName".to_string()),
        offset: Some(1),
        ..Default::default()
    };
    let users = db.list_users(&query).await.unwrap();
    let names: Vec<&str> = users.iter().map(|u| u.last_name.as_str()).collect();
    assert_eq!(names, vec!["Dupuis", "Martin"]);

    // Unknown sort column is rejected before reaching SQL
    let query = UserListQuery {
        sort_by: Some("password; DROP TABLE Users".to_string()),
        ..Default::default()
    };
    assert!(matches!(
        db.list_users(&query).await.unwrap_err(),
        AppError::Validation(_)
    ));
}

#[tokio::test]
async fn test_theme_and_forum_crud() {
    let (db, _guard) = create_test_db().await;

    let theme = db
        .create_theme(Some("General"), Some("General discussion"))
        .await
        .unwrap();
    assert_eq!(db.list_themes().await.unwrap().len(), 1);
    assert!(db.get_theme_by_id(theme.id).await.unwrap().is_some());
    assert!(db.get_theme_by_id(theme.id + 1).await.unwrap().is_none());

    let forum = db
        .create_forum("Open floor", None, theme.id)
        .await
        .unwrap();
    assert_eq!(forum.theme_id, theme.id);
    assert_eq!(db.list_forums().await.unwrap().len(), 1);

    // RESTRICT policy: a theme with forums cannot be deleted
    let err = db.delete_theme(theme.id).await.unwrap_err();
    assert!(matches!(err, AppError::Database(_)));
    assert!(db.get_theme_by_id(theme.id).await.unwrap().is_some());

    // An unreferenced theme deletes fine
    let empty = db.create_theme(Some("Empty"), None).await.unwrap();
    assert!(db.delete_theme(empty.id).await.unwrap());
    assert!(!db.delete_theme(empty.id).await.unwrap());
}

#[tokio::test]
async fn test_message_references_are_validated() {
    let (db, _guard) = create_test_db().await;

    // No such user
    let err = db
        .create_message("hello", "world", 42, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let hash = hash_password("abc123").unwrap();
    let user = db
        .create_user("Jean", "Dupont", "jean@x.com", &hash)
        .await
        .unwrap();

    // No such parent message
    let err = db
        .create_message("hello", "world", user.id, None, Some(999))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let root = db
        .create_message("hello", "world", user.id, None, None)
        .await
        .unwrap();
    assert!(root.reply_to_message_id.is_none());

    let reply = db
        .create_message("re: hello", "indeed", user.id, None, Some(root.id))
        .await
        .unwrap();
    assert_eq!(reply.reply_to_message_id, Some(root.id));
}

#[tokio::test]
async fn test_message_pagination_and_user_listing() {
    let (db, _guard) = create_test_db().await;

    let hash = hash_password("abc123").unwrap();
    let user = db
        .create_user("Jean", "Dupont", "jean@x.com", &hash)
        .await
        .unwrap();
    let other = db
        .create_user("Marie", "Durand", "marie@x.com", &hash)
        .await
        .unwrap();

    for i in 0..12 {
        db.create_message(&format!("subject {}", i), "body", user.id, None, None)
            .await
            .unwrap();
    }

    assert_eq!(db.count_messages().await.unwrap(), 12);

    let page = db.list_messages_page(5, 5).await.unwrap();
    assert_eq!(page.len(), 5);
    // Newest first: the second page holds older messages than the first
    let first_page = db.list_messages_page(5, 0).await.unwrap();
    assert!(first_page[0].created_at >= page[0].created_at);
    assert!(first_page.iter().all(|m| m.id > page[0].id));

    let last_page = db.list_messages_page(5, 10).await.unwrap();
    assert_eq!(last_page.len(), 2);
    assert!(db.list_messages_page(5, 15).await.unwrap().is_empty());

    let mine = db.list_messages_by_user(user.id).await.unwrap();
    assert_eq!(mine.len(), 12);
    assert!(db.list_messages_by_user(other.id).await.unwrap().is_empty());

    let ids_by_user = db
        .message_ids_by_user(&[user.id, other.id])
        .await
        .unwrap();
    assert_eq!(ids_by_user.get(&user.id).map(Vec::len), Some(12));
    assert!(!ids_by_user.contains_key(&other.id));
}

#[test]
fn test_pagination_arithmetic() {
    let query = PageQuery {
        page: None,
        limit: None,
    };
    assert_eq!(query.pagination(), (10, 0));
    assert_eq!(query.current_page(), 0);

    let query = PageQuery {
        page: Some(2),
        limit: Some(5),
    };
    assert_eq!(query.pagination(), (5, 10));

    // An absurd page number saturates instead of overflowing
    let query = PageQuery {
        page: Some(i64::MAX),
        limit: Some(10),
    };
    assert_eq!(query.pagination(), (10, i64::MAX));

    let query = PageQuery {
        page: Some(-3),
        limit: Some(5),
    };
    assert_eq!(query.pagination(), (5, 0));

    let page = MessagePage::new(12, Vec::new(), 1, 5);
    assert_eq!(page.total_pages, 3);
    let page = MessagePage::new(10, Vec::new(), 0, 5);
    assert_eq!(page.total_pages, 2);
    let page = MessagePage::new(0, Vec::new(), 0, 5);
    assert_eq!(page.total_pages, 0);
}

#[test]
fn test_user_payload_validation_modes() {
    let valid = UserPayload {
        first_name: Some("Jean".to_string()),
        last_name: Some("Dupont".to_string()),
        email: Some("jean@x.com".to_string()),
        password: Some("abc123".to_string()),
    };
    assert!(validate_user_payload(&valid, ValidationMode::Full).is_ok());

    // Full mode: every field required, first violation reported
    let empty = UserPayload::default();
    let err = validate_user_payload(&empty, ValidationMode::Full).unwrap_err();
    assert_eq!(err.to_string(), "\"firstName\" is required");

    // Partial mode: absent fields are fine, present ones are checked
    let partial = UserPayload {
        last_name: Some("Dupont".to_string()),
        ..Default::default()
    };
    assert!(validate_user_payload(&partial, ValidationMode::Partial).is_ok());

    let bad_email = UserPayload {
        email: Some("not-an-email".to_string()),
        ..Default::default()
    };
    let err = validate_user_payload(&bad_email, ValidationMode::Partial).unwrap_err();
    assert_eq!(err.to_string(), "\"email\" must be a valid email");

    let short_name = UserPayload {
        first_name: Some("Jo".to_string()),
        ..Default::default()
    };
    let err = validate_user_payload(&short_name, ValidationMode::Partial).unwrap_err();
    assert!(err.to_string().contains("at least 3 characters"));

    let symbols = UserPayload {
        first_name: Some("Jean-Luc".to_string()),
        ..Default::default()
    };
    let err = validate_user_payload(&symbols, ValidationMode::Partial).unwrap_err();
    assert!(err.to_string().contains("alphanumeric"));

    let bad_password = UserPayload {
        password: Some("with spaces!".to_string()),
        ..Default::default()
    };
    assert!(validate_user_payload(&bad_password, ValidationMode::Partial).is_err());
}

#[test]
fn test_message_field_requirements() {
    let ok = require_message_fields(Some("subject"), Some("body"), Some(1));
    assert_eq!(ok.unwrap(), ("subject", "body", 1));

    let err = require_message_fields(None, Some("body"), Some(1)).unwrap_err();
    assert_eq!(err.to_string(), "\"subject\" is required");

    let err = require_message_fields(Some("subject"), Some("  "), Some(1)).unwrap_err();
    assert_eq!(err.to_string(), "\"body\" is required");

    let err = require_message_fields(Some("subject"), Some("body"), None).unwrap_err();
    assert_eq!(err.to_string(), "\"userId\" is required");
}
