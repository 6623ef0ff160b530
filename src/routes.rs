use crate::handlers::{
    create_forum, create_forum_message, create_message, create_theme, create_user, delete_message,
    delete_theme, delete_user, get_message, get_theme, get_user, list_forums, list_messages,
    list_messages_by_user, list_themes, list_users, replace_user, update_user, AppState,
};
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .allow_origin(Any);

    Router::new()
        // User routes
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user)
                .put(replace_user)
                .patch(update_user)
                .delete(delete_user),
        )
        // Theme routes
        .route("/themes", get(list_themes).post(create_theme))
        .route("/themes/:id", get(get_theme).delete(delete_theme))
        // Forum routes
        .route("/forums", get(list_forums).post(create_forum))
        .route("/forums/:forum_id/messages", post(create_forum_message))
        // Message routes
        .route("/messages", get(list_messages).post(create_message))
        .route("/messages/user/:user_id", get(list_messages_by_user))
        .route("/messages/:id", get(get_message).delete(delete_message))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
