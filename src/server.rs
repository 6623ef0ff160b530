/*!
 * HTTP server module.
 *
 * Wires the components together at startup: logging, database connection
 * (with optional migrations), shared state, router, and finally the
 * listening socket.
 */

use crate::config::Config;
use crate::database::Database;
use crate::error::AppResult;
use crate::handlers::AppState;
use crate::logging;
use crate::routes::create_router;
use axum::serve;
use tokio::net::TcpListener;
use tracing::info;

pub struct Server {
    config: Config,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Runs the full startup sequence and serves until the process stops.
    /// Any failure along the way (logging, database, socket bind) aborts
    /// startup with the underlying error.
    pub async fn run(&self) -> AppResult<()> {
        logging::init_logging(&self.config.log_level, &self.config.log_file).map_err(|e| {
            crate::error::AppError::Config(format!("Failed to initialize logging: {}", e))
        })?;

        info!("Starting Forum API v{}", env!("CARGO_PKG_VERSION"));
        info!("Log level: {}", self.config.log_level);

        info!("Connecting to database: {}", self.config.database_url);
        let db = Database::new(&self.config.database_url).await?;
        info!("Database connection established");

        if self.config.auto_migrate {
            info!("Running database migrations (AUTO_MIGRATE=true)...");
            db.migrate().await?;
            info!("Database migrations completed successfully");
        } else {
            info!("Skipping database migrations (AUTO_MIGRATE=false)");
            info!("Note: Please ensure database schema is up-to-date before starting");
        }

        let state = AppState { db };
        let app = create_router(state);

        let addr = format!("{}:{}", self.config.server_host, self.config.server_port);
        let listener = TcpListener::bind(&addr).await.map_err(|e| {
            crate::error::AppError::Config(format!("Failed to bind to address {}: {}", addr, e))
        })?;

        info!("Server listening on http://{}", addr);
        info!("API surface:");
        info!("  GET    /users - List users (filter, sort, paginate)");
        info!("  POST   /users - Create user");
        info!("  GET    /users/{{id}} - Fetch user (password excluded)");
        info!("  PUT    /users/{{id}} - Replace user");
        info!("  PATCH  /users/{{id}} - Partially update user");
        info!("  DELETE /users/{{id}} - Delete user");
        info!("  GET    /themes, /themes/{{id}} - List / fetch themes");
        info!("  POST   /themes - Create theme");
        info!("  DELETE /themes/{{id}} - Delete theme");
        info!("  GET    /forums - List forums");
        info!("  POST   /forums - Create forum");
        info!("  POST   /forums/{{forumId}}/messages - Create root message in forum");
        info!("  GET    /messages - Paginated messages, newest first");
        info!("  GET    /messages/{{id}} - Fetch message");
        info!("  GET    /messages/user/{{userId}} - Messages by author");
        info!("  POST   /messages - Create message");
        info!("  DELETE /messages/{{id}} - Delete message");

        serve(listener, app)
            .await
            .map_err(|e| crate::error::AppError::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }
}
