/*!
 * Forum API - discussion forum REST backend.
 *
 * Entry point: loads configuration from the environment and runs the HTTP
 * server until the process is stopped.
 */

use forum_api::{config::Config, server::Server, AppResult};

#[tokio::main]
async fn main() -> AppResult<()> {
    let config = Config::from_env()?;
    let server = Server::new(config);
    server.run().await
}
