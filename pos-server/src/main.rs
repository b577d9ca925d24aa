use pos_server::{Config, Server, ServerState, print_banner, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. .env, then configuration
    let _ = dotenvy::dotenv();
    let config = Config::from_env()?;

    // 2. Logging (guard kept alive for the process lifetime)
    let _log_guard = setup_environment(&config);

    print_banner();
    tracing::info!(environment = %config.environment, "POS server starting...");

    // 3. State: database, migrations, optional demo data, mailer
    let state = ServerState::initialize(&config).await?;

    // 4. HTTP server (starts background tasks)
    let server = Server::with_state(config, state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
