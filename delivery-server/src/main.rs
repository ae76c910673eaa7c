use delivery_server::{Config, Server, ServerState, print_banner, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment (dotenv, logging)
    setup_environment()?;

    print_banner();

    tracing::info!("🛵 Delivery server starting...");

    // 2. Configuration
    let config = Config::from_env();

    // 3. State (database, registry, engine)
    let state = ServerState::initialize(&config).await?;

    // 4. Run HTTP + realtime gateway
    let server = Server::with_state(config, state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
