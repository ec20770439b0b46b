use std::sync::Arc;

use profile_bridge::{app, config::AppConfig, db, state::AppState, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init("profile_bridge=debug,axum=info,tower_http=info");

    let config = Arc::new(AppConfig::from_env()?);
    let (client, database) = db::connect(&config.mongodb_uri, &config.mongodb_database).await?;
    let state = AppState::init(config.clone(), &database).await?;

    let served = app::serve(app::build_app(state), &config.host, config.port).await;

    client.shutdown().await;
    tracing::info!("mongodb connection closed");
    served
}
