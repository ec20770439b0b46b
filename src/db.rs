use anyhow::Context;
use bson::doc;
use mongodb::{Client, Database};
use tracing::info;

/// Connects to MongoDB and confirms the server answers before anything is
/// served. The database named in the URI wins over `fallback_db`.
pub async fn connect(uri: &str, fallback_db: &str) -> anyhow::Result<(Client, Database)> {
    let client = Client::with_uri_str(uri)
        .await
        .context("parse mongodb connection string")?;
    let db = client
        .default_database()
        .unwrap_or_else(|| client.database(fallback_db));

    db.run_command(doc! { "ping": 1 }, None)
        .await
        .context("ping mongodb")?;

    info!(database = db.name(), "mongodb connected");
    Ok((client, db))
}
