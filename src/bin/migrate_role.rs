//! One-shot maintenance: gives every legacy user document without a `role`
//! the default `user` role. Safe to run repeatedly.

use profile_bridge::{
    config::require_env,
    db,
    telemetry,
    users::{backfill::backfill_missing_roles, MongoUserRepository},
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init("migrate_role=info,profile_bridge=info");

    let uri = require_env("MONGODB_URI")?;
    let fallback_db = std::env::var("MONGODB_DATABASE").unwrap_or_else(|_| "test".into());
    let (client, database) = db::connect(&uri, &fallback_db).await?;

    let repo = MongoUserRepository::new(&database);
    info!(
        database = database.name(),
        collection = repo.collection_name(),
        "running role backfill"
    );

    let outcome = backfill_missing_roles(&repo).await;
    drop(repo);
    client.shutdown().await;

    match outcome {
        Ok(report) => {
            info!(
                total = report.total,
                missing_before = report.missing_before,
                modified = report.modified,
                missing_after = report.missing_after,
                "role backfill finished"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "role backfill failed");
            Err(e.into())
        }
    }
}
