use serde::Serialize;
use tracing::info;

use super::{
    repo::{RepoError, UserRepository},
    repo_types::Role,
};

/// Counts observed by one backfill run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    pub total: u64,
    pub missing_before: u64,
    pub modified: u64,
    pub missing_after: u64,
}

/// Gives every user document without a `role` the default `user` role.
/// Issues no write when nothing is missing, so repeated runs are no-ops.
pub async fn backfill_missing_roles(repo: &dyn UserRepository) -> Result<BackfillReport, RepoError> {
    let total = repo.count_all().await?;
    let missing_before = repo.count_missing_role().await?;
    info!(total, missing = missing_before, "users scanned");

    if missing_before == 0 {
        info!("every user already has a role, nothing to do");
        return Ok(BackfillReport {
            total,
            missing_before,
            modified: 0,
            missing_after: 0,
        });
    }

    let modified = repo.set_missing_role(Role::User).await?;
    let missing_after = repo.count_missing_role().await?;
    info!(modified, missing_after, "role backfill applied");

    Ok(BackfillReport {
        total,
        missing_before,
        modified,
        missing_after,
    })
}
