use std::sync::Arc;

use mongodb::Database;

use crate::config::AppConfig;
use crate::firebase::{FirebaseVerifier, GoogleKeyProvider, TokenVerifier};
use crate::users::{MongoUserRepository, UserRepository};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepository>,
    pub verifier: Arc<dyn TokenVerifier>,
}

impl AppState {
    /// Wires the Mongo-backed repository and the Firebase verifier. The
    /// connection itself is owned by the caller so it can be closed on shutdown.
    pub async fn init(config: Arc<AppConfig>, db: &Database) -> anyhow::Result<Self> {
        let users = MongoUserRepository::new(db);
        users.ensure_indexes().await?;

        let keys = Arc::new(GoogleKeyProvider::new(reqwest::Client::new()));
        let verifier = FirebaseVerifier::new(&config.firebase.project_id, keys);

        Ok(Self::from_parts(config, Arc::new(users), Arc::new(verifier)))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserRepository>,
        verifier: Arc<dyn TokenVerifier>,
    ) -> Self {
        Self {
            config,
            users,
            verifier,
        }
    }
}
