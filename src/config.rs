use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FirebaseConfig {
    pub project_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub mongodb_uri: String,
    /// Used when the connection string does not name a database.
    pub mongodb_database: String,
    pub host: String,
    pub port: u16,
    pub firebase: FirebaseConfig,
    pub session: SessionConfig,
}

/// The subset of a Google service-account key file we care about.
#[derive(Debug, Deserialize)]
struct ServiceAccountKey {
    project_id: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let mongodb_uri = require_env("MONGODB_URI")?;
        let mongodb_database =
            std::env::var("MONGODB_DATABASE").unwrap_or_else(|_| "test".into());
        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".into())
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        let project_id = match std::env::var("FIREBASE_PROJECT_ID") {
            Ok(id) if !id.trim().is_empty() => id,
            _ => {
                let path = std::env::var("FIREBASE_SERVICE_ACCOUNT")
                    .unwrap_or_else(|_| "serviceAccountKey.json".into());
                project_id_from_service_account(Path::new(&path))?
            }
        };

        let session = SessionConfig {
            secret: require_env("SESSION_SECRET")?,
            issuer: std::env::var("SESSION_ISSUER").unwrap_or_else(|_| "profile-bridge".into()),
            audience: std::env::var("SESSION_AUDIENCE")
                .unwrap_or_else(|_| "profile-bridge-clients".into()),
            ttl_minutes: std::env::var("SESSION_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 7),
        };

        Ok(Self {
            mongodb_uri,
            mongodb_database,
            host,
            port,
            firebase: FirebaseConfig { project_id },
            session,
        })
    }
}

pub fn require_env(key: &str) -> anyhow::Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn project_id_from_service_account(path: &Path) -> anyhow::Result<String> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read service account key {}", path.display()))?;
    parse_project_id(&raw).with_context(|| format!("parse service account key {}", path.display()))
}

fn parse_project_id(raw: &str) -> anyhow::Result<String> {
    let key: ServiceAccountKey = serde_json::from_str(raw)?;
    anyhow::ensure!(!key.project_id.is_empty(), "project_id is empty");
    Ok(key.project_id)
}
