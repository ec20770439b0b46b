use async_trait::async_trait;
use bson::{doc, oid::ObjectId, DateTime};
use mongodb::{
    error::{ErrorKind, WriteError, WriteFailure},
    options::IndexOptions,
    Collection, Database, IndexModel,
};
use thiserror::Error;
use tracing::{debug, info};

use super::repo_types::{NewUser, Role, User};

pub const USERS_COLLECTION: &str = "users";

const DUPLICATE_KEY: i32 = 11000;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("email already exists: {0}")]
    DuplicateEmail(String),
    #[error("store error: {0}")]
    Store(#[from] mongodb::error::Error),
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, RepoError>;
    /// Inserts a new user. Fails with `DuplicateEmail` if the email is taken.
    async fn create(&self, new_user: NewUser) -> Result<User, RepoError>;
    async fn count_all(&self) -> Result<u64, RepoError>;
    async fn count_missing_role(&self) -> Result<u64, RepoError>;
    /// Sets `role` on every document that lacks it, returning the number modified.
    async fn set_missing_role(&self, role: Role) -> Result<u64, RepoError>;
}

#[derive(Clone)]
pub struct MongoUserRepository {
    users: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            users: db.collection::<User>(USERS_COLLECTION),
        }
    }

    pub fn collection_name(&self) -> &str {
        self.users.name()
    }

    /// Creates the unique `email` index the one-user-per-email invariant relies on.
    pub async fn ensure_indexes(&self) -> Result<(), RepoError> {
        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        let created = self.users.create_index(index, None).await?;
        info!(index = %created.index_name, "users index ready");
        Ok(())
    }
}

fn missing_role_filter() -> bson::Document {
    doc! { "role": { "$exists": false } }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(WriteError { code, .. })) if *code == DUPLICATE_KEY
    )
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let user = self.users.find_one(doc! { "email": email }, None).await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, RepoError> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            debug!(id, "not an object id");
            return Ok(None);
        };
        let user = self.users.find_one(doc! { "_id": oid }, None).await?;
        Ok(user)
    }

    async fn create(&self, new_user: NewUser) -> Result<User, RepoError> {
        let user = new_user.into_user(DateTime::now());
        match self.users.insert_one(&user, None).await {
            Ok(_) => Ok(user),
            Err(e) if is_duplicate_key(&e) => Err(RepoError::DuplicateEmail(user.email)),
            Err(e) => Err(e.into()),
        }
    }

    async fn count_all(&self) -> Result<u64, RepoError> {
        Ok(self.users.count_documents(doc! {}, None).await?)
    }

    async fn count_missing_role(&self) -> Result<u64, RepoError> {
        Ok(self.users.count_documents(missing_role_filter(), None).await?)
    }

    async fn set_missing_role(&self, role: Role) -> Result<u64, RepoError> {
        let update = doc! {
            "$set": { "role": role.as_str(), "updatedAt": DateTime::now() }
        };
        let result = self
            .users
            .update_many(missing_role_filter(), update, None)
            .await?;
        Ok(result.modified_count)
    }
}
