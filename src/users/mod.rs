pub mod backfill;
#[cfg(test)]
pub(crate) mod memory;
pub mod repo;
pub mod repo_types;

pub use repo::{MongoUserRepository, RepoError, UserRepository};
pub use repo_types::{NewUser, Role, User};
