use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Mutex,
};

use async_trait::async_trait;
use bson::DateTime;

use super::{
    repo::{RepoError, UserRepository},
    repo_types::{NewUser, Role, User},
};

/// In-process `UserRepository` for tests. Enforces email uniqueness the same
/// way the unique index does.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
    creates: AtomicUsize,
    update_calls: AtomicUsize,
    hidden_lookups: AtomicUsize,
    unavailable: AtomicBool,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user: User) {
        self.users.lock().unwrap().push(user);
    }

    pub fn all(&self) -> Vec<User> {
        self.users.lock().unwrap().clone()
    }

    pub fn count_email(&self, email: &str) -> usize {
        self.users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.email == email)
            .count()
    }

    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    /// Number of `set_missing_role` calls, whether or not they matched anything.
    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    /// The next `find_by_email` misses even if the email is stored, as when
    /// another request inserts between the lookup and the create.
    pub fn hide_next_lookup(&self) {
        self.hidden_lookups.fetch_add(1, Ordering::SeqCst);
    }

    /// Makes every later call fail as if the store were unreachable.
    pub fn go_offline(&self) {
        self.unavailable.store(true, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), RepoError> {
        if self.unavailable.load(Ordering::SeqCst) {
            let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "store offline");
            return Err(RepoError::Store(mongodb::error::Error::from(io)));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        self.check_online()?;
        let hidden = self
            .hidden_lookups
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if hidden {
            return Ok(None);
        }
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, RepoError> {
        self.check_online()?;
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id.to_hex() == id).cloned())
    }

    async fn create(&self, new_user: NewUser) -> Result<User, RepoError> {
        self.check_online()?;
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == new_user.email) {
            return Err(RepoError::DuplicateEmail(new_user.email));
        }
        let user = new_user.into_user(DateTime::now());
        users.push(user.clone());
        self.creates.fetch_add(1, Ordering::SeqCst);
        Ok(user)
    }

    async fn count_all(&self) -> Result<u64, RepoError> {
        self.check_online()?;
        Ok(self.users.lock().unwrap().len() as u64)
    }

    async fn count_missing_role(&self) -> Result<u64, RepoError> {
        self.check_online()?;
        let users = self.users.lock().unwrap();
        Ok(users.iter().filter(|u| u.role.is_none()).count() as u64)
    }

    async fn set_missing_role(&self, role: Role) -> Result<u64, RepoError> {
        self.check_online()?;
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        let mut users = self.users.lock().unwrap();
        let now = DateTime::now();
        let mut modified = 0;
        for user in users.iter_mut().filter(|u| u.role.is_none()) {
            user.role = Some(role);
            user.updated_at = now;
            modified += 1;
        }
        Ok(modified)
    }
}
