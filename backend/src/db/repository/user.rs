//! Staff user repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::listing::{Page, PageRequest, UserFilter};
use crate::models::{NewUser, User, UserChanges, UserId};

/// CRUD over staff accounts. Usernames and emails are unique; a duplicate
/// fails with a conflict. Lists are ordered by username.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, user: NewUser) -> RepositoryResult<User>;

    async fn get_user(&self, id: UserId) -> RepositoryResult<User>;

    async fn list_users(&self, filter: &UserFilter, page: PageRequest)
        -> RepositoryResult<Page<User>>;

    async fn update_user(&self, id: UserId, changes: UserChanges) -> RepositoryResult<User>;

    async fn delete_user(&self, id: UserId) -> RepositoryResult<()>;
}
