use crate::domain::pagination::{Page, PageRequest};
use crate::domain::user::User;
use crate::error::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Persistence port for users.
///
/// Implementations own email uniqueness: saving a user whose email belongs to
/// another user fails with `AppError::Conflict`.
#[async_trait]
pub trait UserRepository: Send + Sync + std::fmt::Debug {
    /// Inserts a new user.
    async fn save(&self, user: &User) -> Result<User>;

    /// Overwrites name, email and `updated_at` of an existing row in one step.
    ///
    /// Returns `None` when no row has this id; a missing user is never recreated.
    async fn update(&self, user: &User) -> Result<Option<User>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    async fn find_all(&self) -> Result<Vec<User>>;

    async fn find_page(&self, request: &PageRequest) -> Result<Page<User>>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Round-trips to the backing store.
    async fn ping(&self) -> Result<()>;
}
