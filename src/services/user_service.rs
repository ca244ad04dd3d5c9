use crate::domain::pagination::{Page, PageRequest};
use crate::domain::user::User;
use crate::error::{AppError, Result};
use crate::services::repository::UserRepository;
use opentelemetry::{global, metrics::Counter};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone, Debug)]
struct UserMetrics {
    users_created_total: Counter<u64>,
    users_updated_total: Counter<u64>,
    users_deleted_total: Counter<u64>,
}

impl UserMetrics {
    fn new() -> Self {
        let meter = global::meter("roster-server");
        Self {
            users_created_total: meter
                .u64_counter("users_created_total")
                .with_description("Total number of users created")
                .build(),
            users_updated_total: meter
                .u64_counter("users_updated_total")
                .with_description("Total number of user updates")
                .build(),
            users_deleted_total: meter
                .u64_counter("users_deleted_total")
                .with_description("Total number of users deleted")
                .build(),
        }
    }
}

/// Business rules for the user lifecycle. Every call is one round-trip to the repository
/// (two for update and delete, which check existence first and again in the write).
#[derive(Clone, Debug)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    metrics: UserMetrics,
}

impl UserService {
    #[must_use]
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo, metrics: UserMetrics::new() }
    }

    /// # Errors
    /// Returns `AppError::NotFound` if no user has this id.
    #[tracing::instrument(skip(self), err(level = "debug"))]
    pub async fn fetch_one(&self, id: Uuid) -> Result<User> {
        self.repo.find_by_id(id).await?.ok_or_else(|| AppError::user_not_found(id))
    }

    /// # Errors
    /// Returns `AppError::Database` if the store cannot be read.
    #[tracing::instrument(skip(self), err)]
    pub async fn fetch_all(&self) -> Result<Vec<User>> {
        self.repo.find_all().await
    }

    /// # Errors
    /// Returns `AppError::Database` if the store cannot be read.
    #[tracing::instrument(skip(self), err)]
    pub async fn fetch_page(&self, request: PageRequest) -> Result<Page<User>> {
        self.repo.find_page(&request).await
    }

    /// Persists a user built by [`User::create`].
    ///
    /// # Errors
    /// Returns `AppError::Conflict` if the email is taken.
    #[tracing::instrument(skip(self, user), fields(user_id = %user.id), err(level = "warn"))]
    pub async fn create(&self, user: User) -> Result<User> {
        let created = self.repo.save(&user).await?;

        tracing::info!("User created");
        self.metrics.users_created_total.add(1, &[]);

        Ok(created)
    }

    /// # Errors
    /// Returns `AppError::NotFound` if no user has this id, or `AppError::Conflict` if the new
    /// email belongs to someone else.
    #[tracing::instrument(skip(self, name, email), err(level = "warn"))]
    pub async fn update(&self, id: Uuid, name: String, email: String) -> Result<User> {
        let existing = self.fetch_one(id).await?;

        // A concurrent delete may win between the lookup and here.
        let updated =
            self.repo.update(&existing.update(name, email)).await?.ok_or_else(|| AppError::user_not_found(id))?;

        tracing::info!("User updated");
        self.metrics.users_updated_total.add(1, &[]);

        Ok(updated)
    }

    /// # Errors
    /// Returns `AppError::NotFound` if no user has this id.
    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let existing = self.fetch_one(id).await?;

        // A concurrent delete may win between the lookup and here.
        if !self.repo.delete(existing.id).await? {
            return Err(AppError::user_not_found(id));
        }

        tracing::info!("User deleted");
        self.metrics.users_deleted_total.add(1, &[]);

        Ok(())
    }
}
