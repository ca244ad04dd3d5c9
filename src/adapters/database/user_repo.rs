use crate::adapters::database::DbPool;
use crate::adapters::database::records::UserRecord;
use crate::domain::pagination::{Page, PageRequest, SortField};
use crate::domain::user::User;
use crate::error::{AppError, Result};
use crate::services::repository::UserRepository;
use async_trait::async_trait;
use uuid::Uuid;

const UNIQUE_VIOLATION: &str = "23505";
const EMAIL_CONSTRAINT: &str = "users_email_key";

fn map_write_error(err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::Database(e) if e.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            if e.constraint() == Some(EMAIL_CONSTRAINT) {
                AppError::Conflict("Email is already in use".into())
            } else {
                AppError::Conflict("User already exists".into())
            }
        }
        e => AppError::Database(e),
    }
}

#[derive(Clone, Debug)]
pub struct PgUserRepository {
    pool: DbPool,
}

impl PgUserRepository {
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[tracing::instrument(level = "debug", skip(self, user), fields(user.id = %user.id))]
    async fn save(&self, user: &User) -> Result<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (id, name, email, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, created_at, updated_at
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(record.into())
    }

    #[tracing::instrument(level = "debug", skip(self, user), fields(user.id = %user.id))]
    async fn update(&self, user: &User) -> Result<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            UPDATE users
            SET name = $2, email = $3, updated_at = $4
            WHERE id = $1
            RETURNING id, name, email, created_at, updated_at
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(record.map(Into::into))
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, name, email, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(Into::into))
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn find_all(&self) -> Result<Vec<User>> {
        let records = sqlx::query_as::<_, UserRecord>(
            "SELECT id, name, email, created_at, updated_at FROM users ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(Into::into).collect())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn find_page(&self, request: &PageRequest) -> Result<Page<User>> {
        // Sort columns come from a closed enum, never from the request text.
        let order_by = match request.sort() {
            Some(sort) if sort.field == SortField::Id => format!("id {}", sort.direction.as_sql()),
            Some(sort) => format!("{} {}, id ASC", sort.field.column(), sort.direction.as_sql()),
            None => "created_at ASC, id ASC".to_string(),
        };
        let limit = i64::from(request.size());
        let offset = i64::try_from(request.offset()).map_err(|_| AppError::BadRequest("Page is out of range".into()))?;

        let mut tx = self.pool.begin().await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users").fetch_one(&mut *tx).await?;

        let sql =
            format!("SELECT id, name, email, created_at, updated_at FROM users ORDER BY {order_by} LIMIT $1 OFFSET $2");
        let records =
            sqlx::query_as::<_, UserRecord>(&sql).bind(limit).bind(offset).fetch_all(&mut *tx).await?;

        tx.commit().await?;

        let content = records.into_iter().map(Into::into).collect();
        Ok(Page::new(content, request, u64::try_from(total).unwrap_or_default()))
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
