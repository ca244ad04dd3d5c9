use time::{Duration, OffsetDateTime};
use uuid::Uuid;

/// An account holder.
///
/// `id` and `created_at` are fixed by [`User::create`]; only [`User::update`]
/// mutates the record afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl User {
    #[must_use]
    pub fn create(name: String, email: String) -> Self {
        let now = now_utc_micros();
        Self { id: Uuid::new_v4(), name, email, created_at: now, updated_at: now }
    }

    /// Replaces name and email and moves `updated_at` strictly forward.
    #[must_use]
    pub fn update(self, name: String, email: String) -> Self {
        let now = now_utc_micros();
        let updated_at = if now > self.updated_at { now } else { self.updated_at + Duration::microseconds(1) };
        Self { name, email, updated_at, ..self }
    }
}

/// Current UTC time truncated to the microsecond, the precision of `TIMESTAMPTZ`.
#[must_use]
pub fn now_utc_micros() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now - Duration::nanoseconds(i64::from(now.nanosecond() % 1_000))
}
