use crate::domain::user::User;
use crate::error::{AppError, FieldErrors, Result};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

type Rule = (fn(&str) -> bool, &'static str);

const NAME_RULES: &[Rule] = &[(is_not_blank, "Name must not be blank")];

const EMAIL_RULES: &[Rule] = &[(is_not_blank, "Email must not be blank"), (is_valid_email, "Invalid email format")];

/// Body of create and update requests. Absent fields read as empty so they
/// surface as field errors instead of decode failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl UserRequest {
    /// Checks every field against its rules; the first failing rule of a field is reported.
    ///
    /// # Errors
    /// Returns `AppError::Validation` mapping each invalid field to its message.
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        for (field, value, rules) in [("name", self.name.as_str(), NAME_RULES), ("email", self.email.as_str(), EMAIL_RULES)] {
            if let Some((_, message)) = rules.iter().find(|(check, _)| !check(value)) {
                errors.insert(field.to_string(), (*message).to_string());
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(AppError::Validation(errors)) }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

fn is_not_blank(value: &str) -> bool {
    !value.trim().is_empty()
}

fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.rsplit_once('@') else {
        return false;
    };
    is_valid_local_part(local) && is_valid_domain(domain)
}

fn is_valid_local_part(local: &str) -> bool {
    const SPECIALS: &str = "!#$%&'*+/=?^_`{|}~-";

    !local.is_empty()
        && local.len() <= 64
        && !local.starts_with('.')
        && !local.ends_with('.')
        && !local.contains("..")
        && local.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || SPECIALS.contains(c))
}

fn is_valid_domain(domain: &str) -> bool {
    !domain.is_empty()
        && domain.len() <= 255
        && domain.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}
