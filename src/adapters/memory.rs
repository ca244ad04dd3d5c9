use crate::domain::pagination::{Direction, Page, PageRequest, SortField};
use crate::domain::user::User;
use crate::error::{AppError, Result};
use crate::services::repository::UserRepository;
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Process-local user store with the same uniqueness rules as the `users` table.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_taken(users: &HashMap<Uuid, User>, user: &User) -> bool {
    users.values().any(|other| other.id != user.id && other.email == user.email)
}

fn compare(a: &User, b: &User, field: SortField) -> Ordering {
    match field {
        SortField::Id => a.id.cmp(&b.id),
        SortField::Name => a.name.cmp(&b.name),
        SortField::Email => a.email.cmp(&b.email),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn save(&self, user: &User) -> Result<User> {
        let mut users = self.users.write().await;

        if users.contains_key(&user.id) {
            return Err(AppError::Conflict("User already exists".into()));
        }
        if email_taken(&users, user) {
            return Err(AppError::Conflict("Email is already in use".into()));
        }

        users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn update(&self, user: &User) -> Result<Option<User>> {
        let mut users = self.users.write().await;

        if !users.contains_key(&user.id) {
            return Ok(None);
        }
        if email_taken(&users, user) {
            return Err(AppError::Conflict("Email is already in use".into()));
        }

        Ok(users.get_mut(&user.id).map(|stored| {
            stored.name.clone_from(&user.name);
            stored.email.clone_from(&user.email);
            stored.updated_at = user.updated_at;
            stored.clone()
        }))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<User>> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(users)
    }

    async fn find_page(&self, request: &PageRequest) -> Result<Page<User>> {
        let mut users = self.find_all().await?;

        if let Some(sort) = request.sort() {
            users.sort_by(|a, b| {
                let ordering = compare(a, b, sort.field);
                let ordering = if sort.direction == Direction::Desc { ordering.reverse() } else { ordering };
                ordering.then_with(|| a.id.cmp(&b.id))
            });
        }

        let total = users.len() as u64;
        let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let size = usize::try_from(request.size()).unwrap_or(usize::MAX);
        let content = users.into_iter().skip(offset).take(size).collect();

        Ok(Page::new(content, request, total))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.users.write().await.remove(&id).is_some())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pagination::Sort;

    #[tokio::test]
    async fn test_save_and_find() {
        let repo = InMemoryUserRepository::new();
        let user = User::create("Alice".into(), "alice@example.com".into());

        let saved = repo.save(&user).await.unwrap();

        assert_eq!(saved, user);
        assert_eq!(repo.find_by_id(user.id).await.unwrap(), Some(user));
        assert_eq!(repo.find_by_id(Uuid::new_v4()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let repo = InMemoryUserRepository::new();
        repo.save(&User::create("Alice".into(), "same@example.com".into())).await.unwrap();

        let result = repo.save(&User::create("Other".into(), "same@example.com".into())).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_save_existing_id_conflicts() {
        let repo = InMemoryUserRepository::new();
        let user = repo.save(&User::create("Bob".into(), "bob@example.com".into())).await.unwrap();

        let result = repo.save(&user.update("Robert".into(), "robert@example.com".into())).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_update_keeps_created_at() {
        let repo = InMemoryUserRepository::new();
        let user = repo.save(&User::create("Bob".into(), "bob@example.com".into())).await.unwrap();

        let mut changed = user.clone().update("Robert".into(), "bob@example.com".into());
        changed.created_at = changed.updated_at;
        let updated = repo.update(&changed).await.unwrap().unwrap();

        assert_eq!(updated.created_at, user.created_at);
        assert_eq!(updated.name, "Robert");
        assert_eq!(repo.find_by_id(user.id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn test_update_missing_row_is_not_recreated() {
        let repo = InMemoryUserRepository::new();
        let user = repo.save(&User::create("Gone".into(), "gone@example.com".into())).await.unwrap();
        repo.delete(user.id).await.unwrap();

        let result = repo.update(&user.update("Back".into(), "back@example.com".into())).await.unwrap();

        assert_eq!(result, None);
        assert!(repo.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_to_taken_email_conflicts() {
        let repo = InMemoryUserRepository::new();
        repo.save(&User::create("Owner".into(), "taken@example.com".into())).await.unwrap();
        let other = repo.save(&User::create("Other".into(), "other@example.com".into())).await.unwrap();

        let result = repo.update(&other.update("Other".into(), "taken@example.com".into())).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_delete_reports_removal() {
        let repo = InMemoryUserRepository::new();
        let user = repo.save(&User::create("Eve".into(), "eve@example.com".into())).await.unwrap();

        assert!(repo.delete(user.id).await.unwrap());
        assert!(!repo.delete(user.id).await.unwrap());
        assert!(repo.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_page_sorted_by_name_desc() {
        let repo = InMemoryUserRepository::new();
        for name in ["b", "d", "a", "c", "e"] {
            repo.save(&User::create(name.into(), format!("{name}@example.com"))).await.unwrap();
        }

        let sort = Sort { field: SortField::Name, direction: Direction::Desc };
        let request = PageRequest::new(1, 2, Some(sort)).unwrap();
        let page = repo.find_page(&request).await.unwrap();

        let names: Vec<_> = page.content.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, ["c", "b"]);
        assert_eq!(page.total_elements, 5);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next);
        assert!(page.has_previous);
    }

    #[tokio::test]
    async fn test_find_page_past_end_is_empty() {
        let repo = InMemoryUserRepository::new();
        repo.save(&User::create("Solo".into(), "solo@example.com".into())).await.unwrap();

        let page = repo.find_page(&PageRequest::new(5, 10, None).unwrap()).await.unwrap();

        assert!(page.content.is_empty());
        assert_eq!(page.total_elements, 1);
        assert!(page.is_last);
    }
}
