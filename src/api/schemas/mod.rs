pub mod health;
pub mod pagination;
pub mod users;
