pub mod health_service;
pub mod rate_limit_service;
pub mod repository;
pub mod user_service;
