#![allow(dead_code)]
use clap::Parser;
use roster_server::api::{MgmtState, app_router, mgmt_router};
use roster_server::config::Config;
use roster_server::services::repository::UserRepository;
use roster_server::{AppBuilder, adapters::memory::InMemoryUserRepository};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::{Arc, Once};
use tokio::net::TcpListener;

static INIT: Once = Once::new();

pub fn setup_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into())
            .add_directive("roster_server=debug".parse().unwrap())
            .add_directive("sqlx=warn".parse().unwrap())
            .add_directive("tower=warn".parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap());

        tracing_subscriber::fmt().with_env_filter(filter).init();
    });
}

pub fn get_test_config() -> Config {
    Config::try_parse_from([
        "roster-server",
        "--storage",
        "memory",
        "--host",
        "127.0.0.1",
        "--port",
        "0",
        "--mgmt-port",
        "0",
        "--per-second",
        "10000",
        "--burst",
        "10000",
        "--default-page-size",
        "20",
        "--max-page-size",
        "2000",
    ])
    .unwrap()
}

pub struct TestApp {
    pub config: Config,
    pub server_url: String,
    pub mgmt_url: String,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_config(get_test_config()).await
    }

    pub async fn spawn_with_config(config: Config) -> Self {
        Self::spawn_with_repository(config, Arc::new(InMemoryUserRepository::new())).await
    }

    pub async fn spawn_with_repository(config: Config, repository: Arc<dyn UserRepository>) -> Self {
        setup_tracing();

        let app = AppBuilder::new(config.clone()).with_repository(repository).build().unwrap();
        let router = app_router(config.clone(), app.services).unwrap();
        let mgmt = mgmt_router(MgmtState { health_service: app.health_service });

        let api_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mgmt_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let server_url = format!("http://{}", api_listener.local_addr().unwrap());
        let mgmt_url = format!("http://{}", mgmt_listener.local_addr().unwrap());

        tokio::spawn(async move {
            axum::serve(api_listener, router.into_make_service_with_connect_info::<SocketAddr>()).await.unwrap();
        });
        tokio::spawn(async move {
            axum::serve(mgmt_listener, mgmt.into_make_service_with_connect_info::<SocketAddr>()).await.unwrap();
        });

        Self { config, server_url, mgmt_url, client: reqwest::Client::new() }
    }

    pub fn users_url(&self) -> String {
        format!("{}/api/users", self.server_url)
    }

    pub fn user_url(&self, id: &str) -> String {
        format!("{}/api/users/{}", self.server_url, id)
    }

    /// Creates a user and returns the response body.
    pub async fn create_user(&self, name: &str, email: &str) -> Value {
        let resp = self.client.post(self.users_url()).json(&json!({ "name": name, "email": email })).send().await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::CREATED, "creating {email} failed");
        resp.json().await.unwrap()
    }
}

/// A unique address per call so tests never trip over each other's emails.
pub fn unique_email(prefix: &str) -> String {
    format!("{}_{}@example.com", prefix, &uuid::Uuid::new_v4().simple().to_string()[..12])
}
