use crate::api::rate_limit::log_rate_limit_events;
use crate::config::Config;
use crate::services::health_service::HealthService;
use crate::services::rate_limit_service::RateLimitService;
use crate::services::user_service::UserService;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::{Router, middleware::from_fn_with_state, routing::get};
use std::sync::Arc;
use std::time::Duration;
use tower_governor::GovernorLayer;
use tower_governor::governor::GovernorConfigBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub mod health;
pub mod middleware;
pub mod rate_limit;
pub mod schemas;
pub mod users;

#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Config,
    pub user_service: UserService,
    pub rate_limit_service: RateLimitService,
}

#[derive(Clone, Debug)]
pub struct MgmtState {
    pub health_service: HealthService,
}

#[derive(Debug)]
pub struct ServiceContainer {
    pub user_service: UserService,
    pub rate_limit_service: RateLimitService,
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::fetch_all).post(users::create))
        .route("/{id}", get(users::fetch_one).put(users::update).delete(users::delete))
}

/// Configures and returns the public API router.
///
/// The user resource is served under both `/api/users` and the versioned `/api/v1/users`.
///
/// # Errors
/// Returns an error if the rate limiter configuration is rejected.
pub fn app_router(config: Config, services: ServiceContainer) -> anyhow::Result<Router> {
    let interval_ns = 1_000_000_000 / config.rate_limit.per_second.max(1);
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_nanosecond(u64::from(interval_ns))
            .burst_size(config.rate_limit.burst)
            .key_extractor(services.rate_limit_service.extractor.clone())
            .finish()
            .ok_or_else(|| anyhow::anyhow!("invalid rate limit configuration"))?,
    );

    let request_timeout = Duration::from_secs(config.server.request_timeout_secs);

    let state =
        AppState { config, user_service: services.user_service, rate_limit_service: services.rate_limit_service };

    let api_routes = Router::new()
        .nest("/api/users", user_routes())
        .nest("/api/v1/users", user_routes())
        .layer(GovernorLayer::new(governor_conf));

    let router = Router::new()
        .merge(api_routes)
        .layer(from_fn_with_state(state.clone(), log_rate_limit_events))
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, request_timeout))
        .layer(PropagateRequestIdLayer::new(middleware::X_REQUEST_ID))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .extensions()
                        .get::<RequestId>()
                        .and_then(|id| id.header_value().to_str().ok())
                        .unwrap_or_default()
                        .to_string();

                    tracing::info_span!(
                        "request",
                        "request_id" = %request_id,
                        "http.request.method" = %request.method(),
                        "url.path" = %request.uri().path(),
                        "http.response.status_code" = tracing::field::Empty,
                        "otel.kind" = "server",
                    )
                })
                .on_response(|response: &axum::http::Response<_>, latency: Duration, span: &tracing::Span| {
                    let status = response.status();
                    span.record("http.response.status_code", status.as_u16());

                    tracing::info!(
                        latency_ms = %latency.as_millis(),
                        status = %status.as_u16(),
                        "request completed"
                    );
                })
                .on_failure(|error, _latency, _span: &tracing::Span| {
                    tracing::error!(error = %error, "request failed");
                }),
        )
        .layer(SetRequestIdLayer::new(middleware::X_REQUEST_ID, middleware::MakeRequestUuidOrHeader))
        .with_state(state);

    Ok(router)
}

pub fn mgmt_router(state: MgmtState) -> Router {
    Router::new().route("/livez", get(health::livez)).route("/readyz", get(health::readyz)).with_state(state)
}
