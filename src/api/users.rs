use crate::api::AppState;
use crate::api::middleware::UserIdPath;
use crate::api::schemas::pagination::{PageParams, PageResponse};
use crate::api::schemas::users::{UserRequest, UserResponse};
use crate::domain::user::User;
use crate::error::{AppError, Result};
use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};

fn read_body(payload: std::result::Result<Json<UserRequest>, JsonRejection>) -> Result<UserRequest> {
    let Json(request) = payload.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    request.validate()?;
    Ok(request)
}

/// `GET /users`: every user, or one page of them when any paging parameter is given.
pub async fn fetch_all(
    State(state): State<AppState>,
    params: std::result::Result<Query<PageParams>, QueryRejection>,
) -> Result<Response> {
    let Query(params) = params.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    if !params.is_paged() {
        let users = state.user_service.fetch_all().await?;
        let body: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
        return Ok(Json(body).into_response());
    }

    let request = params.to_page_request(&state.config.pagination)?;
    let page = state.user_service.fetch_page(request).await?;
    Ok(Json(PageResponse::from(page.map(UserResponse::from))).into_response())
}

pub async fn fetch_one(State(state): State<AppState>, UserIdPath(id): UserIdPath) -> Result<Json<UserResponse>> {
    let user = state.user_service.fetch_one(id).await?;
    Ok(Json(user.into()))
}

pub async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<UserRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let request = read_body(payload)?;

    let user = state.user_service.create(User::create(request.name, request.email)).await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

pub async fn update(
    State(state): State<AppState>,
    UserIdPath(id): UserIdPath,
    payload: std::result::Result<Json<UserRequest>, JsonRejection>,
) -> Result<Json<UserResponse>> {
    let request = read_body(payload)?;

    let user = state.user_service.update(id, request.name, request.email).await?;

    Ok(Json(user.into()))
}

pub async fn delete(State(state): State<AppState>, UserIdPath(id): UserIdPath) -> Result<StatusCode> {
    state.user_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
