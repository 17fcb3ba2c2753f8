use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Form, Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use validator::Validate;

use application::{
    services::{AccessToken, CreatePostRequest, LoginRequest, SignupRequest},
    CreatedPostDto, PostDto, SignupDto, UserDto,
};
use domain::{LikeStats, PostId};

use crate::{auth::CurrentUser, error::ApiError, state::AppState};

#[derive(Debug, Deserialize, Validate)]
struct SignupPayload {
    #[validate(length(min = 1, message = "username cannot be empty"))]
    username: String,
    #[validate(length(min = 1, message = "password cannot be empty"))]
    password: String,
}

/// OAuth2 password 表单，`grant_type`、`scope` 等字段忽略。
#[derive(Debug, Deserialize)]
struct TokenForm {
    username: String,
    password: String,
}

#[derive(Debug, Deserialize, Validate)]
struct CreatePostPayload {
    #[validate(length(min = 1, message = "title cannot be empty"))]
    title: String,
    body: String,
}

#[derive(Debug, Deserialize)]
struct LikeAnalyticsQuery {
    date_from: NaiveDate,
    date_to: NaiveDate,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/token/", post(issue_token))
        .nest("/api", api_routes())
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/users/", post(signup).get(list_users))
        .route("/users/me/", get(read_current_user))
        .route("/users/{username}", get(get_user))
        .route("/posts/", post(create_post).get(list_posts))
        .route("/posts/{post_id}/", get(get_post))
        .route("/posts/{post_id}/like/", post(like_post).delete(unlike_post))
        .route("/analytics/likes/", get(like_analytics))
}

fn validate(payload: &impl Validate) -> Result<(), ApiError> {
    payload
        .validate()
        .map_err(|err| ApiError::bad_request(err.to_string()))
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupPayload>,
) -> Result<Json<SignupDto>, ApiError> {
    validate(&payload)?;
    let user = state
        .user_service
        .signup(SignupRequest {
            username: payload.username,
            password: payload.password,
        })
        .await?;

    Ok(Json(SignupDto {
        username: user.username.as_str().to_owned(),
    }))
}

async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserDto>>, ApiError> {
    let users = state.user_service.list_users().await?;
    Ok(Json(users.iter().map(UserDto::from).collect()))
}

async fn read_current_user(CurrentUser(user): CurrentUser) -> Json<UserDto> {
    Json(UserDto::from(&user))
}

async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserDto>, ApiError> {
    let user = state.user_service.get_user(&username).await?;
    Ok(Json(UserDto::from(&user)))
}

async fn issue_token(
    State(state): State<AppState>,
    Form(form): Form<TokenForm>,
) -> Result<Json<AccessToken>, ApiError> {
    let token = state
        .user_service
        .login(LoginRequest {
            username: form.username,
            password: form.password,
        })
        .await?;

    Ok(Json(token))
}

async fn create_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreatePostPayload>,
) -> Result<Json<CreatedPostDto>, ApiError> {
    validate(&payload)?;
    let id = state
        .post_service
        .create_post(
            &user,
            CreatePostRequest {
                title: payload.title,
                body: payload.body,
            },
        )
        .await?;

    Ok(Json(CreatedPostDto { id: id.into() }))
}

async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<i32>,
) -> Result<Json<PostDto>, ApiError> {
    let post = state.post_service.get_post(PostId(post_id)).await?;
    Ok(Json(PostDto::from(&post)))
}

async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<PostDto>>, ApiError> {
    let posts = state.post_service.list_posts().await?;
    Ok(Json(posts.iter().map(PostDto::from).collect()))
}

async fn like_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(post_id): Path<i32>,
) -> Result<Json<&'static str>, ApiError> {
    let status = state.post_service.like_post(&user, PostId(post_id)).await?;
    Ok(Json(status.message()))
}

async fn unlike_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(post_id): Path<i32>,
) -> Result<Json<&'static str>, ApiError> {
    let status = state
        .post_service
        .unlike_post(&user, PostId(post_id))
        .await?;
    Ok(Json(status.message()))
}

async fn like_analytics(
    State(state): State<AppState>,
    Query(query): Query<LikeAnalyticsQuery>,
) -> Result<Json<LikeStats>, ApiError> {
    let stats = state
        .analytics_service
        .like_analytics(query.date_from, query.date_to)
        .await?;
    Ok(Json(stats))
}
