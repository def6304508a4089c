//! Authentication routes: registration, login, profile.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::user::{ROLE_ADMIN, ROLE_MANAGER};
use crate::models::{CreateUser, User};
use crate::routes::helpers::authenticate;
use crate::state::AppState;

/// Minimum accepted password length.
const MIN_PASSWORD_LEN: usize = 8;

/// Create the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/profile", get(profile))
}

// -------------------------------------------------------------------------
// Request/response types
// -------------------------------------------------------------------------

#[derive(Deserialize)]
struct RegisterRequest {
    username: String,
    email: String,
    password: String,
    role: Option<String>,
}

#[derive(Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Serialize)]
struct UserSummary {
    id: Uuid,
    username: String,
    email: String,
    role: String,
    last_login: Option<i64>,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            last_login: user.last_login,
        }
    }
}

#[derive(Serialize)]
struct TokenResponse {
    message: &'static str,
    token: String,
    user: UserSummary,
}

#[derive(Serialize)]
struct ProfileResponse {
    user: UserSummary,
}

// -------------------------------------------------------------------------
// Handlers
// -------------------------------------------------------------------------

async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), AppError> {
    if input.username.trim().is_empty() || input.email.trim().is_empty() {
        return Err(AppError::BadRequest("username and email are required".into()));
    }
    if input.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if let Some(ref role) = input.role {
        if role != ROLE_ADMIN && role != ROLE_MANAGER {
            return Err(AppError::BadRequest("unknown role".into()));
        }
    }

    if User::find_by_username_or_email(state.db(), &input.username, &input.email)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("user already exists".into()));
    }

    let user = User::create(
        state.db(),
        CreateUser {
            username: input.username,
            email: input.email,
            password: input.password,
            role: input.role,
        },
    )
    .await?;

    let token = state.tokens().issue(user.id)?;

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            message: "user created",
            token,
            user: user.into(),
        }),
    ))
}

async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let user = User::find_active_by_login(state.db(), &input.username).await?;

    // Same rejection for unknown user and wrong password.
    let Some(user) = user.filter(|u| u.verify_password(&input.password)) else {
        return Err(AppError::Unauthorized(
            "invalid username or password".into(),
        ));
    };

    User::touch_login(state.db(), user.id).await?;
    let token = state.tokens().issue(user.id)?;

    let now = chrono::Utc::now().timestamp();
    let mut summary = UserSummary::from(user);
    summary.last_login = Some(now);

    Ok(Json(TokenResponse {
        message: "login successful",
        token,
        user: summary,
    }))
}

async fn profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ProfileResponse>, AppError> {
    let user = authenticate(&state, &headers).await?;

    Ok(Json(ProfileResponse { user: user.into() }))
}
