use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::entities::user::{self, UserRole};
use crate::error::{AppError, AppResult};
use crate::repositories::user::NewUser;
use crate::utils::jwt::{create_token, Claims};
use crate::utils::password::{hash_password, verify_password};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// `tourist` (default) or `local`.
    pub role: Option<UserRole>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

impl From<user::Model> for UserInfo {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
        }
    }
}

/// Register a new tourist or local account
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<Json<AuthResponse>> {
    payload.validate()?;

    let role = payload.role.unwrap_or(UserRole::Tourist);
    if !role.is_visitor() {
        return Err(AppError::Forbidden(
            "Only tourist and local accounts can self-register".to_string(),
        ));
    }

    let user = state
        .users()
        .create(NewUser {
            email: payload.email,
            password_hash: hash_password(&payload.password)?,
            name: payload.name,
            role,
        })
        .await?;

    issue(&state, user)
}

/// Login with email and password
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = state
        .users()
        .find_by_email(&payload.email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    verify_password(&payload.password, &user.password_hash)?;

    tracing::info!(user_id = %user.id, "User logged in");
    issue(&state, user)
}

/// Current user, as stored (the role may have changed since the token was issued)
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<UserInfo>> {
    let user = state.users().find_by_id(claims.sub).await?;
    Ok(Json(user.into()))
}

fn issue(state: &AppState, user: user::Model) -> AppResult<Json<AuthResponse>> {
    let token = create_token(
        user.id,
        &user.email,
        user.role.clone(),
        &state.config.jwt_secret,
        state.config.jwt_expiration_hours,
    )?;

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}
