use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::entities::user::UserRole;
use crate::error::{AppError, AppResult};
use crate::utils::jwt::{verify_token, Claims};
use crate::AppState;

/// Extract and validate JWT token from Authorization header
pub async fn auth_middleware(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let TypedHeader(auth) =
        auth.ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

    let claims = verify_token(auth.token(), &state.config.jwt_secret)?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

fn claims(request: &Request) -> AppResult<&Claims> {
    request
        .extensions()
        .get::<Claims>()
        .ok_or_else(|| AppError::Unauthorized("No authentication found".to_string()))
}

/// Require admin role
pub async fn require_admin(request: Request, next: Next) -> AppResult<Response> {
    if claims(&request)?.role != UserRole::Admin {
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }

    Ok(next.run(request).await)
}

/// Require guide role
pub async fn require_guide(request: Request, next: Next) -> AppResult<Response> {
    if claims(&request)?.role != UserRole::Guide {
        return Err(AppError::Forbidden("Guide access required".to_string()));
    }

    Ok(next.run(request).await)
}

/// Require a tourist or local account
pub async fn require_visitor(request: Request, next: Next) -> AppResult<Response> {
    if !claims(&request)?.role.is_visitor() {
        return Err(AppError::Forbidden(
            "Tourist or local account required".to_string(),
        ));
    }

    Ok(next.run(request).await)
}

/// Reject database console requests unless the console is enabled.
pub async fn require_console_enabled(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> AppResult<Response> {
    if !state.config.enable_database_console {
        return Err(AppError::NotFound("Database console is disabled".to_string()));
    }

    Ok(next.run(request).await)
}
