use axum::http::Request;
use std::sync::Arc;
use tower_governor::{
    governor::GovernorConfigBuilder,
    key_extractor::KeyExtractor,
    GovernorError, GovernorLayer,
};
use uuid::Uuid;

use crate::middleware::rate_limit::rate_limit_error_handler;
use crate::utils::jwt::Claims;

/// Custom key extractor that extracts user ID from JWT claims in request extensions
#[derive(Debug, Clone, Copy)]
pub struct UserIdExtractor;

impl KeyExtractor for UserIdExtractor {
    type Key = Uuid;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        // Set by auth_middleware, so the limiter must sit inside it.
        let claims = req
            .extensions()
            .get::<Claims>()
            .ok_or(GovernorError::UnableToExtractKey)?;

        Ok(claims.sub)
    }
}

pub type RoleGovernorLayer = GovernorLayer<
    UserIdExtractor,
    governor::middleware::NoOpMiddleware<governor::clock::QuantaInstant>,
    axum::body::Body,
>;

/// Roles with a per-user quota. Admin routes are not throttled.
#[derive(Debug, Clone, Copy)]
pub enum RateLimitedRole {
    /// Tourists and locals: 100 requests per minute.
    Visitor,
    /// 500 requests per minute.
    Guide,
    /// Any authenticated user uploading files: 20 per minute.
    Uploader,
}

pub fn create_role_governor(role: RateLimitedRole) -> RoleGovernorLayer {
    let (per_ms, burst) = match role {
        RateLimitedRole::Visitor => (600, 100),
        RateLimitedRole::Guide => (120, 500),
        RateLimitedRole::Uploader => (3_000, 20),
    };

    let config = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(burst)
            .key_extractor(UserIdExtractor)
            .finish()
            .expect("role governor quota is non-zero"),
    );

    GovernorLayer::new(config).error_handler(rate_limit_error_handler)
}
