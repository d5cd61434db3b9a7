use axum::{
    Json,
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use super::{ApiError, ApiResponse, AppState, UserDto, validation};
use crate::db::AuthOutcome;
use crate::models::Role;

/// The authenticated caller, inserted as a request extension by
/// `auth_middleware` and read by handlers and role guards.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i32,
    pub email: String,
    pub role: Role,
}

/// Sliding-window counter for login attempts, keyed by client identity.
#[derive(Default)]
pub struct LoginThrottle {
    attempts: Mutex<HashMap<String, Vec<Instant>>>,
}

impl LoginThrottle {
    /// Records an attempt and reports whether the client is over the limit.
    pub fn check_and_record(&self, key: &str, max_attempts: u32, window: Duration) -> bool {
        let now = Instant::now();
        let mut attempts = self.attempts.lock().unwrap_or_else(|e| e.into_inner());

        let entry = attempts.entry(key.to_string()).or_default();
        entry.retain(|t| now.duration_since(*t) < window);

        if entry.len() >= max_attempts as usize {
            return false;
        }

        entry.push(now);
        true
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserDto,
}

// ============================================================================
// Middleware
// ============================================================================

/// Authentication middleware: resolves the `Authorization: Bearer` token to a
/// user and re-checks the blocked flag on every request, so blocking an
/// account takes effect immediately.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = extract_bearer(&headers) else {
        return Err(ApiError::Unauthorized("Not authenticated".to_string()));
    };

    let user = state
        .store()
        .verify_token(&token)
        .await
        .map_err(|e| ApiError::internal(format!("Token lookup failed: {e}")))?
        .ok_or_else(|| ApiError::Unauthorized("Invalid token".to_string()))?;

    if let Some(blocked_at) = user.blocked_at {
        return Err(ApiError::AccountBlocked { blocked_at });
    }

    let role = user
        .role
        .parse::<Role>()
        .map_err(|e| ApiError::internal(e.to_string()))?;

    tracing::Span::current().record("user_id", user.id);

    request.extensions_mut().insert(AuthUser {
        id: user.id,
        email: user.email,
        role,
    });

    Ok(next.run(request).await)
}

/// Guard for routes restricted to admins and super admins.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = current_user(&request)?;
    if !user.role.is_admin() {
        return Err(ApiError::Forbidden(
            "Admin access required".to_string(),
        ));
    }
    Ok(next.run(request).await)
}

/// Guard for routes restricted to super admins.
pub async fn require_super_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = current_user(&request)?;
    if user.role != Role::SuperAdmin {
        return Err(ApiError::Forbidden(
            "Super admin access required".to_string(),
        ));
    }
    Ok(next.run(request).await)
}

fn current_user(request: &Request) -> Result<&AuthUser, ApiError> {
    request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    None
}

/// Client identity used for throttling. Trusts the first forwarded address
/// when present, otherwise all local callers share one bucket.
fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map_or_else(|| "local".to_string(), |ip| ip.trim().to_string())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/login
/// Verifies credentials and issues a fresh bearer token.
pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let throttle_config = {
        let config = state.config().read().await;
        config.security.auth_throttle.clone()
    };

    let key = client_key(&headers);
    if !state.login_throttle.check_and_record(
        &key,
        throttle_config.max_attempts,
        Duration::from_secs(throttle_config.window_seconds),
    ) {
        return Err(ApiError::TooManyRequests(
            "Terlalu banyak percobaan login. Coba lagi nanti.".to_string(),
        ));
    }

    let mut errors = validation::ValidationErrors::new();
    validation::validate_email(&mut errors, "email", &payload.email);
    validation::require(&mut errors, "password", &payload.password, "Kata sandi");
    errors.into_result()?;

    let outcome = state
        .store()
        .authenticate(&payload.email, &payload.password)
        .await
        .map_err(|e| ApiError::internal(format!("Authentication error: {e}")))?;

    let user = match outcome {
        AuthOutcome::Success(user) => user,
        AuthOutcome::InvalidCredentials => {
            return Err(ApiError::Unauthorized(
                "Email atau kata sandi salah.".to_string(),
            ));
        }
        AuthOutcome::Blocked { blocked_at } => {
            return Err(ApiError::AccountBlocked { blocked_at });
        }
    };

    let token = state
        .store()
        .issue_token(user.id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to issue token: {e}")))?;

    let profile = state.store().get_profile(user.id).await?;

    tracing::info!("Login: {}", user.email);

    Ok(Json(ApiResponse::success(LoginResponse {
        token,
        user: UserDto::from_user(user, profile),
    })))
}

/// POST /auth/logout
/// Revokes the token used for this request.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = extract_bearer(&headers) {
        state.store().revoke_token(&token).await?;
    }

    Ok(Json(ApiResponse::success(serde_json::json!({
        "message": "Logged out"
    }))))
}

/// POST /auth/logout-all
/// Revokes every token belonging to the current user.
pub async fn logout_all(
    State(state): State<Arc<AppState>>,
    axum::Extension(user): axum::Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let revoked = state.store().revoke_all_tokens(user.id).await?;

    Ok(Json(ApiResponse::success(serde_json::json!({
        "revoked": revoked
    }))))
}

/// GET /auth/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    axum::Extension(user): axum::Extension<AuthUser>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let record = state
        .store()
        .get_user(user.id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;

    let profile = state.store().get_profile(user.id).await?;

    Ok(Json(ApiResponse::success(UserDto::from_user(
        record, profile,
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttle_allows_up_to_limit() {
        let throttle = LoginThrottle::default();
        let window = Duration::from_secs(60);

        for _ in 0..5 {
            assert!(throttle.check_and_record("1.2.3.4", 5, window));
        }
        assert!(!throttle.check_and_record("1.2.3.4", 5, window));
    }

    #[test]
    fn throttle_buckets_are_per_client() {
        let throttle = LoginThrottle::default();
        let window = Duration::from_secs(60);

        for _ in 0..5 {
            assert!(throttle.check_and_record("1.2.3.4", 5, window));
        }
        assert!(throttle.check_and_record("5.6.7.8", 5, window));
    }
}
