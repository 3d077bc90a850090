use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::auth::decode_token;
use crate::error::ApiError;
use crate::state::AppState;
use crate::run_blocking;

/// Extract and validate the bearer JWT, then check that its session has not
/// been revoked or expired. The claims are inserted as a request extension.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    let claims = decode_token(&state.settings.jwt_secret, token).map_err(|e| {
        warn!("Rejected token: {}", e);
        ApiError::Unauthorized
    })?;

    let sid = claims.sid.to_string();
    let active = run_blocking(&state, move |s| s.db.is_session_active(&sid)).await?;
    if !active {
        warn!("Rejected token for revoked or expired session {}", claims.sid);
        return Err(ApiError::Unauthorized);
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
