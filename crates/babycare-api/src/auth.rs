use std::convert::Infallible;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::{
        IntoResponse,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures_util::Stream;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::{info, warn};
use uuid::Uuid;

use babycare_types::api::{
    Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, SessionResponse,
};
use babycare_types::events::SessionEvent;
use babycare_types::models::UserType;

use crate::convert;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::run_blocking;

const MIN_PASSWORD_LEN: usize = 6;
const DEFAULT_REDIRECT: &str = "/dashboard";

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::bad_request("A valid email is required"));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request("Password must be at least 6 characters"));
    }
    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::bad_request("Name is required"));
    }

    // Hash password with Argon2id
    let password_hash = hash_password(&req.password)?;
    let user_id = Uuid::new_v4();
    let user_type = req.user_type;

    let lookup = email.clone();
    let created = run_blocking(&state, move |s| {
        s.db.create_account(&user_id.to_string(), &lookup, &password_hash, &name, user_type.as_str())
    })
    .await?;
    if !created {
        return Err(ApiError::Conflict("Email is already registered".into()));
    }

    let (token, _) = open_session(&state, user_id, &email).await?;
    info!("Registered {} user {}", user_type, user_id);

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id,
            token,
            redirect_to: req.redirect_to.unwrap_or_else(|| DEFAULT_REDIRECT.to_string()),
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let email = req.email.trim().to_lowercase();

    let lookup = email.clone();
    let found = run_blocking(&state, move |s| {
        let Some(user) = s.db.get_user_by_email(&lookup)? else {
            return Ok(None);
        };
        let profile = s.db.get_profile(&user.id)?;
        Ok(Some((user, profile)))
    })
    .await?;

    let Some((user, profile)) = found else {
        warn!("Sign-in for unknown email");
        return Err(ApiError::Unauthorized);
    };

    if !verify_password(&req.password, &user.password)? {
        warn!("Sign-in with wrong password for user {}", user.id);
        return Err(ApiError::Unauthorized);
    }

    let user_id: Uuid = user
        .id
        .parse()
        .map_err(|_| ApiError::Internal(format!("corrupt user id '{}'", user.id)))?;
    let (name, user_type) = match profile {
        Some(p) => {
            let p = convert::profile(p);
            (p.name, p.user_type)
        }
        None => (String::new(), UserType::default()),
    };

    let (token, _) = open_session(&state, user_id, &email).await?;
    info!("User {} signed in", user_id);

    Ok(Json(LoginResponse {
        user_id,
        name,
        user_type,
        token,
    }))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<StatusCode> {
    let sid = claims.sid.to_string();
    run_blocking(&state, move |s| s.db.revoke_session(&sid)).await?;

    state.sessions.publish(SessionEvent::SignedOut {
        user_id: claims.sub,
        session_id: claims.sid,
    });
    info!("User {} signed out", claims.sub);

    Ok(StatusCode::NO_CONTENT)
}

pub async fn current_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<SessionResponse>> {
    let uid = claims.sub.to_string();
    let sid = claims.sid.to_string();
    let (profile, session) = run_blocking(&state, move |s| {
        Ok((s.db.get_profile(&uid)?, s.db.get_session(&sid)?))
    })
    .await?;

    let profile = profile.ok_or_else(|| ApiError::not_found("Profile not found"))?;
    let session = session.ok_or(ApiError::Unauthorized)?;
    let profile = convert::profile(profile);

    Ok(Json(SessionResponse {
        user_id: claims.sub,
        session_id: claims.sid,
        email: claims.email,
        name: profile.name,
        user_type: profile.user_type,
        expires_at: convert::timestamp(&session.expires_at, "session"),
    }))
}

/// Server-Sent Events stream of the caller's session changes. The stream
/// owns the subscription; a client disconnect drops both.
pub async fn session_events(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut subscription = state.sessions.subscribe(claims.sub);

    let stream = async_stream::stream! {
        while let Some(event) = subscription.next().await {
            match Event::default().event(event.name()).json_data(&event) {
                Ok(sse) => yield Ok(sse),
                Err(e) => warn!("Failed to encode session event: {}", e),
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Persist a new session row and issue its token. Publishes `SignedIn`.
async fn open_session(state: &AppState, user_id: Uuid, email: &str) -> ApiResult<(String, Uuid)> {
    let session_id = Uuid::new_v4();
    let expires_at = chrono::Utc::now() + state.settings.token_ttl;

    let token = create_token(&state.settings.jwt_secret, user_id, email, session_id, expires_at)
        .map_err(|e| ApiError::Internal(format!("token encoding failed: {}", e)))?;

    let (sid, uid) = (session_id.to_string(), user_id.to_string());
    run_blocking(state, move |s| s.db.create_session(&sid, &uid, expires_at)).await?;

    state.sessions.publish(SessionEvent::SignedIn { user_id, session_id });
    Ok((token, session_id))
}

pub fn create_token(
    secret: &str,
    user_id: Uuid,
    email: &str,
    session_id: Uuid,
    expires_at: chrono::DateTime<chrono::Utc>,
) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        sid: session_id,
        exp: expires_at.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

pub fn decode_token(secret: &str, token: &str) -> jsonwebtoken::errors::Result<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {}", e)))
}

fn verify_password(password: &str, stored: &str) -> ApiResult<bool> {
    let parsed = PasswordHash::new(stored)
        .map_err(|e| ApiError::Internal(format!("corrupt password hash: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trips_claims() {
        let user_id = Uuid::new_v4();
        let sid = Uuid::new_v4();
        let expires = chrono::Utc::now() + chrono::Duration::hours(1);

        let token = create_token("secret", user_id, "ana@example.com", sid, expires).unwrap();
        let claims = decode_token("secret", &token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.sid, sid);
        assert_eq!(claims.email, "ana@example.com");
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let expires = chrono::Utc::now() + chrono::Duration::hours(1);
        let token = create_token("secret", Uuid::new_v4(), "a@b.c", Uuid::new_v4(), expires).unwrap();
        assert!(decode_token("other", &token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let expires = chrono::Utc::now() - chrono::Duration::hours(2);
        let token = create_token("secret", Uuid::new_v4(), "a@b.c", Uuid::new_v4(), expires).unwrap();
        assert!(decode_token("secret", &token).is_err());
    }

    #[test]
    fn password_hash_verifies_only_the_original() {
        let hash = hash_password("hunter22").unwrap();
        assert!(verify_password("hunter22", &hash).unwrap());
        assert!(!verify_password("hunter23", &hash).unwrap());
    }
}
