use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use std::time::Duration;
use tracing::{error, info};

use traahi_types::api::{Claims, LoginRequest, LoginResponse, MessageResponse, RegisterRequest};

use crate::error::{ApiError, ApiResult};
use crate::extract::JsonBody;
use crate::{AppState, db_call};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

pub async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let ngo_name = req.ngo_name.trim().to_string();
    let email = req.email.trim().to_string();
    if ngo_name.is_empty() || email.is_empty() || req.password.is_empty() {
        return Err(ApiError::Validation("All fields are required.".into()));
    }

    let password = req.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(e.into()))??;

    // The unique index on email decides races; no pre-check.
    let user_id = db_call(&state, move |db| {
        db.create_user_with_ngo(&email, &password_hash, &ngo_name)
    })
    .await
    .map_err(|e| match e {
        ApiError::Conflict(_) => {
            ApiError::Conflict("An account with this email already exists.".into())
        }
        other => other,
    })?;

    info!("Registered user {}", user_id);

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "NGO registered successfully. Please log in.".into(),
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let email = req.email.trim().to_string();
    let user = db_call(&state, move |db| db.get_login(&email))
        .await?
        .ok_or_else(|| ApiError::Unauthenticated(INVALID_CREDENTIALS.into()))?;

    let password = req.password;
    let stored = user.password_hash.clone();
    let matches = tokio::task::spawn_blocking(move || verify_password(&password, &stored))
        .await
        .map_err(|e| ApiError::Internal(e.into()))?;
    if !matches {
        return Err(ApiError::Unauthenticated(INVALID_CREDENTIALS.into()));
    }

    let token = issue_token(&state.jwt_secret, user.user_id, &user.ngo_name, state.token_ttl)
        .map_err(ApiError::Internal)?;

    Ok(Json(LoginResponse {
        message: "Logged in successfully".into(),
        token,
        ngo_name: user.ngo_name,
    }))
}

/// Argon2id hash in PHC string form.
pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("password hashing failed: {}", e)))
}

/// False for a wrong password and for an unparseable stored hash alike.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let parsed = match PasswordHash::new(stored_hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            error!("Stored password hash is corrupt: {}", e);
            return false;
        }
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

pub fn issue_token(
    secret: &str,
    user_id: i64,
    ngo_name: &str,
    ttl: Duration,
) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        ngo_name: ngo_name.to_string(),
        exp: (chrono::Utc::now().timestamp() + ttl.as_secs() as i64) as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Resolve a session token. Bad signatures and expired tokens are both `Forbidden`.
pub fn verify_token(secret: &str, token: &str) -> ApiResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| ApiError::Forbidden("Token is not valid".into()))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_verifies_only_original() {
        let hash = hash_password("pw").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("pw", &hash));
        assert!(!verify_password("PW", &hash));
        assert!(!verify_password("pw", "not-a-phc-string"));
    }

    #[test]
    fn token_round_trips_user_and_ngo() {
        let token = issue_token("s3cret", 42, "Helping Hands", Duration::from_secs(3600)).unwrap();
        let claims = verify_token("s3cret", &token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.ngo_name, "Helping Hands");
    }

    #[test]
    fn wrong_secret_is_forbidden() {
        let token = issue_token("s3cret", 1, "NGO", Duration::from_secs(3600)).unwrap();
        assert!(matches!(verify_token("other", &token), Err(ApiError::Forbidden(_))));
    }

    #[test]
    fn expired_token_is_forbidden() {
        let claims = Claims {
            sub: 1,
            ngo_name: "NGO".into(),
            exp: (chrono::Utc::now().timestamp() - 7200) as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"s3cret"),
        )
        .unwrap();
        assert!(matches!(verify_token("s3cret", &token), Err(ApiError::Forbidden(_))));
    }
}
