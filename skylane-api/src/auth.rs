use axum::{extract::State, routing::post, Json, Router};
use axum_extra::headers::authorization::Bearer;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

#[derive(Debug, Serialize)]
struct AuthResponse {
    token: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/auth/guest", post(login_guest))
}

/// Issue a short-lived guest token. Account-backed login lives in the auth
/// service; this surface only needs an expiring bearer identity.
async fn login_guest(State(state): State<AppState>) -> Result<Json<AuthResponse>, AppError> {
    let claims = Claims {
        sub: format!("guest-{}", Uuid::new_v4()),
        role: "GUEST".to_owned(),
        exp: (Utc::now() + Duration::seconds(state.auth.expiration as i64)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.auth.secret.as_bytes()),
    )
    .map_err(|e| AppError::AuthenticationError(format!("Token encoding failed: {}", e)))?;

    Ok(Json(AuthResponse { token }))
}

/// Decode and verify a bearer token against the shared secret.
pub fn verify_token(state: &AppState, bearer: &Bearer) -> Result<Claims, AppError> {
    let token_data = decode::<Claims>(
        bearer.token(),
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| AppError::AuthenticationError(e.to_string()))?;

    Ok(token_data.claims)
}
