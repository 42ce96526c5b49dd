use axum::{
    http::StatusCode,
    middleware::Next,
    response::Response,
    extract::{ Request, FromRequestParts, State},
    http::request::Parts,
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// The caller's user id, placed in request extensions by [`require_auth`].
pub struct JwtUser(pub Uuid);


impl<S> FromRequestParts<S> for JwtUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Uuid>()
            .copied()
            .map(JwtUser)
            .ok_or((StatusCode::UNAUTHORIZED, "missing user"))
    }
}

// Tokens are issued by the identity service; this side only verifies them.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
}

pub fn verify_token(token: &str, secret: &str) -> Result<Uuid, &'static str> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!(error = %e, "JWT decode error");
        "invalid token"
    })?;

    Uuid::parse_str(&token_data.claims.sub).map_err(|_| "invalid subject")
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, (StatusCode, &'static str)> {
    let auth_header = req.headers().get("authorization").and_then(|v| v.to_str().ok());

    let token = match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) => token,
        None => {
            return Err((StatusCode::UNAUTHORIZED, "missing token"));
        }
    };

    match verify_token(token, &state.jwt_secret) {
        Ok(user_id) => {
            req.extensions_mut().insert(user_id);
            Ok(next.run(req).await)
        }
        Err(reason) => Err((StatusCode::UNAUTHORIZED, reason)),
    }
}
