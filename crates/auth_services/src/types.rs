use serde::{Deserialize, Serialize};

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject of the token, the author ID
    pub sub: String,
    /// Public display name of the author
    #[serde(default)]
    pub username: String,
    /// Expiration timestamp of the token
    pub exp: usize,
    /// Issued at timestamp of the token
    pub iat: usize,
}

/// Custom error type for authentication-related errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No bearer token was supplied
    #[error("Missing bearer token")]
    MissingToken,

    /// A bearer token was supplied but failed verification
    #[error("Invalid or expired bearer token")]
    InvalidToken,

    /// The token's subject is not an author ID
    #[error("Invalid token subject")]
    InvalidSubject,

    /// The token failed verification
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl actix_web::ResponseError for AuthError {
    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::HttpResponse;

        match self {
            AuthError::MissingToken => HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "missing_token",
                "message": "Authorization token is required"
            })),
            _ => HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "invalid_token",
                "message": "Invalid or expired token"
            })),
        }
    }
}
