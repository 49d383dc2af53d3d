use thiserror::Error as ThisError;

/// Failures of the password hashing / token primitives.
///
/// Wrong credentials are not an `AuthError`; handlers report those as
/// validation failures.
#[derive(Debug, ThisError)]
pub enum AuthError {
    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(e: argon2::password_hash::Error) -> Self {
        AuthError::PasswordHash(e.to_string())
    }
}
