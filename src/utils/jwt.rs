use std::{collections::HashSet, env};

use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use thiserror::Error;

use crate::routes::auth::claims::Claims;

/// Minimum acceptable size for the JWT secret in bytes.
pub const MIN_JWT_SECRET_LENGTH: usize = 32;
/// Minimum number of unique bytes expected for the JWT secret to avoid trivially guessable values.
const MIN_UNIQUE_JWT_BYTES: usize = 8;

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT_SECRET must be set")]
    MissingSecret,
    #[error("JWT_SECRET must be at least {required} bytes, but {actual} bytes were provided")]
    SecretTooShort { actual: usize, required: usize },
    #[error(
        "JWT_SECRET must contain sufficient entropy (at least {required} unique bytes); only {actual} unique bytes found"
    )]
    SecretLowEntropy { actual: usize, required: usize },
    #[error(transparent)]
    Token(#[from] jsonwebtoken::errors::Error),
}

fn secret_from_env() -> Result<Vec<u8>, JwtError> {
    let value = env::var("JWT_SECRET").map_err(|_| JwtError::MissingSecret)?;
    let bytes = value.into_bytes();
    validate_secret(&bytes)?;
    Ok(bytes)
}

fn validate_secret(secret: &[u8]) -> Result<(), JwtError> {
    if secret.len() < MIN_JWT_SECRET_LENGTH {
        return Err(JwtError::SecretTooShort {
            actual: secret.len(),
            required: MIN_JWT_SECRET_LENGTH,
        });
    }

    let unique = secret.iter().copied().collect::<HashSet<_>>().len();
    if unique < MIN_UNIQUE_JWT_BYTES {
        return Err(JwtError::SecretLowEntropy {
            actual: unique,
            required: MIN_UNIQUE_JWT_BYTES,
        });
    }

    Ok(())
}

/// Called once at startup so a bad secret fails the boot, not the first login.
pub fn check_secret() -> Result<(), JwtError> {
    secret_from_env().map(|_| ())
}

pub fn create_jwt(claims: &Claims) -> Result<String, JwtError> {
    let secret = secret_from_env()?;
    let token = encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(&secret),
    )?;
    Ok(token)
}

pub fn decode_jwt(token: &str) -> Result<TokenData<Claims>, JwtError> {
    let secret = secret_from_env()?;
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.insert("exp".to_string());

    let data = decode::<Claims>(token, &DecodingKey::from_secret(&secret), &validation)?;
    Ok(data)
}
