use crate::config::JwtConfig;
use crate::error::{Error, Result};
use hmac::{Hmac, Mac};
use rand::Rng;
use secrecy::ExposeSecret;
use sha2::Sha256;
use subtle::ConstantTimeEq;

fn signer(config: &JwtConfig) -> Result<Hmac<Sha256>> {
    Hmac::<Sha256>::new_from_slice(config.refresh_token_secret.expose_secret().as_bytes())
        .map_err(|e| Error::Internal(format!("Failed to create HMAC: {}", e)))
}

/// Generates a secure refresh token with HMAC signature
///
/// Format: <random_32_bytes_hex>:<hmac_signature_hex>
pub fn generate_refresh_token(config: &JwtConfig) -> Result<String> {
    // 256 bits of entropy
    let mut random_bytes = [0u8; 32];
    rand::rng().fill(&mut random_bytes);

    let mut mac = signer(config)?;
    mac.update(&random_bytes);
    let signature = mac.finalize().into_bytes();

    // 64 + 1 + 64 = 129 chars
    Ok(format!("{}:{}", hex::encode(random_bytes), hex::encode(signature)))
}

/// Verifies a refresh token's HMAC signature
///
/// # Errors
/// Returns `InvalidToken` if the token is malformed or the signature does not
/// match the configured secret.
pub fn verify_refresh_token(token: &str, config: &JwtConfig) -> Result<Vec<u8>> {
    let Some((random_hex, provided_signature_hex)) = token.split_once(':') else {
        return Err(Error::InvalidToken("Invalid token format".to_string()));
    };

    let random_bytes = hex::decode(random_hex)
        .map_err(|_| Error::InvalidToken("Invalid token encoding".to_string()))?;

    let provided_signature = hex::decode(provided_signature_hex)
        .map_err(|_| Error::InvalidToken("Invalid signature encoding".to_string()))?;

    let mut mac = signer(config)?;
    mac.update(&random_bytes);
    let expected_signature = mac.finalize().into_bytes();

    if expected_signature.as_slice().ct_eq(&provided_signature[..]).into() {
        Ok(random_bytes)
    } else {
        Err(Error::InvalidToken("Invalid token signature".to_string()))
    }
}
