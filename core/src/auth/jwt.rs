use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::config::{AuthConfig, TokenAlgorithm};
use crate::errors::AuthError;

const BEARER_PREFIX: &str = "bearer ";

/// Claims the API relies on. Unknown claims are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct JwtPayload {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
}

/// Pulls the token out of an `Authorization: Bearer <token>` header value.
pub fn extract_bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = match header {
        Some(value) if !value.trim().is_empty() => value.trim(),
        _ => return Err(AuthError::MissingHeader),
    };

    let prefix_matches = header
        .get(..BEARER_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(BEARER_PREFIX));
    if !prefix_matches {
        return Err(AuthError::InvalidHeader);
    }

    let token = header[BEARER_PREFIX.len()..].trim();
    if token.is_empty() {
        return Err(AuthError::InvalidHeader);
    }
    Ok(token)
}

/// Reads `sub` from a token without checking its signature.
///
/// Only call this behind the API Gateway authorizer, which has already
/// verified the same token.
pub fn user_id_from_token(token: &str) -> Result<String, AuthError> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<JwtPayload>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims.sub)
        .map_err(|e| AuthError::InvalidToken {
            reason: e.to_string(),
        })
}

pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn from_config(config: &AuthConfig) -> Result<Self, AuthError> {
        // Keys passed through environment variables often carry escaped newlines.
        let key_material = config.key.replace("\\n", "\n");

        let (key, algorithm) = match config.algorithm {
            TokenAlgorithm::Rs256 => {
                let key = DecodingKey::from_rsa_pem(key_material.as_bytes()).map_err(|e| {
                    AuthError::InvalidKey {
                        reason: e.to_string(),
                    }
                })?;
                (key, Algorithm::RS256)
            }
            TokenAlgorithm::Hs256 => (
                DecodingKey::from_secret(key_material.as_bytes()),
                Algorithm::HS256,
            ),
        };

        let mut validation = Validation::new(algorithm);
        match &config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }

        Ok(Self { key, validation })
    }

    pub fn verify(&self, token: &str) -> Result<JwtPayload, AuthError> {
        decode::<JwtPayload>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidToken {
                reason: e.to_string(),
            })
    }

    /// Verifies the token carried by an `Authorization` header value.
    pub fn verify_header(&self, header: Option<&str>) -> Result<JwtPayload, AuthError> {
        let token = extract_bearer_token(header)?;
        self.verify(token)
    }
}
