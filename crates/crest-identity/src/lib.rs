// Identity provider contract and the JWT-backed implementation.
//
// Bearer credentials are validated once at the service boundary; everything
// downstream trusts the resolved identity and never re-parses tokens.
use async_trait::async_trait;
use crest_common::{UserId, now_epoch_seconds};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

/// Expired credentials are distinguishable from invalid ones so clients can
/// re-authenticate instead of re-submitting with different data.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("credential expired")]
    Expired,
    #[error("invalid credential: {0}")]
    Invalid(String),
}

/// Caller identity resolved from a validated credential.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Identity {
    pub user_id: UserId,
    pub display_name: String,
}

/// Validates a bearer credential and yields the stable user identity.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn validate(&self, credential: &str) -> AuthResult<Identity>;
}

/// Claims carried by crest bearer tokens.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BearerClaims {
    pub iss: String,
    pub aud: String,
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl BearerClaims {
    // Display name preference: preferred_username, then name, then the
    // subject itself.
    fn display_name(&self) -> String {
        self.preferred_username
            .clone()
            .or_else(|| self.name.clone())
            .unwrap_or_else(|| self.sub.clone())
    }
}

/// HS256 verifier for crest bearer tokens.
///
/// Issuer and audience must match the values the token was minted with;
/// signature and expiry checks are delegated to `jsonwebtoken`.
pub struct JwtIdentityProvider {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityProvider {
    pub fn new(secret: &[u8], issuer: &str, audience: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        validation.leeway = 60;
        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn validate(&self, credential: &str) -> AuthResult<Identity> {
        let token =
            jsonwebtoken::decode::<BearerClaims>(credential, &self.decoding_key, &self.validation)
                .map_err(|err| match err.kind() {
                    ErrorKind::ExpiredSignature => AuthError::Expired,
                    _ => AuthError::Invalid(err.to_string()),
                })?;
        let claims = token.claims;
        if claims.sub.is_empty() {
            return Err(AuthError::Invalid("empty subject".to_string()));
        }
        let display_name = claims.display_name();
        Ok(Identity {
            user_id: UserId::new(claims.sub),
            display_name,
        })
    }
}

/// Mints bearer tokens with the claim shape `JwtIdentityProvider` verifies.
///
/// Used by dev login flows and test setups; production deployments normally
/// point the verifier at an external issuer instead.
pub struct IdentityIssuer {
    encoding_key: EncodingKey,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl IdentityIssuer {
    pub fn new(
        secret: &[u8],
        issuer: impl Into<String>,
        audience: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            issuer: issuer.into(),
            audience: audience.into(),
            ttl,
        }
    }

    pub fn mint(&self, user_id: &str, display_name: &str) -> AuthResult<String> {
        let now = now_epoch_seconds();
        let claims = BearerClaims {
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            sub: user_id.to_string(),
            preferred_username: Some(display_name.to_string()),
            name: None,
            exp: now + self.ttl.as_secs() as i64,
            iat: now,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| AuthError::Invalid(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret";
    const ISSUER: &str = "crest-auth";
    const AUDIENCE: &str = "crest-leaderboard";

    fn provider() -> JwtIdentityProvider {
        JwtIdentityProvider::new(SECRET, ISSUER, AUDIENCE)
    }

    fn issuer() -> IdentityIssuer {
        IdentityIssuer::new(SECRET, ISSUER, AUDIENCE, Duration::from_secs(900))
    }

    fn encode_claims(claims: &BearerClaims) -> String {
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(SECRET),
        )
        .expect("encode")
    }

    #[tokio::test]
    async fn mint_and_validate_round_trip() {
        let token = issuer().mint("u1", "alice").expect("mint");
        let identity = provider().validate(&token).await.expect("validate");
        assert_eq!(identity.user_id, UserId::new("u1"));
        assert_eq!(identity.display_name, "alice");
    }

    #[tokio::test]
    async fn expired_credential_is_distinguished() {
        let now = now_epoch_seconds();
        let claims = BearerClaims {
            iss: ISSUER.to_string(),
            aud: AUDIENCE.to_string(),
            sub: "u1".to_string(),
            preferred_username: Some("alice".to_string()),
            name: None,
            exp: now - 3_600,
            iat: now - 7_200,
        };
        let err = provider()
            .validate(&encode_claims(&claims))
            .await
            .expect_err("expired");
        assert!(matches!(err, AuthError::Expired));
    }

    #[tokio::test]
    async fn wrong_issuer_is_invalid() {
        let token = IdentityIssuer::new(SECRET, "someone-else", AUDIENCE, Duration::from_secs(900))
            .mint("u1", "alice")
            .expect("mint");
        let err = provider().validate(&token).await.expect_err("issuer");
        assert!(matches!(err, AuthError::Invalid(_)));
    }

    #[tokio::test]
    async fn garbage_credential_is_invalid() {
        let err = provider()
            .validate("not-a-token")
            .await
            .expect_err("garbage");
        assert!(matches!(err, AuthError::Invalid(_)));
    }

    #[tokio::test]
    async fn tampered_signature_is_invalid() {
        let mut token = issuer().mint("u1", "alice").expect("mint");
        token.push('x');
        let err = provider().validate(&token).await.expect_err("tampered");
        assert!(matches!(err, AuthError::Invalid(_)));
    }

    #[tokio::test]
    async fn display_name_falls_back_to_name_then_subject() {
        let now = now_epoch_seconds();
        let mut claims = BearerClaims {
            iss: ISSUER.to_string(),
            aud: AUDIENCE.to_string(),
            sub: "u1".to_string(),
            preferred_username: None,
            name: Some("Alice Example".to_string()),
            exp: now + 900,
            iat: now,
        };
        let identity = provider()
            .validate(&encode_claims(&claims))
            .await
            .expect("validate");
        assert_eq!(identity.display_name, "Alice Example");

        claims.name = None;
        let identity = provider()
            .validate(&encode_claims(&claims))
            .await
            .expect("validate");
        assert_eq!(identity.display_name, "u1");
    }

    #[tokio::test]
    async fn empty_subject_is_invalid() {
        let now = now_epoch_seconds();
        let claims = BearerClaims {
            iss: ISSUER.to_string(),
            aud: AUDIENCE.to_string(),
            sub: String::new(),
            preferred_username: None,
            name: None,
            exp: now + 900,
            iat: now,
        };
        let err = provider()
            .validate(&encode_claims(&claims))
            .await
            .expect_err("empty subject");
        assert!(matches!(err, AuthError::Invalid(_)));
    }
}
