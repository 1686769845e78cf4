use chrono::{TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{AuthError, Role};

pub const ISSUER: &str = "meal-maker-functions";

const BEARER: &str = "Bearer";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Phone number of the authenticated user.
    pub sub: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: TimeDelta,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], ttl: TimeDelta) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.set_audience(&[
            Role::Client.audience(),
            Role::Partner.audience(),
            Role::Admin.audience(),
        ]);
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    pub fn issue(&self, subject: &str, role: Role) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            iss: ISSUER.to_string(),
            aud: role.audience().to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(AuthError::Issue)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| {
                tracing::debug!(%err, "token rejected");
                AuthError::InvalidToken
            })
    }
}

/// Pulls the token out of an `Authorization: Bearer <token>` header value.
pub fn extract_bearer(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(AuthError::MissingAuthorization)?;
    let (scheme, token) = header
        .split_once(' ')
        .ok_or(AuthError::MalformedAuthorization)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case(BEARER) || token.is_empty() {
        return Err(AuthError::MalformedAuthorization);
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(b"test-secret", TimeDelta::hours(1))
    }

    #[test]
    fn issued_token_verifies_with_expected_claims() {
        let issuer = issuer();
        let token = issuer.issue("+5511999999999", Role::Client).unwrap();
        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, "+5511999999999");
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.aud, "client");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let issuer = issuer();
        let token = issuer.issue("+5511999999999", Role::Client).unwrap();
        let (head, signature) = token.rsplit_once('.').unwrap();
        for position in 0..signature.len() {
            let mut bytes = signature.as_bytes().to_vec();
            bytes[position] = if bytes[position] == b'A' { b'g' } else { b'A' };
            let tampered = format!("{head}.{}", String::from_utf8(bytes).unwrap());
            assert!(
                matches!(issuer.verify(&tampered), Err(AuthError::InvalidToken)),
                "signature byte {position} altered but token still verified"
            );
        }
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let other = TokenIssuer::new(b"another-secret", TimeDelta::hours(1));
        let token = other.issue("+5511999999999", Role::Client).unwrap();
        assert!(issuer().verify(&token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let expired = TokenIssuer::new(b"test-secret", TimeDelta::hours(-2));
        let token = expired.issue("+5511999999999", Role::Client).unwrap();
        assert!(issuer().verify(&token).is_err());
    }

    #[test]
    fn bearer_header_parsing() {
        assert_eq!(extract_bearer(Some("Bearer abc.def")).unwrap(), "abc.def");
        assert_eq!(extract_bearer(Some("bearer  abc")).unwrap(), "abc");
        assert!(matches!(
            extract_bearer(None),
            Err(AuthError::MissingAuthorization)
        ));
        assert!(matches!(
            extract_bearer(Some("")),
            Err(AuthError::MissingAuthorization)
        ));
        assert!(matches!(
            extract_bearer(Some("Bearer")),
            Err(AuthError::MalformedAuthorization)
        ));
        assert!(matches!(
            extract_bearer(Some("Bearer   ")),
            Err(AuthError::MissingAuthorization | AuthError::MalformedAuthorization)
        ));
        assert!(matches!(
            extract_bearer(Some("Basic abc")),
            Err(AuthError::MalformedAuthorization)
        ));
    }
}
