use std::fmt;
use std::str::FromStr;

use argon2::password_hash::{rand_core::OsRng, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Argon2, PasswordHash};
use base64::prelude::*;

use crate::AuthError;

const ARGON2_PREFIX: &str = "$argon2";

/// How new passwords are encoded before they are stored.
///
/// `LegacyBase64` keeps the reversible encoding already present in existing
/// user documents. `Argon2` stores a PHC string; legacy documents still verify
/// and are re-encoded on the next successful sign-in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PasswordScheme {
    #[default]
    LegacyBase64,
    Argon2,
}

impl PasswordScheme {
    pub fn encode(&self, password: &str) -> Result<String, AuthError> {
        match self {
            PasswordScheme::LegacyBase64 => Ok(BASE64_STANDARD.encode(password)),
            PasswordScheme::Argon2 => {
                let salt = SaltString::generate(&mut OsRng);
                Argon2::default()
                    .hash_password(password.as_bytes(), &salt)
                    .map(|hash| hash.to_string())
                    .map_err(|err| AuthError::Hashing(err.to_string()))
            }
        }
    }

    /// Checks a candidate against a stored credential of either encoding.
    pub fn verify(stored: &str, candidate: &str) -> bool {
        if stored.starts_with(ARGON2_PREFIX) {
            PasswordHash::new(stored)
                .map(|hash| {
                    Argon2::default()
                        .verify_password(candidate.as_bytes(), &hash)
                        .is_ok()
                })
                .unwrap_or(false)
        } else {
            BASE64_STANDARD.encode(candidate) == stored
        }
    }

    pub fn needs_rehash(&self, stored: &str) -> bool {
        matches!(self, PasswordScheme::Argon2) && !stored.starts_with(ARGON2_PREFIX)
    }
}

impl fmt::Display for PasswordScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PasswordScheme::LegacyBase64 => write!(f, "legacy-base64"),
            PasswordScheme::Argon2 => write!(f, "argon2"),
        }
    }
}

impl FromStr for PasswordScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "legacy-base64" | "base64" => Ok(PasswordScheme::LegacyBase64),
            "argon2" => Ok(PasswordScheme::Argon2),
            other => Err(format!("unknown password scheme: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_encoding_is_plain_base64() {
        let stored = PasswordScheme::LegacyBase64.encode("secret1").unwrap();
        assert_eq!(stored, "c2VjcmV0MQ==");
        assert!(PasswordScheme::verify(&stored, "secret1"));
        assert!(!PasswordScheme::verify(&stored, "secret2"));
    }

    #[test]
    fn argon2_hashes_verify_and_are_salted() {
        let first = PasswordScheme::Argon2.encode("secret1").unwrap();
        let second = PasswordScheme::Argon2.encode("secret1").unwrap();
        assert_ne!(first, second);
        assert!(PasswordScheme::verify(&first, "secret1"));
        assert!(!PasswordScheme::verify(&first, "secret2"));
    }

    #[test]
    fn rehash_only_when_upgrading() {
        let legacy = PasswordScheme::LegacyBase64.encode("secret1").unwrap();
        assert!(PasswordScheme::Argon2.needs_rehash(&legacy));
        assert!(!PasswordScheme::LegacyBase64.needs_rehash(&legacy));

        let hashed = PasswordScheme::Argon2.encode("secret1").unwrap();
        assert!(!PasswordScheme::Argon2.needs_rehash(&hashed));
    }

    #[test]
    fn parses_scheme_names() {
        assert_eq!("argon2".parse(), Ok(PasswordScheme::Argon2));
        assert_eq!("Legacy-Base64".parse(), Ok(PasswordScheme::LegacyBase64));
        assert!("md5".parse::<PasswordScheme>().is_err());
    }
}
