//! User identity resolution and the local user registry.
//!
//! Identity is advisory: it partitions data, it does not authenticate.
//! Resolution order for a request:
//! 1) Value of the configured identity header
//! 2) Configured fallback scope (unless `identity.required` is set, in
//!    which case the request is rejected instead)
//!
//! The registry stores locally registered usernames with a
//! non-cryptographic 32-bit hash. It only exists to namespace local
//! collections; nothing server-side ever trusts it.

use std::path::PathBuf;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::IdentityConfig;
use crate::error::{Error, Result};
use crate::storage;

/// Default request header carrying the user scope key
pub const DEFAULT_USER_HEADER: &str = "x-user-id";

/// Scope used when no identity is supplied. Effectively a public shared
/// bucket; a known limitation, not a security boundary.
pub const FALLBACK_SCOPE: &str = "shared";

const MIN_USERNAME_LEN: usize = 3;
const MIN_PASSWORD_LEN: usize = 4;

/// Resolve the user scope for a request from its identity header value.
pub fn resolve_user(header_value: Option<&str>, config: &IdentityConfig) -> Result<String> {
    if let Some(value) = non_empty(header_value) {
        return Ok(value.to_string());
    }
    if config.required {
        return Err(Error::IdentityRequired(config.header.clone()));
    }
    Ok(config.fallback.clone())
}

/// Generate a durable opaque client identifier
pub fn generate_client_id() -> String {
    format!("user_{}", Uuid::new_v4())
}

/// The classic `((h << 5) - h) + c` 32-bit string hash, rendered in base
/// 36 with the sign preserved. Not secure; only used to avoid storing raw
/// passwords in the local registry.
pub fn simple_hash(input: &str) -> String {
    let mut hash: i32 = 0;
    for ch in input.chars() {
        let code = ch as u32 as i32;
        hash = hash.wrapping_shl(5).wrapping_sub(hash).wrapping_add(code);
    }
    to_base36(hash)
}

fn to_base36(value: i32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let negative = value < 0;
    let mut v = (value as i64).unsigned_abs();
    let mut out = Vec::new();
    while v > 0 {
        out.push(DIGITS[(v % 36) as usize]);
        v /= 36;
    }
    if negative {
        out.push(b'-');
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

fn non_empty(input: Option<&str>) -> Option<&str> {
    input.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}

/// A locally registered user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalUser {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub created_at: i64,
}

/// Registry of local users, persisted as a single JSON file
#[derive(Debug, Clone)]
pub struct LocalUsers {
    path: PathBuf,
}

impl LocalUsers {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Register a new local user. Usernames are unique.
    pub fn register(&self, username: &str, password: &str) -> Result<LocalUser> {
        let username = username.trim();
        if username.len() < MIN_USERNAME_LEN {
            return Err(Error::Validation(format!(
                "username must be at least {MIN_USERNAME_LEN} characters long"
            )));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(Error::Validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters long"
            )));
        }

        let mut users = self.list()?;
        if users.iter().any(|user| user.username == username) {
            return Err(Error::Validation(format!(
                "username already taken: {username}"
            )));
        }

        let user = LocalUser {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            password_hash: simple_hash(password),
            created_at: Utc::now().timestamp_millis(),
        };
        users.push(user.clone());
        storage::write_json(&self.path, &users)?;
        Ok(user)
    }

    /// Verify a username/password pair against the registry.
    pub fn verify(&self, username: &str, password: &str) -> Result<LocalUser> {
        let users = self.list()?;
        let user = users
            .into_iter()
            .find(|user| user.username == username.trim())
            .ok_or_else(|| Error::UserNotFound(username.trim().to_string()))?;
        if user.password_hash != simple_hash(password) {
            return Err(Error::Validation("incorrect password".to_string()));
        }
        Ok(user)
    }

    /// All registered users, registration order.
    pub fn list(&self) -> Result<Vec<LocalUser>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        storage::read_json(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IdentityConfig;
    use tempfile::TempDir;

    #[test]
    fn header_value_wins() {
        let config = IdentityConfig::default();
        let user = resolve_user(Some("user_abc"), &config).unwrap();
        assert_eq!(user, "user_abc");
    }

    #[test]
    fn missing_header_falls_back_to_shared_scope() {
        let config = IdentityConfig::default();
        assert_eq!(resolve_user(None, &config).unwrap(), FALLBACK_SCOPE);
        assert_eq!(resolve_user(Some("  "), &config).unwrap(), FALLBACK_SCOPE);
    }

    #[test]
    fn required_mode_rejects_missing_header() {
        let config = IdentityConfig {
            required: true,
            ..IdentityConfig::default()
        };
        assert!(matches!(
            resolve_user(None, &config),
            Err(Error::IdentityRequired(_))
        ));
    }

    #[test]
    fn simple_hash_matches_reference_values() {
        // Known-good values for the JS-style 32-bit hash.
        assert_eq!(simple_hash(""), "0");
        assert_eq!(simple_hash("a"), "2p");
        assert_eq!(simple_hash("abc"), "22ci");
        assert_eq!(simple_hash("hello"), "1n1e4y");
        assert_eq!(simple_hash("s3cret"), "-fr2dmq");
    }

    #[test]
    fn register_and_verify_roundtrip() {
        let temp = TempDir::new().unwrap();
        let registry = LocalUsers::new(temp.path().join("users.json"));

        let user = registry.register("alice", "s3cret").unwrap();
        assert_eq!(user.username, "alice");
        assert_ne!(user.password_hash, "s3cret");

        let verified = registry.verify("alice", "s3cret").unwrap();
        assert_eq!(verified.id, user.id);

        assert!(matches!(
            registry.verify("alice", "wrong"),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            registry.verify("bob", "s3cret"),
            Err(Error::UserNotFound(_))
        ));
    }

    #[test]
    fn register_enforces_length_and_uniqueness() {
        let temp = TempDir::new().unwrap();
        let registry = LocalUsers::new(temp.path().join("users.json"));

        assert!(matches!(
            registry.register("al", "s3cret"),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            registry.register("alice", "pw"),
            Err(Error::Validation(_))
        ));

        registry.register("alice", "s3cret").unwrap();
        assert!(matches!(
            registry.register("alice", "other1"),
            Err(Error::Validation(_))
        ));
    }
}
