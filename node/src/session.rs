//! Session key persistence and cookie plumbing.
//!
//! Tokens themselves are signed and checked in `platter_common::session`;
//! this module owns where the signing key lives and how tokens ride in
//! cookies.

use std::path::Path;

use anyhow::Context;
use axum::http::{header, HeaderMap};
use chrono::Utc;
use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use tracing::info;

use platter_common::session::{verify_token, SessionClaims, SessionError};

/// Name of the cookie the node sets and reads.
pub const SESSION_COOKIE: &str = "platter_session";

const KEY_FILE: &str = "session-key.json";

/// On-disk form of the node's session signing key.
#[derive(Serialize, Deserialize)]
struct PersistedKey {
    /// Hex-encoded 32-byte ed25519 secret.
    secret: String,
}

/// Load the signing key from `data_dir`, generating and saving a fresh one
/// on first run. Without a data dir the key lives only in memory, so every
/// restart invalidates outstanding sessions.
pub fn load_or_generate_key(data_dir: Option<&Path>) -> anyhow::Result<SigningKey> {
    let Some(dir) = data_dir else {
        return Ok(SigningKey::generate(&mut OsRng));
    };
    let path = dir.join(KEY_FILE);
    if path.exists() {
        let data = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let persisted: PersistedKey = serde_json::from_str(&data)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        let bytes = hex::decode(&persisted.secret).context("session key is not valid hex")?;
        let secret: [u8; 32] = bytes
            .try_into()
            .map_err(|_| anyhow::anyhow!("session key must be 32 bytes"))?;
        info!("loaded session key from {}", path.display());
        Ok(SigningKey::from_bytes(&secret))
    } else {
        let key = SigningKey::generate(&mut OsRng);
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        let persisted = PersistedKey {
            secret: hex::encode(key.to_bytes()),
        };
        std::fs::write(&path, serde_json::to_string_pretty(&persisted)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("saved new session key to {}", path.display());
        Ok(key)
    }
}

/// Set-Cookie value carrying a fresh token.
pub fn session_cookie(token: &str, max_age_secs: i64) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; Max-Age={max_age_secs}; HttpOnly; SameSite=Lax")
}

/// Set-Cookie value that clears the session cookie immediately.
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax")
}

/// Pull the session token out of a Cookie request header, if present.
pub fn token_from_cookie_header(header: &str) -> Option<&str> {
    header.split(';').map(str::trim).find_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        (name == SESSION_COOKIE).then_some(value)
    })
}

/// Verify the claims presented in the request's Cookie header.
pub fn claims_from_headers(
    headers: &HeaderMap,
    key: &VerifyingKey,
) -> Result<SessionClaims, SessionError> {
    let header = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .ok_or(SessionError::Missing)?;
    let token = token_from_cookie_header(header).ok_or(SessionError::Missing)?;
    verify_token(token, key, Utc::now())
}
