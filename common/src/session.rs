use chrono::{DateTime, Utc};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};

/// Claims carried inside a session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

impl SessionClaims {
    /// Serialize the claims for signing/verification.
    pub fn signable_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("serialization should not fail")
    }
}

/// Why a presented token was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// No token was presented at all.
    Missing,
    /// Not in `payload.signature` hex form, or the payload is not claims JSON.
    Malformed,
    /// The signature does not match the node's key.
    BadSignature,
    /// Signature fine, but the expiry has passed.
    Expired,
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => write!(f, "no session token presented"),
            Self::Malformed => write!(f, "malformed session token"),
            Self::BadSignature => write!(f, "session token signature mismatch"),
            Self::Expired => write!(f, "session expired"),
        }
    }
}

impl std::error::Error for SessionError {}

/// Sign claims into a portable token: `hex(claims).hex(signature)`.
pub fn issue_token(claims: &SessionClaims, key: &SigningKey) -> String {
    let payload = claims.signable_bytes();
    let signature = key.sign(&payload);
    format!(
        "{}.{}",
        hex::encode(&payload),
        hex::encode(signature.to_bytes())
    )
}

/// Verify a token against the node's key and return its claims if the
/// signature holds and the expiry is still in the future.
pub fn verify_token(
    token: &str,
    key: &VerifyingKey,
    now: DateTime<Utc>,
) -> Result<SessionClaims, SessionError> {
    let (payload_hex, signature_hex) = token.split_once('.').ok_or(SessionError::Malformed)?;
    let payload = hex::decode(payload_hex).map_err(|_| SessionError::Malformed)?;
    let signature_bytes: [u8; 64] = hex::decode(signature_hex)
        .map_err(|_| SessionError::Malformed)?
        .try_into()
        .map_err(|_| SessionError::Malformed)?;
    let signature = Signature::from_bytes(&signature_bytes);
    key.verify(&payload, &signature)
        .map_err(|_| SessionError::BadSignature)?;
    let claims: SessionClaims =
        serde_json::from_slice(&payload).map_err(|_| SessionError::Malformed)?;
    if claims.expires_at <= now {
        return Err(SessionError::Expired);
    }
    Ok(claims)
}
