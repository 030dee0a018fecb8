use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique user identifier (store-assigned, monotonically increasing).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered account as the store keeps it. The password hash never
/// leaves the node; hand out a [`UserView`] instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Unique across the market, matched exactly.
    pub email: String,
    pub password_hash: String,
    pub photo_url: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The credential-free form served over the wire.
    pub fn view(&self) -> UserView {
        UserView {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            photo_url: self.photo_url.clone(),
            created_at: self.created_at,
        }
    }
}

/// Wire form of a user account: everything except the credential hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub photo_url: String,
    pub created_at: DateTime<Utc>,
}
