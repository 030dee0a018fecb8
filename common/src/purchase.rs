use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique purchase identifier (store-assigned, monotonically increasing).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PurchaseId(pub String);

impl std::fmt::Display for PurchaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a purchase. Every purchase starts out `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PurchaseStatus {
    /// Recorded and stock reserved, not yet handed over.
    Pending,
    /// Handed over to the buyer.
    Completed,
    /// Called off; the record stays for history.
    Cancelled,
}

impl PurchaseStatus {
    /// Returns true if transitioning from self to `next` is valid. Nothing
    /// moves out of a terminal state, and nothing moves back to `Pending`.
    pub fn can_transition_to(self, next: PurchaseStatus) -> bool {
        !self.is_terminal() && !matches!(next, PurchaseStatus::Pending)
    }

    /// Completed and Cancelled never change again.
    pub fn is_terminal(self) -> bool {
        !matches!(self, PurchaseStatus::Pending)
    }
}

impl std::str::FromStr for PurchaseStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(PurchaseStatus::Pending),
            "Completed" => Ok(PurchaseStatus::Completed),
            "Cancelled" => Ok(PurchaseStatus::Cancelled),
            _ => Err(()),
        }
    }
}

/// A committed purchase. Everything except `status` is frozen at commit
/// time; later edits to the food item never reach back into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: PurchaseId,
    /// Name of the food item at purchase time, not its id.
    pub food_name: String,
    /// Price snapshot taken when the purchase was submitted.
    pub unit_price: f64,
    pub quantity: u32,
    pub buyer_name: String,
    pub buyer_email: String,
    /// Client-supplied purchase date, stored verbatim.
    pub buying_date: String,
    pub status: PurchaseStatus,
    pub created_at: DateTime<Utc>,
}
