use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique food-item identifier (store-assigned, monotonically increasing).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FoodId(pub String);

impl std::fmt::Display for FoodId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A listed food item with live stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodItem {
    pub id: FoodId,
    /// Unique across the market; purchases resolve items by this name.
    pub name: String,
    pub image: String,
    pub category: String,
    /// Units currently in stock. Never negative.
    pub quantity: u32,
    pub price: f64,
    pub origin: String,
    pub description: String,
    /// Email of the seller who listed the item.
    pub added_by: String,
    /// Units sold so far. Only ever grows.
    pub purchase_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FoodItem {
    /// Returns true if the current stock covers `requested` units.
    pub fn can_supply(&self, requested: u32) -> bool {
        requested <= self.quantity
    }
}
