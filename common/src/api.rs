use serde::{Deserialize, Serialize};

use crate::purchase::{PurchaseId, PurchaseStatus};
use crate::user::UserId;

/// A request field failed validation. Raised before any store access, so a
/// rejected request leaves no trace behind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationError {
    MissingField(&'static str),
    EmptyField(&'static str),
    InvalidField {
        field: &'static str,
        reason: &'static str,
    },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing required field: {field}"),
            Self::EmptyField(field) => write!(f, "field must not be empty: {field}"),
            Self::InvalidField { field, reason } => write!(f, "invalid {field}: {reason}"),
        }
    }
}

impl std::error::Error for ValidationError {}

fn require_string(value: &Option<String>, field: &'static str) -> Result<String, ValidationError> {
    match value {
        None => Err(ValidationError::MissingField(field)),
        Some(s) if s.trim().is_empty() => Err(ValidationError::EmptyField(field)),
        Some(s) => Ok(s.clone()),
    }
}

fn require_price(value: Option<f64>, field: &'static str) -> Result<f64, ValidationError> {
    let price = value.ok_or(ValidationError::MissingField(field))?;
    if !price.is_finite() || price < 0.0 {
        return Err(ValidationError::InvalidField {
            field,
            reason: "must be a non-negative number",
        });
    }
    Ok(price)
}

fn require_quantity(value: Option<i64>, field: &'static str) -> Result<u32, ValidationError> {
    let quantity = value.ok_or(ValidationError::MissingField(field))?;
    if quantity < 0 {
        return Err(ValidationError::InvalidField {
            field,
            reason: "must not be negative",
        });
    }
    u32::try_from(quantity).map_err(|_| ValidationError::InvalidField {
        field,
        reason: "exceeds the supported range",
    })
}

/// Decode a raw JSON body into a payload type, folding shape errors (a
/// wrong-typed field, an array where an object belongs) into validation
/// errors instead of body-decode rejections.
fn from_json_value<T: serde::de::DeserializeOwned>(
    value: serde_json::Value,
    reason: &'static str,
) -> Result<T, ValidationError> {
    serde_json::from_value(value).map_err(|_| ValidationError::InvalidField {
        field: "body",
        reason,
    })
}

/// Inbound purchase submission. Fields are optional so that absent or null
/// values surface as validation errors rather than body-decode rejections.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PurchaseBody {
    pub food_name: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<i64>,
    pub buyer_name: Option<String>,
    pub buyer_email: Option<String>,
    pub buying_date: Option<String>,
}

impl PurchaseBody {
    pub fn from_value(value: serde_json::Value) -> Result<Self, ValidationError> {
        from_json_value(value, "malformed purchase payload")
    }

    /// Check every field and produce a typed request. Fields are checked in
    /// declaration order and the first failure wins.
    pub fn validate(&self) -> Result<PurchaseRequest, ValidationError> {
        let food_name = require_string(&self.food_name, "foodName")?;
        let unit_price = require_price(self.price, "price")?;
        let quantity = require_quantity(self.quantity, "quantity")?;
        if quantity == 0 {
            return Err(ValidationError::InvalidField {
                field: "quantity",
                reason: "must be at least 1",
            });
        }
        let buyer_name = require_string(&self.buyer_name, "buyerName")?;
        let buyer_email = require_string(&self.buyer_email, "buyerEmail")?;
        let buying_date = require_string(&self.buying_date, "buyingDate")?;
        Ok(PurchaseRequest {
            food_name,
            unit_price,
            quantity,
            buyer_name,
            buyer_email,
            buying_date,
        })
    }
}

/// A fully validated purchase submission, ready for the store.
#[derive(Clone, Debug, PartialEq)]
pub struct PurchaseRequest {
    pub food_name: String,
    pub unit_price: f64,
    pub quantity: u32,
    pub buyer_name: String,
    pub buyer_email: String,
    pub buying_date: String,
}

/// Inbound food listing, used for both create and full-overwrite update.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FoodBody {
    pub name: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<i64>,
    pub price: Option<f64>,
    pub origin: Option<String>,
    pub description: Option<String>,
    pub added_by: Option<String>,
}

impl FoodBody {
    pub fn from_value(value: serde_json::Value) -> Result<Self, ValidationError> {
        from_json_value(value, "malformed food payload")
    }

    /// Check every field and produce a typed draft. Zero stock is fine;
    /// sellers may list an item before it is available.
    pub fn validate(&self) -> Result<FoodDraft, ValidationError> {
        Ok(FoodDraft {
            name: require_string(&self.name, "name")?,
            image: require_string(&self.image, "image")?,
            category: require_string(&self.category, "category")?,
            quantity: require_quantity(self.quantity, "quantity")?,
            price: require_price(self.price, "price")?,
            origin: require_string(&self.origin, "origin")?,
            description: require_string(&self.description, "description")?,
            added_by: require_string(&self.added_by, "addedBy")?,
        })
    }
}

/// A validated food listing without store-assigned fields.
#[derive(Clone, Debug, PartialEq)]
pub struct FoodDraft {
    pub name: String,
    pub image: String,
    pub category: String,
    pub quantity: u32,
    pub price: f64,
    pub origin: String,
    pub description: String,
    pub added_by: String,
}

/// Inbound account registration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserBody {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(alias = "photoURL")]
    pub photo_url: Option<String>,
}

impl UserBody {
    pub fn from_value(value: serde_json::Value) -> Result<Self, ValidationError> {
        from_json_value(value, "malformed user payload")
    }

    pub fn validate(&self) -> Result<UserDraft, ValidationError> {
        Ok(UserDraft {
            name: require_string(&self.name, "name")?,
            email: require_string(&self.email, "email")?,
            password: require_string(&self.password, "password")?,
            photo_url: require_string(&self.photo_url, "photoURL")?,
        })
    }
}

/// A validated registration with the password still in the clear. The store
/// hashes it before anything is written.
#[derive(Clone, Debug, PartialEq)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
    pub password: String,
    pub photo_url: String,
}

/// Inbound session request: who the cookie should be minted for.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionBody {
    pub email: Option<String>,
}

impl SessionBody {
    pub fn from_value(value: serde_json::Value) -> Result<Self, ValidationError> {
        from_json_value(value, "malformed session payload")
    }

    pub fn validate(&self) -> Result<String, ValidationError> {
        require_string(&self.email, "email")
    }
}

/// Inbound purchase status change.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusBody {
    pub status: Option<String>,
}

impl StatusBody {
    pub fn from_value(value: serde_json::Value) -> Result<Self, ValidationError> {
        from_json_value(value, "malformed status payload")
    }

    pub fn validate(&self) -> Result<PurchaseStatus, ValidationError> {
        let status = require_string(&self.status, "status")?;
        status.parse().map_err(|_| ValidationError::InvalidField {
            field: "status",
            reason: "must be one of Pending, Completed, Cancelled",
        })
    }
}

/// Receipt returned after a committed purchase.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseReceipt {
    pub purchase_id: PurchaseId,
    /// Stock left on the item after this purchase.
    pub updated_quantity: u32,
    /// The item's lifetime units sold after this purchase.
    pub updated_purchase_count: u32,
}

/// Returned on successful registration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: UserId,
}

/// Plain acknowledgement for operations with nothing else to report.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Liveness snapshot served at the health endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub users: usize,
    pub foods: usize,
    pub purchases: usize,
}
