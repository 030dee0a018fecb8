//! In-memory market state with JSON snapshot persistence.
//!
//! Every mutation goes through [`MarketStore::commit`]: the change is staged
//! on a working copy, flushed to disk, and only then swapped into memory.
//! Readers and writers share one `RwLock`, so the purchase path's
//! check-then-decrement is a single critical section.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

use platter_common::api::{FoodDraft, PurchaseReceipt, PurchaseRequest, UserDraft};
use platter_common::food::{FoodId, FoodItem};
use platter_common::purchase::{Purchase, PurchaseId, PurchaseStatus};
use platter_common::user::{User, UserId};

const SNAPSHOT_FILE: &str = "market.json";

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no food item matching '{0}'")]
    FoodNotFound(String),
    #[error("no purchase matching '{0}'")]
    PurchaseNotFound(String),
    #[error("a user with email '{0}' already exists")]
    DuplicateEmail(String),
    #[error("a food item named '{0}' already exists")]
    DuplicateFoodName(String),
    #[error("insufficient stock: {available} available, {requested} requested")]
    InsufficientStock { available: u32, requested: u32 },
    #[error("purchase is {from:?} and cannot become {to:?}")]
    InvalidTransition {
        from: PurchaseStatus,
        to: PurchaseStatus,
    },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Everything the node persists, serialized as one JSON document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarketState {
    users: Vec<User>,
    foods: Vec<FoodItem>,
    purchases: Vec<Purchase>,
    next_user_id: u32,
    next_food_id: u32,
    next_purchase_id: u32,
}

impl Default for MarketState {
    fn default() -> Self {
        Self {
            users: Vec::new(),
            foods: Vec::new(),
            purchases: Vec::new(),
            next_user_id: 1,
            next_food_id: 1,
            next_purchase_id: 1,
        }
    }
}

/// The market's single storage handle.
pub struct MarketStore {
    state: RwLock<MarketState>,
    snapshot: Option<PathBuf>,
}

impl MarketStore {
    /// A store that keeps everything in memory and writes nothing to disk.
    pub fn in_memory() -> Self {
        Self {
            state: RwLock::new(MarketState::default()),
            snapshot: None,
        }
    }

    /// Open (or create) the snapshot under `data_dir` and load its contents.
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(data_dir).map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let path = data_dir.join(SNAPSHOT_FILE);
        let state = if path.exists() {
            let data = std::fs::read_to_string(&path)
                .map_err(|e| StoreError::Unavailable(e.to_string()))?;
            let state: MarketState =
                serde_json::from_str(&data).map_err(|e| StoreError::Unavailable(e.to_string()))?;
            info!(
                "loaded market snapshot from {} ({} users, {} foods, {} purchases)",
                path.display(),
                state.users.len(),
                state.foods.len(),
                state.purchases.len()
            );
            state
        } else {
            MarketState::default()
        };
        Ok(Self {
            state: RwLock::new(state),
            snapshot: Some(path),
        })
    }

    /// Apply a mutation to a working copy of the state, flush the copy to
    /// the snapshot file, then swap it in. The swap is the commit point: a
    /// failed flush leaves both memory and disk exactly as they were.
    async fn commit<T>(
        &self,
        mutate: impl FnOnce(&mut MarketState) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.state.write().await;
        let mut next = guard.clone();
        let value = mutate(&mut next)?;
        self.flush(&next)?;
        *guard = next;
        Ok(value)
    }

    fn flush(&self, state: &MarketState) -> Result<(), StoreError> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };
        let data = serde_json::to_string_pretty(state)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        // Write-then-rename keeps the snapshot whole even if we die mid-write.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &data).map_err(|e| StoreError::Unavailable(e.to_string()))?;
        std::fs::rename(&tmp, path).map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(())
    }

    // ─── Users ──────────────────────────────────────────────────────────────

    pub async fn register_user(&self, draft: &UserDraft) -> Result<User, StoreError> {
        let now = Utc::now();
        self.commit(|state| {
            if state.users.iter().any(|u| u.email == draft.email) {
                return Err(StoreError::DuplicateEmail(draft.email.clone()));
            }
            let user = User {
                id: UserId(format!("u-{}", state.next_user_id)),
                name: draft.name.clone(),
                email: draft.email.clone(),
                password_hash: sha256_hex(&draft.password),
                photo_url: draft.photo_url.clone(),
                created_at: now,
            };
            state.next_user_id += 1;
            state.users.push(user.clone());
            Ok(user)
        })
        .await
    }

    pub async fn list_users(&self) -> Vec<User> {
        self.state.read().await.users.clone()
    }

    // ─── Foods ──────────────────────────────────────────────────────────────

    pub async fn create_food(&self, draft: &FoodDraft) -> Result<FoodItem, StoreError> {
        let now = Utc::now();
        self.commit(|state| {
            if state.foods.iter().any(|f| f.name == draft.name) {
                return Err(StoreError::DuplicateFoodName(draft.name.clone()));
            }
            let food = FoodItem {
                id: FoodId(format!("f-{}", state.next_food_id)),
                name: draft.name.clone(),
                image: draft.image.clone(),
                category: draft.category.clone(),
                quantity: draft.quantity,
                price: draft.price,
                origin: draft.origin.clone(),
                description: draft.description.clone(),
                added_by: draft.added_by.clone(),
                purchase_count: 0,
                created_at: now,
                updated_at: now,
            };
            state.next_food_id += 1;
            state.foods.push(food.clone());
            Ok(food)
        })
        .await
    }

    pub async fn list_foods(&self) -> Vec<FoodItem> {
        self.state.read().await.foods.clone()
    }

    pub async fn get_food(&self, id: &str) -> Result<FoodItem, StoreError> {
        self.state
            .read()
            .await
            .foods
            .iter()
            .find(|f| f.id.0 == id)
            .cloned()
            .ok_or_else(|| StoreError::FoodNotFound(id.to_string()))
    }

    /// Full overwrite of a listing. `purchase_count` and `created_at` are
    /// store-owned and survive the overwrite.
    pub async fn update_food(&self, id: &str, draft: &FoodDraft) -> Result<FoodItem, StoreError> {
        let now = Utc::now();
        self.commit(|state| {
            let idx = state
                .foods
                .iter()
                .position(|f| f.id.0 == id)
                .ok_or_else(|| StoreError::FoodNotFound(id.to_string()))?;
            if state
                .foods
                .iter()
                .any(|f| f.name == draft.name && f.id.0 != id)
            {
                return Err(StoreError::DuplicateFoodName(draft.name.clone()));
            }
            let food = &mut state.foods[idx];
            food.name = draft.name.clone();
            food.image = draft.image.clone();
            food.category = draft.category.clone();
            food.quantity = draft.quantity;
            food.price = draft.price;
            food.origin = draft.origin.clone();
            food.description = draft.description.clone();
            food.added_by = draft.added_by.clone();
            food.updated_at = now;
            Ok(food.clone())
        })
        .await
    }

    // ─── Purchases ──────────────────────────────────────────────────────────

    /// Commit a validated purchase: record it and take the stock in one step.
    ///
    /// The name lookup, the stock check, and both writes happen under a
    /// single write lock, so two buyers can never spend the same unit. On
    /// any error nothing is written at all.
    pub async fn submit_purchase(
        &self,
        request: &PurchaseRequest,
    ) -> Result<PurchaseReceipt, StoreError> {
        let now = Utc::now();
        self.commit(|state| {
            let idx = state
                .foods
                .iter()
                .position(|f| f.name == request.food_name)
                .ok_or_else(|| StoreError::FoodNotFound(request.food_name.clone()))?;
            let available = state.foods[idx].quantity;
            if !state.foods[idx].can_supply(request.quantity) {
                return Err(StoreError::InsufficientStock {
                    available,
                    requested: request.quantity,
                });
            }
            let id = PurchaseId(format!("p-{}", state.next_purchase_id));
            state.next_purchase_id += 1;
            let food = &mut state.foods[idx];
            food.quantity -= request.quantity;
            food.purchase_count = food.purchase_count.saturating_add(request.quantity);
            food.updated_at = now;
            let receipt = PurchaseReceipt {
                purchase_id: id.clone(),
                updated_quantity: food.quantity,
                updated_purchase_count: food.purchase_count,
            };
            state.purchases.push(Purchase {
                id,
                food_name: request.food_name.clone(),
                unit_price: request.unit_price,
                quantity: request.quantity,
                buyer_name: request.buyer_name.clone(),
                buyer_email: request.buyer_email.clone(),
                buying_date: request.buying_date.clone(),
                status: PurchaseStatus::Pending,
                created_at: now,
            });
            Ok(receipt)
        })
        .await
    }

    pub async fn list_purchases(&self) -> Vec<Purchase> {
        self.state.read().await.purchases.clone()
    }

    pub async fn get_purchase(&self, id: &str) -> Result<Purchase, StoreError> {
        self.state
            .read()
            .await
            .purchases
            .iter()
            .find(|p| p.id.0 == id)
            .cloned()
            .ok_or_else(|| StoreError::PurchaseNotFound(id.to_string()))
    }

    pub async fn set_purchase_status(
        &self,
        id: &str,
        next: PurchaseStatus,
    ) -> Result<Purchase, StoreError> {
        self.commit(|state| {
            let purchase = state
                .purchases
                .iter_mut()
                .find(|p| p.id.0 == id)
                .ok_or_else(|| StoreError::PurchaseNotFound(id.to_string()))?;
            if !purchase.status.can_transition_to(next) {
                return Err(StoreError::InvalidTransition {
                    from: purchase.status,
                    to: next,
                });
            }
            purchase.status = next;
            Ok(purchase.clone())
        })
        .await
    }

    /// Remove a purchase record. Stock and purchase counters stay untouched.
    pub async fn delete_purchase(&self, id: &str) -> Result<(), StoreError> {
        self.commit(|state| {
            let before = state.purchases.len();
            state.purchases.retain(|p| p.id.0 != id);
            if state.purchases.len() == before {
                return Err(StoreError::PurchaseNotFound(id.to_string()));
            }
            Ok(())
        })
        .await
    }

    /// (users, foods, purchases) record counts for the health endpoint.
    pub async fn counts(&self) -> (usize, usize, usize) {
        let state = self.state.read().await;
        (state.users.len(), state.foods.len(), state.purchases.len())
    }
}

fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}
