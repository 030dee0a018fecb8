//! HTTP handlers for the market node.
//!
//! Handlers stay thin: decode, validate, call the store, map the result.
//! Every error path goes through [`ApiError`] so status codes stay stable.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use tracing::{info, warn};

use platter_common::api::{
    FoodBody, HealthResponse, PurchaseBody, PurchaseReceipt, RegisterResponse, SessionBody,
    StatusBody, SuccessResponse, UserBody,
};
use platter_common::food::FoodItem;
use platter_common::purchase::Purchase;
use platter_common::session::SessionClaims;
use platter_common::user::{User, UserView};

use crate::error::ApiError;
use crate::session::{claims_from_headers, clear_session_cookie, session_cookie};
use crate::state::AppState;

// ─── Health ─────────────────────────────────────────────────────────────────

pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let (users, foods, purchases) = state.store.counts().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        users,
        foods,
        purchases,
    })
}

// ─── Users ──────────────────────────────────────────────────────────────────

pub async fn register_user_handler(
    State(state): State<Arc<AppState>>,
    Json(value): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let draft = UserBody::from_value(value)?.validate()?;
    let user = state.store.register_user(&draft).await?;
    info!("registered user {} ({})", user.id, user.email);
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user_id: user.id,
        }),
    ))
}

pub async fn list_users_handler(State(state): State<Arc<AppState>>) -> Json<Vec<UserView>> {
    let users = state.store.list_users().await;
    Json(users.iter().map(User::view).collect())
}

// ─── Sessions ───────────────────────────────────────────────────────────────

pub async fn issue_session_handler(
    State(state): State<Arc<AppState>>,
    Json(value): Json<serde_json::Value>,
) -> Result<impl IntoResponse, ApiError> {
    let email = SessionBody::from_value(value)?.validate()?;
    let (token, claims) = state.issue_session(email);
    info!(
        "issued session for {} until {}",
        claims.email, claims.expires_at
    );
    let cookie = session_cookie(&token, state.session_ttl.num_seconds());
    Ok((
        [(SET_COOKIE, cookie)],
        Json(SuccessResponse { success: true }),
    ))
}

pub async fn whoami_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<SessionClaims>, ApiError> {
    let claims = claims_from_headers(&headers, &state.verifying_key())?;
    Ok(Json(claims))
}

pub async fn clear_session_handler() -> impl IntoResponse {
    (
        [(SET_COOKIE, clear_session_cookie())],
        Json(SuccessResponse { success: true }),
    )
}

// ─── Foods ──────────────────────────────────────────────────────────────────

pub async fn create_food_handler(
    State(state): State<Arc<AppState>>,
    Json(value): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<FoodItem>), ApiError> {
    let draft = FoodBody::from_value(value)?.validate()?;
    let food = state.store.create_food(&draft).await?;
    info!("listed food {} ({:?}, {} in stock)", food.id, food.name, food.quantity);
    Ok((StatusCode::CREATED, Json(food)))
}

pub async fn list_foods_handler(State(state): State<Arc<AppState>>) -> Json<Vec<FoodItem>> {
    Json(state.store.list_foods().await)
}

pub async fn get_food_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<FoodItem>, ApiError> {
    Ok(Json(state.store.get_food(&id).await?))
}

pub async fn update_food_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(value): Json<serde_json::Value>,
) -> Result<Json<FoodItem>, ApiError> {
    let draft = FoodBody::from_value(value)?.validate()?;
    let food = state.store.update_food(&id, &draft).await?;
    Ok(Json(food))
}

// ─── Purchases ──────────────────────────────────────────────────────────────

/// The buy path. Validation failures never reach the store; a commit that
/// outlives the configured timeout is reported as unavailable.
pub async fn submit_purchase_handler(
    State(state): State<Arc<AppState>>,
    Json(value): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<PurchaseReceipt>), ApiError> {
    let request = PurchaseBody::from_value(value)?.validate()?;

    let commit = state.store.submit_purchase(&request);
    let receipt = match tokio::time::timeout(state.commit_timeout, commit).await {
        Ok(result) => result?,
        Err(_) => {
            warn!(
                "purchase commit timed out after {:?}",
                state.commit_timeout
            );
            return Err(ApiError::Unavailable(
                "purchase commit timed out".to_string(),
            ));
        }
    };

    info!(
        "purchase {} committed: {} x{} for {}",
        receipt.purchase_id, request.food_name, request.quantity, request.buyer_email
    );
    Ok((StatusCode::CREATED, Json(receipt)))
}

pub async fn list_purchases_handler(State(state): State<Arc<AppState>>) -> Json<Vec<Purchase>> {
    Json(state.store.list_purchases().await)
}

pub async fn get_purchase_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Purchase>, ApiError> {
    Ok(Json(state.store.get_purchase(&id).await?))
}

pub async fn update_purchase_status_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(value): Json<serde_json::Value>,
) -> Result<Json<Purchase>, ApiError> {
    let next = StatusBody::from_value(value)?.validate()?;
    let purchase = state.store.set_purchase_status(&id, next).await?;
    info!("purchase {} is now {:?}", purchase.id, purchase.status);
    Ok(Json(purchase))
}

pub async fn delete_purchase_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.store.delete_purchase(&id).await?;
    info!("deleted purchase {id}");
    Ok(Json(SuccessResponse { success: true }))
}
