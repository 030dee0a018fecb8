//! Platter market node.
//!
//! A small food-market backend served over HTTP/JSON: account registration,
//! cookie sessions, food listings, and the purchase workflow. All market
//! state lives behind [`store::MarketStore`]; the purchase path commits its
//! record insert and stock decrement as one atomic step.

pub mod error;
pub mod routes;
pub mod session;
pub mod state;
pub mod store;

use std::sync::Arc;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tracing::info;

use state::AppState;

/// Build the node's router with every market route attached.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health_handler))
        .route(
            "/users",
            post(routes::register_user_handler).get(routes::list_users_handler),
        )
        .route(
            "/session",
            post(routes::issue_session_handler)
                .get(routes::whoami_handler)
                .delete(routes::clear_session_handler),
        )
        .route(
            "/foods",
            post(routes::create_food_handler).get(routes::list_foods_handler),
        )
        .route(
            "/foods/{id}",
            get(routes::get_food_handler).put(routes::update_food_handler),
        )
        .route(
            "/purchases",
            post(routes::submit_purchase_handler).get(routes::list_purchases_handler),
        )
        .route(
            "/purchases/{id}",
            get(routes::get_purchase_handler)
                .patch(routes::update_purchase_status_handler)
                .delete(routes::delete_purchase_handler),
        )
        .with_state(state)
}

/// Bind the port and serve until Ctrl+C or SIGTERM.
///
/// The CORS layer admits exactly one origin with credentials, so browser
/// clients can carry the session cookie.
pub async fn serve(state: Arc<AppState>, port: u16, cors_origin: &str) -> anyhow::Result<()> {
    let origin: HeaderValue = cors_origin.parse()?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true);

    let app = router(state).layer(cors);

    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!("market node listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("market node stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
        info!("received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
        info!("received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
