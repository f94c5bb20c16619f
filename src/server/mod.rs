// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// HTTP SERVER - Invocação local do handler
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//!
//! Servidor HTTP que expõe o handler de roteiros fora do ambiente serverless.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `POST /invoke` - Evento serverless completo → `{statusCode, headers, body}`
//! - `POST /itinerary` - Corpo `{"question": "..."}` → status e corpo do handler
//!
//! ## Uso
//!
//! ```bash
//! cargo run --features server -- --server --port=3000
//! ```

#[allow(missing_docs)]
pub mod types;
#[allow(missing_docs)]
pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

pub use types::*;

use crate::handler::ItineraryHandler;

/// Estado compartilhado entre todos os handlers
pub struct AppState {
    /// Handler de roteiros (sem estado mutável entre requisições)
    pub handler: ItineraryHandler,
}

/// Monta as rotas do servidor
pub fn router(state: Arc<AppState>) -> axum::Router {
    use axum::{routing::{get, post}, Router};
    use tower_http::cors::CorsLayer;

    Router::new()
        .route("/health", get(handlers::health))
        .route("/invoke", post(handlers::invoke))
        .route("/itinerary", post(handlers::itinerary))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Inicia o servidor HTTP no endereço especificado.
///
/// Entry point chamado de main.rs quando `--server` é passado.
pub async fn start_server(addr: SocketAddr, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("🌍 Travel itinerary server listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
