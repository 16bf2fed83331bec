#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the service marketplace.
//!
//! Serves address decomposition, location search and reverse geocoding
//! for the location picker, and wallet balance and withdrawal validation
//! for service providers. Wallet data arrives in each request body; the
//! server keeps no state beyond its geocoder.

mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use marketplace_geocoder::Geocoder;
use marketplace_geocoder::picker::LocationPicker;
use marketplace_geocoder::service_registry::default_geocoder;
use marketplace_wallet_models::WithdrawalPolicy;

/// Shared application state.
pub struct AppState {
    /// Location picker over the configured geocoding service.
    pub picker: LocationPicker<dyn Geocoder>,
    /// Limits applied to withdrawal requests.
    pub withdrawal_policy: WithdrawalPolicy,
}

impl AppState {
    /// Creates state over any geocoder with the default withdrawal policy.
    #[must_use]
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            picker: LocationPicker::new(geocoder),
            withdrawal_policy: WithdrawalPolicy::default(),
        }
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/address/decompose", web::get().to(handlers::decompose))
            .route("/location/search", web::get().to(handlers::location_search))
            .route("/location/reverse", web::get().to(handlers::location_reverse))
            .route("/wallet/balance", web::post().to(handlers::wallet_balance))
            .route("/wallet/withdrawals", web::post().to(handlers::wallet_withdraw)),
    );
}

/// Starts the marketplace API server.
///
/// Uses the geocoding service named by `MARKETPLACE_GEOCODER_SERVICE`, or
/// the highest-priority enabled one, and binds to `BIND_ADDR`:`PORT`
/// (default `127.0.0.1:8080`). The caller provides the async runtime and
/// initializes logging.
///
/// # Errors
///
/// Returns an `std::io::Result` error if no geocoder can be built, or if
/// the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    let service = std::env::var("MARKETPLACE_GEOCODER_SERVICE").ok();
    let geocoder = default_geocoder(service.as_deref()).map_err(std::io::Error::other)?;

    let state = web::Data::new(AppState::new(Arc::new(geocoder)));

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
