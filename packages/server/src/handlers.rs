//! HTTP handler functions for the marketplace API.

use actix_web::{HttpResponse, web};
use marketplace_address::{MAP_CLICK_EXTRA_DENYLIST, decompose_with};
use marketplace_address_models::Coordinates;
use marketplace_geocoder::GeocodeError;
use marketplace_server_models::{
    AddressVariant, ApiError, ApiHealth, DecomposeParams, ReverseParams, SearchParams,
    WithdrawalBody,
};
use marketplace_wallet::{compute_balance, validate_withdrawal};
use marketplace_wallet_models::Wallet;

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/address/decompose`
///
/// Splits a raw address into street, city and state.
pub async fn decompose(params: web::Query<DecomposeParams>) -> HttpResponse {
    let extra_denylist: &[&str] = match params.variant {
        AddressVariant::Search => &[],
        AddressVariant::MapClick => MAP_CLICK_EXTRA_DENYLIST,
    };

    HttpResponse::Ok().json(decompose_with(&params.raw, extra_denylist))
}

/// `GET /api/location/search`
///
/// Searches the geocoder and decomposes each result.
pub async fn location_search(
    state: web::Data<AppState>,
    params: web::Query<SearchParams>,
) -> HttpResponse {
    match state.picker.search(&params.q).await {
        Ok(locations) => HttpResponse::Ok().json(locations),
        Err(e) => geocode_error_response("search locations", &e),
    }
}

/// `GET /api/location/reverse`
///
/// Resolves a map point to a decomposed address.
pub async fn location_reverse(
    state: web::Data<AppState>,
    params: web::Query<ReverseParams>,
) -> HttpResponse {
    let coordinates = Coordinates::new(params.lat, params.lon);

    match state.picker.pick_on_map(coordinates).await {
        Ok(location) => HttpResponse::Ok().json(location),
        Err(e) => geocode_error_response("reverse geocode", &e),
    }
}

/// `POST /api/wallet/balance`
pub async fn wallet_balance(wallet: web::Json<Wallet>) -> HttpResponse {
    HttpResponse::Ok().json(compute_balance(&wallet))
}

/// `POST /api/wallet/withdrawals`
///
/// Validates a withdrawal request against the supplied wallet. Rejections
/// are answered with `422` and a stable error code.
pub async fn wallet_withdraw(
    state: web::Data<AppState>,
    body: web::Json<WithdrawalBody>,
) -> HttpResponse {
    match validate_withdrawal(&body.wallet, &body.request, &state.withdrawal_policy) {
        Ok(validated) => HttpResponse::Created().json(validated),
        Err(e) => {
            log::info!("Rejected withdrawal request: {e}");
            HttpResponse::UnprocessableEntity().json(ApiError::with_code(e.to_string(), e.code()))
        }
    }
}

fn geocode_error_response(action: &str, e: &GeocodeError) -> HttpResponse {
    match e {
        GeocodeError::InvalidCoordinates { .. } => {
            HttpResponse::BadRequest().json(ApiError::new(e.to_string()))
        }
        GeocodeError::RateLimited => {
            log::warn!("Failed to {action}: {e}");
            HttpResponse::TooManyRequests().json(ApiError::new(e.to_string()))
        }
        _ => {
            log::error!("Failed to {action}: {e}");
            HttpResponse::BadGateway().json(ApiError::new(format!("Failed to {action}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, http::StatusCode, test};
    use async_trait::async_trait;
    use marketplace_address_models::ParsedAddress;
    use marketplace_geocoder::{GeocodedPlace, Geocoder, PickedLocation};
    use marketplace_wallet_models::{ValidatedWithdrawal, WalletBalance};

    use super::*;

    struct FakeGeocoder;

    #[async_trait]
    impl Geocoder for FakeGeocoder {
        async fn search(&self, query: &str) -> Result<Vec<GeocodedPlace>, GeocodeError> {
            if query == "busy" {
                return Err(GeocodeError::RateLimited);
            }
            Ok(vec![GeocodedPlace {
                display_name: "Avenida Paulista, Bela Vista, São Paulo, São Paulo, Brasil"
                    .to_string(),
                coordinates: Coordinates::new(-23.5614, -46.6559),
            }])
        }

        async fn reverse(
            &self,
            coordinates: Coordinates,
        ) -> Result<Option<GeocodedPlace>, GeocodeError> {
            if !coordinates.is_valid() {
                return Err(GeocodeError::InvalidCoordinates {
                    latitude: coordinates.latitude,
                    longitude: coordinates.longitude,
                });
            }
            Ok(Some(GeocodedPlace {
                display_name: "Rua 3, Centro, Quadra 12, Goiás, Brasil".to_string(),
                coordinates,
            }))
        }
    }

    fn state() -> web::Data<AppState> {
        web::Data::new(AppState::new(Arc::new(FakeGeocoder)))
    }

    fn wallet_json() -> serde_json::Value {
        serde_json::json!({
            "entries": [
                { "id": "e1", "kind": "credit", "amountCents": 15000, "occurredAt": "2026-03-01T12:00:00Z" },
                { "id": "e2", "kind": "debit", "amountCents": 1500, "occurredAt": "2026-03-01T12:00:00Z" }
            ],
            "withdrawals": [
                { "id": "w1", "amountCents": 3000, "paymentMethodId": "pix-1", "status": "paid", "requestedAt": "2026-03-02T09:30:00Z" }
            ],
            "paymentMethods": [
                { "id": "pix-1", "type": "pix", "keyType": "email", "key": "ana@example.com" }
            ]
        })
    }

    #[actix_web::test]
    async fn health_reports_version() {
        let app = test::init_service(App::new().configure(crate::configure)).await;
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["healthy"], true);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[actix_web::test]
    async fn decompose_honors_variant() {
        let app = test::init_service(App::new().configure(crate::configure)).await;

        let req = test::TestRequest::get()
            .uri("/api/address/decompose?raw=Rua%203%2C%20Centro%2C%20Quadra%2012%2C%20Goi%C3%A1s")
            .to_request();
        let parsed: ParsedAddress = test::call_and_read_body_json(&app, req).await;
        assert_eq!(parsed.city, "Quadra 12");
        assert_eq!(parsed.state, "GO");

        let req = test::TestRequest::get()
            .uri("/api/address/decompose?raw=Rua%203%2C%20Centro%2C%20Quadra%2012%2C%20Goi%C3%A1s&variant=map_click")
            .to_request();
        let parsed: ParsedAddress = test::call_and_read_body_json(&app, req).await;
        assert_eq!(parsed.city, "Centro");
    }

    #[actix_web::test]
    async fn search_returns_decomposed_locations() {
        let app =
            test::init_service(App::new().app_data(state()).configure(crate::configure)).await;
        let req = test::TestRequest::get()
            .uri("/api/location/search?q=paulista")
            .to_request();
        let locations: Vec<PickedLocation> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].address.street, "Avenida Paulista");
        assert_eq!(locations[0].address.city, "São Paulo");
        assert_eq!(locations[0].address.state, "SP");
    }

    #[actix_web::test]
    async fn search_rate_limit_is_429() {
        let app =
            test::init_service(App::new().app_data(state()).configure(crate::configure)).await;
        let req = test::TestRequest::get()
            .uri("/api/location/search?q=busy")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[actix_web::test]
    async fn reverse_uses_map_click_variant() {
        let app =
            test::init_service(App::new().app_data(state()).configure(crate::configure)).await;
        let req = test::TestRequest::get()
            .uri("/api/location/reverse?lat=-16.68&lon=-49.25")
            .to_request();
        let location: PickedLocation = test::call_and_read_body_json(&app, req).await;
        assert_eq!(location.address.city, "Centro");
        assert_eq!(location.address.state, "GO");
    }

    #[actix_web::test]
    async fn reverse_rejects_invalid_coordinates() {
        let app =
            test::init_service(App::new().app_data(state()).configure(crate::configure)).await;
        let req = test::TestRequest::get()
            .uri("/api/location/reverse?lat=95&lon=0")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn balance_from_posted_wallet() {
        let app = test::init_service(App::new().configure(crate::configure)).await;
        let req = test::TestRequest::post()
            .uri("/api/wallet/balance")
            .set_json(wallet_json())
            .to_request();
        let balance: WalletBalance = test::call_and_read_body_json(&app, req).await;
        assert_eq!(balance.available_cents.value(), 10_500);
        assert_eq!(balance.withdrawn_cents.value(), 3_000);
    }

    #[actix_web::test]
    async fn accepted_withdrawal_is_created() {
        let app =
            test::init_service(App::new().app_data(state()).configure(crate::configure)).await;
        let req = test::TestRequest::post()
            .uri("/api/wallet/withdrawals")
            .set_json(serde_json::json!({
                "wallet": wallet_json(),
                "request": { "amountCents": 5000, "paymentMethodId": "pix-1" }
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let validated: ValidatedWithdrawal = test::read_body_json(resp).await;
        assert_eq!(validated.balance_after.available_cents.value(), 5_500);
    }

    #[actix_web::test]
    async fn rejected_withdrawal_is_422_with_code() {
        let app =
            test::init_service(App::new().app_data(state()).configure(crate::configure)).await;
        let req = test::TestRequest::post()
            .uri("/api/wallet/withdrawals")
            .set_json(serde_json::json!({
                "wallet": wallet_json(),
                "request": { "amountCents": 20000, "paymentMethodId": "pix-1" }
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let error: ApiError = test::read_body_json(resp).await;
        assert_eq!(error.code.as_deref(), Some("insufficient_balance"));
    }
}
