//! Proxy surface: thin pass-throughs from the page to the geocoding provider.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

use crate::protocol::{
    BadRequest, Failure, GeocodeResponse, ReverseGeocodeResponse, ERR_ADDRESS_REQUIRED,
    ERR_COORDS_REQUIRED, ERR_NOT_FOUND, ERR_SERVER,
};
use crate::{GeocodeError, Geocoder};

#[derive(Clone)]
struct GatewayState {
    geocoder: Arc<dyn Geocoder>,
}

/// Build the proxy router over any [`Geocoder`] backend.
pub fn router(geocoder: Arc<dyn Geocoder>) -> Router {
    Router::new()
        .route("/geocode", get(geocode))
        .route("/reverse-geocode", get(reverse_geocode))
        .with_state(GatewayState { geocoder })
}

async fn geocode(
    State(state): State<GatewayState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    // Validated by hand so the 400 envelope keeps its contract shape.
    let address = params
        .get("address")
        .map(String::as_str)
        .filter(|address| !address.trim().is_empty());
    let Some(address) = address else {
        return bad_request(ERR_ADDRESS_REQUIRED);
    };

    match state.geocoder.geocode(address.to_owned()).await {
        Ok(location) => Json(GeocodeResponse::from(location)).into_response(),
        Err(err) => failure("geocode", address, &err, ERR_ADDRESS_REQUIRED),
    }
}

async fn reverse_geocode(
    State(state): State<GatewayState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some((lat, lng)) = parse_coordinates(&params) else {
        return bad_request(ERR_COORDS_REQUIRED);
    };

    match state.geocoder.reverse_geocode(lat, lng).await {
        Ok(address) => Json(ReverseGeocodeResponse {
            address,
            success: true,
        })
        .into_response(),
        Err(err) => failure("reverse-geocode", &format!("{lat},{lng}"), &err, ERR_COORDS_REQUIRED),
    }
}

fn parse_coordinates(params: &HashMap<String, String>) -> Option<(f64, f64)> {
    let lat = params.get("lat")?.parse::<f64>().ok()?;
    let lng = params.get("lng")?.parse::<f64>().ok()?;
    Some((lat, lng))
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(BadRequest {
            error: message.to_owned(),
        }),
    )
        .into_response()
}

fn failure(endpoint: &str, input: &str, err: &GeocodeError, invalid_message: &str) -> Response {
    match err {
        GeocodeError::InvalidInput(_) => {
            tracing::debug!(endpoint, input, %err, "rejected request");
            bad_request(invalid_message)
        }
        GeocodeError::NotFound => {
            tracing::debug!(endpoint, input, "no upstream match");
            (StatusCode::NOT_FOUND, Json(Failure::new(ERR_NOT_FOUND))).into_response()
        }
        GeocodeError::Upstream(_) => {
            tracing::error!(endpoint, input, %err, "upstream failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(Failure::new(ERR_SERVER)),
            )
                .into_response()
        }
    }
}
