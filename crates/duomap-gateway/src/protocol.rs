//! Wire envelopes for the proxy surface.
//!
//! The shapes (and the Spanish error strings) are a compatibility contract
//! with the demo page; both the route handlers and the in-app HTTP client
//! speak them.

use serde::{Deserialize, Serialize};

use crate::Location;

pub const ERR_ADDRESS_REQUIRED: &str = "Dirección requerida";
pub const ERR_COORDS_REQUIRED: &str = "Coordenadas requeridas";
pub const ERR_NOT_FOUND: &str = "Dirección no encontrada";
pub const ERR_SERVER: &str = "Error en el servidor";

/// `200` body of `GET /geocode`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeResponse {
    pub lat: f64,
    pub lng: f64,
    pub name: String,
    pub success: bool,
}

impl From<Location> for GeocodeResponse {
    fn from(location: Location) -> Self {
        Self {
            lat: location.lat,
            lng: location.lng,
            name: location.name,
            success: true,
        }
    }
}

/// `200` body of `GET /reverse-geocode`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReverseGeocodeResponse {
    pub address: String,
    pub success: bool,
}

/// `400` body: the request never reached the upstream provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BadRequest {
    pub error: String,
}

/// `404`/`500` body: the upstream provider had no result or failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Failure {
    pub error: String,
    pub success: bool,
}

impl Failure {
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            success: false,
        }
    }
}
