pub mod nominatim;
pub mod protocol;
pub mod routes;

use std::fmt;
use std::fmt::Write as _;
use std::future::Future;
use std::pin::Pin;

/// A resolved geographic location.
///
/// `name` is a human-readable label and is never empty after construction:
/// [`Location::new`] falls back to formatted coordinates when the given
/// label is blank.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    pub name: String,
}

impl Location {
    #[must_use]
    pub fn new(lat: f64, lng: f64, name: impl Into<String>) -> Self {
        let name = name.into();
        let name = if name.trim().is_empty() {
            coordinate_label(lat, lng)
        } else {
            name
        };
        Self { lat, lng, name }
    }

    /// Whether a coordinate pair is finite and within WGS84 bounds.
    #[must_use]
    pub fn valid(lat: f64, lng: f64) -> bool {
        lat.is_finite() && lng.is_finite() && (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.6}, {:.6})", self.name, self.lat, self.lng)
    }
}

/// Fallback label for a point with no resolved address, 6 decimal places.
#[must_use]
pub fn coordinate_label(lat: f64, lng: f64) -> String {
    format!("Coordenadas: {lat:.6}, {lng:.6}")
}

/// Errors returned by [`Geocoder`] operations.
#[derive(Debug)]
pub enum GeocodeError {
    /// Input rejected locally, before any network call.
    InvalidInput(String),
    /// The upstream provider had no result for the query.
    NotFound,
    /// Transport failure or a malformed upstream response.
    Upstream(String),
}

impl fmt::Display for GeocodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            Self::NotFound => f.write_str("no matching location"),
            Self::Upstream(msg) => write!(f, "upstream geocoding failure: {msg}"),
        }
    }
}

impl std::error::Error for GeocodeError {}

/// A geocoding provider that resolves addresses to coordinates and back.
///
/// Implementations must reject blank forward queries and out-of-range
/// reverse coordinates locally with [`GeocodeError::InvalidInput`], without
/// touching the network.
pub trait Geocoder: Send + Sync + 'static {
    /// Forward geocode: resolve a free-text query to the best match.
    fn geocode(
        &self,
        query: String,
    ) -> Pin<Box<dyn Future<Output = Result<Location, GeocodeError>> + Send + '_>>;

    /// Reverse geocode: resolve coordinates to a display address.
    fn reverse_geocode(
        &self,
        lat: f64,
        lng: f64,
    ) -> Pin<Box<dyn Future<Output = Result<String, GeocodeError>> + Send + '_>>;
}

/// Percent-encode a string for use in a URL query parameter.
#[must_use]
pub fn percent_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len() * 2);
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            b' ' => out.push('+'),
            _ => {
                let _ = write!(out, "%{byte:02X}");
            }
        }
    }
    out
}
