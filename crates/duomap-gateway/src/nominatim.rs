use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use isahc::prelude::*;
use isahc::Request;

use crate::{percent_encode, GeocodeError, Geocoder, Location};

const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";
/// Identifying client string. The public Nominatim instance blocks requests
/// that arrive with a default library agent.
pub const USER_AGENT: &str = "duomap/1.0 (map comparison demo)";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Nominatim-backed [`Geocoder`].
#[derive(Clone)]
pub struct Backend {
    base_url: String,
}

impl Backend {
    /// Backend against the public Nominatim instance.
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Backend against a custom instance, e.g. a self-hosted mirror.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for Backend {
    fn default() -> Self {
        Self::new()
    }
}

impl Geocoder for Backend {
    fn geocode(
        &self,
        query: String,
    ) -> Pin<Box<dyn Future<Output = Result<Location, GeocodeError>> + Send + '_>> {
        Box::pin(search(&self.base_url, query))
    }

    fn reverse_geocode(
        &self,
        lat: f64,
        lng: f64,
    ) -> Pin<Box<dyn Future<Output = Result<String, GeocodeError>> + Send + '_>> {
        Box::pin(reverse(&self.base_url, lat, lng))
    }
}

#[derive(serde::Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
    display_name: String,
}

#[derive(serde::Deserialize)]
struct ReverseResult {
    display_name: Option<String>,
}

async fn search(base_url: &str, query: String) -> Result<Location, GeocodeError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(GeocodeError::InvalidInput("empty query".into()));
    }

    let url = format!(
        "{base_url}/search?q={}&format=json&limit=1",
        percent_encode(trimmed)
    );
    let body = fetch(&url).await?;
    let location = parse_search_body(&body)?;
    tracing::debug!(query = trimmed, %location, "forward geocode resolved");
    Ok(location)
}

async fn reverse(base_url: &str, lat: f64, lng: f64) -> Result<String, GeocodeError> {
    if !Location::valid(lat, lng) {
        return Err(GeocodeError::InvalidInput(format!(
            "coordinates out of range: {lat}, {lng}"
        )));
    }

    let url = format!("{base_url}/reverse?lat={lat}&lon={lng}&format=json");
    let body = fetch(&url).await?;
    let address = parse_reverse_body(&body)?;
    tracing::debug!(lat, lng, address, "reverse geocode resolved");
    Ok(address)
}

async fn fetch(url: &str) -> Result<String, GeocodeError> {
    let request = Request::get(url)
        .timeout(REQUEST_TIMEOUT)
        .header("User-Agent", USER_AGENT)
        .body(())
        .map_err(|e| GeocodeError::Upstream(e.to_string()))?;

    let client = isahc::HttpClient::new().map_err(|e| GeocodeError::Upstream(e.to_string()))?;
    let mut response = client
        .send_async(request)
        .await
        .map_err(|e| GeocodeError::Upstream(e.to_string()))?;

    if !response.status().is_success() {
        return Err(GeocodeError::Upstream(format!(
            "nominatim returned status {}",
            response.status()
        )));
    }

    response
        .text()
        .await
        .map_err(|e| GeocodeError::Upstream(e.to_string()))
}

fn parse_search_body(body: &str) -> Result<Location, GeocodeError> {
    let results: Vec<SearchResult> = serde_json::from_str(body)
        .map_err(|e| GeocodeError::Upstream(format!("failed to parse search response: {e}")))?;

    let Some(first) = results.into_iter().next() else {
        return Err(GeocodeError::NotFound);
    };

    let lat = first
        .lat
        .parse::<f64>()
        .map_err(|e| GeocodeError::Upstream(format!("invalid lat: {e}")))?;
    let lng = first
        .lon
        .parse::<f64>()
        .map_err(|e| GeocodeError::Upstream(format!("invalid lon: {e}")))?;
    if !Location::valid(lat, lng) {
        return Err(GeocodeError::Upstream(format!(
            "coordinates out of range: {lat}, {lng}"
        )));
    }

    Ok(Location::new(lat, lng, first.display_name))
}

fn parse_reverse_body(body: &str) -> Result<String, GeocodeError> {
    let result: ReverseResult = serde_json::from_str(body)
        .map_err(|e| GeocodeError::Upstream(format!("failed to parse reverse response: {e}")))?;

    result
        .display_name
        .filter(|name| !name.trim().is_empty())
        .ok_or(GeocodeError::NotFound)
}
