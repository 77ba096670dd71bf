//! HTTP client side of the gateway: the coordinator reaches the proxy over
//! the same surface the page consumes.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use isahc::prelude::*;
use isahc::Request;

use duomap_gateway::protocol::{BadRequest, GeocodeResponse, ReverseGeocodeResponse};
use duomap_gateway::{percent_encode, GeocodeError, Geocoder, Location};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// [`Geocoder`] backend that calls the locally served proxy endpoints.
#[derive(Clone)]
pub struct GatewayClient {
    base_url: String,
}

impl GatewayClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Geocoder for GatewayClient {
    fn geocode(
        &self,
        query: String,
    ) -> Pin<Box<dyn Future<Output = Result<Location, GeocodeError>> + Send + '_>> {
        Box::pin(forward(&self.base_url, query))
    }

    fn reverse_geocode(
        &self,
        lat: f64,
        lng: f64,
    ) -> Pin<Box<dyn Future<Output = Result<String, GeocodeError>> + Send + '_>> {
        Box::pin(reverse(&self.base_url, lat, lng))
    }
}

async fn forward(base_url: &str, query: String) -> Result<Location, GeocodeError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(GeocodeError::InvalidInput("empty query".into()));
    }

    let url = format!("{base_url}/geocode?address={}", percent_encode(trimmed));
    let (status, body) = fetch(&url).await?;
    map_forward(status, &body)
}

async fn reverse(base_url: &str, lat: f64, lng: f64) -> Result<String, GeocodeError> {
    let url = format!("{base_url}/reverse-geocode?lat={lat}&lng={lng}");
    let (status, body) = fetch(&url).await?;
    map_reverse(status, &body)
}

async fn fetch(url: &str) -> Result<(u16, String), GeocodeError> {
    let request = Request::get(url)
        .timeout(REQUEST_TIMEOUT)
        .body(())
        .map_err(|e| GeocodeError::Upstream(e.to_string()))?;

    let client = isahc::HttpClient::new().map_err(|e| GeocodeError::Upstream(e.to_string()))?;
    let mut response = client
        .send_async(request)
        .await
        .map_err(|e| GeocodeError::Upstream(e.to_string()))?;

    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(|e| GeocodeError::Upstream(e.to_string()))?;
    Ok((status, body))
}

fn map_forward(status: u16, body: &str) -> Result<Location, GeocodeError> {
    match status {
        200 => {
            let envelope: GeocodeResponse = serde_json::from_str(body)
                .map_err(|e| GeocodeError::Upstream(format!("bad gateway envelope: {e}")))?;
            Ok(Location::new(envelope.lat, envelope.lng, envelope.name))
        }
        400 => Err(GeocodeError::InvalidInput(error_message(body))),
        404 => Err(GeocodeError::NotFound),
        other => Err(GeocodeError::Upstream(format!(
            "gateway returned status {other}: {}",
            error_message(body)
        ))),
    }
}

fn map_reverse(status: u16, body: &str) -> Result<String, GeocodeError> {
    match status {
        200 => {
            let envelope: ReverseGeocodeResponse = serde_json::from_str(body)
                .map_err(|e| GeocodeError::Upstream(format!("bad gateway envelope: {e}")))?;
            Ok(envelope.address)
        }
        400 => Err(GeocodeError::InvalidInput(error_message(body))),
        404 => Err(GeocodeError::NotFound),
        other => Err(GeocodeError::Upstream(format!(
            "gateway returned status {other}: {}",
            error_message(body)
        ))),
    }
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<BadRequest>(body)
        .map(|envelope| envelope.error)
        .unwrap_or_else(|_| body.to_owned())
}
