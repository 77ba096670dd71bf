mod coordinator;
mod geocoding;
mod panel;
mod position;
mod protocol;
mod server;
mod session;
mod widget;

use std::net::SocketAddr;
use std::sync::Arc;

use duomap_gateway::{nominatim, Location};

const DEFAULT_PORT: u16 = 40145;
/// Campus the demo opens on.
const INITIAL_LOCATION: (f64, f64, &str) = (
    20.571_044,
    -97.971_944,
    "Universidad Tecnologica de Xicotepec de Juarez",
);
/// Fallback when a configured override is invalid.
const DEFAULT_LOCATION: (f64, f64, &str) = (19.4326, -99.1336, "Ubicación por defecto");

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let port = std::env::var("DUOMAP_PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let google_maps_api_key = std::env::var("GOOGLE_MAPS_API_KEY").unwrap_or_default();
    tracing::info!(
        configured = !google_maps_api_key.is_empty(),
        "google maps api key"
    );

    let state = server::AppState {
        initial: initial_location(),
        google_maps_api_key,
        base_url: format!("http://127.0.0.1:{port}"),
    };
    let app = server::router(state, Arc::new(nominatim::Backend::new()));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("bind listener");
    tracing::info!(%addr, "serving");
    axum::serve(listener, app).await.expect("serve");
}

/// Initial location, overridable from the environment. Invalid overrides
/// fall back to the hardcoded default.
fn initial_location() -> Location {
    let var = |key: &str| std::env::var(key).ok();
    let coord = |key: &str| var(key).and_then(|value| value.parse::<f64>().ok());

    match (var("DUOMAP_INITIAL_LAT"), var("DUOMAP_INITIAL_LNG")) {
        (None, None) => {
            let (lat, lng, name) = INITIAL_LOCATION;
            Location::new(lat, lng, name)
        }
        _ => match (coord("DUOMAP_INITIAL_LAT"), coord("DUOMAP_INITIAL_LNG")) {
            (Some(lat), Some(lng)) if Location::valid(lat, lng) => {
                let name = var("DUOMAP_INITIAL_NAME").unwrap_or_default();
                Location::new(lat, lng, name)
            }
            _ => {
                tracing::warn!("invalid initial location override, using the default");
                let (lat, lng, name) = DEFAULT_LOCATION;
                Location::new(lat, lng, name)
            }
        },
    }
}
