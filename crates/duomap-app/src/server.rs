//! Router assembly: the demo page, its session socket and the proxy
//! endpoints behind one listener.

use std::sync::Arc;

use axum::extract::{State, WebSocketUpgrade};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use duomap_gateway::{routes, Geocoder, Location};

use crate::session;

const INDEX_TEMPLATE: &str = include_str!("../static/index.html");
const APP_SHIM: &str = include_str!("../static/js/app.js");

/// Values injected into the served page.
#[derive(Clone)]
pub struct AppState {
    pub initial: Location,
    pub google_maps_api_key: String,
    /// Where the in-process gateway client reaches the proxy endpoints.
    pub base_url: String,
}

pub fn router(state: AppState, geocoder: Arc<dyn Geocoder>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/js/app.js", get(shim))
        .route("/ws", get(ws))
        .with_state(state)
        .merge(routes::router(geocoder))
        .layer(TraceLayer::new_for_http())
}

async fn index(State(state): State<AppState>) -> Response {
    let bootstrap =
        serde_json::to_string(&state.initial).unwrap_or_else(|_| "null".to_owned());
    let page = INDEX_TEMPLATE
        .replace("__INITIAL_LOCATION__", &bootstrap)
        .replace("__GOOGLE_MAPS_API_KEY__", &state.google_maps_api_key);
    Html(page).into_response()
}

async fn shim() -> Response {
    ([(header::CONTENT_TYPE, "application/javascript")], APP_SHIM).into_response()
}

async fn ws(State(state): State<AppState>, upgrade: WebSocketUpgrade) -> Response {
    upgrade.on_upgrade(move |socket| session::run(socket, state.base_url, state.initial))
}
