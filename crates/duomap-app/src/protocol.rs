//! Wire model between the page and a session socket.
//!
//! Inbound [`ClientEvent`]s are the user interactions the page reports;
//! outbound [`Frame`]s carry one [`Directive`] each, addressed to one of the
//! two map widgets or to the page chrome.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::coordinator::SessionStats;
use crate::panel::Notification;
use crate::position::PositionError;
use crate::widget::MarkerHandle;

/// One of the two side-by-side map widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Google,
    Leaflet,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Google => f.write_str("google"),
            Self::Leaflet => f.write_str("leaflet"),
        }
    }
}

/// Addressee of an outbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Google,
    Leaflet,
    Page,
}

/// A user interaction reported by the page.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    Search { address: String },
    Locate,
    MapClick { provider: Provider, lat: f64, lng: f64 },
    ZoomChanged { provider: Provider, level: f64 },
    ClearMarkers,
    ExportMarkers,
    /// Reply to a `requestPosition` directive.
    Position { lat: f64, lng: f64 },
    PositionError { code: PositionErrorCode },
}

/// Geolocation failure codes as the platform service reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PositionErrorCode {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    #[serde(other)]
    Unknown,
}

impl From<PositionErrorCode> for PositionError {
    fn from(code: PositionErrorCode) -> Self {
        match code {
            PositionErrorCode::PermissionDenied => Self::PermissionDenied,
            PositionErrorCode::PositionUnavailable => Self::Unavailable,
            PositionErrorCode::Timeout => Self::Timeout,
            PositionErrorCode::Unknown => Self::Unknown,
        }
    }
}

/// One outbound instruction.
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub target: Target,
    #[serde(flatten)]
    pub directive: Directive,
}

/// What the addressee should do.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Directive {
    SetCenter {
        lat: f64,
        lng: f64,
    },
    SetZoom {
        level: f64,
    },
    /// Combined recenter-and-zoom, the open-source widget's native call.
    SetView {
        lat: f64,
        lng: f64,
        zoom: f64,
    },
    PlaceMarker {
        handle: MarkerHandle,
        lat: f64,
        lng: f64,
        title: String,
        /// Number shown inside the open-source widget's div icon.
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<usize>,
        color: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        animation: Option<String>,
    },
    RemoveMarker {
        handle: MarkerHandle,
    },
    /// Ask the page for the device position with the given options.
    RequestPosition {
        enable_high_accuracy: bool,
        timeout_ms: u64,
        maximum_age_ms: u64,
    },
    Notify(Notification),
    LocationInfo {
        lat: f64,
        lng: f64,
        name: String,
    },
    Stats(SessionStats),
    /// A widget's own zoom level, shown next to that map only.
    WidgetZoom {
        provider: Provider,
        level: f64,
    },
    Busy {
        busy: bool,
    },
    FillAddress {
        value: String,
    },
    Download {
        filename: String,
        content: String,
    },
}
