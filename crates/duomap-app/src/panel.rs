//! The page chrome around the two maps: notifications, the current-location
//! info panel, session stats and the busy overlay.

use serde::Serialize;

use duomap_gateway::Location;

use crate::coordinator::SessionStats;
use crate::protocol::Provider;

/// Notification severity, mirroring the page's toast styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Success,
    Error,
    Warning,
    Info,
}

/// A toast shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: Kind,
    pub message: String,
}

impl Notification {
    #[must_use]
    pub fn new(kind: Kind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Everything the coordinator tells the page outside of the two maps.
///
/// Methods are fire-and-forget so the coordinator never blocks on the UI.
pub trait StatusPanel: Send {
    fn notify(&self, notification: Notification);
    fn show_location(&self, location: &Location);
    fn show_stats(&self, stats: &SessionStats);
    /// One widget's own zoom level; the two scales are never reconciled.
    fn show_widget_zoom(&self, provider: Provider, level: f64);
    fn set_busy(&self, busy: bool);
    /// Put a resolved address into the search input.
    fn fill_address(&self, value: &str);
    fn offer_download(&self, filename: String, content: String);
}
