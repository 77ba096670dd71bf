//! The capability set shared by both map widget variants.
//!
//! The two real adapters translate the same calls into each provider's own
//! directive vocabulary; the headless variant records them for tests.

pub mod google;
#[cfg(test)]
pub mod headless;
pub mod leaflet;

use std::pin::Pin;

use futures_lite::Stream;
use serde::Serialize;

/// Opaque identifier for a placed marker, allocated by the owning widget.
/// Handles are never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MarkerHandle(u64);

impl MarkerHandle {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// A user interaction on a rendered map, reported back by the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WidgetEvent {
    Clicked { lat: f64, lng: f64 },
    ZoomChanged { level: f64 },
}

/// One side of the comparison: a map the coordinator can drive.
///
/// Mutators are synchronous; adapters enqueue directives for the page and
/// return immediately. [`events`](MapWidget::events) replaces callback
/// registration: it yields the clicks and zoom changes the page reports for
/// this widget.
pub trait MapWidget: Send {
    fn set_center(&mut self, lat: f64, lng: f64);
    fn set_zoom(&mut self, level: f64);
    fn place_marker(&mut self, lat: f64, lng: f64, title: &str) -> MarkerHandle;
    fn remove_marker(&mut self, handle: MarkerHandle);
    /// Record a zoom the user performed directly on the rendered map.
    fn sync_zoom(&mut self, level: f64);
    fn events(&self) -> Pin<Box<dyn Stream<Item = WidgetEvent> + Send>>;
}
