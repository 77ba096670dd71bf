//! Open-source-provider adapter: combined view directives, numbered div-icon
//! markers, tile-limited zoom.

use std::pin::Pin;

use futures_lite::Stream;

use crate::protocol::{Directive, Frame, Target};
use crate::widget::{MapWidget, MarkerHandle, WidgetEvent};

/// Background color of the numbered div icon.
const MARKER_COLOR: &str = "#199900";
/// OpenStreetMap tiles stop here.
const MAX_ZOOM: f64 = 19.0;

pub struct Widget {
    frames: async_channel::Sender<Frame>,
    events: async_channel::Receiver<WidgetEvent>,
    center: (f64, f64),
    zoom: f64,
    next_handle: u64,
    /// Markers currently on the map; the next label is this plus one.
    live: usize,
}

impl Widget {
    #[must_use]
    pub fn new(
        frames: async_channel::Sender<Frame>,
        events: async_channel::Receiver<WidgetEvent>,
        center: (f64, f64),
        initial_zoom: f64,
    ) -> Self {
        Self {
            frames,
            events,
            center,
            zoom: initial_zoom,
            next_handle: 0,
            live: 0,
        }
    }

    fn push(&self, directive: Directive) {
        let _ = self.frames.try_send(Frame {
            target: Target::Leaflet,
            directive,
        });
    }

    fn push_view(&self) {
        self.push(Directive::SetView {
            lat: self.center.0,
            lng: self.center.1,
            zoom: self.zoom,
        });
    }
}

impl MapWidget for Widget {
    fn set_center(&mut self, lat: f64, lng: f64) {
        self.center = (lat, lng);
        self.push_view();
    }

    fn set_zoom(&mut self, level: f64) {
        self.zoom = level.min(MAX_ZOOM);
        self.push_view();
    }

    fn place_marker(&mut self, lat: f64, lng: f64, title: &str) -> MarkerHandle {
        self.next_handle += 1;
        self.live += 1;
        let handle = MarkerHandle::new(self.next_handle);
        self.push(Directive::PlaceMarker {
            handle,
            lat,
            lng,
            title: title.to_owned(),
            label: Some(self.live),
            color: MARKER_COLOR.to_owned(),
            animation: None,
        });
        handle
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        self.live = self.live.saturating_sub(1);
        self.push(Directive::RemoveMarker { handle });
    }

    // A later recenter reuses whatever zoom the user last picked.
    fn sync_zoom(&mut self, level: f64) {
        self.zoom = level;
    }

    fn events(&self) -> Pin<Box<dyn Stream<Item = WidgetEvent> + Send>> {
        Box::pin(self.events.clone())
    }
}
