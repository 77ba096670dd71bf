//! Commercial-provider adapter: separate center and zoom directives,
//! drop-animated circle markers.

use std::pin::Pin;

use futures_lite::Stream;

use crate::protocol::{Directive, Frame, Target};
use crate::widget::{MapWidget, MarkerHandle, WidgetEvent};

/// Fill color of the circle symbol markers.
const MARKER_COLOR: &str = "#4285F4";

pub struct Widget {
    frames: async_channel::Sender<Frame>,
    events: async_channel::Receiver<WidgetEvent>,
    next_handle: u64,
}

impl Widget {
    #[must_use]
    pub fn new(
        frames: async_channel::Sender<Frame>,
        events: async_channel::Receiver<WidgetEvent>,
    ) -> Self {
        Self {
            frames,
            events,
            next_handle: 0,
        }
    }

    fn push(&self, directive: Directive) {
        let _ = self.frames.try_send(Frame {
            target: Target::Google,
            directive,
        });
    }
}

impl MapWidget for Widget {
    fn set_center(&mut self, lat: f64, lng: f64) {
        self.push(Directive::SetCenter { lat, lng });
    }

    fn set_zoom(&mut self, level: f64) {
        self.push(Directive::SetZoom { level });
    }

    fn place_marker(&mut self, lat: f64, lng: f64, title: &str) -> MarkerHandle {
        self.next_handle += 1;
        let handle = MarkerHandle::new(self.next_handle);
        self.push(Directive::PlaceMarker {
            handle,
            lat,
            lng,
            title: title.to_owned(),
            label: None,
            color: MARKER_COLOR.to_owned(),
            animation: Some("drop".to_owned()),
        });
        handle
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        self.push(Directive::RemoveMarker { handle });
    }

    // Center and zoom are independent calls here; nothing to track.
    fn sync_zoom(&mut self, _level: f64) {}

    fn events(&self) -> Pin<Box<dyn Stream<Item = WidgetEvent> + Send>> {
        Box::pin(self.events.clone())
    }
}
