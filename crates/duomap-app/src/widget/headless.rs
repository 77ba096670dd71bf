//! Recording widget for unit tests: no page, no directives, just a call log
//! and an injectable event stream.

use std::pin::Pin;
use std::sync::{Arc, Mutex};

use futures_lite::Stream;

use crate::widget::{MapWidget, MarkerHandle, WidgetEvent};

/// A mutator call as the coordinator issued it.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SetCenter { lat: f64, lng: f64 },
    SetZoom { level: f64 },
    PlaceMarker { lat: f64, lng: f64, title: String },
    RemoveMarker { handle: MarkerHandle },
}

/// Test-side handle onto a [`Widget`]: reads the call log and injects
/// user events.
#[derive(Clone)]
pub struct Probe {
    calls: Arc<Mutex<Vec<Call>>>,
    events: async_channel::Sender<WidgetEvent>,
}

impl Probe {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("poisoned").clone()
    }

    pub fn placed(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::PlaceMarker { .. }))
            .count()
    }

    pub fn removed(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::RemoveMarker { .. }))
            .count()
    }

    pub fn click(&self, lat: f64, lng: f64) {
        let _ = self.events.try_send(WidgetEvent::Clicked { lat, lng });
    }

    pub fn change_zoom(&self, level: f64) {
        let _ = self.events.try_send(WidgetEvent::ZoomChanged { level });
    }
}

pub struct Widget {
    calls: Arc<Mutex<Vec<Call>>>,
    events: async_channel::Receiver<WidgetEvent>,
    next_handle: u64,
}

impl Widget {
    pub fn new() -> (Self, Probe) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let (events_tx, events_rx) = async_channel::unbounded();
        let probe = Probe {
            calls: Arc::clone(&calls),
            events: events_tx,
        };
        (
            Self {
                calls,
                events: events_rx,
                next_handle: 0,
            },
            probe,
        )
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("poisoned").push(call);
    }
}

impl MapWidget for Widget {
    fn set_center(&mut self, lat: f64, lng: f64) {
        self.record(Call::SetCenter { lat, lng });
    }

    fn set_zoom(&mut self, level: f64) {
        self.record(Call::SetZoom { level });
    }

    fn place_marker(&mut self, lat: f64, lng: f64, title: &str) -> MarkerHandle {
        self.next_handle += 1;
        self.record(Call::PlaceMarker {
            lat,
            lng,
            title: title.to_owned(),
        });
        MarkerHandle::new(self.next_handle)
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        self.record(Call::RemoveMarker { handle });
    }

    fn sync_zoom(&mut self, _level: f64) {}

    fn events(&self) -> Pin<Box<dyn Stream<Item = WidgetEvent> + Send>> {
        Box::pin(self.events.clone())
    }
}
