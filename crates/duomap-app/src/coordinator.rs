//! The dual-map coordinator: single owner of the current location, the two
//! marker collections and the session search counter, and the only component
//! allowed to mutate them. Both widgets and the page chrome are driven from
//! here, behind their capability traits.

use futures_lite::{future, StreamExt};
use serde::Serialize;

use duomap_gateway::{coordinate_label, GeocodeError, Geocoder, Location};

use crate::panel::{Kind, Notification, StatusPanel};
use crate::position::{PositionError, PositionSource, REQUEST_OPTIONS};
use crate::protocol::Provider;
use crate::widget::{MapWidget, MarkerHandle, WidgetEvent};

/// Overview zoom both widgets start at.
pub const INITIAL_ZOOM: f64 = 12.0;
/// Closer zoom applied on every located result.
pub const FOCUS_ZOOM: f64 = 14.0;

/// A marker as tracked here: one per provider per placed point.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedMarker {
    pub lat: f64,
    pub lng: f64,
    pub title: String,
    pub handle: MarkerHandle,
}

/// Derived session counters. Recomputed from the collections after every
/// mutation, never stored, so they cannot drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub searches: u64,
    pub google_markers: usize,
    pub leaflet_markers: usize,
}

/// Snapshot offered to the user as a download.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerExport {
    pub google_markers: Vec<ExportedMarker>,
    pub leaflet_markers: Vec<ExportedMarker>,
    pub export_date: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportedMarker {
    pub lat: f64,
    pub lng: f64,
    pub title: String,
}

impl From<&PlacedMarker> for ExportedMarker {
    fn from(marker: &PlacedMarker) -> Self {
        Self {
            lat: marker.lat,
            lng: marker.lng,
            title: marker.title.clone(),
        }
    }
}

/// A user action delivered by the session.
#[derive(Debug, Clone)]
pub enum Command {
    Search { address: String },
    Locate,
    ClearMarkers,
    ExportMarkers,
}

enum Input {
    Command(Command),
    Widget(Provider, WidgetEvent),
    Closed,
}

pub struct Coordinator {
    geocoder: Box<dyn Geocoder>,
    positions: Box<dyn PositionSource>,
    panel: Box<dyn StatusPanel>,
    google: Box<dyn MapWidget>,
    leaflet: Box<dyn MapWidget>,
    current: Location,
    google_markers: Vec<PlacedMarker>,
    leaflet_markers: Vec<PlacedMarker>,
    searches: u64,
}

impl Coordinator {
    pub fn new(
        google: Box<dyn MapWidget>,
        leaflet: Box<dyn MapWidget>,
        geocoder: Box<dyn Geocoder>,
        positions: Box<dyn PositionSource>,
        panel: Box<dyn StatusPanel>,
        initial: Location,
    ) -> Self {
        Self {
            geocoder,
            positions,
            panel,
            google,
            leaflet,
            current: initial,
            google_markers: Vec::new(),
            leaflet_markers: Vec::new(),
            searches: 0,
        }
    }

    /// Center both widgets on the initial location, place the first marker
    /// pair and reset the session counters.
    pub fn initialize(&mut self) {
        self.searches = 0;
        let Location { lat, lng, .. } = self.current;
        self.google.set_center(lat, lng);
        self.google.set_zoom(INITIAL_ZOOM);
        self.leaflet.set_center(lat, lng);
        self.leaflet.set_zoom(INITIAL_ZOOM);

        let name = self.current.name.clone();
        self.place_pair(lat, lng, &name);

        self.panel.show_location(&self.current);
        self.panel.show_stats(&self.stats());
        tracing::info!(location = %self.current, "session initialized");
    }

    /// Resolve a free-text address through the gateway and apply it to both
    /// maps. A failed lookup leaves every piece of state untouched.
    pub async fn resolve_address(&mut self, address: &str) {
        let address = address.trim();
        if address.is_empty() {
            self.panel
                .notify(Notification::new(Kind::Warning, MSG_ADDRESS_PROMPT));
            return;
        }

        self.panel.set_busy(true);
        let result = self.geocoder.geocode(address.to_owned()).await;
        self.panel.set_busy(false);

        match result {
            Ok(location) => {
                tracing::info!(%location, "address resolved");
                self.current = location.clone();
                self.place_pair(location.lat, location.lng, &location.name);
                self.searches += 1;

                self.recenter(location.lat, location.lng);
                self.panel.show_location(&self.current);
                self.panel.show_stats(&self.stats());
                self.panel.notify(Notification::new(
                    Kind::Success,
                    format!("Ubicación encontrada: {}", location.name),
                ));
            }
            Err(err) => {
                tracing::warn!(address, %err, "address resolution failed");
                self.panel
                    .notify(Notification::new(Kind::Error, geocode_message(&err)));
            }
        }
    }

    /// Resolve the device's position. A failed reverse lookup degrades the
    /// label to formatted coordinates; only a failure to obtain coordinates
    /// at all aborts the flow.
    pub async fn resolve_current_position(&mut self) {
        self.panel.set_busy(true);
        let position = self.positions.current_position(REQUEST_OPTIONS).await;

        let (lat, lng) = match position {
            Ok(point) => point,
            Err(err) => {
                self.panel.set_busy(false);
                tracing::warn!(%err, "device position unavailable");
                self.panel
                    .notify(Notification::new(Kind::Error, position_message(err)));
                return;
            }
        };

        let resolved = self.geocoder.reverse_geocode(lat, lng).await;
        self.panel.set_busy(false);

        let (name, filled, notification) = match resolved {
            Ok(address) => (
                address.clone(),
                address,
                Notification::new(Kind::Success, "Ubicación actual obtenida"),
            ),
            Err(err) => {
                tracing::debug!(lat, lng, %err, "reverse lookup degraded to coordinates");
                (
                    coordinate_label(lat, lng),
                    String::new(),
                    Notification::new(Kind::Info, "Ubicación obtenida (sin dirección específica)"),
                )
            }
        };

        self.current = Location::new(lat, lng, name);
        let title = self.current.name.clone();
        self.place_pair(lat, lng, &title);
        self.searches += 1;

        self.recenter(lat, lng);
        self.panel.show_location(&self.current);
        self.panel.fill_address(&filled);
        self.panel.show_stats(&self.stats());
        self.panel.notify(notification);
    }

    /// A click on either map always resolves as a location event; a failed
    /// reverse lookup only downgrades the title to formatted coordinates.
    pub async fn handle_map_click(&mut self, lat: f64, lng: f64) {
        let title = match self.geocoder.reverse_geocode(lat, lng).await {
            Ok(address) => address,
            Err(err) => {
                tracing::debug!(lat, lng, %err, "reverse lookup degraded to coordinates");
                coordinate_label(lat, lng)
            }
        };

        self.current = Location::new(lat, lng, title.clone());
        self.place_pair(lat, lng, &title);
        self.searches += 1;

        self.panel.show_location(&self.current);
        self.panel.show_stats(&self.stats());
        self.panel.notify(Notification::new(
            Kind::Info,
            format!("Marcador agregado en: {title}"),
        ));
    }

    /// Remove every marker from both widgets. The search counter is
    /// cumulative for the session and survives.
    pub fn clear_all(&mut self) {
        for marker in self.google_markers.drain(..) {
            self.google.remove_marker(marker.handle);
        }
        for marker in self.leaflet_markers.drain(..) {
            self.leaflet.remove_marker(marker.handle);
        }
        self.panel.show_stats(&self.stats());
        self.panel.notify(Notification::new(
            Kind::Info,
            "Todos los marcadores han sido eliminados",
        ));
        tracing::debug!("all markers cleared");
    }

    /// Pure read: snapshot of both collections with a capture timestamp.
    #[must_use]
    pub fn export_markers(&self) -> MarkerExport {
        MarkerExport {
            google_markers: self.google_markers.iter().map(ExportedMarker::from).collect(),
            leaflet_markers: self
                .leaflet_markers
                .iter()
                .map(ExportedMarker::from)
                .collect(),
            export_date: chrono::Utc::now(),
        }
    }

    #[must_use]
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            searches: self.searches,
            google_markers: self.google_markers.len(),
            leaflet_markers: self.leaflet_markers.len(),
        }
    }

    /// Drive the coordinator from session commands and both widgets' event
    /// streams until the command stream closes. Everything is handled on
    /// this one task, in arrival order, so no two flows ever interleave.
    pub async fn run(&mut self, commands: async_channel::Receiver<Command>) {
        let mut google_events = self.google.events();
        let mut leaflet_events = self.leaflet.events();

        loop {
            let input = future::or(
                future::or(
                    async {
                        match google_events.next().await {
                            Some(event) => Input::Widget(Provider::Google, event),
                            None => Input::Closed,
                        }
                    },
                    async {
                        match leaflet_events.next().await {
                            Some(event) => Input::Widget(Provider::Leaflet, event),
                            None => Input::Closed,
                        }
                    },
                ),
                async {
                    match commands.recv().await {
                        Ok(command) => Input::Command(command),
                        Err(_) => Input::Closed,
                    }
                },
            )
            .await;

            match input {
                Input::Command(Command::Search { address }) => {
                    self.resolve_address(&address).await;
                }
                Input::Command(Command::Locate) => self.resolve_current_position().await,
                Input::Command(Command::ClearMarkers) => self.clear_all(),
                Input::Command(Command::ExportMarkers) => self.export(),
                Input::Widget(provider, WidgetEvent::Clicked { lat, lng }) => {
                    tracing::debug!(%provider, lat, lng, "map click");
                    self.handle_map_click(lat, lng).await;
                }
                Input::Widget(provider, WidgetEvent::ZoomChanged { level }) => {
                    self.widget_mut(provider).sync_zoom(level);
                    self.panel.show_widget_zoom(provider, level);
                }
                Input::Closed => break,
            }
        }
        tracing::debug!("session input closed");
    }

    fn export(&self) {
        let export = self.export_markers();
        let filename = format!("map-markers-{}.json", export.export_date.format("%Y-%m-%d"));
        match serde_json::to_string_pretty(&export) {
            Ok(content) => {
                self.panel.offer_download(filename, content);
                self.panel.notify(Notification::new(
                    Kind::Success,
                    "Marcadores exportados exitosamente",
                ));
            }
            Err(err) => tracing::error!(%err, "failed to serialize marker export"),
        }
    }

    /// Place one marker per widget and record both, in step. Both insertions
    /// land before any stats recompute.
    fn place_pair(&mut self, lat: f64, lng: f64, title: &str) {
        let handle = self.google.place_marker(lat, lng, title);
        self.google_markers.push(PlacedMarker {
            lat,
            lng,
            title: title.to_owned(),
            handle,
        });
        let handle = self.leaflet.place_marker(lat, lng, title);
        self.leaflet_markers.push(PlacedMarker {
            lat,
            lng,
            title: title.to_owned(),
            handle,
        });
    }

    fn recenter(&mut self, lat: f64, lng: f64) {
        self.google.set_center(lat, lng);
        self.google.set_zoom(FOCUS_ZOOM);
        self.leaflet.set_center(lat, lng);
        self.leaflet.set_zoom(FOCUS_ZOOM);
    }

    fn widget_mut(&mut self, provider: Provider) -> &mut dyn MapWidget {
        match provider {
            Provider::Google => self.google.as_mut(),
            Provider::Leaflet => self.leaflet.as_mut(),
        }
    }
}

const MSG_ADDRESS_PROMPT: &str = "Por favor, ingresa una dirección";

fn geocode_message(err: &GeocodeError) -> String {
    match err {
        GeocodeError::InvalidInput(_) => MSG_ADDRESS_PROMPT.to_owned(),
        GeocodeError::NotFound => duomap_gateway::protocol::ERR_NOT_FOUND.to_owned(),
        GeocodeError::Upstream(_) => "Error de conexión con el servidor".to_owned(),
    }
}

fn position_message(err: PositionError) -> &'static str {
    match err {
        PositionError::PermissionDenied => "Permiso de geolocalización denegado",
        PositionError::Unavailable => "Información de ubicación no disponible",
        PositionError::Timeout => "Tiempo de espera agotado",
        PositionError::Unknown => "Error desconocido al obtener ubicación",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::PositionOptions;
    use crate::widget::headless;

    use std::future::Future;
    use std::pin::Pin;
    use std::sync::{Arc, Mutex};

    use futures_lite::future::block_on;

    struct FakeGeocoder {
        location: Option<Location>,
        address: Option<String>,
        reverse_fails: bool,
        forward_calls: Arc<Mutex<usize>>,
    }

    impl FakeGeocoder {
        fn with_location(location: Location) -> Self {
            Self {
                location: Some(location),
                ..Self::empty()
            }
        }

        fn with_address(address: &str) -> Self {
            Self {
                address: Some(address.to_owned()),
                ..Self::empty()
            }
        }

        fn empty() -> Self {
            Self {
                location: None,
                address: None,
                reverse_fails: false,
                forward_calls: Arc::new(Mutex::new(0)),
            }
        }

        fn failing_reverse() -> Self {
            Self {
                reverse_fails: true,
                ..Self::empty()
            }
        }
    }

    impl Geocoder for FakeGeocoder {
        fn geocode(
            &self,
            _query: String,
        ) -> Pin<Box<dyn Future<Output = Result<Location, GeocodeError>> + Send + '_>> {
            *self.forward_calls.lock().unwrap() += 1;
            let out = self.location.clone().ok_or(GeocodeError::NotFound);
            Box::pin(async move { out })
        }

        fn reverse_geocode(
            &self,
            _lat: f64,
            _lng: f64,
        ) -> Pin<Box<dyn Future<Output = Result<String, GeocodeError>> + Send + '_>> {
            let out = if self.reverse_fails {
                Err(GeocodeError::Upstream("scripted failure".into()))
            } else {
                self.address.clone().ok_or(GeocodeError::NotFound)
            };
            Box::pin(async move { out })
        }
    }

    struct FakePositions(Result<(f64, f64), PositionError>);

    impl PositionSource for FakePositions {
        fn current_position(
            &self,
            _options: PositionOptions,
        ) -> Pin<Box<dyn Future<Output = Result<(f64, f64), PositionError>> + Send + '_>>
        {
            let out = self.0;
            Box::pin(async move { out })
        }
    }

    #[derive(Clone, Default)]
    struct RecordingPanel {
        notifications: Arc<Mutex<Vec<Notification>>>,
        zooms: Arc<Mutex<Vec<(Provider, f64)>>>,
        downloads: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingPanel {
        fn last_notification(&self) -> Notification {
            self.notifications.lock().unwrap().last().cloned().unwrap()
        }
    }

    impl StatusPanel for RecordingPanel {
        fn notify(&self, notification: Notification) {
            self.notifications.lock().unwrap().push(notification);
        }
        fn show_location(&self, _location: &Location) {}
        fn show_stats(&self, _stats: &SessionStats) {}
        fn show_widget_zoom(&self, provider: Provider, level: f64) {
            self.zooms.lock().unwrap().push((provider, level));
        }
        fn set_busy(&self, _busy: bool) {}
        fn fill_address(&self, _value: &str) {}
        fn offer_download(&self, filename: String, _content: String) {
            self.downloads.lock().unwrap().push(filename);
        }
    }

    fn utx() -> Location {
        Location::new(
            20.571_044,
            -97.971_944,
            "Universidad Tecnologica de Xicotepec de Juarez",
        )
    }

    struct Harness {
        coordinator: Coordinator,
        google: headless::Probe,
        leaflet: headless::Probe,
        panel: RecordingPanel,
        forward_calls: Arc<Mutex<usize>>,
    }

    fn harness(geocoder: FakeGeocoder, positions: FakePositions) -> Harness {
        let (google, google_probe) = headless::Widget::new();
        let (leaflet, leaflet_probe) = headless::Widget::new();
        let panel = RecordingPanel::default();
        let forward_calls = Arc::clone(&geocoder.forward_calls);
        let coordinator = Coordinator::new(
            Box::new(google),
            Box::new(leaflet),
            Box::new(geocoder),
            Box::new(positions),
            Box::new(panel.clone()),
            utx(),
        );
        Harness {
            coordinator,
            google: google_probe,
            leaflet: leaflet_probe,
            panel,
            forward_calls,
        }
    }

    fn no_position() -> FakePositions {
        FakePositions(Err(PositionError::Unavailable))
    }

    #[test]
    fn initialize_places_one_pair_and_zeroes_searches() {
        let mut h = harness(FakeGeocoder::empty(), no_position());
        h.coordinator.initialize();

        let stats = h.coordinator.stats();
        assert_eq!(stats.searches, 0);
        assert_eq!(stats.google_markers, 1);
        assert_eq!(stats.leaflet_markers, 1);
        assert!(h
            .google
            .calls()
            .contains(&headless::Call::SetZoom { level: INITIAL_ZOOM }));
    }

    #[test]
    fn resolved_search_increments_once_and_recenters_at_focus_zoom() {
        let mut h = harness(FakeGeocoder::with_location(utx()), no_position());
        h.coordinator.initialize();
        block_on(
            h.coordinator
                .resolve_address("Universidad Tecnologica de Xicotepec de Juarez"),
        );

        let stats = h.coordinator.stats();
        assert_eq!(stats.searches, 1);
        assert_eq!(stats.google_markers, 2);
        assert_eq!(stats.leaflet_markers, 2);
        assert_eq!(h.coordinator.current, utx());
        assert!(h
            .google
            .calls()
            .contains(&headless::Call::SetZoom { level: FOCUS_ZOOM }));
        assert!(h
            .leaflet
            .calls()
            .contains(&headless::Call::SetZoom { level: FOCUS_ZOOM }));

        let notification = h.panel.last_notification();
        assert_eq!(notification.kind, Kind::Success);
        assert!(notification.message.contains("Universidad Tecnologica"));
    }

    #[test]
    fn failed_search_changes_nothing() {
        let mut h = harness(FakeGeocoder::empty(), no_position());
        h.coordinator.initialize();
        let before = h.coordinator.stats();
        let location_before = h.coordinator.current.clone();

        block_on(h.coordinator.resolve_address("nowhere at all"));

        assert_eq!(h.coordinator.stats(), before);
        assert_eq!(h.coordinator.current, location_before);
        assert_eq!(h.google.placed(), 1);
        assert_eq!(h.panel.last_notification().kind, Kind::Error);
    }

    #[test]
    fn blank_search_never_calls_the_gateway() {
        let mut h = harness(FakeGeocoder::empty(), no_position());
        block_on(h.coordinator.resolve_address("   "));

        assert_eq!(*h.forward_calls.lock().unwrap(), 0);
        assert_eq!(h.panel.last_notification().kind, Kind::Warning);
    }

    #[test]
    fn clear_all_empties_both_and_keeps_the_counter() {
        let mut h = harness(FakeGeocoder::with_location(utx()), no_position());
        h.coordinator.initialize();
        block_on(h.coordinator.resolve_address("utx"));
        block_on(h.coordinator.resolve_address("utx"));
        assert_eq!(h.coordinator.stats().searches, 2);

        h.coordinator.clear_all();

        let stats = h.coordinator.stats();
        assert_eq!(stats.google_markers, 0);
        assert_eq!(stats.leaflet_markers, 0);
        assert_eq!(stats.searches, 2);
        assert_eq!(h.google.removed(), 3);
        assert_eq!(h.leaflet.removed(), 3);
    }

    #[test]
    fn collections_refill_after_clearing() {
        let mut h = harness(FakeGeocoder::with_location(utx()), no_position());
        h.coordinator.initialize();
        h.coordinator.clear_all();
        block_on(h.coordinator.resolve_address("utx"));

        let stats = h.coordinator.stats();
        assert_eq!(stats.google_markers, 1);
        assert_eq!(stats.leaflet_markers, 1);
    }

    #[test]
    fn locate_uses_the_resolved_address() {
        let mut h = harness(
            FakeGeocoder::with_address("Calle Falsa 123"),
            FakePositions(Ok((10.0, 20.0))),
        );
        block_on(h.coordinator.resolve_current_position());

        assert_eq!(h.coordinator.current.name, "Calle Falsa 123");
        assert_eq!(h.coordinator.stats().searches, 1);
        assert_eq!(h.google.placed(), 1);
        assert_eq!(h.panel.last_notification().kind, Kind::Success);
    }

    #[test]
    fn locate_degrades_to_coordinates_when_reverse_fails() {
        let mut h = harness(
            FakeGeocoder::failing_reverse(),
            FakePositions(Ok((10.0, 20.0))),
        );
        block_on(h.coordinator.resolve_current_position());

        assert_eq!(
            h.coordinator.current.name,
            "Coordenadas: 10.000000, 20.000000"
        );
        let stats = h.coordinator.stats();
        assert_eq!(stats.searches, 1);
        assert_eq!(stats.google_markers, 1);
        assert_eq!(stats.leaflet_markers, 1);
        assert_eq!(h.panel.last_notification().kind, Kind::Info);
    }

    #[test]
    fn locate_device_failure_is_terminal() {
        let mut h = harness(
            FakeGeocoder::with_address("never used"),
            FakePositions(Err(PositionError::PermissionDenied)),
        );
        h.coordinator.initialize();
        let before = h.coordinator.stats();

        block_on(h.coordinator.resolve_current_position());

        assert_eq!(h.coordinator.stats(), before);
        let notification = h.panel.last_notification();
        assert_eq!(notification.kind, Kind::Error);
        assert_eq!(notification.message, "Permiso de geolocalización denegado");
    }

    #[test]
    fn each_device_failure_has_its_own_message() {
        let cases = [
            (PositionError::PermissionDenied, "Permiso de geolocalización denegado"),
            (PositionError::Unavailable, "Información de ubicación no disponible"),
            (PositionError::Timeout, "Tiempo de espera agotado"),
            (PositionError::Unknown, "Error desconocido al obtener ubicación"),
        ];
        for (error, message) in cases {
            let mut h = harness(FakeGeocoder::empty(), FakePositions(Err(error)));
            block_on(h.coordinator.resolve_current_position());
            assert_eq!(h.panel.last_notification().message, message);
        }
    }

    #[test]
    fn map_click_always_places_a_pair() {
        let mut h = harness(FakeGeocoder::failing_reverse(), no_position());
        block_on(h.coordinator.handle_map_click(1.5, -2.5));

        let stats = h.coordinator.stats();
        assert_eq!(stats.searches, 1);
        assert_eq!(stats.google_markers, 1);
        assert_eq!(stats.leaflet_markers, 1);
        assert_eq!(h.coordinator.current.name, "Coordenadas: 1.500000, -2.500000");
    }

    #[test]
    fn map_click_uses_the_address_when_available() {
        let mut h = harness(FakeGeocoder::with_address("Av. Juárez 5"), no_position());
        block_on(h.coordinator.handle_map_click(1.0, 2.0));

        assert_eq!(h.coordinator.current.name, "Av. Juárez 5");
        let notification = h.panel.last_notification();
        assert_eq!(notification.kind, Kind::Info);
        assert!(notification.message.contains("Av. Juárez 5"));
    }

    #[test]
    fn export_reproduces_insertion_data() {
        let mut h = harness(FakeGeocoder::with_address("Punto"), no_position());
        block_on(h.coordinator.handle_map_click(1.0, 2.0));
        block_on(h.coordinator.handle_map_click(3.0, 4.0));

        let export = h.coordinator.export_markers();
        assert_eq!(export.google_markers.len(), 2);
        assert_eq!(export.leaflet_markers.len(), 2);
        assert_eq!(
            export.google_markers[0],
            ExportedMarker {
                lat: 1.0,
                lng: 2.0,
                title: "Punto".to_owned()
            }
        );
        assert_eq!(export.leaflet_markers[1].lat, 3.0);
        assert_eq!(export.leaflet_markers[1].title, "Punto");
    }

    #[test]
    fn export_wire_keys_match_the_page_contract() {
        let h = harness(FakeGeocoder::empty(), no_position());
        let json = serde_json::to_value(h.coordinator.export_markers()).unwrap();
        assert!(json.get("googleMarkers").is_some());
        assert!(json.get("leafletMarkers").is_some());
        assert!(json.get("exportDate").is_some());
    }

    #[test]
    fn run_dispatches_widget_clicks_to_the_shared_handler() {
        let mut h = harness(FakeGeocoder::with_address("Click"), no_position());
        let (commands_tx, commands_rx) = async_channel::unbounded();

        h.leaflet.click(5.0, 6.0);
        drop(commands_tx);
        block_on(h.coordinator.run(commands_rx));

        assert_eq!(h.coordinator.stats().searches, 1);
        assert_eq!(h.coordinator.current.name, "Click");
    }

    #[test]
    fn run_dispatches_commands_in_arrival_order() {
        let mut h = harness(FakeGeocoder::with_location(utx()), no_position());
        let (commands_tx, commands_rx) = async_channel::unbounded();

        commands_tx
            .try_send(Command::Search {
                address: "utx".into(),
            })
            .unwrap();
        commands_tx.try_send(Command::ClearMarkers).unwrap();
        drop(commands_tx);
        block_on(h.coordinator.run(commands_rx));

        let stats = h.coordinator.stats();
        assert_eq!(stats.searches, 1);
        assert_eq!(stats.google_markers, 0);
    }

    #[test]
    fn zoom_events_update_only_that_widget() {
        let mut h = harness(FakeGeocoder::empty(), no_position());
        let (commands_tx, commands_rx) = async_channel::unbounded();

        h.google.change_zoom(9.0);
        drop(commands_tx);
        block_on(h.coordinator.run(commands_rx));

        assert_eq!(
            h.panel.zooms.lock().unwrap().as_slice(),
            &[(Provider::Google, 9.0)]
        );
    }

    #[test]
    fn export_command_offers_a_dated_download() {
        let mut h = harness(FakeGeocoder::empty(), no_position());
        let (commands_tx, commands_rx) = async_channel::unbounded();

        commands_tx.try_send(Command::ExportMarkers).unwrap();
        drop(commands_tx);
        block_on(h.coordinator.run(commands_rx));

        let downloads = h.panel.downloads.lock().unwrap();
        assert_eq!(downloads.len(), 1);
        assert!(downloads[0].starts_with("map-markers-"));
        assert!(downloads[0].ends_with(".json"));
    }
}
