//! Per-connection wiring between the page socket and the coordinator.
//!
//! One pump task owns the socket and races outbound frames against inbound
//! messages; the session task itself runs the coordinator's cooperative
//! loop. Client events are demuxed into the two widget event streams, the
//! command queue, or the pending device-position waiter.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use axum::extract::ws::{Message, WebSocket};
use futures_lite::future;

use duomap_gateway::Location;

use crate::coordinator::{Command, Coordinator, INITIAL_ZOOM};
use crate::geocoding::GatewayClient;
use crate::panel::{Notification, StatusPanel};
use crate::position::{PositionError, PositionOptions, PositionSource};
use crate::protocol::{ClientEvent, Directive, Frame, Provider, Target};
use crate::widget::{google, leaflet, WidgetEvent};

type PositionReply = Result<(f64, f64), PositionError>;

/// Run one page session over an upgraded socket until it closes.
pub async fn run(socket: WebSocket, base_url: String, initial: Location) {
    let (frames_tx, frames_rx) = async_channel::unbounded::<Frame>();
    let (commands_tx, commands_rx) = async_channel::unbounded::<Command>();
    let (google_tx, google_rx) = async_channel::unbounded::<WidgetEvent>();
    let (leaflet_tx, leaflet_rx) = async_channel::unbounded::<WidgetEvent>();
    let waiter = PositionWaiter::default();

    let pump = tokio::spawn(pump(
        socket,
        frames_rx,
        Demux {
            commands: commands_tx,
            google: google_tx,
            leaflet: leaflet_tx,
            waiter: waiter.clone(),
        },
    ));

    let google = google::Widget::new(frames_tx.clone(), google_rx);
    let leaflet = leaflet::Widget::new(
        frames_tx.clone(),
        leaflet_rx,
        (initial.lat, initial.lng),
        INITIAL_ZOOM,
    );
    let panel = WsPanel {
        frames: frames_tx.clone(),
    };
    let positions = WsPositionSource {
        frames: frames_tx,
        waiter,
    };

    let mut coordinator = Coordinator::new(
        Box::new(google),
        Box::new(leaflet),
        Box::new(GatewayClient::new(base_url)),
        Box::new(positions),
        Box::new(panel),
        initial,
    );
    coordinator.initialize();
    coordinator.run(commands_rx).await;

    let _ = pump.await;
    tracing::debug!("session ended");
}

struct Demux {
    commands: async_channel::Sender<Command>,
    google: async_channel::Sender<WidgetEvent>,
    leaflet: async_channel::Sender<WidgetEvent>,
    waiter: PositionWaiter,
}

impl Demux {
    async fn dispatch(&self, text: &str) {
        let event = match serde_json::from_str::<ClientEvent>(text) {
            Ok(event) => event,
            Err(err) => {
                tracing::debug!(%err, "ignoring malformed client event");
                return;
            }
        };

        match event {
            ClientEvent::Search { address } => {
                let _ = self.commands.send(Command::Search { address }).await;
            }
            ClientEvent::Locate => {
                let _ = self.commands.send(Command::Locate).await;
            }
            ClientEvent::ClearMarkers => {
                let _ = self.commands.send(Command::ClearMarkers).await;
            }
            ClientEvent::ExportMarkers => {
                let _ = self.commands.send(Command::ExportMarkers).await;
            }
            ClientEvent::MapClick { provider, lat, lng } => {
                let _ = self
                    .widget(provider)
                    .send(WidgetEvent::Clicked { lat, lng })
                    .await;
            }
            ClientEvent::ZoomChanged { provider, level } => {
                let _ = self
                    .widget(provider)
                    .send(WidgetEvent::ZoomChanged { level })
                    .await;
            }
            ClientEvent::Position { lat, lng } => self.waiter.resolve(Ok((lat, lng))),
            ClientEvent::PositionError { code } => self.waiter.resolve(Err(code.into())),
        }
    }

    fn widget(&self, provider: Provider) -> &async_channel::Sender<WidgetEvent> {
        match provider {
            Provider::Google => &self.google,
            Provider::Leaflet => &self.leaflet,
        }
    }
}

enum Step {
    Outbound(Result<Frame, async_channel::RecvError>),
    Inbound(Option<Result<Message, axum::Error>>),
}

async fn pump(mut socket: WebSocket, frames: async_channel::Receiver<Frame>, demux: Demux) {
    loop {
        let step = future::or(
            async { Step::Outbound(frames.recv().await) },
            async { Step::Inbound(socket.recv().await) },
        )
        .await;

        match step {
            Step::Outbound(Ok(frame)) => match serde_json::to_string(&frame) {
                Ok(text) => {
                    if socket.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(err) => tracing::error!(%err, "failed to encode frame"),
            },
            // The session logic dropped its senders.
            Step::Outbound(Err(_)) => break,
            Step::Inbound(Some(Ok(Message::Text(text)))) => demux.dispatch(&text).await,
            Step::Inbound(Some(Ok(Message::Close(_))) | None) => break,
            Step::Inbound(Some(Ok(_))) => {}
            Step::Inbound(Some(Err(err))) => {
                tracing::debug!(%err, "socket error");
                break;
            }
        }
    }
}

/// Slot for the single in-flight device-position request.
#[derive(Clone, Default)]
struct PositionWaiter {
    slot: Arc<Mutex<Option<async_channel::Sender<PositionReply>>>>,
}

impl PositionWaiter {
    fn arm(&self) -> async_channel::Receiver<PositionReply> {
        let (tx, rx) = async_channel::bounded(1);
        *self.slot.lock().expect("poisoned") = Some(tx);
        rx
    }

    fn resolve(&self, reply: PositionReply) {
        if let Some(tx) = self.slot.lock().expect("poisoned").take() {
            let _ = tx.try_send(reply);
        } else {
            tracing::debug!("position reply with no waiter");
        }
    }
}

struct WsPositionSource {
    frames: async_channel::Sender<Frame>,
    waiter: PositionWaiter,
}

impl PositionSource for WsPositionSource {
    fn current_position(
        &self,
        options: PositionOptions,
    ) -> Pin<Box<dyn Future<Output = PositionReply> + Send + '_>> {
        let receiver = self.waiter.arm();
        let _ = self.frames.try_send(Frame {
            target: Target::Page,
            directive: Directive::RequestPosition {
                enable_high_accuracy: options.enable_high_accuracy,
                timeout_ms: u64::try_from(options.timeout.as_millis()).unwrap_or(u64::MAX),
                maximum_age_ms: u64::try_from(options.maximum_age.as_millis()).unwrap_or(u64::MAX),
            },
        });

        let timeout = options.timeout;
        Box::pin(async move {
            future::or(
                async {
                    receiver
                        .recv()
                        .await
                        .unwrap_or(Err(PositionError::Unavailable))
                },
                async {
                    async_io::Timer::after(timeout).await;
                    Err(PositionError::Timeout)
                },
            )
            .await
        })
    }
}

struct WsPanel {
    frames: async_channel::Sender<Frame>,
}

impl WsPanel {
    fn push(&self, directive: Directive) {
        let _ = self.frames.try_send(Frame {
            target: Target::Page,
            directive,
        });
    }
}

impl StatusPanel for WsPanel {
    fn notify(&self, notification: Notification) {
        self.push(Directive::Notify(notification));
    }

    fn show_location(&self, location: &Location) {
        self.push(Directive::LocationInfo {
            lat: location.lat,
            lng: location.lng,
            name: location.name.clone(),
        });
    }

    fn show_stats(&self, stats: &crate::coordinator::SessionStats) {
        self.push(Directive::Stats(*stats));
    }

    fn show_widget_zoom(&self, provider: Provider, level: f64) {
        self.push(Directive::WidgetZoom { provider, level });
    }

    fn set_busy(&self, busy: bool) {
        self.push(Directive::Busy { busy });
    }

    fn fill_address(&self, value: &str) {
        self.push(Directive::FillAddress {
            value: value.to_owned(),
        });
    }

    fn offer_download(&self, filename: String, content: String) {
        self.push(Directive::Download { filename, content });
    }
}
