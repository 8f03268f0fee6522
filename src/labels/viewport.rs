use crate::config::LabelConfig;
use crate::geo::LatLngBounds;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use tracing::debug;

/// The visible map region plus zoom level
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub bounds: LatLngBounds,
    pub zoom: f64,
}

/// Which host gesture just finished
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewEventKind {
    ZoomEnd,
    MoveEnd,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewChange {
    pub kind: ViewEventKind,
    pub viewport: Viewport,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Handle returned by `MapHost::subscribe`. Dropping it stops delivery;
/// `MapHost::unsubscribe` removes it eagerly.
pub struct Subscription {
    id: SubscriptionId,
    events: Receiver<ViewChange>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

/// What the label core needs from the interactive map
pub trait MapHost {
    fn bounds(&self) -> LatLngBounds;
    fn zoom(&self) -> f64;
    /// Receive a `ViewChange` after every completed zoom or pan gesture
    fn subscribe(&mut self) -> Subscription;
    fn unsubscribe(&mut self, id: SubscriptionId);

    fn viewport(&self) -> Viewport {
        Viewport {
            bounds: self.bounds(),
            zoom: self.zoom(),
        }
    }
}

/// Subscriber list a host embeds to implement `MapHost::subscribe`
#[derive(Default)]
pub struct ViewEventHub {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Sender<ViewChange>)>,
}

impl ViewEventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Subscription {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        let (tx, rx) = channel();
        self.subscribers.push((id, tx));
        Subscription { id, events: rx }
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscribers.retain(|(sub, _)| *sub != id);
    }

    /// Deliver to every live subscriber, forgetting ones whose handle was dropped
    pub fn emit(&mut self, change: ViewChange) {
        self.subscribers.retain(|(_, tx)| tx.send(change).is_ok());
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

/// Mirrors the host's current zoom and bounds. Holds no history.
pub struct ViewportTracker {
    viewport: Viewport,
    subscription: Option<Subscription>,
}

impl ViewportTracker {
    /// Snapshot the host's view and start listening for view-end events
    pub fn attach(host: &mut impl MapHost) -> Self {
        let viewport = host.viewport();
        let subscription = Some(host.subscribe());
        Self { viewport, subscription }
    }

    /// Drain pending events. Returns the newest viewport if any arrived;
    /// a burst of events collapses into its last one.
    pub fn poll(&mut self) -> Option<Viewport> {
        let sub = self.subscription.as_ref()?;
        let mut latest = None;
        let mut disconnected = false;
        loop {
            match sub.events.try_recv() {
                Ok(change) => latest = Some(change),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    disconnected = true;
                    break;
                }
            }
        }
        if disconnected {
            debug!("map host dropped view subscription");
            self.subscription = None;
        }

        let change = latest?;
        debug!(kind = ?change.kind, zoom = change.viewport.zoom, "view changed");
        self.viewport = change.viewport;
        Some(self.viewport)
    }

    pub fn detach(&mut self, host: &mut impl MapHost) {
        if let Some(sub) = self.subscription.take() {
            host.unsubscribe(sub.id());
        }
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn zoom(&self) -> f64 {
        self.viewport.zoom
    }

    pub fn bounds(&self) -> LatLngBounds {
        self.viewport.bounds
    }

    pub fn zoom_factor(&self, config: &LabelConfig) -> f64 {
        config.zoom_factor(self.viewport.zoom)
    }
}
