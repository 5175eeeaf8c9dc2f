//! Fan-out of shell events to render adapters.
//!
//! Actors publish [`ShellEvent`]s through a [`BroadcastSender`]; the
//! [`Broadcaster`] owns the subscriber registry and forwards each event to
//! every registered sink. Subscribing yields a [`Subscription`] handle that
//! can later be passed back to unsubscribe.

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tracing::debug;

use crate::apps::carousel::PageGroup;
use crate::sys::sensor::Transform;

/// Events the shell publishes to render adapters.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
#[serde(tag = "type")]
pub enum ShellEvent {
    /// A carousel page appeared. Positions follow the repagination edit
    /// script semantics (favorites pages precede regular pages).
    PageInserted {
        position: usize,
        group: PageGroup,
        page_index: usize,
    },
    PageRemoved {
        position: usize,
    },
    /// An existing page's contents changed; `previous`/`current` are its
    /// effective item counts before and after.
    PageItemsChanged {
        position: usize,
        previous: usize,
        current: usize,
    },
    /// The favorites/total page split changed; drives the page indicator.
    IndicatorChanged {
        favorites_pages: usize,
        total_pages: usize,
    },
    SearchResultsChanged {
        ids: Vec<String>,
    },
    /// Whether the favorites rows should be revealed (they hide while a
    /// search is active).
    FavoritesRevealed {
        revealed: bool,
    },
    /// Scroll back to the first page.
    CarouselReset,
    TransformChanged {
        transform: Transform,
    },
    OrientationLockChanged {
        locked: bool,
    },
    /// Whether sensor-driven rotation is possible at all; off means the
    /// rotate toggle falls back to manual mode.
    AutoRotateAvailable {
        available: bool,
    },
}

/// Sink an adapter receives shell events on.
pub type SinkSender = crate::actor::Sender<ShellEvent>;
pub type SinkReceiver = crate::actor::Receiver<ShellEvent>;

#[derive(Debug)]
pub enum Event {
    Publish(ShellEvent),
    Subscribe {
        sink: SinkSender,
        reply: oneshot::Sender<Subscription>,
    },
    Unsubscribe(Subscription),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription(u64);

/// Cloneable handle actors publish through.
pub struct BroadcastSender(crate::actor::Sender<Event>);

impl Clone for BroadcastSender {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl BroadcastSender {
    pub fn send(&self, event: ShellEvent) { self.0.send(Event::Publish(event)) }

    /// Register a sink. The subscription handle arrives on the returned
    /// channel once the broadcaster has processed the registration.
    pub fn subscribe(&self, sink: SinkSender) -> oneshot::Receiver<Subscription> {
        let (reply, handle) = oneshot::channel();
        self.0.send(Event::Subscribe { sink, reply });
        handle
    }

    pub fn unsubscribe(&self, subscription: Subscription) {
        self.0.send(Event::Unsubscribe(subscription));
    }
}

pub fn channel() -> (BroadcastSender, crate::actor::Receiver<Event>) {
    let (tx, rx) = crate::actor::channel();
    (BroadcastSender(tx), rx)
}

/// Subscriber registry. Sinks whose receiver has gone away are pruned on the
/// next emit.
#[derive(Default)]
pub struct EventBus {
    sinks: Vec<(u64, SinkSender)>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self { Self::default() }

    pub fn subscribe(&mut self, sink: SinkSender) -> Subscription {
        let id = self.next_id;
        self.next_id += 1;
        self.sinks.push((id, sink));
        Subscription(id)
    }

    pub fn unsubscribe(&mut self, subscription: Subscription) {
        self.sinks.retain(|(id, _)| *id != subscription.0);
    }

    pub fn emit(&mut self, event: ShellEvent) {
        self.sinks.retain(|(id, sink)| {
            let delivered = sink.try_send(event.clone()).is_ok();
            if !delivered {
                debug!(subscription = *id, "dropping dead broadcast sink");
            }
            delivered
        });
    }

    pub fn sink_count(&self) -> usize { self.sinks.len() }
}

pub struct Broadcaster {
    receiver: crate::actor::Receiver<Event>,
    bus: EventBus,
}

impl Broadcaster {
    pub fn new() -> (Self, BroadcastSender) {
        let (sender, receiver) = channel();
        (Self { receiver, bus: EventBus::new() }, sender)
    }

    pub async fn run(mut self) {
        while let Some((span, event)) = self.receiver.recv().await {
            let _guard = span.enter();
            self.handle_event(event);
        }
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Publish(event) => self.bus.emit(event),
            Event::Subscribe { sink, reply } => {
                let subscription = self.bus.subscribe(sink);
                _ = reply.send(subscription);
            }
            Event::Unsubscribe(subscription) => self.bus.unsubscribe(subscription),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn drain(rx: &mut SinkReceiver) -> Vec<ShellEvent> {
        let mut events = Vec::new();
        while let Ok((_span, event)) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn subscribers_receive_emitted_events() {
        let mut bus = EventBus::new();
        let (sink, mut rx) = crate::actor::channel();
        bus.subscribe(sink);

        bus.emit(ShellEvent::CarouselReset);
        bus.emit(ShellEvent::OrientationLockChanged { locked: true });

        assert_eq!(drain(&mut rx), vec![
            ShellEvent::CarouselReset,
            ShellEvent::OrientationLockChanged { locked: true },
        ]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut bus = EventBus::new();
        let (sink, mut rx) = crate::actor::channel();
        let subscription = bus.subscribe(sink);

        bus.emit(ShellEvent::CarouselReset);
        bus.unsubscribe(subscription);
        bus.emit(ShellEvent::CarouselReset);

        assert_eq!(drain(&mut rx).len(), 1);
        assert_eq!(bus.sink_count(), 0);
    }

    #[test]
    fn dead_sinks_are_pruned_on_emit() {
        let mut bus = EventBus::new();
        let (sink, rx) = crate::actor::channel();
        bus.subscribe(sink);
        drop(rx);

        bus.emit(ShellEvent::CarouselReset);
        assert_eq!(bus.sink_count(), 0);
    }

    #[test]
    fn broadcaster_wires_subscriptions_through_events() {
        let (mut broadcaster, sender) = Broadcaster::new();
        let (sink, mut rx) = crate::actor::channel();

        let mut handle = sender.subscribe(sink);
        sender.send(ShellEvent::CarouselReset);

        // Drain the broadcaster's mailbox synchronously.
        while let Ok((_span, event)) = broadcaster.receiver.try_recv() {
            broadcaster.handle_event(event);
        }

        assert_eq!(drain(&mut rx), vec![ShellEvent::CarouselReset]);
        let subscription = handle.try_recv().unwrap();

        sender.unsubscribe(subscription);
        sender.send(ShellEvent::CarouselReset);
        while let Ok((_span, event)) = broadcaster.receiver.try_recv() {
            broadcaster.handle_event(event);
        }
        assert_eq!(drain(&mut rx).len(), 0);
    }
}
