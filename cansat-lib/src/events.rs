//! Outcome notifications emitted by a [crate::PacketDecoder].
use crossbeam::channel::Sender;
use tracing::trace;

use crate::error::DecodeError;
use crate::telemetry::Reading;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A packet was rejected. The decoder state is unchanged.
    PacketError(DecodeError),
    /// Mission time went backwards, most likely because the payload restarted. Emitted
    /// before the [Event::DecodeSucceeded] of the same packet.
    ResetDetected { previous: u64, current: u64 },
    /// A packet was decoded and is now the current reading.
    DecodeSucceeded(Reading),
    CsvLoggingEnabledChanged(bool),
}

/// Receives [Event]s from a decoder, in the order they are emitted.
pub trait Listener: Send {
    fn on_event(&mut self, event: &Event);
}

impl<F> Listener for F
where
    F: FnMut(&Event) + Send,
{
    fn on_event(&mut self, event: &Event) {
        self(event);
    }
}

/// Forwards events to a channel, e.g., to hand them to another thread.
///
/// Events are dropped silently once the receiving side is gone.
pub struct ChannelListener {
    tx: Sender<Event>,
}

impl ChannelListener {
    pub fn new(tx: Sender<Event>) -> Self {
        ChannelListener { tx }
    }
}

impl Listener for ChannelListener {
    fn on_event(&mut self, event: &Event) {
        if self.tx.send(event.clone()).is_err() {
            trace!("event receiver dropped");
        }
    }
}
