use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::channel::{Channel, ChannelId};

use super::{Inbound, Outbound};

/// Connects an outbound port to an inbound port through a new channel.
///
/// Any channel previously bound to either port is replaced, and operations
/// blocked on the ports resume on the new channel. The returned
/// [`Connection`] is only needed to later cut the connection: dropping it
/// leaves the ports connected.
pub fn connect<T: Send + 'static>(outbound: &Outbound<T>, inbound: &Inbound<T>) -> Connection<T> {
    let channel = Channel::new();
    let channel_id = channel.id();

    outbound.binding.swap(Some(channel.clone()));
    inbound.binding.swap(Some(channel));

    debug!(channel = %channel_id, "ports connected");

    Connection {
        outbound: outbound.clone(),
        inbound: inbound.clone(),
        channel_id,
        is_cut: AtomicBool::new(false),
    }
}

/// A live connection between an outbound and an inbound port.
///
/// A connection can be cut once; cutting it again, possibly concurrently from
/// several threads, has no further effect. A cut connection cannot be
/// restored: [`connect`] must be called again to create a new one.
pub struct Connection<T> {
    outbound: Outbound<T>,
    inbound: Inbound<T>,
    channel_id: ChannelId,
    is_cut: AtomicBool,
}

impl<T: Send + 'static> Connection<T> {
    /// Disconnects both ports.
    ///
    /// This does not wait for an in-flight value. A value that was already
    /// handed over to the channel may still be received by the inbound port,
    /// whereas a sender blocked on the channel is moved to the disconnected
    /// state and waits for a new connection.
    ///
    /// Both ports are unbound even if one of them was meanwhile rebound by
    /// another connection.
    #[doc(alias = "cut")]
    pub fn disconnect(&self) {
        if self.is_cut.swap(true, Ordering::AcqRel) {
            return;
        }

        self.outbound.binding.swap(None);
        self.inbound.binding.swap(None);

        debug!(channel = %self.channel_id, "ports disconnected");
    }

    /// Checks whether the connection was cut.
    pub fn is_cut(&self) -> bool {
        self.is_cut.load(Ordering::Acquire)
    }

    /// Returns the identifier of the channel created for this connection.
    pub fn channel_id(&self) -> ChannelId {
        self.channel_id
    }
}

impl<T> fmt::Debug for Connection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("channel_id", &self.channel_id)
            .field("is_cut", &self.is_cut.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
