use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::channel::{ChannelId, Offer};
use crate::context::{Context, ContextError};

use super::binding::{send_to, Binding};
use super::{Connection, Inbound};

/// An outbound port.
///
/// `Outbound` ports send values to the [`Inbound`] port they are connected to.
/// The underlying channel can be swapped at any time, including while a
/// component is blocked in [`Outbound::send`].
///
/// When an `Outbound` is cloned, the binding remains shared: connecting or
/// disconnecting one clone is immediately reflected in other clones.
pub struct Outbound<T> {
    pub(super) binding: Arc<Binding<T>>,
}

impl<T: Send + 'static> Outbound<T> {
    /// Creates a new, disconnected `Outbound` port.
    pub fn new() -> Self {
        Self::default()
    }

    /// Connects this port to an inbound port.
    ///
    /// This is equivalent to [`connect(self, inbound)`](crate::ports::connect).
    pub fn connect(&self, inbound: &Inbound<T>) -> Connection<T> {
        super::connect(self, inbound)
    }

    /// Sends a value to the connected inbound port.
    ///
    /// This blocks until the value was taken by a receiver or the context is
    /// cancelled. If the port is rebound while waiting, the value is withdrawn
    /// from the previous channel and offered on the new one, unless it was
    /// already delivered. If the port is disconnected, the operation keeps
    /// waiting until the port is connected again.
    ///
    /// When the context is cancelled, the value is dropped unless a receiver
    /// took it concurrently, in which case the send succeeds. An error is
    /// returned immediately if the context is already cancelled.
    pub async fn send(&self, cx: &Context, value: T) -> Result<(), ContextError> {
        if let Some(error) = cx.error() {
            return Err(error);
        }

        let mut offer = Offer::new(value);

        loop {
            let (channel, version) = self.binding.current();

            let interruption = tokio::select! {
                biased;
                error = cx.cancelled() => Some(error),
                () = send_to(channel.as_ref(), &mut offer) => return Ok(()),
                () = self.binding.rebound(version) => None,
            };

            // The value may still be parked in the channel we were sending to.
            if let Some(channel) = &channel {
                if !channel.withdraw(&mut offer) {
                    return Ok(());
                }
            }

            match interruption {
                Some(error) => return Err(error),
                None => trace!("outbound port rebound while sending"),
            }
        }
    }

    /// Checks whether the port is currently bound to a channel.
    pub fn is_connected(&self) -> bool {
        self.binding.channel_id().is_some()
    }

    /// Returns the identifier of the bound channel, if any.
    pub fn channel_id(&self) -> Option<ChannelId> {
        self.binding.channel_id()
    }
}

impl<T> Clone for Outbound<T> {
    fn clone(&self) -> Self {
        Self {
            binding: self.binding.clone(),
        }
    }
}

impl<T> Default for Outbound<T> {
    fn default() -> Self {
        Self {
            binding: Arc::new(Binding::new()),
        }
    }
}

impl<T> fmt::Debug for Outbound<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Outbound ({:?})", self.binding)
    }
}
