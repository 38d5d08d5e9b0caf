use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::channel::ChannelId;
use crate::context::{Context, ContextError};

use super::binding::{recv_from, Binding};

/// An inbound port.
///
/// `Inbound` ports receive values from the [`Outbound`](crate::ports::Outbound)
/// port they are connected to. The underlying channel can be swapped at any
/// time, including while a component is blocked in [`Inbound::recv`].
///
/// When an `Inbound` is cloned, the binding remains shared: connecting or
/// disconnecting one clone is immediately reflected in other clones.
pub struct Inbound<T> {
    pub(super) binding: Arc<Binding<T>>,
}

impl<T: Send + 'static> Inbound<T> {
    /// Creates a new, disconnected `Inbound` port.
    pub fn new() -> Self {
        Self::default()
    }

    /// Receives a value from the connected outbound port.
    ///
    /// This blocks until a value is received or the context is cancelled. If
    /// the port is rebound while waiting, the operation restarts on the new
    /// channel. If the port is disconnected, the operation keeps waiting until
    /// the port is connected again: a disconnection alone does not unblock the
    /// receiver.
    ///
    /// An error is returned immediately if the context is already cancelled.
    pub async fn recv(&self, cx: &Context) -> Result<T, ContextError> {
        if let Some(error) = cx.error() {
            return Err(error);
        }

        loop {
            // The channel and the version are read atomically so that a swap
            // occurring before `rebound` is polled is still observed.
            let (channel, version) = self.binding.current();

            tokio::select! {
                biased;
                error = cx.cancelled() => return Err(error),
                value = recv_from(channel.as_ref()) => return Ok(value),
                () = self.binding.rebound(version) => {
                    trace!("inbound port rebound while receiving");
                }
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

impl<T> Clone for Inbound<T> {
    fn clone(&self) -> Self {
        Self {
            binding: self.binding.clone(),
        }
    }
}

impl<T> Default for Inbound<T> {
    fn default() -> Self {
        Self {
            binding: Arc::new(Binding::new()),
        }
    }
}

impl<T> fmt::Debug for Inbound<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Inbound ({:?})", self.binding)
    }
}
