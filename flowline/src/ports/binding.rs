use std::fmt;
use std::future;
use std::sync::Mutex;

use async_event::Event;

use crate::channel::{Channel, ChannelId, Offer};

/// The rebindable channel reference shared by all clones of a port.
pub(super) struct Binding<T> {
    state: Mutex<State<T>>,
    /// Signalling primitive used to interrupt operations blocked on a
    /// previous channel.
    signal: Event,
}

struct State<T> {
    /// Currently bound channel, if connected.
    channel: Option<Channel<T>>,
    /// Count of swaps since the creation of the port.
    version: u64,
}

impl<T> Binding<T> {
    pub(super) fn new() -> Self {
        Self {
            state: Mutex::new(State {
                channel: None,
                version: 0,
            }),
            signal: Event::new(),
        }
    }

    /// Installs a new channel, or disconnects the port if `None`, and wakes
    /// any operation blocked on the previous channel.
    pub(super) fn swap(&self, channel: Option<Channel<T>>) {
        {
            let mut state = self.state.lock().unwrap();
            state.channel = channel;
            state.version = state.version.wrapping_add(1);
        }

        // Notifying without waiters is a no-op.
        self.signal.notify_all();
    }

    /// Returns the bound channel together with the binding version.
    ///
    /// The version must be passed to [`Binding::rebound`] to wait for the
    /// next swap without missing one that happens in between.
    pub(super) fn current(&self) -> (Option<Channel<T>>, u64) {
        let state = self.state.lock().unwrap();

        (state.channel.clone(), state.version)
    }

    /// Returns the identifier of the bound channel, if any.
    pub(super) fn channel_id(&self) -> Option<ChannelId> {
        self.state
            .lock()
            .unwrap()
            .channel
            .as_ref()
            .map(Channel::id)
    }

    /// Waits until the binding version differs from the specified one.
    pub(super) async fn rebound(&self, version: u64) {
        self.signal
            .wait_until(|| (self.state.lock().unwrap().version != version).then_some(()))
            .await
    }
}

impl<T> fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.channel_id() {
            Some(id) => write!(f, "connected to channel {}", id),
            None => write!(f, "disconnected"),
        }
    }
}

/// Receives from the channel, or never completes if there is none.
pub(super) async fn recv_from<T>(channel: Option<&Channel<T>>) -> T {
    match channel {
        Some(channel) => channel.recv().await,
        None => future::pending().await,
    }
}

/// Sends to the channel, or never completes if there is none.
pub(super) async fn send_to<T>(channel: Option<&Channel<T>>, offer: &mut Offer<T>) {
    match channel {
        Some(channel) => channel.send(offer).await,
        None => future::pending().await,
    }
}
