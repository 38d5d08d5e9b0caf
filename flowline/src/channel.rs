//! Unbuffered channel for the hand-off of values between an outbound and an
//! inbound port.
#![warn(missing_docs, missing_debug_implementations, unreachable_pub)]

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_event::Event;

/// Source of unique channel identifiers.
static NEXT_CHANNEL_ID: AtomicU64 = AtomicU64::new(0);

/// The single slot of a channel.
struct Slot<T> {
    /// Value offered by a sender and not yet taken, tagged with its ticket.
    offer: Option<(u64, T)>,
    /// Ticket to be attributed to the next offer.
    next_ticket: u64,
}

/// Data shared between all handles to a channel.
struct Inner<T> {
    /// Slot holding the pending offer, if any.
    slot: Mutex<Slot<T>>,
    /// Signalling primitive used to notify receivers that a value was offered.
    receiver_signal: Event,
    /// Signalling primitive used to notify senders that an offer was taken or
    /// withdrawn.
    sender_signal: Event,
}

/// A handle to a rendezvous channel.
///
/// A send completes only once a receiver has taken the value, which mirrors
/// the semantics of a synchronous, unbuffered channel. Handles are shallow
/// clones: all clones refer to the same channel.
pub(crate) struct Channel<T> {
    /// Shared data.
    inner: Arc<Inner<T>>,
    /// Identifier of the channel.
    id: ChannelId,
}

impl<T> Channel<T> {
    /// Creates a new channel with an empty slot.
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                slot: Mutex::new(Slot {
                    offer: None,
                    next_ticket: 0,
                }),
                receiver_signal: Event::new(),
                sender_signal: Event::new(),
            }),
            id: ChannelId(NEXT_CHANNEL_ID.fetch_add(1, Ordering::Relaxed)),
        }
    }

    /// Returns the unique identifier of the channel.
    pub(crate) fn id(&self) -> ChannelId {
        self.id
    }

    /// Hands the value held by the offer over to a receiver, waiting until the
    /// slot is free and then until a receiver has taken the value.
    ///
    /// The state of the transfer is kept in the offer so this future can be
    /// dropped at any await point: if it is dropped after the value was
    /// parked in the slot, [`Channel::withdraw`] must be called to either
    /// recover the value or learn that it was delivered.
    pub(crate) async fn send(&self, offer: &mut Offer<T>) {
        self.inner
            .sender_signal
            .wait_until(|| {
                let mut slot = self.inner.slot.lock().unwrap();

                match offer.ticket {
                    // The value is parked: the transfer is complete once the
                    // slot no longer holds our ticket.
                    Some(ticket) => match &slot.offer {
                        Some((t, _)) if *t == ticket => None,
                        _ => {
                            offer.ticket = None;
                            Some(())
                        }
                    },
                    None => {
                        if slot.offer.is_some() {
                            return None;
                        }
                        let Some(value) = offer.value.take() else {
                            // Nothing left to send.
                            return Some(());
                        };
                        let ticket = slot.next_ticket;
                        slot.next_ticket = slot.next_ticket.wrapping_add(1);
                        slot.offer = Some((ticket, value));
                        offer.ticket = Some(ticket);
                        drop(slot);

                        self.inner.receiver_signal.notify_all();

                        None
                    }
                }
            })
            .await
    }

    /// Receives a value, waiting until a sender offers one.
    ///
    /// This future is cancel-safe: a value is only removed from the slot when
    /// the future completes.
    pub(crate) async fn recv(&self) -> T {
        let value = self
            .inner
            .receiver_signal
            .wait_until(|| {
                let mut slot = self.inner.slot.lock().unwrap();

                slot.offer.take().map(|(_, value)| value)
            })
            .await;

        // The slot is now free and the sender of this value can complete.
        self.inner.sender_signal.notify_all();

        value
    }

    /// Takes back the value of an interrupted send if it is still parked in
    /// the slot.
    ///
    /// Returns `true` if the offer holds its value after the call, and `false`
    /// if the value was already delivered to a receiver.
    pub(crate) fn withdraw(&self, offer: &mut Offer<T>) -> bool {
        let Some(ticket) = offer.ticket.take() else {
            return offer.value.is_some();
        };

        let mut slot = self.inner.slot.lock().unwrap();
        match slot.offer.take() {
            Some((t, value)) if t == ticket => {
                offer.value = Some(value);
                drop(slot);

                // Another sender may be waiting for the slot to become free.
                self.inner.sender_signal.notify_all();

                true
            }
            other => {
                slot.offer = other;

                false
            }
        }
    }
}

impl<T> Clone for Channel<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            id: self.id,
        }
    }
}

impl<T> fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// A value in transit through a [`Channel`].
///
/// An offer either holds its value, or has parked it in a channel under a
/// ticket, or is spent once the value was delivered.
pub(crate) struct Offer<T> {
    value: Option<T>,
    ticket: Option<u64>,
}

impl<T> Offer<T> {
    /// Creates an offer holding the provided value.
    pub(crate) fn new(value: T) -> Self {
        Self {
            value: Some(value),
            ticket: None,
        }
    }
}

impl<T> fmt::Debug for Offer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Offer")
            .field("has_value", &self.value.is_some())
            .field("ticket", &self.ticket)
            .finish()
    }
}

/// Unique identifier for a channel.
///
/// Identifiers are never reused within a process.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChannelId(u64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
