//! Cancellation context shared by the components of a network.
//!
//! A [`Context`] conveys a cancellation signal and an optional deadline to all
//! blocking port operations. Contexts form a tree: cancelling a context
//! cancels all contexts derived from it with [`Context::child`],
//! [`Context::with_timeout`] or [`Context::with_deadline`], while cancelling a
//! child leaves its parent untouched.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use flowline::context::{Context, ContextError};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let root = Context::new();
//! let child = root.with_timeout(Duration::from_secs(60));
//!
//! root.cancel();
//!
//! assert_eq!(child.cancelled().await, ContextError::Cancelled);
//! # }
//! ```

use std::error::Error;
use std::fmt;
use std::sync::{Arc, Mutex, Weak};
use std::time::{Duration, Instant};

use async_event::Event;
use slab::Slab;

/// A shallow-clonable cancellation context.
///
/// All clones share the same cancellation state.
#[derive(Clone)]
pub struct Context {
    inner: Arc<Inner>,
}

impl Context {
    /// Creates a root context without deadline.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State::default()),
                signal: Event::new(),
                deadline: None,
                parent: None,
            }),
        }
    }

    /// Derives a context which is cancelled when this context is cancelled.
    pub fn child(&self) -> Self {
        self.derive(self.inner.deadline)
    }

    /// Derives a context which deadline expires after the specified duration,
    /// or earlier if this context has an earlier deadline.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derives a context which deadline expires at the specified instant, or
    /// earlier if this context has an earlier deadline.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.inner.deadline {
            Some(parent_deadline) => parent_deadline.min(deadline),
            None => deadline,
        };

        self.derive(Some(deadline))
    }

    /// Cancels this context and all contexts derived from it.
    ///
    /// Cancelling an already cancelled or expired context has no effect.
    pub fn cancel(&self) {
        self.inner.terminate(ContextError::Cancelled);
    }

    /// Returns the deadline of this context, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Returns the reason for the termination of the context, or `None` if the
    /// context is still live.
    pub fn error(&self) -> Option<ContextError> {
        if let Some(error) = self.inner.state.lock().unwrap().error {
            return Some(error);
        }

        match self.inner.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                Some(self.inner.terminate(ContextError::DeadlineExceeded))
            }
            _ => None,
        }
    }

    /// Checks whether the context was cancelled or its deadline has expired.
    pub fn is_cancelled(&self) -> bool {
        self.error().is_some()
    }

    /// Waits until the context is cancelled or its deadline expires and
    /// returns the reason.
    ///
    /// This future is cancel-safe.
    pub async fn cancelled(&self) -> ContextError {
        let terminated = self
            .inner
            .signal
            .wait_until(|| self.inner.state.lock().unwrap().error);

        match self.inner.deadline {
            None => terminated.await,
            Some(deadline) => {
                tokio::select! {
                    error = terminated => error,
                    () = tokio::time::sleep_until(deadline.into()) => {
                        self.inner.terminate(ContextError::DeadlineExceeded)
                    }
                }
            }
        }
    }

    /// Creates a child context with the provided effective deadline.
    fn derive(&self, deadline: Option<Instant>) -> Self {
        let mut parent_state = self.inner.state.lock().unwrap();

        let mut state = State::default();
        if parent_state.error.is_some() {
            // A child of a terminated context is born terminated and needs not
            // be registered.
            state.error = parent_state.error;
        }

        let inner = Arc::new_cyclic(|weak| {
            let parent = if state.error.is_none() {
                let key = parent_state.children.insert(weak.clone());
                Some((self.inner.clone(), key))
            } else {
                None
            };

            Inner {
                state: Mutex::new(state),
                signal: Event::new(),
                deadline,
                parent,
            }
        });

        Self { inner }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("error", &self.inner.state.lock().unwrap().error)
            .field("deadline", &self.inner.deadline)
            .finish_non_exhaustive()
    }
}

/// Mutable state of a context.
#[derive(Default)]
struct State {
    /// Reason for the termination of the context, if terminated.
    error: Option<ContextError>,
    /// Live children, which are to be terminated with this context.
    children: Slab<Weak<Inner>>,
}

/// Data shared between all clones of a context.
struct Inner {
    state: Mutex<State>,
    /// Signalling primitive used to notify cancellation waiters.
    signal: Event,
    /// Effective deadline, accounting for the deadlines of all ancestors.
    deadline: Option<Instant>,
    /// Parent context and key of this context in the parent's children.
    parent: Option<(Arc<Inner>, usize)>,
}

impl Inner {
    /// Terminates the context and its descendants unless it was already
    /// terminated, and returns the effective termination reason.
    fn terminate(&self, error: ContextError) -> ContextError {
        let children = {
            let mut state = self.state.lock().unwrap();
            if let Some(error) = state.error {
                return error;
            }
            state.error = Some(error);

            // Once terminated, a context no longer registers children so the
            // keys freed here are never reused.
            state.children.drain().collect::<Vec<_>>()
        };

        self.signal.notify_all();

        for child in children {
            if let Some(child) = child.upgrade() {
                child.terminate(error);
            }
        }

        error
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some((parent, key)) = &self.parent {
            if let Ok(mut parent_state) = parent.state.lock() {
                // The entry is absent if the parent has been terminated.
                if parent_state.error.is_none() {
                    parent_state.children.try_remove(*key);
                }
            }
        }
    }
}

/// Reason for the termination of a [`Context`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ContextError {
    /// The context was explicitly cancelled.
    Cancelled,
    /// The deadline of the context has expired.
    DeadlineExceeded,
}

impl fmt::Display for ContextError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => write!(fmt, "the context was cancelled"),
            Self::DeadlineExceeded => write!(fmt, "the context deadline has expired"),
        }
    }
}

impl Error for ContextError {}
