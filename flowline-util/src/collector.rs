//! Observable value sink.
//!
//! A [`Collector`] records all received values into a buffer shared with a
//! [`Collected`] handle, which can be used from outside the network to
//! inspect the values received so far or to wait until enough values were
//! received.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use async_event::Event;

use flowline::component::{Component, ComponentError};
use flowline::context::Context;
use flowline::ports::Inbound;

struct Shared<T> {
    values: Mutex<Vec<T>>,
    signal: Event,
}

/// A sink which records all received values.
pub struct Collector<T> {
    /// Values to be recorded.
    pub input: Inbound<T>,
    shared: Arc<Shared<T>>,
}

impl<T: Send + 'static> Collector<T> {
    /// Creates a new collector with an empty buffer.
    pub fn new() -> Self {
        Self {
            input: Inbound::new(),
            shared: Arc::new(Shared {
                values: Mutex::new(Vec::new()),
                signal: Event::new(),
            }),
        }
    }

    /// Returns a handle to the buffer of recorded values.
    pub fn handle(&self) -> Collected<T> {
        Collected {
            shared: self.shared.clone(),
        }
    }

    async fn process(&mut self, cx: &Context) -> Result<(), ComponentError> {
        loop {
            let value = self.input.recv(cx).await?;
            self.shared.values.lock().unwrap().push(value);
            self.shared.signal.notify_all();
        }
    }
}

impl<T: Send + 'static> Default for Collector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> Component for Collector<T> {
    fn run<'a>(
        &'a mut self,
        cx: &'a Context,
    ) -> Pin<Box<dyn Future<Output = Result<(), ComponentError>> + Send + 'a>> {
        Box::pin(self.process(cx))
    }
}

impl<T> fmt::Debug for Collector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collector")
            .field("input", &self.input)
            .finish_non_exhaustive()
    }
}

/// A handle to the values recorded by a [`Collector`].
pub struct Collected<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Collected<T> {
    /// Returns the number of recorded values.
    pub fn len(&self) -> usize {
        self.shared.values.lock().unwrap().len()
    }

    /// Checks whether no value was recorded yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes and returns all recorded values.
    pub fn take(&self) -> Vec<T> {
        std::mem::take(&mut *self.shared.values.lock().unwrap())
    }

    /// Waits until at least `len` values are recorded.
    ///
    /// Values removed with [`Collected::take`] do not count.
    pub async fn wait_for_len(&self, len: usize) {
        self.shared
            .signal
            .wait_until(|| (self.len() >= len).then_some(()))
            .await
    }
}

impl<T: Clone> Collected<T> {
    /// Returns a copy of the recorded values.
    pub fn values(&self) -> Vec<T> {
        self.shared.values.lock().unwrap().clone()
    }
}

impl<T> Clone for Collected<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T> fmt::Debug for Collected<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collected")
            .field("len", &self.len())
            .finish()
    }
}
