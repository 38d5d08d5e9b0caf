//! Value sources.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use flowline::component::{Component, ComponentError};
use flowline::context::Context;
use flowline::ports::Outbound;
use tracing::trace;

/// A source which emits `make(0)`, `make(1)`, ... on its output port.
///
/// By default, values are sent back-to-back and the generator never
/// terminates on its own.
pub struct Generator<T> {
    /// Generated values.
    pub output: Outbound<T>,
    make: Box<dyn FnMut(u64) -> T + Send>,
    interval: Option<Duration>,
    count: Option<u64>,
}

impl<T: Send + 'static> Generator<T> {
    /// Creates a generator from a function of the index of the value.
    pub fn new(make: impl FnMut(u64) -> T + Send + 'static) -> Self {
        Self {
            output: Outbound::new(),
            make: Box::new(make),
            interval: None,
            count: None,
        }
    }

    /// Waits for the specified duration after each value was sent.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);

        self
    }

    /// Terminates successfully after the specified number of values were
    /// sent.
    pub fn with_count(mut self, count: u64) -> Self {
        self.count = Some(count);

        self
    }

    async fn process(&mut self, cx: &Context) -> Result<(), ComponentError> {
        for index in 0..self.count.unwrap_or(u64::MAX) {
            let value = (self.make)(index);
            self.output.send(cx, value).await?;
            trace!(index, "value sent");

            if let Some(interval) = self.interval {
                tokio::select! {
                    error = cx.cancelled() => return Err(error.into()),
                    () = tokio::time::sleep(interval) => {}
                }
            }
        }

        Ok(())
    }
}

impl Generator<String> {
    /// Creates a generator of greetings, `"Hello 0"`, `"Hello 1"`, ...
    pub fn hello() -> Self {
        Self::new(|index| format!("Hello {}", index))
    }
}

impl<T: Send + 'static> Component for Generator<T> {
    fn run<'a>(
        &'a mut self,
        cx: &'a Context,
    ) -> Pin<Box<dyn Future<Output = Result<(), ComponentError>> + Send + 'a>> {
        Box::pin(self.process(cx))
    }
}

impl<T> fmt::Debug for Generator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("output", &self.output)
            .field("interval", &self.interval)
            .field("count", &self.count)
            .finish_non_exhaustive()
    }
}
