//! Value transformations.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use flowline::component::{Component, ComponentError};
use flowline::context::Context;
use flowline::ports::{Inbound, Outbound};

/// A component which applies a function to each received value and sends
/// the result.
pub struct Map<T, U> {
    /// Values to be transformed.
    pub input: Inbound<T>,
    /// Transformed values.
    pub output: Outbound<U>,
    func: Box<dyn FnMut(T) -> U + Send>,
}

impl<T: Send + 'static, U: Send + 'static> Map<T, U> {
    /// Creates a new map component.
    pub fn new(func: impl FnMut(T) -> U + Send + 'static) -> Self {
        Self {
            input: Inbound::new(),
            output: Outbound::new(),
            func: Box::new(func),
        }
    }

    async fn process(&mut self, cx: &Context) -> Result<(), ComponentError> {
        loop {
            let value = self.input.recv(cx).await?;
            let value = (self.func)(value);
            self.output.send(cx, value).await?;
        }
    }
}

impl Map<String, String> {
    /// Creates a component which converts strings to upper case.
    pub fn upper() -> Self {
        Self::new(|s: String| s.to_uppercase())
    }

    /// Creates a component which converts strings to lower case.
    pub fn lower() -> Self {
        Self::new(|s: String| s.to_lowercase())
    }
}

impl<T: Send + 'static, U: Send + 'static> Component for Map<T, U> {
    fn run<'a>(
        &'a mut self,
        cx: &'a Context,
    ) -> Pin<Box<dyn Future<Output = Result<(), ComponentError>> + Send + 'a>> {
        Box::pin(self.process(cx))
    }
}

impl<T, U> fmt::Debug for Map<T, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Map")
            .field("input", &self.input)
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}
