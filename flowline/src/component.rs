//! Component contract.
//!
//! A component is an isolated unit with a set of typed ports, exposed as
//! public fields, and a single execution function, [`Component::run`]. The
//! execution function typically loops, receiving from its inbound ports and
//! sending to its outbound ports, until the context is cancelled.
//!
//! #### Example
//!
//! ```
//! use std::future::Future;
//! use std::pin::Pin;
//!
//! use flowline::component::{Component, ComponentError};
//! use flowline::context::Context;
//! use flowline::ports::{Inbound, Outbound};
//!
//! #[derive(Default)]
//! pub struct Doubler {
//!     pub input: Inbound<u64>,
//!     pub output: Outbound<u64>,
//! }
//!
//! impl Doubler {
//!     async fn process(&mut self, cx: &Context) -> Result<(), ComponentError> {
//!         loop {
//!             let value = self.input.recv(cx).await?;
//!             self.output.send(cx, 2 * value).await?;
//!         }
//!     }
//! }
//!
//! impl Component for Doubler {
//!     fn run<'a>(
//!         &'a mut self,
//!         cx: &'a Context,
//!     ) -> Pin<Box<dyn Future<Output = Result<(), ComponentError>> + Send + 'a>> {
//!         Box::pin(self.process(cx))
//!     }
//! }
//! ```

use std::error::Error;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::context::{Context, ContextError};

/// Trait to be implemented by all components.
pub trait Component: Send + 'static {
    /// Runs the component until the context is cancelled, its work is
    /// complete, or it fails.
    ///
    /// Returning `Ok(())` signals a normal termination. Errors returned by
    /// port operations are typically propagated with the `?` operator.
    ///
    /// *Note*: the returned future is boxed so that components can be stored
    /// as trait objects.
    fn run<'a>(
        &'a mut self,
        cx: &'a Context,
    ) -> Pin<Box<dyn Future<Output = Result<(), ComponentError>> + Send + 'a>>;
}

/// A component made of a bare execution function.
///
/// The function is called once per run with a clone of the network context.
pub struct FnComponent<F> {
    func: F,
}

impl<F, Fut> FnComponent<F>
where
    F: FnMut(Context) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), ComponentError>> + Send + 'static,
{
    /// Wraps an execution function into a component.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F, Fut> Component for FnComponent<F>
where
    F: FnMut(Context) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), ComponentError>> + Send + 'static,
{
    fn run<'a>(
        &'a mut self,
        cx: &'a Context,
    ) -> Pin<Box<dyn Future<Output = Result<(), ComponentError>> + Send + 'a>> {
        Box::pin((self.func)(cx.clone()))
    }
}

impl<F> fmt::Debug for FnComponent<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnComponent").finish_non_exhaustive()
    }
}

/// Error returned by a component's execution function.
#[derive(Debug)]
pub enum ComponentError {
    /// A port operation was interrupted by the termination of the context.
    Context(ContextError),
    /// The component failed.
    Failed(Box<dyn Error + Send + Sync + 'static>),
}

impl ComponentError {
    /// Creates a `Failed` error from any error or message.
    pub fn failed(error: impl Into<Box<dyn Error + Send + Sync + 'static>>) -> Self {
        Self::Failed(error.into())
    }

    /// Checks whether the error originates from the termination of the
    /// context rather than from a failure.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Context(_))
    }
}

impl fmt::Display for ComponentError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Context(error) => write!(fmt, "{}", error),
            Self::Failed(error) => write!(fmt, "component failure: {}", error),
        }
    }
}

impl Error for ComponentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Context(error) => Some(error),
            Self::Failed(error) => Some(error.as_ref()),
        }
    }
}

impl From<ContextError> for ComponentError {
    fn from(error: ContextError) -> Self {
        Self::Context(error)
    }
}
