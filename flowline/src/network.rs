//! Network of concurrently running components.
//!
//! A [`Network`] is a registry of components which, when run, executes each
//! component in its own task and waits until all of them have terminated.
//! Connections between the ports of the components are not managed by the
//! network: they can be made before the network is run, or at any time while
//! it runs, from any thread.
//!
//! The first error returned by a component is the result of the run; other
//! errors are discarded. A failing component does not stop its siblings,
//! which keep running until they terminate on their own or the context is
//! cancelled, unless [`Network::cancel_on_error`] was set.
//!
//! #### Example
//!
//! ```
//! use flowline::component::ComponentError;
//! use flowline::context::Context;
//! use flowline::network::Network;
//! use flowline::ports::{connect, Inbound, Outbound};
//!
//! let output = Outbound::new();
//! let input = Inbound::new();
//! let _connection = connect(&output, &input);
//!
//! let network = Network::with_num_threads(2)
//!     .add_fn(
//!         move |cx| {
//!             let output = output.clone();
//!             async move {
//!                 for i in 0..3 {
//!                     output.send(&cx, i).await?;
//!                 }
//!                 Ok::<(), ComponentError>(())
//!             }
//!         },
//!         "producer",
//!     )
//!     .add_fn(
//!         move |cx| {
//!             let input = input.clone();
//!             async move {
//!                 for i in 0..3 {
//!                     assert_eq!(input.recv(&cx).await?, i);
//!                 }
//!                 Ok::<(), ComponentError>(())
//!             }
//!         },
//!         "consumer",
//!     );
//!
//! network.run_blocking(&Context::new()).unwrap();
//! ```

use std::any::Any;
use std::error::Error;
use std::fmt;
use std::future::Future;
use std::io;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};

use futures_util::FutureExt;
use tokio::task::JoinSet;
use tracing::{debug, info_span, warn, Instrument};

use crate::component::{Component, ComponentError, FnComponent};
use crate::context::Context;

/// Builder and runner for a network of components.
pub struct Network {
    components: Vec<(String, Box<dyn Component>)>,
    num_threads: usize,
    cancel_on_error: bool,
}

impl Network {
    /// Creates an empty network which blocking runner uses all available
    /// logical threads.
    pub fn new() -> Self {
        Self::with_num_threads(num_cpus::get())
    }

    /// Creates an empty network which blocking runner uses the specified
    /// number of threads.
    ///
    /// The number of threads is only relevant to [`Network::run_blocking`];
    /// [`Network::run`] uses the ambient runtime. A value of zero is treated
    /// as one.
    pub fn with_num_threads(num_threads: usize) -> Self {
        Self {
            components: Vec::new(),
            num_threads: num_threads.max(1),
            cancel_on_error: false,
        }
    }

    /// Specifies whether the first error returned by a component should
    /// cancel all other components.
    ///
    /// This is disabled by default, in which case the siblings of a failing
    /// component keep running.
    pub fn cancel_on_error(mut self, enabled: bool) -> Self {
        self.cancel_on_error = enabled;

        self
    }

    /// Adds a component to the network.
    ///
    /// The `name` argument needs not be unique (it can be the empty string) and
    /// is used for convenience for the component instance identification (e.g.
    /// for logging and error reporting purposes).
    pub fn add(mut self, component: impl Component, name: impl Into<String>) -> Self {
        self.components.push((name.into(), Box::new(component)));

        self
    }

    /// Adds a bare execution function to the network.
    ///
    /// The function is called with a clone of the network context.
    pub fn add_fn<F, Fut>(self, func: F, name: impl Into<String>) -> Self
    where
        F: FnMut(Context) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), ComponentError>> + Send + 'static,
    {
        self.add(FnComponent::new(func), name)
    }

    /// Returns the number of components in the network.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Checks whether the network contains no components.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Runs all components concurrently on the ambient tokio runtime until
    /// they have all terminated.
    ///
    /// Each component is given a child of the provided context, so cancelling
    /// `cx` cancels all components. The first error returned is the result of
    /// the run.
    ///
    /// If this future is dropped, all component tasks are aborted.
    ///
    /// # Panics
    ///
    /// This method panics if it is not called from within a tokio runtime.
    pub async fn run(self, cx: &Context) -> Result<(), ExecutionError> {
        let Self {
            components,
            cancel_on_error,
            ..
        } = self;

        let cx = cx.child();
        let first_error = Arc::new(Mutex::new(None));
        let mut tasks = JoinSet::new();

        debug!(component_count = components.len(), "starting network");

        for (name, mut component) in components {
            let cx = cx.clone();
            let first_error = first_error.clone();
            let span = info_span!(target: "flowline", "component", name = %name);

            tasks.spawn(
                async move {
                    let outcome = AssertUnwindSafe(component.run(&cx)).catch_unwind().await;

                    let error = match outcome {
                        Ok(Ok(())) => {
                            debug!("component terminated");
                            return;
                        }
                        Ok(Err(error)) => {
                            if error.is_cancellation() {
                                debug!(%error, "component cancelled");
                            } else {
                                warn!(%error, "component failed");
                            }
                            ExecutionError::Component { name, error }
                        }
                        Err(payload) => {
                            let payload = panic_message(payload);
                            warn!(%payload, "component panicked");
                            ExecutionError::Panic { name, payload }
                        }
                    };

                    // The error must be recorded before the siblings are
                    // cancelled so that it takes precedence over their
                    // cancellation errors.
                    {
                        let mut first_error = first_error.lock().unwrap();
                        if first_error.is_none() {
                            *first_error = Some(error);
                        } else {
                            debug!(%error, "discarding subsequent error");
                        }
                    }

                    if cancel_on_error {
                        cx.cancel();
                    }
                }
                .instrument(span),
            );
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(error) = joined {
                warn!(%error, "component task aborted");
            }
        }

        let error = first_error.lock().unwrap().take();
        match error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Runs all components concurrently on a dedicated multi-threaded
    /// runtime, blocking until they have all terminated.
    ///
    /// See [`Network::run`].
    ///
    /// # Panics
    ///
    /// This method panics if it is called from within an asynchronous
    /// context.
    pub fn run_blocking(self, cx: &Context) -> Result<(), ExecutionError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.num_threads)
            .enable_time()
            .build()
            .map_err(ExecutionError::Runtime)?;

        runtime.block_on(self.run(cx))
    }
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Network")
            .field(
                "components",
                &self.components.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            )
            .field("num_threads", &self.num_threads)
            .field("cancel_on_error", &self.cancel_on_error)
            .finish()
    }
}

/// Extracts a printable message from a panic payload.
fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("non-string panic payload")
    }
}

/// Error returned when a network run did not complete successfully.
#[derive(Debug)]
pub enum ExecutionError {
    /// A component returned an error.
    Component {
        /// Name of the component.
        name: String,
        /// Error returned by the component.
        error: ComponentError,
    },
    /// A component panicked.
    Panic {
        /// Name of the component.
        name: String,
        /// Message extracted from the panic payload.
        payload: String,
    },
    /// The runtime required by [`Network::run_blocking`] could not be built.
    Runtime(io::Error),
}

impl ExecutionError {
    /// Returns the name of the component at the origin of the error, if any.
    pub fn component(&self) -> Option<&str> {
        match self {
            Self::Component { name, .. } | Self::Panic { name, .. } => Some(name),
            Self::Runtime(_) => None,
        }
    }

    /// Checks whether the error originates from the termination of the
    /// context.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Component { error, .. } if error.is_cancellation())
    }
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Component { name, error } => {
                write!(fmt, "component '{}' returned an error: {}", name, error)
            }
            Self::Panic { name, payload } => {
                write!(fmt, "component '{}' panicked: {}", name, payload)
            }
            Self::Runtime(error) => {
                write!(fmt, "the network runtime could not be built: {}", error)
            }
        }
    }
}

impl Error for ExecutionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Component { error, .. } => Some(error),
            Self::Panic { .. } => None,
            Self::Runtime(error) => Some(error),
        }
    }
}
