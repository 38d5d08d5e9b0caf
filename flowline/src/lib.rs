//! A flow-based programming runtime with live rewiring.
//!
//! Flowline executes networks of concurrently running *components* which
//! exchange values through typed *ports*. The distinguishing feature of
//! Flowline is that connections between ports are first-class objects that
//! can be created and cut at any time, including while the components are
//! running and blocked on their ports. A component never observes a rewiring
//! other than through the values it receives: the send or receive operation
//! it is blocked on is transparently moved to the newly bound channel.
//!
//!
//! # A practical overview
//!
//! Building a network is a 3-step process:
//!
//! 1. the design of components, each exposing inbound and outbound ports and
//!    implementing a single execution function,
//! 2. the wiring of the ports of the instantiated components,
//! 3. the execution of the network, during which ports may be rewired.
//!
//! ## Components
//!
//! A component is a type which exposes [`Inbound`](ports::Inbound) and
//! [`Outbound`](ports::Outbound) ports as public fields and implements the
//! [`Component`](component::Component) trait. Ports are shallow-clonable
//! handles, so a component can be moved into a network while the surrounding
//! program keeps clones of its ports for later rewiring.
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
//! pub struct Shout {
//!     pub input: Inbound<String>,
//!     pub output: Outbound<String>,
//! }
//!
//! impl Shout {
//!     async fn process(&mut self, cx: &Context) -> Result<(), ComponentError> {
//!         loop {
//!             let message = self.input.recv(cx).await?;
//!             self.output.send(cx, message.to_uppercase()).await?;
//!         }
//!     }
//! }
//!
//! impl Component for Shout {
//!     fn run<'a>(
//!         &'a mut self,
//!         cx: &'a Context,
//!     ) -> Pin<Box<dyn Future<Output = Result<(), ComponentError>> + Send + 'a>> {
//!         Box::pin(self.process(cx))
//!     }
//! }
//! ```
//!
//! Every port operation takes a [`Context`](context::Context), which is the
//! cancellation signal of the network. Port operations return an error as soon
//! as the context is cancelled or its deadline has passed, so that the `?`
//! operator is usually all that is needed to shut a component down.
//!
//! ## Wiring and rewiring
//!
//! An outbound port is connected to an inbound port with
//! [`connect`](ports::connect), which creates a fresh unbuffered channel and
//! returns a [`Connection`](ports::Connection). A send completes only once a
//! receiver has taken the value.
//!
//! A connection is cut with
//! [`Connection::disconnect`](ports::Connection::disconnect). Cutting is
//! idempotent and safe to perform concurrently. A port whose connection was
//! cut is disconnected and stalls any operation until it is connected again;
//! this makes it possible to rewire a running network one link at a time
//! without losing or duplicating values.
//!
//! ## Running a network
//!
//! Components are registered with a [`Network`](network::Network) builder and
//! run either on the ambient tokio runtime with
//! [`Network::run`](network::Network::run), or on a dedicated runtime with
//! [`Network::run_blocking`](network::Network::run_blocking). The run completes
//! once all components have terminated, and reports the first error returned
//! by a component, if any.
//!
//! ```
//! use std::time::Duration;
//!
//! use flowline::component::ComponentError;
//! use flowline::context::Context;
//! use flowline::network::Network;
//! use flowline::ports::{connect, Inbound, Outbound};
//!
//! let output = Outbound::new();
//! let input = Inbound::new();
//! let _link = connect(&output, &input);
//!
//! let network = Network::with_num_threads(2)
//!     .add_fn(
//!         move |cx| {
//!             let output = output.clone();
//!             async move {
//!                 output.send(&cx, 21).await?;
//!                 Ok::<(), ComponentError>(())
//!             }
//!         },
//!         "source",
//!     )
//!     .add_fn(
//!         move |cx| {
//!             let input = input.clone();
//!             async move {
//!                 let value: i32 = input.recv(&cx).await?;
//!                 assert_eq!(value * 2, 42);
//!                 Ok::<(), ComponentError>(())
//!             }
//!         },
//!         "sink",
//!     );
//!
//! let cx = Context::new().with_timeout(Duration::from_secs(5));
//! network.run_blocking(&cx).unwrap();
//! ```
//!
//!
//! # Logging
//!
//! Flowline emits [`tracing`] events and spans under the `flowline` target.
//! Each component runs within a `component` span which records the name it was
//! registered with, so that events emitted by the component itself are
//! attributed to it:
//!
//! ```text
//! DEBUG component{name=upper}: flowline::network: component cancelled error=the context was cancelled
//! ```
//!
//! Connections and disconnections are reported at the `DEBUG` level, and the
//! migration of a blocked operation to a new channel at the `TRACE` level. No
//! subscriber is installed by the library; a typical application would use
//! `tracing-subscriber` with an `EnvFilter`, e.g. `RUST_LOG=flowline=debug`.
//!
//!
//! # Modules documentation
//!
//! * the [`ports`] module details the semantics of port operations while a
//!   port is being rewired,
//! * the [`context`] module discusses cancellation propagation and deadlines,
//! * the [`network`] module describes error reporting and the optional
//!   cancellation of siblings on error.
#![warn(missing_docs, missing_debug_implementations, unreachable_pub)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod channel;
pub mod component;
pub mod context;
pub mod network;
pub mod ports;
