//! Component ports and connections.
//!
//! Components typically contain [`Inbound`] and/or [`Outbound`] ports, exposed
//! as public member variables. An outbound port is connected to an inbound
//! port with [`connect`], which creates a fresh unbuffered channel and binds it
//! to both ports. The returned [`Connection`] can later be cut with
//! [`Connection::disconnect`].
//!
//! Connections can be created and cut at any time, including while the
//! components owning the ports are running and blocked on the ports. A
//! component blocked in [`Inbound::recv`] or [`Outbound::send`] is
//! transparently moved to the channel of the most recent connection. A port
//! that is disconnected simply stalls the component until it is connected
//! again.
//!
//! `Inbound` and `Outbound` ports are clonable. Their clones are shallow
//! copies, meaning that any connection made on one clone is immediately
//! reflected in other clones. This is what makes it possible to keep
//! rewiring the ports of a component after the component itself was moved to
//! a [`Network`](crate::network::Network).
//!
//! #### Example
//!
//! ```
//! use flowline::context::Context;
//! use flowline::ports::{connect, Inbound, Outbound};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let cx = Context::new();
//! let output = Outbound::new();
//! let first = Inbound::new();
//! let second = Inbound::new();
//!
//! let connection = connect(&output, &first);
//! let sender = {
//!     let (cx, output) = (cx.clone(), output.clone());
//!     tokio::spawn(async move { output.send(&cx, "hello").await })
//! };
//! assert_eq!(first.recv(&cx).await, Ok("hello"));
//! sender.await.unwrap().unwrap();
//!
//! // Rewire the output to the second inbound port.
//! connection.disconnect();
//! let _connection = connect(&output, &second);
//! let sender = {
//!     let (cx, output) = (cx.clone(), output.clone());
//!     tokio::spawn(async move { output.send(&cx, "world").await })
//! };
//! assert_eq!(second.recv(&cx).await, Ok("world"));
//! sender.await.unwrap().unwrap();
//! # }
//! ```

mod binding;
mod connection;
mod inbound;
mod outbound;

pub use crate::channel::ChannelId;
pub use connection::{connect, Connection};
pub use inbound::Inbound;
pub use outbound::Outbound;
