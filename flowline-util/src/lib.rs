//! Stock components for flowline networks.
//!
//! This crate provides a handful of general-purpose components:
//!
//! * [`Generator`](generator::Generator), a source which emits values made
//!   from a running index,
//! * [`Map`](map::Map), which transforms each received value,
//! * [`Printer`](printer::Printer), a sink writing one line per value,
//! * [`Collector`](collector::Collector), a sink recording values into a
//!   buffer which can be observed from outside the network.
#![warn(missing_docs, missing_debug_implementations, unreachable_pub)]

pub mod collector;
pub mod generator;
pub mod map;
pub mod printer;
