//! Example: insertion of a filter into a running pipeline.
//!
//! This example demonstrates in particular:
//!
//! * custom components,
//! * closure-based components,
//! * splicing a component between two connected ports.
//!
//! ```text
//!                               ┌──────────┐
//!                          ┌───►│ EvenOnly ├───┐
//!         ┌──────────┐     │    └──────────┘   │     ┌──────────┐
//!         │ Counter  ├─────┤                   ├────►│   Sink   │
//!         └──────────┘     └ ─ ─ ─ ─ ─ ─ ─ ─ ─ ┘     └──────────┘
//! ```
//!
//! The counter is first connected directly to the sink (dashed line).

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use flowline::component::{Component, ComponentError};
use flowline::context::Context;
use flowline::network::{ExecutionError, Network};
use flowline::ports::{connect, Inbound, Outbound};

/// Counts up, one value every 10ms.
#[derive(Default)]
pub struct Counter {
    pub output: Outbound<u64>,
}

impl Counter {
    async fn process(&mut self, cx: &Context) -> Result<(), ComponentError> {
        for value in 0.. {
            self.output.send(cx, value).await?;
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        Ok(())
    }
}

impl Component for Counter {
    fn run<'a>(
        &'a mut self,
        cx: &'a Context,
    ) -> Pin<Box<dyn Future<Output = Result<(), ComponentError>> + Send + 'a>> {
        Box::pin(self.process(cx))
    }
}

/// Forwards even values only.
#[derive(Default)]
pub struct EvenOnly {
    pub input: Inbound<u64>,
    pub output: Outbound<u64>,
}

impl EvenOnly {
    async fn process(&mut self, cx: &Context) -> Result<(), ComponentError> {
        loop {
            let value = self.input.recv(cx).await?;
            if value % 2 == 0 {
                self.output.send(cx, value).await?;
            }
        }
    }
}

impl Component for EvenOnly {
    fn run<'a>(
        &'a mut self,
        cx: &'a Context,
    ) -> Pin<Box<dyn Future<Output = Result<(), ComponentError>> + Send + 'a>> {
        Box::pin(self.process(cx))
    }
}

async fn print_all(cx: Context, sink: Inbound<u64>) -> Result<(), ComponentError> {
    loop {
        let value = sink.recv(&cx).await?;
        println!("received {}", value);
    }
}

fn main() -> Result<(), ExecutionError> {
    let counter = Counter::default();
    let filter = EvenOnly::default();
    let sink = Inbound::new();

    let counter_out = counter.output.clone();
    let (filter_in, filter_out) = (filter.input.clone(), filter.output.clone());
    let sink_in = sink.clone();

    let direct = connect(&counter_out, &sink);

    let network = Network::with_num_threads(2)
        .add(counter, "counter")
        .add(filter, "filter")
        .add_fn(move |cx| print_all(cx, sink.clone()), "sink");

    // Splice in the filter after a while, then let the deadline stop the
    // network.
    let cx = Context::new().with_timeout(Duration::from_millis(300));
    let rewiring = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(100));
        direct.disconnect();
        connect(&counter_out, &filter_in);
        connect(&filter_out, &sink_in);
        println!("filter spliced in");
    });

    let result = network.run_blocking(&cx);
    rewiring.join().unwrap();

    match result {
        Err(error) if error.is_cancellation() => Ok(()),
        result => result,
    }
}
