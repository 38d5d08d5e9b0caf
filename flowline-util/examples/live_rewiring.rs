//! Example: a greeting pipeline alternating between two processing stages.
//!
//! This example demonstrates in particular:
//!
//! * stock components,
//! * rewiring of a running network,
//! * graceful shutdown on Ctrl-C.
//!
//! ```text
//!                           ┌─────────┐
//!                       ┌──►│  Upper  ├───┐
//!           ┌─────────┐ │   └─────────┘   │   ┌─────────┐
//!           │  Hello  ├─┤                 ├──►│ Printer │
//!           └─────────┘ │   ┌─────────┐   │   └─────────┘
//!                       └──►│  Lower  ├───┘
//!                           └─────────┘
//! ```
//!
//! Only one of the two stages is connected at any time. Run with
//! `RUST_LOG=flowline=debug` to see the connections being made and cut.

use std::time::Duration;

use tracing_subscriber::EnvFilter;

use flowline::context::Context;
use flowline::network::Network;
use flowline::ports::connect;
use flowline_util::generator::Generator;
use flowline_util::map::Map;
use flowline_util::printer::Printer;

const STAGE_DURATION: Duration = Duration::from_secs(3);

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let hello = Generator::hello().with_interval(Duration::from_millis(500));
    let upper = Map::upper();
    let lower = Map::lower();
    let printer = Printer::new();

    let hello_out = hello.output.clone();
    let stages = [
        ("upper", upper.input.clone(), upper.output.clone()),
        ("lower", lower.input.clone(), lower.output.clone()),
    ];
    let printer_in = printer.input.clone();

    let network = Network::new()
        .add(hello, "hello")
        .add(upper, "upper")
        .add(lower, "lower")
        .add(printer, "printer");

    let cx = Context::new();
    let run = tokio::spawn({
        let cx = cx.clone();
        async move { network.run(&cx).await }
    });

    let rewire = async {
        for (name, stage_in, stage_out) in stages.iter().cycle() {
            tracing::info!(stage = *name, "switching stage");
            let first = connect(&hello_out, stage_in);
            let second = connect(stage_out, &printer_in);
            tokio::time::sleep(STAGE_DURATION).await;
            first.disconnect();
            second.disconnect();
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        () = rewire => {}
    }
    cx.cancel();

    match run.await {
        Ok(Err(error)) if !error.is_cancellation() => eprintln!("network failed: {}", error),
        Err(error) => eprintln!("network task failed: {}", error),
        _ => {}
    }
}
