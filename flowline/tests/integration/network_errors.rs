//! Error reporting and termination of network runs.

use std::thread;
use std::time::{Duration, Instant};

use flowline::component::ComponentError;
use flowline::context::{Context, ContextError};
use flowline::network::{ExecutionError, Network};
use flowline::ports::{connect, Inbound, Outbound};

const MT_NUM_THREADS: usize = 4;
const BOUND: Duration = Duration::from_secs(5);

async fn countdown(
    cx: Context,
    input: Inbound<usize>,
    output: Outbound<usize>,
) -> Result<(), ComponentError> {
    loop {
        let count = input.recv(&cx).await?;
        if count == 0 {
            panic!("test message");
        }
        output.send(&cx, count - 1).await?;
    }
}

/// Pass a counter around a ring of components and decrement it each time,
/// panicking when it becomes zero.
fn component_panic(num_threads: usize) {
    const COMPONENT_COUNT: usize = 5;
    const INIT_COUNTDOWN: usize = 9;

    let inputs: Vec<Inbound<usize>> = (0..COMPONENT_COUNT).map(|_| Inbound::new()).collect();
    let outputs: Vec<Outbound<usize>> = (0..COMPONENT_COUNT).map(|_| Outbound::new()).collect();

    // Connect all components in a cycle graph.
    for (component_id, output) in outputs.iter().enumerate() {
        connect(output, &inputs[(component_id + 1) % COMPONENT_COUNT]);
    }
    let starter = Outbound::new();
    connect(&starter, &inputs[0]);

    let mut network = Network::with_num_threads(num_threads).cancel_on_error(true);
    for (component_id, (input, output)) in inputs.into_iter().zip(outputs).enumerate() {
        network = network.add_fn(
            move |cx| countdown(cx, input.clone(), output.clone()),
            component_id.to_string(),
        );
    }
    network = network.add_fn(
        move |cx| {
            let starter = starter.clone();
            async move {
                starter.send(&cx, INIT_COUNTDOWN).await?;
                Ok::<(), ComponentError>(())
            }
        },
        "starter",
    );

    let cx = Context::new().with_timeout(BOUND);
    match network.run_blocking(&cx) {
        Err(ExecutionError::Panic { name, payload }) => {
            let panicking_component_id = INIT_COUNTDOWN % COMPONENT_COUNT;

            assert_eq!(name, panicking_component_id.to_string());
            assert_eq!(payload, "test message");
        }
        result => panic!("unexpected run result: {:?}", result),
    }
}

/// Start several components failing at once next to a component blocked on a
/// disconnected port.
fn concurrent_failures(num_threads: usize) {
    const FAILING_COUNT: usize = 6;

    let mut network = Network::with_num_threads(num_threads).cancel_on_error(true);
    for id in 0..FAILING_COUNT {
        network = network.add_fn(
            move |_cx| async move {
                Err::<(), _>(ComponentError::failed(format!("failure {}", id)))
            },
            format!("failing{}", id),
        );
    }
    let idle = Inbound::<()>::new();
    network = network.add_fn(
        move |cx| {
            let idle = idle.clone();
            async move {
                idle.recv(&cx).await?;
                Ok::<(), ComponentError>(())
            }
        },
        "idle",
    );

    let cx = Context::new().with_timeout(BOUND);
    let error = network.run_blocking(&cx).unwrap_err();

    assert!(!error.is_cancellation());
    let name = error.component().unwrap().to_owned();
    assert!(name.starts_with("failing"));
    match error {
        ExecutionError::Component { error, .. } => {
            assert_eq!(
                error.to_string(),
                format!("component failure: failure {}", &name["failing".len()..])
            );
        }
        error => panic!("unexpected error: {}", error),
    }

    // Siblings were cancelled, not timed out.
    assert!(!cx.is_cancelled());
}

/// Cancel a network whose components are blocked in every possible way.
fn bounded_time_cancellation(num_threads: usize) {
    let unbound_input = Inbound::<u8>::new();
    let unbound_output = Outbound::<u8>::new();
    let unread_output = Outbound::<u8>::new();
    let unwritten_input = Inbound::<u8>::new();
    connect(&unread_output, &Inbound::new());
    connect(&Outbound::new(), &unwritten_input);

    let network = Network::with_num_threads(num_threads)
        .add_fn(
            move |cx| {
                let port = unbound_input.clone();
                async move {
                    port.recv(&cx).await?;
                    Ok::<(), ComponentError>(())
                }
            },
            "unbound input",
        )
        .add_fn(
            move |cx| {
                let port = unbound_output.clone();
                async move {
                    port.send(&cx, 1).await?;
                    Ok::<(), ComponentError>(())
                }
            },
            "unbound output",
        )
        .add_fn(
            move |cx| {
                let port = unread_output.clone();
                async move {
                    port.send(&cx, 2).await?;
                    Ok::<(), ComponentError>(())
                }
            },
            "unread output",
        )
        .add_fn(
            move |cx| {
                let port = unwritten_input.clone();
                async move {
                    port.recv(&cx).await?;
                    Ok::<(), ComponentError>(())
                }
            },
            "unwritten input",
        );

    let cx = Context::new();
    let canceller = {
        let cx = cx.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            cx.cancel();
        })
    };

    let start = Instant::now();
    let error = network.run_blocking(&cx).unwrap_err();
    assert!(start.elapsed() < BOUND);
    canceller.join().unwrap();

    assert!(error.is_cancellation());
    match error {
        ExecutionError::Component {
            error: ComponentError::Context(reason),
            ..
        } => assert_eq!(reason, ContextError::Cancelled),
        error => panic!("unexpected error: {}", error),
    }
}

/// Let a deadline terminate a network blocked on a disconnected port.
fn deadline_termination(num_threads: usize) {
    let input = Inbound::<u8>::new();
    let network = Network::with_num_threads(num_threads).add_fn(
        move |cx| {
            let input = input.clone();
            async move {
                input.recv(&cx).await?;
                Ok::<(), ComponentError>(())
            }
        },
        "waiting",
    );

    let start = Instant::now();
    let cx = Context::new().with_timeout(Duration::from_millis(50));
    let error = network.run_blocking(&cx).unwrap_err();

    assert!(start.elapsed() >= Duration::from_millis(50));
    assert!(start.elapsed() < BOUND);
    assert_eq!(cx.error(), Some(ContextError::DeadlineExceeded));
    assert_eq!(error.component(), Some("waiting"));
    assert!(error.is_cancellation());
}

#[test]
fn component_panic_st() {
    component_panic(1);
}

#[test]
fn component_panic_mt() {
    component_panic(MT_NUM_THREADS);
}

#[test]
fn concurrent_failures_st() {
    concurrent_failures(1);
}

#[test]
fn concurrent_failures_mt() {
    concurrent_failures(MT_NUM_THREADS);
}

#[test]
fn bounded_time_cancellation_st() {
    bounded_time_cancellation(1);
}

#[test]
fn bounded_time_cancellation_mt() {
    bounded_time_cancellation(MT_NUM_THREADS);
}

#[test]
fn deadline_termination_st() {
    deadline_termination(1);
}

#[test]
fn deadline_termination_mt() {
    deadline_termination(MT_NUM_THREADS);
}
