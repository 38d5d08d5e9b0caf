//! Insertion of a component into a running pipeline.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Semaphore;

use flowline::component::{Component, ComponentError};
use flowline::context::Context;
use flowline::network::Network;
use flowline::ports::{connect, Inbound, Outbound};

const VALUE_COUNT: u64 = 1000;
const BOUND: Duration = Duration::from_secs(10);

type RunFuture<'a> = Pin<Box<dyn Future<Output = Result<(), ComponentError>> + Send + 'a>>;

/// Counts up, sending one value per permit.
struct Counter {
    output: Outbound<u64>,
    permits: Arc<Semaphore>,
}
impl Counter {
    async fn process(&mut self, cx: &Context) -> Result<(), ComponentError> {
        for value in 1..=VALUE_COUNT {
            self.permits
                .acquire()
                .await
                .map_err(ComponentError::failed)?
                .forget();
            self.output.send(cx, value).await?;
        }

        Ok(())
    }
}
impl Component for Counter {
    fn run<'a>(&'a mut self, cx: &'a Context) -> RunFuture<'a> {
        Box::pin(self.process(cx))
    }
}

#[derive(Default)]
struct Negate {
    input: Inbound<u64>,
    output: Outbound<i64>,
}
impl Negate {
    async fn process(&mut self, cx: &Context) -> Result<(), ComponentError> {
        loop {
            let value = self.input.recv(cx).await?;
            let value = i64::try_from(value).map_err(ComponentError::failed)?;
            self.output.send(cx, -value).await?;
        }
    }
}
impl Component for Negate {
    fn run<'a>(&'a mut self, cx: &'a Context) -> RunFuture<'a> {
        Box::pin(self.process(cx))
    }
}

#[derive(Default)]
struct Widen {
    input: Inbound<u64>,
    output: Outbound<i64>,
}
impl Widen {
    async fn process(&mut self, cx: &Context) -> Result<(), ComponentError> {
        loop {
            let value = self.input.recv(cx).await?;
            let value = i64::try_from(value).map_err(ComponentError::failed)?;
            self.output.send(cx, value).await?;
        }
    }
}
impl Component for Widen {
    fn run<'a>(&'a mut self, cx: &'a Context) -> RunFuture<'a> {
        Box::pin(self.process(cx))
    }
}

struct Recorder {
    input: Inbound<i64>,
    received: Arc<Mutex<Vec<i64>>>,
}
impl Recorder {
    async fn process(&mut self, cx: &Context) -> Result<(), ComponentError> {
        for _ in 0..VALUE_COUNT {
            let value = self.input.recv(cx).await?;
            self.received.lock().unwrap().push(value);
        }

        Ok(())
    }
}
impl Component for Recorder {
    fn run<'a>(&'a mut self, cx: &'a Context) -> RunFuture<'a> {
        Box::pin(self.process(cx))
    }
}

async fn wait_for_len(received: &Mutex<Vec<i64>>, len: u64) {
    tokio::time::timeout(BOUND, async {
        while (received.lock().unwrap().len() as u64) < len {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("timed out waiting for the recorder");
}

/// Feed a recorder through a widening stage, then replace the stage by a
/// negating stage while all components are blocked on their ports.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn replace_stage_while_running() {
    const SPLIT: u64 = VALUE_COUNT / 4;

    let permits = Arc::new(Semaphore::new(0));
    let counter = Counter {
        output: Outbound::new(),
        permits: permits.clone(),
    };
    let widen = Widen::default();
    let negate = Negate::default();
    let received = Arc::new(Mutex::new(Vec::new()));
    let recorder = Recorder {
        input: Inbound::new(),
        received: received.clone(),
    };

    // Keep clones of the ports for later rewiring.
    let counter_out = counter.output.clone();
    let (widen_in, widen_out) = (widen.input.clone(), widen.output.clone());
    let (negate_in, negate_out) = (negate.input.clone(), negate.output.clone());
    let recorder_in = recorder.input.clone();

    let counter_to_widen = connect(&counter_out, &widen_in);
    let widen_to_recorder = connect(&widen_out, &recorder_in);

    let cx = Context::new().with_timeout(BOUND);
    let network = Network::new()
        .add(counter, "counter")
        .add(widen, "widen")
        .add(negate, "negate")
        .add(recorder, "recorder");
    let run = tokio::spawn({
        let cx = cx.clone();
        async move { network.run(&cx).await }
    });

    permits.add_permits(SPLIT as usize);
    wait_for_len(&received, SPLIT).await;

    counter_to_widen.disconnect();
    widen_to_recorder.disconnect();
    let _counter_to_negate = connect(&counter_out, &negate_in);
    let _negate_to_recorder = connect(&negate_out, &recorder_in);

    permits.add_permits((VALUE_COUNT - SPLIT) as usize);
    wait_for_len(&received, VALUE_COUNT).await;

    // The recorder and the counter are done, the stages keep waiting.
    cx.cancel();
    let error = run.await.unwrap().unwrap_err();
    assert!(error.is_cancellation());
    assert!(matches!(error.component(), Some("widen") | Some("negate")));

    let received = received.lock().unwrap();
    let expected: Vec<i64> = (1..=VALUE_COUNT as i64)
        .map(|value| if value as u64 <= SPLIT { value } else { -value })
        .collect();
    assert_eq!(*received, expected);
}
