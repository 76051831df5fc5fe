use std::sync::mpsc;
use std::thread;

use crate::engine::{AlgorithmEvent, CancelToken, Engine, RunSnapshot, StopCondition};
use crate::error::{EvolveError, Result};

/// engine handed back after its thread finished, with the run outcome
pub struct Finished {
    pub engine: Engine,
    pub outcome: Result<RunSnapshot>,
}

/// handle to an engine running on a background thread
pub struct RunHandle {
    events: mpsc::Receiver<AlgorithmEvent>,
    cancel: CancelToken,
    thread: thread::JoinHandle<Finished>,
}

impl RunHandle {
    /// lifecycle events in emission order; disconnects once the run is over
    pub fn events(&self) -> &mpsc::Receiver<AlgorithmEvent> {
        &self.events
    }

    /// request cancellation; observed at the next epoch boundary
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// wait for the run to end
    pub fn join(self) -> Result<Finished> {
        self.thread
            .join()
            .map_err(|_| EvolveError::InvalidState("engine thread panicked"))
    }
}

/// spawn `engine` on a background thread named "engine".
/// events are forwarded over a channel; a dropped receiver does not stop the run.
pub fn spawn(mut engine: Engine, stop: StopCondition) -> Result<RunHandle> {
    profiling::scope!("engine_thread::spawn");
    let (event_tx, events) = mpsc::channel();
    let cancel = CancelToken::new();
    let token = cancel.clone();

    let thread = thread::Builder::new().name("engine".to_owned()).spawn(move || {
        profiling::register_thread!("engine");
        let outcome = engine.run(&stop, &token, |event| {
            let _ = event_tx.send(event.clone());
        });
        Finished { engine, outcome }
    })?;

    Ok(RunHandle { events, cancel, thread })
}
