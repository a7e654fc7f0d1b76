//! Running an optimizer out-of-line behind two queues.
//!
//! A [`QueueBasedOptimizer`] presents the [`Optimizer`] contract to the
//! caller while the wrapped optimizer lives on a worker thread inside a
//! [`QueueBackend`]. The two sides share no state; they talk through
//! unbounded channels:
//!
//! - inbound: [`BackendMessage::Update`] snapshots and the
//!   [`BackendMessage::Exit`] sentinel,
//! - outbound: proposed [`Candidate`]s,
//! - errors: failures of the wrapped optimizer.
//!
//! On every tick the backend drains the inbound queue, keeping only the
//! newest snapshot. Applying a snapshot first discards every buffered
//! proposal, since those were made from older information. The backend
//! then tops the outbound queue up whenever it holds fewer than
//! `min_candidates` proposals.
//!
//! # Example
//!
//! ```
//! use std::time::{Duration, Instant};
//!
//! use hypersearch::parameter::MinMaxNumericParamDef;
//! use hypersearch::{Experiment, Optimizer, OptimizerConfig, QueueBasedOptimizer, RandomSearch};
//!
//! let exp = Experiment::builder("queued")
//!     .param("x", MinMaxNumericParamDef::new(0.0, 1.0).unwrap())
//!     .build()
//!     .unwrap();
//! let config = OptimizerConfig::default().update_time(Duration::from_millis(5));
//! let inner = RandomSearch::new(exp, &config).unwrap();
//! let mut opt = QueueBasedOptimizer::spawn(inner, &config).unwrap();
//!
//! // Proposals arrive asynchronously; pulling never blocks.
//! let deadline = Instant::now() + Duration::from_secs(5);
//! let mut got = Vec::new();
//! while got.is_empty() && Instant::now() < deadline {
//!     got = opt.get_next_candidates(2);
//!     std::thread::sleep(Duration::from_millis(1));
//! }
//! assert!(!got.is_empty());
//! opt.join().unwrap();
//! ```

use core::time::Duration;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, TryRecvError};

use super::{Optimizer, OptimizerConfig, check_experiment_supported};
use crate::candidate::Candidate;
use crate::error::{Error, Result};
use crate::experiment::Experiment;
use crate::parameter::ParamKind;

/// A message on a backend's inbound queue.
#[derive(Debug)]
pub enum BackendMessage {
    /// A newer experiment snapshot.
    Update(Experiment),
    /// Stop the backend; later messages are discarded.
    Exit,
}

/// Lifecycle state of a [`QueueBackend`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendState {
    /// Polling for updates and producing proposals.
    Running,
    /// Stopped; ticks are no-ops.
    Exited,
}

/// The worker side of a [`QueueBasedOptimizer`].
///
/// The backend owns the wrapped optimizer exclusively. It is normally driven
/// by [`run`](Self::run) on a worker thread, but [`tick`](Self::tick) can be
/// called directly for deterministic stepping.
pub struct QueueBackend {
    optimizer: Box<dyn Optimizer>,
    inbound: Receiver<BackendMessage>,
    outbound: Sender<Candidate>,
    buffered: Receiver<Candidate>,
    errors: Sender<Error>,
    min_candidates: usize,
    update_time: Duration,
    state: BackendState,
}

impl core::fmt::Debug for QueueBackend {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("QueueBackend")
            .field("optimizer", &self.optimizer.name())
            .field("buffered", &self.buffered.len())
            .field("min_candidates", &self.min_candidates)
            .field("update_time", &self.update_time)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl QueueBackend {
    /// Creates a backend around `optimizer`.
    ///
    /// `outbound` and `buffered` must be the two ends of the same channel:
    /// proposals are sent on `outbound`, and `buffered` is used to measure
    /// and flush the queue.
    #[must_use]
    pub fn new(
        optimizer: Box<dyn Optimizer>,
        config: &OptimizerConfig,
        inbound: Receiver<BackendMessage>,
        outbound: Sender<Candidate>,
        buffered: Receiver<Candidate>,
        errors: Sender<Error>,
    ) -> Self {
        Self {
            optimizer,
            inbound,
            outbound,
            buffered,
            errors,
            min_candidates: config.min_candidates,
            update_time: config.update_time,
            state: BackendState::Running,
        }
    }

    /// The current lifecycle state.
    #[must_use]
    pub fn state(&self) -> BackendState {
        self.state
    }

    /// The wrapped optimizer.
    #[must_use]
    pub fn optimizer(&self) -> &dyn Optimizer {
        self.optimizer.as_ref()
    }

    /// Performs one polling step: update handling, then generation.
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    pub fn tick(&mut self) -> BackendState {
        if self.state == BackendState::Exited {
            return self.state;
        }

        let Some(latest) = self.drain_inbound() else {
            self.state = BackendState::Exited;
            trace_info!(optimizer = self.optimizer.name(), "backend received exit");
            return self.state;
        };

        if let Some(experiment) = latest {
            let stale = self.buffered.try_iter().count();
            trace_debug!(
                optimizer = self.optimizer.name(),
                experiment = experiment.id(),
                stale,
                "applying experiment update"
            );
            match self.guarded(|opt| opt.update(experiment)) {
                Some(Ok(())) => {}
                Some(Err(e)) => self.report(e),
                None => return self.state,
            }
        }

        if self.buffered.len() < self.min_candidates {
            let n = self.min_candidates;
            let Some(proposals) = self.guarded(|opt| opt.get_next_candidates(n)) else {
                return self.state;
            };
            trace_debug!(
                optimizer = self.optimizer.name(),
                generated = proposals.len(),
                "generated candidates"
            );
            for candidate in proposals {
                // The backend holds a receiver, so the channel stays connected.
                let _ = self.outbound.send(candidate);
            }
        }

        self.state
    }

    /// Ticks every `update_time` until the backend exits, then releases the
    /// wrapped optimizer.
    pub fn run(mut self) {
        trace_info!(
            optimizer = self.optimizer.name(),
            min_candidates = self.min_candidates,
            "backend started"
        );
        while self.tick() == BackendState::Running {
            thread::sleep(self.update_time);
        }
        let _ = self.guarded(|opt| opt.exit());
        trace_info!(optimizer = self.optimizer.name(), "backend exited");
    }

    /// Drains the inbound queue.
    ///
    /// Returns `None` on the exit sentinel (or a disconnected caller),
    /// otherwise the newest snapshot, if any arrived.
    fn drain_inbound(&mut self) -> Option<Option<Experiment>> {
        let mut latest = None;
        loop {
            match self.inbound.try_recv() {
                Ok(BackendMessage::Update(experiment)) => latest = Some(experiment),
                Ok(BackendMessage::Exit) | Err(TryRecvError::Disconnected) => {
                    // Anything queued behind the sentinel is dropped.
                    while self.inbound.try_recv().is_ok() {}
                    return None;
                }
                Err(TryRecvError::Empty) => return Some(latest),
            }
        }
    }

    /// Runs `f` on the wrapped optimizer, turning a panic into a reported
    /// error and the `Exited` state.
    fn guarded<T>(&mut self, f: impl FnOnce(&mut dyn Optimizer) -> T) -> Option<T> {
        let optimizer = self.optimizer.as_mut();
        match panic::catch_unwind(AssertUnwindSafe(|| f(optimizer))) {
            Ok(value) => Some(value),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                self.state = BackendState::Exited;
                self.report(Error::OptimizerPanicked(message));
                None
            }
        }
    }

    fn report(&self, error: Error) {
        trace_warn!(optimizer = self.optimizer.name(), error = %error, "optimizer error");
        // A caller that dropped its error receiver no longer wants reports.
        let _ = self.errors.send(error);
    }
}

fn panic_message(payload: &(dyn core::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}

/// An [`Optimizer`] whose wrapped strategy runs on a worker thread.
///
/// [`update`](Optimizer::update) and [`exit`](Optimizer::exit) only enqueue
/// messages; [`get_next_candidates`](Optimizer::get_next_candidates) returns
/// whatever proposals are buffered right now, possibly none. Use
/// [`join`](Self::join) to wait for the worker to stop. Dropping the
/// optimizer asks the worker to exit without waiting for it.
pub struct QueueBasedOptimizer {
    name: String,
    supported: Vec<ParamKind>,
    experiment: Experiment,
    inbound: Sender<BackendMessage>,
    outbound: Receiver<Candidate>,
    errors: Receiver<Error>,
    worker: Option<JoinHandle<()>>,
    exit_sent: bool,
}

impl core::fmt::Debug for QueueBasedOptimizer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("QueueBasedOptimizer")
            .field("name", &self.name)
            .field("experiment", &self.experiment.id())
            .field("buffered", &self.outbound.len())
            .field("exit_sent", &self.exit_sent)
            .finish_non_exhaustive()
    }
}

impl QueueBasedOptimizer {
    /// Moves `optimizer` onto a new worker thread and starts its backend.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `config` is invalid and
    /// [`Error::Internal`] if the worker thread cannot be spawned.
    pub fn spawn(optimizer: impl Optimizer + 'static, config: &OptimizerConfig) -> Result<Self> {
        config.validate()?;
        let name = format!("QueueBased({})", optimizer.name());
        let supported = optimizer.supported_param_types().to_vec();
        let experiment = optimizer.experiment().clone();

        let (inbound_tx, inbound_rx) = crossbeam_channel::unbounded();
        let (outbound_tx, outbound_rx) = crossbeam_channel::unbounded();
        let (errors_tx, errors_rx) = crossbeam_channel::unbounded();
        let backend = QueueBackend::new(
            Box::new(optimizer),
            config,
            inbound_rx,
            outbound_tx,
            outbound_rx.clone(),
            errors_tx,
        );

        let worker = thread::Builder::new()
            .name(format!("hypersearch-{}", experiment.name()))
            .spawn(move || backend.run())
            .map_err(|_| Error::Internal("failed to spawn optimizer worker thread"))?;
        trace_info!(optimizer = %name, experiment = experiment.id(), "queue-based optimizer spawned");

        Ok(Self {
            name,
            supported,
            experiment,
            inbound: inbound_tx,
            outbound: outbound_rx,
            errors: errors_rx,
            worker: Some(worker),
            exit_sent: false,
        })
    }

    /// Number of proposals currently buffered.
    #[must_use]
    pub fn pending_candidates(&self) -> usize {
        self.outbound.len()
    }

    /// Drains the errors reported by the backend so far.
    #[must_use]
    pub fn errors(&self) -> Vec<Error> {
        self.errors.try_iter().collect()
    }

    /// Asks the worker to exit and waits until it has stopped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`] if the worker thread panicked outside the
    /// wrapped optimizer.
    pub fn join(mut self) -> Result<()> {
        self.exit();
        match self.worker.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| Error::Internal("optimizer worker thread panicked")),
            None => Ok(()),
        }
    }

    fn send(&self, message: BackendMessage) {
        if self.inbound.send(message).is_err() {
            trace_debug!(optimizer = %self.name, "backend already exited");
        }
    }
}

impl Optimizer for QueueBasedOptimizer {
    fn name(&self) -> &str {
        &self.name
    }

    fn supported_param_types(&self) -> &[ParamKind] {
        &self.supported
    }

    fn experiment(&self) -> &Experiment {
        &self.experiment
    }

    fn update(&mut self, experiment: Experiment) -> Result<()> {
        check_experiment_supported(&self.name, &experiment, &self.supported)?;
        self.experiment = experiment.clone();
        self.send(BackendMessage::Update(experiment));
        Ok(())
    }

    fn get_next_candidates(&mut self, n: usize) -> Vec<Candidate> {
        (0..n).map_while(|_| self.outbound.try_recv().ok()).collect()
    }

    fn exit(&mut self) {
        if !self.exit_sent {
            self.exit_sent = true;
            self.send(BackendMessage::Exit);
        }
    }
}

impl Drop for QueueBasedOptimizer {
    fn drop(&mut self) {
        self.exit();
    }
}
