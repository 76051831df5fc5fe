// Engine module organization
// the epoch loop lives here, each operator family in its own submodule

pub mod crossover;
pub mod mutations;
pub mod selection;
pub mod statistics;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::dna::{fittest, Canvas};
use crate::environment::Environment;
use crate::error::{EvolveError, Result};
use crate::factory::PolygonFactory;
use crate::fitness::metrics::psnr_from_similarity;
use crate::settings::{Reproduction, Settings};
use crate::suspend;

use self::statistics::StatisticsLog;

/// lifecycle of one engine. every state after `Running` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStatus {
    Idle,
    Running,
    Completed,
    Cancelled,
    /// an operator, the codec or the renderer returned an error
    Failed,
}

/// progress of a run as seen by stop predicates and event consumers
#[derive(Clone, Debug, PartialEq)]
pub struct RunSnapshot {
    pub epoch: u64,
    /// best fitness of the current population, `None` before it exists
    pub fitness: Option<f64>,
    pub stagnation_count: u64,
    pub time_ran: Duration,
}

#[derive(Clone, Debug, PartialEq)]
pub enum AlgorithmEvent {
    Started(RunSnapshot),
    EpochCompleted(RunSnapshot),
    Completed(RunSnapshot),
}

impl AlgorithmEvent {
    pub fn snapshot(&self) -> &RunSnapshot {
        match self {
            AlgorithmEvent::Started(s) | AlgorithmEvent::EpochCompleted(s) | AlgorithmEvent::Completed(s) => s,
        }
    }
}

/// stop bounds; any satisfied bound stops the run, an absent bound never fires
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StopCondition {
    pub max_runtime: Option<Duration>,
    pub max_epochs: Option<u64>,
    pub max_stagnation: Option<u64>,
    pub min_fitness: Option<f64>,
}

impl StopCondition {
    pub fn epochs(max_epochs: u64) -> Self {
        Self { max_epochs: Some(max_epochs), ..Self::default() }
    }

    pub fn is_met(&self, s: &RunSnapshot) -> bool {
        if self.max_runtime.is_some_and(|max| s.time_ran > max) {
            return true;
        }
        if self.max_epochs.is_some_and(|max| s.epoch >= max) {
            return true;
        }
        if self.max_stagnation.is_some_and(|max| s.stagnation_count >= max) {
            return true;
        }
        matches!((self.min_fitness, s.fitness), (Some(min), Some(f)) if f >= min)
    }
}

/// cooperative cancellation flag, observed once per epoch boundary
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// counters of the current run
#[derive(Clone, Debug, Default)]
pub struct RunState {
    pub epoch: u64,
    pub stagnation_count: u64,
    /// best fitness after the previous epoch, 0 before the first
    pub previous_fitness: f64,
    pub started: Option<Instant>,
    pub stopped: Option<Instant>,
}

impl RunState {
    pub fn time_ran(&self) -> Duration {
        match self.started {
            Some(start) => self.stopped.unwrap_or_else(Instant::now).saturating_duration_since(start),
            None => Duration::ZERO,
        }
    }

    /// equal best fitness counts as stagnation, anything else resets it
    pub fn observe(&mut self, best: f64) {
        if best == self.previous_fitness {
            self.stagnation_count += 1;
        } else {
            self.stagnation_count = 0;
        }
        self.previous_fitness = best;
    }
}

pub struct Engine {
    env: Arc<Environment>,
    factory: PolygonFactory,
    rng: Pcg32,
    population: Vec<Canvas>,
    state: RunState,
    status: RunStatus,
    statistics: StatisticsLog,
}

impl Engine {
    /// seeded from `settings.rng_seed`, or from entropy when unset
    pub fn new(env: Arc<Environment>) -> Self {
        let seed = env.settings().rng_seed.unwrap_or_else(rand::random);
        Self::with_rng(env, Pcg32::seed_from_u64(seed))
    }

    pub fn with_rng(env: Arc<Environment>, rng: Pcg32) -> Self {
        let statistics = StatisticsLog::new(env.settings().statistics_path.clone());
        Self {
            factory: PolygonFactory::new(Arc::clone(&env)),
            env,
            rng,
            population: Vec::new(),
            state: RunState::default(),
            status: RunStatus::Idle,
            statistics,
        }
    }

    pub fn environment(&self) -> &Arc<Environment> {
        &self.env
    }

    pub fn settings(&self) -> &Settings {
        self.env.settings()
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// empty until a run has started
    pub fn population(&self) -> &[Canvas] {
        &self.population
    }

    pub fn fittest(&self) -> Result<Option<&Canvas>> {
        fittest(&self.population)
    }

    pub fn snapshot(&self) -> Result<RunSnapshot> {
        Ok(RunSnapshot {
            epoch: self.state.epoch,
            fitness: self.fittest()?.map(Canvas::fitness).transpose()?,
            stagnation_count: self.state.stagnation_count,
            time_ran: self.state.time_ran(),
        })
    }

    /// run until `stop` is met. see [`Engine::run_until`].
    pub fn run(
        &mut self,
        stop: &StopCondition,
        cancel: &CancelToken,
        notify: impl FnMut(&AlgorithmEvent),
    ) -> Result<RunSnapshot> {
        self.run_until(|s| stop.is_met(s), cancel, notify)
    }

    /// drive `Idle -> Running -> Completed`. at every epoch boundary the stop
    /// predicate is evaluated first, then the cancel token. cancellation
    /// persists the fittest canvas to `suspend_path` and returns
    /// [`EvolveError::Cancelled`].
    pub fn run_until(
        &mut self,
        mut should_stop: impl FnMut(&RunSnapshot) -> bool,
        cancel: &CancelToken,
        mut notify: impl FnMut(&AlgorithmEvent),
    ) -> Result<RunSnapshot> {
        if self.status != RunStatus::Idle {
            return Err(EvolveError::InvalidState("engine has already been started"));
        }
        self.status = RunStatus::Running;

        let result = self.drive(&mut should_stop, cancel, &mut notify);
        self.state.stopped = Some(Instant::now());
        match result {
            Ok(()) => {
                self.status = RunStatus::Completed;
                let snapshot = self.snapshot()?;
                tracing::info!(
                    "run completed after {} epochs in {:.2?}, fitness {:?}",
                    snapshot.epoch,
                    snapshot.time_ran,
                    snapshot.fitness
                );
                notify(&AlgorithmEvent::Completed(snapshot.clone()));
                Ok(snapshot)
            }
            Err(e) if e.is_cancelled() => {
                self.status = RunStatus::Cancelled;
                self.persist_fittest();
                tracing::info!("run cancelled after epoch {}", self.state.epoch);
                Err(e)
            }
            Err(e) => {
                self.status = RunStatus::Failed;
                tracing::error!("run failed at epoch {}: {}", self.state.epoch, e);
                Err(e)
            }
        }
    }

    fn drive(
        &mut self,
        should_stop: &mut impl FnMut(&RunSnapshot) -> bool,
        cancel: &CancelToken,
        notify: &mut impl FnMut(&AlgorithmEvent),
    ) -> Result<()> {
        tracing::info!(
            "run started: {} canvases of {} {}-gons on {}x{}",
            self.settings().canvas_count,
            self.settings().polygon_count,
            self.settings().polygon_edge_count,
            self.settings().canvas_width,
            self.settings().canvas_height
        );
        notify(&AlgorithmEvent::Started(self.snapshot()?));
        self.state.started = Some(Instant::now());
        self.materialize()?;

        loop {
            if should_stop(&self.snapshot()?) {
                return Ok(());
            }
            if cancel.is_cancelled() {
                return Err(EvolveError::Cancelled { epoch: self.state.epoch });
            }

            self.step()?;

            let snapshot = self.snapshot()?;
            let best = snapshot.fitness.unwrap_or(0.0);
            tracing::debug!(
                "epoch {}: fitness {:.6} ({:.2} dB), stagnation {}",
                snapshot.epoch,
                best,
                psnr_from_similarity(best),
                snapshot.stagnation_count
            );
            notify(&AlgorithmEvent::EpochCompleted(snapshot));
            self.statistics.record(self.state.epoch, self.state.time_ran(), best);
            if self.settings().checkpoint_interval.is_some_and(|n| self.state.epoch % n == 0) {
                self.persist_fittest();
            }
        }
    }

    /// initial population: a suspended canvas if one exists, topped up with random ones
    fn materialize(&mut self) -> Result<()> {
        profiling::scope!("Engine::materialize");
        let count = self.settings().canvas_count;
        let mut population = Vec::with_capacity(count);

        if let Some(path) = &self.env.settings().suspend_path {
            if let Some(canvas) = suspend::load_if_exists(path, &self.env)? {
                tracing::info!("resuming from suspended canvas {}", path.display());
                population.push(canvas);
            }
        }
        let missing = count - population.len();
        population.extend(self.factory.random_canvases(&mut self.rng, missing));

        self.population = population;
        Ok(())
    }

    /// one epoch: offspring, survival, stagnation bookkeeping
    pub fn step(&mut self) -> Result<()> {
        profiling::scope!("Engine::step");
        if self.population.is_empty() {
            self.materialize()?;
        }

        let offspring = self.offspring()?;
        let mut pool = std::mem::take(&mut self.population);
        pool.extend(offspring);
        evaluate_all(&pool)?;
        self.population = selection::truncate(pool, self.settings().canvas_count)?;

        self.state.epoch += 1;
        let best = match self.population.first() {
            Some(canvas) => canvas.fitness()?,
            None => 0.0,
        };
        self.state.observe(best);
        Ok(())
    }

    fn offspring(&mut self) -> Result<Vec<Canvas>> {
        profiling::scope!("Engine::offspring");
        match self.env.settings().reproduction {
            Reproduction::Mutation => Ok(mutations::mutate(&self.population, &self.factory, &mut self.rng)),
            Reproduction::CrossoverAndMutation => {
                let couples = selection::pair_couples(&self.population, self.settings().couple_count(), &mut self.rng)?;
                let children = crossover::offspring(&couples, &mut self.rng);
                Ok(mutations::mutate(&children, &self.factory, &mut self.rng))
            }
        }
    }

    /// best-effort write of the fittest canvas to `suspend_path`
    fn persist_fittest(&self) {
        let Some(path) = &self.env.settings().suspend_path else {
            return;
        };
        let written = self
            .fittest()
            .and_then(|best| best.map_or(Ok(()), |canvas| suspend::save_suspended(path, canvas)));
        if let Err(e) = written {
            tracing::warn!("could not write suspend file {}: {}", path.display(), e);
        }
    }
}

/// score every canvas up front, one at a time; the first failure stops the epoch
fn evaluate_all(canvases: &[Canvas]) -> Result<()> {
    profiling::scope!("evaluate_all");
    canvases.iter().try_for_each(|canvas| canvas.fitness().map(|_| ()))
}
