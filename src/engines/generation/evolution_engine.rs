use crate::config::{AppConfig, ConfigSection, EvolutionConfig};
use crate::data::SampleSet;
use crate::engines::generation::{
    chromosome::Chromosome,
    history::GenerationHistory,
    operators::{crossover, mutate, MutationOutcome, SkipReason},
    population,
    progress::ProgressCallback,
    selection::{mate, replace, select_sample},
};
use crate::error::{Result, SymregError};
use crate::functions::registry::GeneRegistry;
use crate::types::{EnginePhase, StopReason};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cooperative cancellation signal shared between a controller and a run.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Outcome of a finished run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub stop_reason: StopReason,
    /// Completed generations
    pub iterations: usize,
    pub elapsed: Duration,
    pub best: Option<Chromosome>,
    pub population_size: usize,
    /// Displace mutations abandoned for lack of a target terminal
    pub displace_skips: usize,
}

pub struct EvolutionEngine {
    config: EvolutionConfig,
    registry: Arc<GeneRegistry>,
    samples: SampleSet,
    population: Vec<Chromosome>,
    history: GenerationHistory,
    rng: StdRng,
    // effective sizes, adjusted as the population shrinks or grows
    population_size: usize,
    sample_size: usize,
    phase: EnginePhase,
    elapsed: Duration,
    displace_skips: usize,
}

impl EvolutionEngine {
    pub fn new(
        config: EvolutionConfig,
        registry: Arc<GeneRegistry>,
        samples: SampleSet,
    ) -> Result<Self> {
        config.validate()?;
        if samples.is_empty() {
            return Err(SymregError::DataLoading("No samples to fit".to_string()));
        }
        let width = registry.symbols().len();
        if let Some(row) = samples.inputs().iter().find(|row| row.len() < width) {
            return Err(SymregError::Configuration(format!(
                "{} terminal symbols but sample rows only have {} inputs",
                width,
                row.len()
            )));
        }

        let rng = seeded_rng(&config);

        Ok(Self {
            population_size: config.population_size,
            sample_size: config.sample_size,
            config,
            registry,
            samples,
            population: Vec::new(),
            history: GenerationHistory::new(),
            rng,
            phase: EnginePhase::Idle,
            elapsed: Duration::ZERO,
            displace_skips: 0,
        })
    }

    /// Build the registry and samples described by a full configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let registry = Arc::new(GeneRegistry::new(&config.functions)?);
        let samples = SampleSet::from_config(&config.dataset, &config.functions)?;
        Self::new(config.evolution.clone(), registry, samples)
    }

    /// Run until a stop condition holds. `on_final_results` fires exactly once
    /// unless populating fails.
    ///
    /// Every run starts from scratch: history, counters, effective sizes and
    /// the random generator are reset, so a seeded rerun repeats itself.
    pub fn run<C: ProgressCallback>(
        &mut self,
        callback: &mut C,
        stop: &StopFlag,
    ) -> Result<RunSummary> {
        let started = Instant::now();
        if let Err(e) = self.populate(callback, stop) {
            self.enter(EnginePhase::Stopped, callback);
            return Err(e);
        }
        // a stop that cut populating short wins over every other condition
        let interrupted =
            stop.is_stop_requested() && self.population.len() < self.config.population_size;
        self.record_best(0);

        let mut iteration = 0;
        let stop_reason = loop {
            if let Some(reason) = self.stop_reason(iteration, started, stop, interrupted) {
                break reason;
            }
            iteration += 1;
            callback.on_progress("Generation", iteration, self.config.max_iterations);
            self.step(iteration, callback);
            if let Some(best) = self.record_best(iteration) {
                callback.on_generation_best(iteration, &best);
            }
        };

        self.elapsed = started.elapsed();
        self.enter(EnginePhase::Stopped, callback);
        log::info!("Evolution stopped: {} after {} generations", stop_reason, iteration);

        let summary = RunSummary {
            stop_reason,
            iterations: iteration,
            elapsed: self.elapsed,
            best: self.best().cloned(),
            population_size: self.population.len(),
            displace_skips: self.displace_skips,
        };
        callback.on_final_results(&summary);
        Ok(summary)
    }

    /// Build the initial population, or load it without running when only a
    /// snapshot is wanted.
    pub fn populate<C: ProgressCallback>(&mut self, callback: &mut C, stop: &StopFlag) -> Result<()> {
        self.reset();
        self.enter(EnginePhase::Populating, callback);
        self.population = match self.config.population_file.clone() {
            Some(path) => population::read_population(&path, &self.registry, &self.samples)?,
            None => self.generate_population(callback, stop),
        };

        if self.population.len() < self.population_size {
            log::warn!(
                "Population holds {} valid chromosomes, {} requested",
                self.population.len(),
                self.population_size
            );
        }
        self.population_size = self.population.len();
        self.clamp_sample_size();
        Ok(())
    }

    /// Rejection sampling: invalid chromosomes are redrawn until the
    /// population is full or a stop is requested.
    fn generate_population<C: ProgressCallback>(
        &mut self,
        callback: &mut C,
        stop: &StopFlag,
    ) -> Vec<Chromosome> {
        let target = self.population_size;
        let mut population = Vec::with_capacity(target);
        let mut rejected = 0usize;

        while population.len() < target {
            if stop.is_stop_requested() {
                log::info!("Stop requested while populating ({}/{})", population.len(), target);
                break;
            }
            let mut chromosome =
                Chromosome::random(&self.registry, self.config.max_depth, &mut self.rng);
            if chromosome.calculate_fitness(&self.samples).is_ok() {
                population.push(chromosome);
                callback.on_progress("Populating", population.len(), target);
            } else {
                rejected += 1;
            }
        }

        log::debug!("Generated {} chromosomes, rejected {}", population.len(), rejected);
        population
    }

    fn reset(&mut self) {
        self.population.clear();
        self.history = GenerationHistory::new();
        self.rng = seeded_rng(&self.config);
        self.population_size = self.config.population_size;
        self.sample_size = self.config.sample_size;
        self.elapsed = Duration::ZERO;
        self.displace_skips = 0;
    }

    fn enter<C: ProgressCallback>(&mut self, phase: EnginePhase, callback: &mut C) {
        self.phase = phase;
        callback.on_phase(phase);
    }

    fn stop_reason(
        &self,
        iteration: usize,
        started: Instant,
        stop: &StopFlag,
        interrupted: bool,
    ) -> Option<StopReason> {
        if interrupted {
            return Some(StopReason::Cancelled);
        }
        if iteration >= self.config.max_iterations {
            return Some(StopReason::MaxIterations);
        }
        let best = self.best().map_or(f64::MAX, Chromosome::fitness);
        if best <= self.config.fitness_threshold {
            return Some(StopReason::FitnessThreshold);
        }
        if started.elapsed() > self.config.max_duration() {
            return Some(StopReason::Timeout);
        }
        if stop.is_stop_requested() {
            return Some(StopReason::Cancelled);
        }
        if self.population.is_empty() {
            return Some(StopReason::PopulationExhausted);
        }
        None
    }

    /// One generation; children are tagged with `generation`.
    fn step<C: ProgressCallback>(&mut self, generation: usize, callback: &mut C) {
        self.enter(EnginePhase::Selecting, callback);
        let pool = select_sample(
            &self.population,
            self.config.selection,
            self.sample_size,
            &mut self.rng,
        );

        self.enter(EnginePhase::Mating, callback);
        let pairs = mate(pool.len(), self.config.mating, &mut self.rng);

        self.enter(EnginePhase::CrossingOver, callback);
        let mut children = Vec::with_capacity(pairs.len() * 2);
        for (mother, father) in pairs {
            let (a, b) = crossover(self.config.crossover, &pool[mother], &pool[father], &mut self.rng);
            children.push(a);
            children.push(b);
        }

        self.enter(EnginePhase::Mutating, callback);
        let bred = children.len();
        let children: Vec<Chromosome> = children
            .into_iter()
            .filter_map(|mut child| {
                child.set_generation(generation);
                self.mutate_child(child)
            })
            .collect();
        log::trace!("Generation {}: {}/{} children survived", generation, children.len(), bred);

        self.enter(EnginePhase::Replacing, callback);
        let previous = std::mem::take(&mut self.population);
        self.population = replace(
            previous,
            children,
            self.config.replacement,
            self.population_size,
            &mut self.rng,
        );
        self.population_size = self.population.len();
        self.clamp_sample_size();
    }

    /// Length-tolerance discard, optional mutation, then scoring.
    /// Returns `None` when the child is dropped.
    fn mutate_child(&mut self, mut child: Chromosome) -> Option<Chromosome> {
        let tolerance: f64 = self.rng.gen();
        if child.depth() > self.config.max_depth && tolerance < self.config.length_tolerance {
            return None;
        }
        if tolerance > self.config.mutate_tolerance {
            let outcome = mutate(self.config.mutation, &mut child, &self.registry, &mut self.rng);
            if outcome == MutationOutcome::Skipped(SkipReason::NoTarget) {
                self.displace_skips += 1;
            }
        }
        child.calculate_fitness(&self.samples).ok()?;
        Some(child)
    }

    fn clamp_sample_size(&mut self) {
        if self.sample_size > self.population_size {
            if self.config.verbose {
                log::info!(
                    "Sample size {} clamped to population size {}",
                    self.sample_size,
                    self.population_size
                );
            }
            self.sample_size = self.population_size;
        }
    }

    /// Appends the current best to the history and returns it.
    fn record_best(&mut self, generation: usize) -> Option<Chromosome> {
        let best = self.best().cloned()?;
        if self.config.verbose {
            log::info!(
                "[{}] fitness={:.6} born={} {}",
                generation,
                best.fitness(),
                best.generation(),
                best.formula()
            );
        } else {
            log::debug!("[{}] fitness={:.6} {}", generation, best.fitness(), best.formula());
        }
        self.history.record(best.clone());
        Some(best)
    }

    /// Lowest fitness in the current population.
    pub fn best(&self) -> Option<&Chromosome> {
        self.population
            .iter()
            .min_by(|a, b| a.fitness().total_cmp(&b.fitness()))
    }

    /// Best individual recorded for `generation`; 0 is the initial population.
    pub fn best_of_generation(&self, generation: usize) -> Option<&Chromosome> {
        self.history.get(generation)
    }

    pub fn history(&self) -> &GenerationHistory {
        &self.history
    }

    pub fn population(&self) -> &[Chromosome] {
        &self.population
    }

    pub fn population_size(&self) -> usize {
        self.population_size
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    /// Wall-clock duration of the last run.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn registry(&self) -> &Arc<GeneRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    pub fn write_population(&self, path: &Path) -> Result<()> {
        population::write_population(path, &self.population)
    }
}

fn seeded_rng(config: &EvolutionConfig) -> StdRng {
    match config.seed() {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
