use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use symreg::config::AppConfig;
use symreg::engines::generation::{
    Chromosome, EvolutionEngine, ProgressCallback, ProgressMessage, RunSummary,
};
use symreg::error::SymregError;
use symreg::services::EvolutionRunner;
use symreg::types::{EnginePhase, StopReason};

/// Counts final-results notifications across threads
struct CountingCallback {
    final_results: Arc<AtomicUsize>,
}

impl ProgressCallback for CountingCallback {
    fn on_progress(&mut self, _label: &str, _current: usize, _max: usize) {}
    fn on_generation_best(&mut self, _generation: usize, _best: &Chromosome) {}

    fn on_final_results(&mut self, _summary: &RunSummary) {
        self.final_results.fetch_add(1, Ordering::SeqCst);
    }
}

/// A run that only ends when asked to
fn endless_engine() -> EvolutionEngine {
    let mut config = AppConfig::default();
    config.dataset.target = "x:2".to_string();
    config.evolution.population_size = 50;
    config.evolution.sample_size = 20;
    config.evolution.max_depth = 3;
    config.evolution.max_iterations = usize::MAX;
    config.evolution.fitness_threshold = -1.0;
    EvolutionEngine::from_config(&config).unwrap()
}

fn short_engine() -> EvolutionEngine {
    let mut config = AppConfig::default();
    config.evolution.population_size = 20;
    config.evolution.sample_size = 10;
    config.evolution.max_depth = 3;
    config.evolution.max_iterations = 3;
    config.evolution.fitness_threshold = -1.0;
    EvolutionEngine::from_config(&config).unwrap()
}

#[test]
fn test_stop_mid_run_reports_once() {
    let count = Arc::new(AtomicUsize::new(0));
    let mut runner = EvolutionRunner::new();
    runner
        .start_with_callback(
            endless_engine(),
            CountingCallback {
                final_results: Arc::clone(&count),
            },
        )
        .unwrap();
    assert!(!runner.is_stop_requested());

    thread::sleep(Duration::from_millis(100));
    runner.request_stop();
    assert!(runner.is_stop_requested());

    let outcome = runner.join().unwrap();
    assert_eq!(outcome.summary.stop_reason, StopReason::Cancelled);
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert!(!runner.is_running());
}

#[test]
fn test_second_start_is_rejected() {
    let mut runner = EvolutionRunner::new();
    runner.start(endless_engine()).unwrap();

    match runner.start(short_engine()) {
        Err(SymregError::AlreadyRunning) => {}
        other => panic!("expected AlreadyRunning, got ok={}", other.is_ok()),
    }

    runner.request_stop();
    runner.join().unwrap();
    // joined, so a new run may start
    runner.start(short_engine()).unwrap();
    runner.join().unwrap();
}

#[test]
fn test_join_without_start() {
    let mut runner = EvolutionRunner::new();
    assert!(matches!(runner.join(), Err(SymregError::NotStarted)));
}

#[test]
fn test_progress_is_forwarded() {
    let mut runner = EvolutionRunner::new();
    runner.start(short_engine()).unwrap();
    let outcome = runner.join().unwrap();
    assert_eq!(outcome.summary.stop_reason, StopReason::MaxIterations);
    assert_eq!(outcome.engine.history().len(), 4);

    let mut generations = Vec::new();
    let mut phases = Vec::new();
    let mut finished = 0;
    while let Some(message) = runner.poll_progress() {
        match message {
            ProgressMessage::GenerationBest { generation, .. } => generations.push(generation),
            ProgressMessage::Finished(summary) => {
                finished += 1;
                assert_eq!(summary.iterations, 3);
            }
            ProgressMessage::Phase(phase) => phases.push(phase),
            ProgressMessage::Progress { .. } => {}
        }
    }
    assert_eq!(generations, vec![1, 2, 3]);
    assert_eq!(phases.first(), Some(&EnginePhase::Populating));
    assert_eq!(phases.last(), Some(&EnginePhase::Stopped));
    assert_eq!(phases.iter().filter(|p| **p == EnginePhase::Replacing).count(), 3);
    assert_eq!(finished, 1);
}
