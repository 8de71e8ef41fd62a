use symreg::config::AppConfig;
use symreg::engines::generation::{EvolutionEngine, NoopProgress, StopFlag};
use symreg::error::SymregError;
use symreg::types::StopReason;
use std::fs;

fn config_with_population(contents: &str) -> (tempfile::TempDir, AppConfig) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("population.txt");
    fs::write(&path, contents).unwrap();

    let mut config = AppConfig::default();
    config.dataset.target = "x:2".to_string();
    config.evolution.population_file = Some(path);
    (dir, config)
}

#[test]
fn test_malformed_line_aborts_load() {
    let (_dir, config) = config_with_population("x:2\n3:3;x:2;5:3\n");
    let mut engine = EvolutionEngine::from_config(&config).unwrap();

    match engine.run(&mut NoopProgress, &StopFlag::new()) {
        Err(SymregError::MalformedLine { line, .. }) => assert_eq!(line, 2),
        Err(e) => panic!("unexpected error: {}", e),
        Ok(summary) => panic!("load should fail, stopped with {}", summary.stop_reason),
    }
}

#[test]
fn test_invalid_entries_shrink_population() {
    // ln(x - 20) is undefined over the sampled range
    let (_dir, config) = config_with_population("+:6;x:2;1:3\n\nln:5;-:6;x:2;20:3\n*:6;x:2;2:3\n");
    let mut engine = EvolutionEngine::from_config(&config).unwrap();

    engine.populate(&mut NoopProgress, &StopFlag::new()).unwrap();
    assert_eq!(engine.population().len(), 2);
    assert_eq!(engine.population_size(), 2);
    assert_eq!(engine.sample_size(), 2);
}

#[test]
fn test_exact_individual_stops_immediately() {
    let (_dir, config) = config_with_population("sin:5;x:2\nx:2\n");
    let mut engine = EvolutionEngine::from_config(&config).unwrap();

    let summary = engine.run(&mut NoopProgress, &StopFlag::new()).unwrap();
    assert_eq!(summary.stop_reason, StopReason::FitnessThreshold);
    assert_eq!(summary.iterations, 0);
    assert_eq!(summary.best.unwrap().formula(), "x");
}

#[test]
fn test_snapshot_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = dir.path().join("snapshot.txt");

    let mut config = AppConfig::default();
    config.evolution.population_size = 25;
    config.evolution.max_depth = 3;
    let mut engine = EvolutionEngine::from_config(&config).unwrap();
    engine.populate(&mut NoopProgress, &StopFlag::new()).unwrap();
    engine.write_population(&snapshot).unwrap();

    config.evolution.population_file = Some(snapshot);
    let mut reloaded = EvolutionEngine::from_config(&config).unwrap();
    reloaded.populate(&mut NoopProgress, &StopFlag::new()).unwrap();

    assert_eq!(reloaded.population().len(), 25);
    for (a, b) in engine.population().iter().zip(reloaded.population()) {
        assert_eq!(a.write_genes(), b.write_genes());
        assert_eq!(a.fitness().to_bits(), b.fitness().to_bits());
    }
}
