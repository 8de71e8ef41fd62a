use anyhow::{bail, Context};
use std::path::PathBuf;
use std::time::Duration;
use symreg::config::{AppConfig, ConfigManager};
use symreg::engines::generation::{
    ConsoleProgressCallback, EvolutionEngine, ProgressMessage, StopFlag,
};
use symreg::services::{EvolutionRunner, RunOutcome, RunReport};

const USAGE: &str = "usage: symreg [populate | iterate SECTION.FIELD V1,V2,...] [CONFIG.toml]";

enum Mode {
    Run,
    Populate,
    /// Rerun once per value of one configuration field
    Iterate { field: String, values: Vec<String> },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let mode = match args.first().map(String::as_str) {
        Some("populate") => {
            args.remove(0);
            Mode::Populate
        }
        Some("iterate") => {
            if args.len() < 3 {
                bail!(USAGE);
            }
            let values = args[2].split(',').map(|v| v.trim().to_string()).collect();
            let field = args[1].clone();
            args.drain(..3);
            Mode::Iterate { field, values }
        }
        _ => Mode::Run,
    };
    if args.len() > 1 {
        bail!(USAGE);
    }

    let manager = ConfigManager::new();
    if let Some(path) = args.first() {
        manager
            .load_layered(path)
            .with_context(|| format!("loading configuration from {}", path))?;
    }

    match mode {
        Mode::Run => run_once(&manager.get()?),
        Mode::Populate => {
            let config = manager.get()?;
            write_initial_population(EvolutionEngine::from_config(&config)?, &config)
        }
        Mode::Iterate { field, values } => iterate(&manager, &field, &values),
    }
}

fn run_once(config: &AppConfig) -> anyhow::Result<()> {
    let engine = EvolutionEngine::from_config(config)?;
    let RunOutcome { engine, summary } = if config.output.threaded {
        run_threaded(engine)?
    } else {
        let mut engine = engine;
        let summary = engine.run(&mut ConsoleProgressCallback, &StopFlag::new())?;
        RunOutcome { engine, summary }
    };

    if let Some(path) = &config.output.population_output {
        engine.write_population(path)?;
    }
    if let Some(path) = &config.output.results_file {
        RunReport::new(&engine, &summary).append_to(path)?;
    }

    match &summary.best {
        Some(best) => println!("{}\t{}", best.fitness(), best.formula()),
        None => bail!("no valid individual survived ({})", summary.stop_reason),
    }
    Ok(())
}

/// Parameter sweep: one run and one results row per value.
fn iterate(manager: &ConfigManager, field: &str, values: &[String]) -> anyhow::Result<()> {
    let results = manager
        .get()?
        .output
        .results_file
        .context("iterate needs output.results_file")?;

    for value in values {
        manager
            .set_field(field, value)
            .with_context(|| format!("setting {} to {}", field, value))?;
        let config = manager.get()?;
        log::info!("Sweep {} = {}", field, value);

        let mut engine = EvolutionEngine::from_config(&config)?;
        let summary = engine.run(&mut ConsoleProgressCallback, &StopFlag::new())?;
        RunReport::new(&engine, &summary)
            .with_parameter(field, value)
            .append_to(&results)?;

        match &summary.best {
            Some(best) => println!("{}\t{}\t{}", value, best.fitness(), best.formula()),
            None => println!("{}\t-\t{}", value, summary.stop_reason),
        }
    }
    Ok(())
}

fn write_initial_population(mut engine: EvolutionEngine, config: &AppConfig) -> anyhow::Result<()> {
    let path: &PathBuf = config
        .output
        .population_output
        .as_ref()
        .context("populate needs output.population_output")?;
    engine.populate(&mut ConsoleProgressCallback, &StopFlag::new())?;
    engine.write_population(path)?;
    Ok(())
}

fn run_threaded(engine: EvolutionEngine) -> anyhow::Result<RunOutcome> {
    let mut runner = EvolutionRunner::new();
    runner.start(engine)?;

    loop {
        while let Some(message) = runner.poll_progress() {
            match message {
                ProgressMessage::GenerationBest { generation, fitness, formula } => {
                    log::info!("Generation {} best fitness: {:.6}  {}", generation, fitness, formula);
                }
                ProgressMessage::Progress { label, current, max } => {
                    log::debug!("{} {}/{}", label, current, max);
                }
                ProgressMessage::Phase(phase) => log::trace!("Phase {:?}", phase),
                ProgressMessage::Finished(summary) => {
                    log::info!("Run finished: {}", summary.stop_reason);
                }
            }
        }
        if let Some(outcome) = runner.try_join() {
            return Ok(outcome?);
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}
