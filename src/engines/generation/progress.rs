use super::chromosome::Chromosome;
use super::evolution_engine::RunSummary;
use crate::types::EnginePhase;
use std::sync::mpsc::Sender;

/// Observer of a running evolution.
pub trait ProgressCallback: Send {
    fn on_progress(&mut self, label: &str, current: usize, max: usize);
    /// Called once per completed generation, starting at 1.
    fn on_generation_best(&mut self, generation: usize, best: &Chromosome);
    fn on_phase(&mut self, _phase: EnginePhase) {}
    /// Called once when the run halts, whatever the reason.
    fn on_final_results(&mut self, summary: &RunSummary);
}

pub struct NoopProgress;

impl ProgressCallback for NoopProgress {
    fn on_progress(&mut self, _label: &str, _current: usize, _max: usize) {}
    fn on_generation_best(&mut self, _generation: usize, _best: &Chromosome) {}
    fn on_final_results(&mut self, _summary: &RunSummary) {}
}

pub struct ConsoleProgressCallback;

impl ProgressCallback for ConsoleProgressCallback {
    fn on_progress(&mut self, label: &str, current: usize, max: usize) {
        if current % 10 == 0 || current == max {
            log::info!("{} {}/{}", label, current, max);
        }
    }

    fn on_generation_best(&mut self, generation: usize, best: &Chromosome) {
        log::info!(
            "Generation {} best fitness: {:.6}  {}",
            generation,
            best.fitness(),
            best.formula()
        );
    }

    fn on_phase(&mut self, phase: EnginePhase) {
        log::trace!("Phase {:?}", phase);
    }

    fn on_final_results(&mut self, summary: &RunSummary) {
        log::info!(
            "Stopped after {} iterations ({}), elapsed {:.2?}",
            summary.iterations,
            summary.stop_reason,
            summary.elapsed
        );
        match &summary.best {
            Some(best) => log::info!("Best: {} (fitness {:.6})", best.formula(), best.fitness()),
            None => log::warn!("No valid individual survived"),
        }
    }
}

/// Forwards progress to another thread, e.g. a controller polling the runner.
pub struct ChannelProgressCallback {
    sender: Sender<ProgressMessage>,
}

#[derive(Debug, Clone)]
pub enum ProgressMessage {
    Progress { label: String, current: usize, max: usize },
    GenerationBest { generation: usize, fitness: f64, formula: String },
    Phase(EnginePhase),
    Finished(RunSummary),
}

impl ChannelProgressCallback {
    pub fn new(sender: Sender<ProgressMessage>) -> Self {
        Self { sender }
    }
}

impl ProgressCallback for ChannelProgressCallback {
    fn on_progress(&mut self, label: &str, current: usize, max: usize) {
        let _ = self.sender.send(ProgressMessage::Progress {
            label: label.to_string(),
            current,
            max,
        });
    }

    fn on_generation_best(&mut self, generation: usize, best: &Chromosome) {
        let _ = self.sender.send(ProgressMessage::GenerationBest {
            generation,
            fitness: best.fitness(),
            formula: best.formula().to_string(),
        });
    }

    fn on_phase(&mut self, phase: EnginePhase) {
        let _ = self.sender.send(ProgressMessage::Phase(phase));
    }

    fn on_final_results(&mut self, summary: &RunSummary) {
        let _ = self.sender.send(ProgressMessage::Finished(summary.clone()));
    }
}
