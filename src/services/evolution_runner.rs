use crate::engines::generation::evolution_engine::{EvolutionEngine, RunSummary, StopFlag};
use crate::engines::generation::progress::{
    ChannelProgressCallback, ProgressCallback, ProgressMessage,
};
use crate::error::{Result, SymregError};
use std::sync::mpsc::{channel, Receiver};
use std::thread::{self, JoinHandle};

/// A finished run: the engine, handed back with its final population and
/// history, and the summary it produced.
pub struct RunOutcome {
    pub engine: EvolutionEngine,
    pub summary: RunSummary,
}

/// Runs an engine's generational loop on a background thread.
pub struct EvolutionRunner {
    handle: Option<JoinHandle<Result<RunOutcome>>>,
    progress_rx: Option<Receiver<ProgressMessage>>,
    stop: StopFlag,
}

impl EvolutionRunner {
    pub fn new() -> Self {
        Self {
            handle: None,
            progress_rx: None,
            stop: StopFlag::new(),
        }
    }

    /// Start in the background, forwarding progress to `poll_progress`.
    pub fn start(&mut self, engine: EvolutionEngine) -> Result<()> {
        let (progress_tx, progress_rx) = channel();
        self.start_with_callback(engine, ChannelProgressCallback::new(progress_tx))?;
        self.progress_rx = Some(progress_rx);
        Ok(())
    }

    /// Start in the background with a caller supplied observer.
    ///
    /// Fails with `AlreadyRunning` until the previous run has been joined.
    pub fn start_with_callback<C>(&mut self, engine: EvolutionEngine, callback: C) -> Result<()>
    where
        C: ProgressCallback + 'static,
    {
        if self.handle.is_some() {
            return Err(SymregError::AlreadyRunning);
        }
        self.stop = StopFlag::new();
        self.progress_rx = None;
        let stop = self.stop.clone();

        let handle = thread::Builder::new()
            .name("evolution".to_string())
            .stack_size(16 * 1024 * 1024) // 16MB stack
            .spawn(move || {
                let mut engine = engine;
                let mut callback = callback;
                log::debug!("Evolution thread started");
                let summary = engine.run(&mut callback, &stop)?;
                Ok(RunOutcome { engine, summary })
            })
            .map_err(|e| SymregError::Worker(format!("Failed to spawn evolution thread: {}", e)))?;

        self.handle = Some(handle);
        Ok(())
    }

    /// Ask the run to halt at its next generation boundary.
    pub fn request_stop(&self) {
        self.stop.request_stop();
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop.is_stop_requested()
    }

    /// True while a started run has not finished.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Poll for progress updates (non-blocking)
    pub fn poll_progress(&mut self) -> Option<ProgressMessage> {
        self.progress_rx.as_ref().and_then(|rx| rx.try_recv().ok())
    }

    /// Results if the run has finished, without blocking.
    pub fn try_join(&mut self) -> Option<Result<RunOutcome>> {
        match self.handle.take() {
            Some(handle) if handle.is_finished() => Some(Self::collect(handle)),
            Some(handle) => {
                self.handle = Some(handle);
                None
            }
            None => None,
        }
    }

    /// Block until the run finishes.
    pub fn join(&mut self) -> Result<RunOutcome> {
        let handle = self.handle.take().ok_or(SymregError::NotStarted)?;
        Self::collect(handle)
    }

    fn collect(handle: JoinHandle<Result<RunOutcome>>) -> Result<RunOutcome> {
        handle
            .join()
            .map_err(|_| SymregError::Worker("Evolution thread panicked".to_string()))?
    }
}

impl Default for EvolutionRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for EvolutionRunner {
    fn drop(&mut self) {
        self.request_stop();
    }
}
