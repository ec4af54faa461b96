use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dutem_bus::FrameSink;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::EmulatorConfig;
use crate::emitter::{self, EmissionReport, ExitGuard};
use crate::error::{EmulatorError, Result};
use crate::state::{SessionState, StateCell};
use crate::store::{ChannelParams, ChannelStore};

/// State shared between the caller and the background task.
#[derive(Debug)]
pub(crate) struct Shared {
    pub(crate) config: EmulatorConfig,
    pub(crate) channels: ChannelStore,
    pub(crate) state: StateCell,
    /// The current (or most recent) run. Locked across every state change
    /// made by `start`/`stop` so the two never interleave.
    run: Mutex<ActiveRun>,
}

#[derive(Debug, Default)]
struct ActiveRun {
    generation: u64,
    token: CancellationToken,
}

impl Shared {
    fn lock_run(&self) -> MutexGuard<'_, ActiveRun> {
        self.run.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move a live session to `Stopping` and cancel its run. With
    /// `Some(generation)`, only that run is affected.
    fn request_stop(&self, generation: Option<u64>) {
        let run = self.lock_run();
        if generation.is_some_and(|generation| generation != run.generation) {
            return;
        }
        if self
            .state
            .transition(SessionState::Running, SessionState::Stopping)
            || self
                .state
                .transition(SessionState::Starting, SessionState::Stopping)
        {
            run.token.cancel();
            tracing::info!("stop requested for fuel sensor emulation");
        }
    }
}

/// A DUT-EM sensor family emulator session.
///
/// Channel mutators may be called at any time, including while emission is
/// running. At most one background task exists per session. Dropping the
/// session requests a stop.
#[derive(Debug)]
pub struct Emulator {
    shared: Arc<Shared>,
}

impl Emulator {
    /// Create an idle session with every channel disabled.
    pub fn new(config: EmulatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    fn from_validated(config: EmulatorConfig) -> Self {
        let channels = ChannelStore::new(config.channel_count);
        Self {
            shared: Arc::new(Shared {
                config,
                channels,
                state: StateCell::new(),
                run: Mutex::new(ActiveRun::default()),
            }),
        }
    }

    pub fn config(&self) -> &EmulatorConfig {
        &self.shared.config
    }

    /// Direct access to the channel records.
    pub fn channels(&self) -> &ChannelStore {
        &self.shared.channels
    }

    pub fn channel_count(&self) -> usize {
        self.shared.channels.channel_count()
    }

    pub fn enable(&self, index: usize) {
        self.shared.channels.enable(index);
    }

    pub fn disable(&self, index: usize) {
        self.shared.channels.disable(index);
    }

    pub fn set_level(&self, index: usize, level: f64) {
        self.shared.channels.set_level(index, level);
    }

    pub fn set_temperature(&self, index: usize, temperature: i32) {
        self.shared.channels.set_temperature(index, temperature);
    }

    pub fn set(&self, index: usize, level: f64, temperature: i32) {
        self.shared.channels.set(index, level, temperature);
    }

    pub fn channel(&self, index: usize) -> Option<ChannelParams> {
        self.shared.channels.channel(index)
    }

    pub fn state(&self) -> SessionState {
        self.shared.state.load()
    }

    /// `true` while a background task is starting or sweeping.
    pub fn is_running(&self) -> bool {
        matches!(
            self.state(),
            SessionState::Starting | SessionState::Running
        )
    }

    /// Start emission on the current tokio runtime.
    ///
    /// Returns `None` without touching `bus` beyond dropping it when the
    /// session is not `Disabled`; the existing task keeps running.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime. Use [`Emulator::start_on`]
    /// from plain threads.
    pub fn start<B>(&self, bus: B) -> Option<EmissionHandle>
    where
        B: FrameSink + 'static,
    {
        self.start_on(&Handle::current(), bus)
    }

    /// Start emission on an explicit runtime.
    pub fn start_on<B>(&self, runtime: &Handle, bus: B) -> Option<EmissionHandle>
    where
        B: FrameSink + 'static,
    {
        let mut current = self.shared.lock_run();
        if !self
            .shared
            .state
            .transition(SessionState::Disabled, SessionState::Starting)
        {
            tracing::debug!(state = %self.state(), "emulation already active, start ignored");
            return None;
        }

        let token = CancellationToken::new();
        current.generation = current.generation.wrapping_add(1);
        current.token = token.clone();
        let generation = current.generation;
        drop(current);

        let exit = ExitGuard::new(Arc::clone(&self.shared));
        let task = runtime.spawn(emitter::run(exit, bus, token.clone()));
        Some(EmissionHandle {
            shared: Arc::clone(&self.shared),
            generation,
            token,
            task,
        })
    }

    /// Request the background task to stop. Returns immediately.
    pub fn stop(&self) {
        self.shared.request_stop(None);
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Self::from_validated(EmulatorConfig::default())
    }
}

impl Drop for Emulator {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Control and completion handle for one emission run.
#[derive(Debug)]
pub struct EmissionHandle {
    shared: Arc<Shared>,
    generation: u64,
    token: CancellationToken,
    task: JoinHandle<EmissionReport>,
}

impl EmissionHandle {
    /// Token for this run; cancelling it stops the run like [`Emulator::stop`].
    /// The session reports `Stopping` once the task observes the cancellation.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Request this run to stop. Returns immediately. A no-op on the session
    /// once a later run has started.
    pub fn stop(&self) {
        self.shared.request_stop(Some(self.generation));
        self.token.cancel();
    }

    /// `true` once the background task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait until the background task has exited and the session is back in
    /// [`SessionState::Disabled`].
    pub async fn wait(self) -> Result<EmissionReport> {
        self.task
            .await
            .map_err(|err| EmulatorError::TaskFailed(err.to_string()))
    }
}
