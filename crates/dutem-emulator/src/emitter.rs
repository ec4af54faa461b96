use std::sync::Arc;
use std::time::Duration;

use dutem_bus::FrameSink;
use dutem_frame::{encode_reading, sensor_id};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::config::SweepMode;
use crate::session::Shared;
use crate::state::SessionState;
use crate::store::ChannelParams;

/// What a finished emission run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EmissionReport {
    /// Frames the bus accepted.
    pub frames_sent: u64,
    /// Frames the bus rejected. These are never retried.
    pub bus_errors: u64,
    /// Passes over the channel arena that were started.
    pub passes: u64,
}

/// Background task body: sweep until the token is cancelled.
///
/// The guard is created by the caller so the session returns to `Disabled`
/// even when this future is dropped before its first poll.
pub(crate) async fn run<B: FrameSink>(
    exit: ExitGuard,
    bus: B,
    token: CancellationToken,
) -> EmissionReport {
    let shared: &Shared = &exit.shared;

    if !shared
        .state
        .transition(SessionState::Starting, SessionState::Running)
    {
        return EmissionReport::default();
    }

    let config = &shared.config;
    tracing::info!(
        base_id = config.base_id,
        channels = config.channel_count,
        enabled = shared.channels.enabled_count(),
        interval_ms = config.interval.as_millis() as u64,
        mode = ?config.sweep_mode,
        "starting fuel sensor emulation"
    );

    let report = Emitter {
        shared,
        bus,
        token,
        report: EmissionReport::default(),
    }
    .run()
    .await;

    shared
        .state
        .transition(SessionState::Running, SessionState::Stopping);
    tracing::info!(
        frames_sent = report.frames_sent,
        bus_errors = report.bus_errors,
        passes = report.passes,
        "fuel sensor emulation stopped"
    );
    report
}

struct Emitter<'a, B> {
    shared: &'a Shared,
    bus: B,
    token: CancellationToken,
    report: EmissionReport,
}

impl<B: FrameSink> Emitter<'_, B> {
    async fn run(mut self) -> EmissionReport {
        while !self.token.is_cancelled() {
            self.report.passes += 1;
            let keep_going = match self.shared.config.sweep_mode {
                SweepMode::Sequential => self.sequential_pass().await,
                SweepMode::Simultaneous => self.simultaneous_pass().await,
            };
            if !keep_going {
                break;
            }
        }
        self.report
    }

    /// One frame, then one interval, per enabled channel. A pass with nothing
    /// enabled still waits one interval. Returns `false` once cancelled.
    async fn sequential_pass(&mut self) -> bool {
        let mut emitted = 0usize;
        for index in 0..self.shared.channels.channel_count() {
            let Some(params) = self.enabled_channel(index) else {
                continue;
            };
            if self.token.is_cancelled() {
                return false;
            }
            self.submit(index, &params);
            emitted += 1;
            if !pause(&self.token, self.shared.config.interval).await {
                return false;
            }
        }
        if emitted == 0 {
            return pause(&self.token, self.shared.config.interval).await;
        }
        true
    }

    /// Every enabled channel back-to-back, then one interval.
    async fn simultaneous_pass(&mut self) -> bool {
        for index in 0..self.shared.channels.channel_count() {
            let Some(params) = self.enabled_channel(index) else {
                continue;
            };
            if self.token.is_cancelled() {
                return false;
            }
            self.submit(index, &params);
        }
        pause(&self.token, self.shared.config.interval).await
    }

    fn enabled_channel(&self, index: usize) -> Option<ChannelParams> {
        self.shared
            .channels
            .channel(index)
            .filter(|params| params.enabled)
    }

    fn submit(&mut self, index: usize, params: &ChannelParams) {
        let id = sensor_id(self.shared.config.base_id, index);
        let frame = encode_reading(id, &params.reading());
        match self.bus.send(&frame) {
            Ok(()) => {
                self.report.frames_sent += 1;
                tracing::debug!(
                    sensor = index,
                    id,
                    level = frame.level_raw(),
                    temperature = frame.temperature_raw(),
                    "sensor frame sent"
                );
            }
            Err(err) => {
                self.report.bus_errors += 1;
                tracing::warn!(sensor = index, id, error = %err, "bus rejected sensor frame");
            }
        }
    }
}

/// Wait one interval. Returns `false` if the token was cancelled first.
async fn pause(token: &CancellationToken, interval: Duration) -> bool {
    tokio::select! {
        _ = token.cancelled() => false,
        _ = tokio::time::sleep(interval) => true,
    }
}

/// Returns the session to `Disabled` however the task ends, including when
/// the task is dropped unpolled at runtime shutdown.
pub(crate) struct ExitGuard {
    shared: Arc<Shared>,
}

impl ExitGuard {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }
}

impl Drop for ExitGuard {
    fn drop(&mut self) {
        self.shared.state.store(SessionState::Disabled);
    }
}
