use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, RwLock};
use tokio::time::{interval, sleep, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use common::{EngineCommand, EngineState};
use strategy::ScanConfig;

use crate::cooldown::CooldownGate;
use crate::scanner::Scanner;

/// Cloneable handle passed to other crates (Telegram, API).
#[derive(Clone)]
pub struct EngineHandle {
    command_tx: mpsc::Sender<EngineCommand>,
    state: Arc<RwLock<EngineState>>,
    gate: Arc<CooldownGate>,
}

impl EngineHandle {
    pub async fn send(&self, cmd: EngineCommand) {
        let _ = self.command_tx.send(cmd).await;
    }

    pub async fn state(&self) -> EngineState {
        *self.state.read().await
    }

    pub fn shared_state(&self) -> Arc<RwLock<EngineState>> {
        self.state.clone()
    }

    /// Symbols currently suppressed by the cooldown gate.
    pub async fn cooling_symbols(&self) -> Vec<String> {
        self.gate.cooling_symbols(Utc::now()).await
    }
}

/// The main engine: drives scan cycles on a fixed cadence and processes
/// commands until the shutdown token is cancelled.
pub struct Engine {
    scanner: Scanner,
    state: Arc<RwLock<EngineState>>,
    command_rx: mpsc::Receiver<EngineCommand>,
    #[allow(dead_code)] // kept to prevent channel close
    command_tx: mpsc::Sender<EngineCommand>,
    shutdown: CancellationToken,
    scan_interval: Duration,
    failure_backoff: Duration,
    max_backoff: Duration,
}

impl Engine {
    pub fn new(
        scanner: Scanner,
        gate: Arc<CooldownGate>,
        cfg: &ScanConfig,
        shutdown: CancellationToken,
    ) -> (Self, EngineHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);
        let state = Arc::new(RwLock::new(EngineState::Stopped));

        let handle = EngineHandle {
            command_tx: command_tx.clone(),
            state: state.clone(),
            gate,
        };

        let engine = Engine {
            scanner,
            state,
            command_rx,
            command_tx,
            shutdown,
            scan_interval: cfg.scan_interval(),
            failure_backoff: cfg.failure_backoff(),
            max_backoff: cfg.max_backoff(),
        };

        (engine, handle)
    }

    /// Run until cancelled. Call from `tokio::spawn`.
    ///
    /// Cycles start every `scan_interval`; a cycle that overruns delays the
    /// next one instead of overlapping it. A failed cycle is reported and
    /// followed by a backoff sleep that doubles up to `max_backoff` and
    /// resets after the next successful cycle.
    pub async fn run(mut self) {
        *self.state.write().await = EngineState::Running;
        info!(interval_secs = self.scan_interval.as_secs(), "Engine running");

        let mut ticker = interval(self.scan_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut backoff = self.failure_backoff;

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => break,

                Some(cmd) = self.command_rx.recv() => self.handle_command(cmd).await,

                _ = ticker.tick() => {
                    if *self.state.read().await == EngineState::Paused {
                        continue;
                    }

                    let result = tokio::select! {
                        _ = self.shutdown.cancelled() => None,
                        r = self.scanner.scan_cycle() => Some(r),
                    };
                    let Some(result) = result else { break };

                    match result {
                        Ok(_) => backoff = self.failure_backoff,
                        Err(e) => {
                            error!(error = %e, backoff_secs = backoff.as_secs(), "Scan cycle failed");
                            self.scanner
                                .dispatcher()
                                .report(&format!("❌ Scan cycle failed: {e}"))
                                .await;

                            tokio::select! {
                                _ = self.shutdown.cancelled() => break,
                                _ = sleep(backoff) => {}
                            }
                            backoff = (backoff * 2).min(self.max_backoff);
                        }
                    }
                }
            }
        }

        *self.state.write().await = EngineState::Stopped;
        info!("Engine stopped");
    }

    async fn handle_command(&self, cmd: EngineCommand) {
        let current = *self.state.read().await;
        match (cmd, current) {
            (EngineCommand::Pause, EngineState::Running) => {
                info!("Engine paused; scan cycles suspended");
                *self.state.write().await = EngineState::Paused;
            }
            (EngineCommand::Resume, EngineState::Paused) => {
                info!("Engine resumed");
                *self.state.write().await = EngineState::Running;
            }
            (cmd, state) => warn!(?cmd, %state, "Command ignored in current state"),
        }
    }
}
