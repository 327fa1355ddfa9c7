//! Periodic audit scheduling.
//!
//! Spawns three independent tasks, each driven by `tokio::time::interval`
//! and stopped through a shared [`CancellationToken`]:
//!
//! | Task        | Period                         | Operation                       |
//! |-------------|--------------------------------|---------------------------------|
//! | full audit  | `frequency_hours`              | [`AuditEngine::run_full_audit`] |
//! | re-check    | `recheck_interval_hours`       | [`AuditEngine::recheck`]        |
//! | alert sweep | `alert_sweep_interval_hours`   | [`AuditEngine::alert_sweep`]    |
//!
//! Each task waits one full period before its first run.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::engine::{AuditEngine, EngineState};

struct RunningTasks {
    cancel: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

/// Snapshot of scheduler and engine state for status endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct SchedulerStatus {
    pub state: EngineState,
    pub running_tasks: usize,
}

pub struct Scheduler {
    engine: Arc<AuditEngine>,
    tasks: Mutex<Option<RunningTasks>>,
}

impl Scheduler {
    pub fn new(engine: Arc<AuditEngine>) -> Self {
        Self {
            engine,
            tasks: Mutex::new(None),
        }
    }

    /// Start tasks for the engine's current configuration.
    pub async fn start(&self) {
        self.restart().await;
    }

    /// Cancel every running task, then spawn new ones for the engine's
    /// current configuration.
    ///
    /// The configuration is read while the task slot is held, so the last
    /// restart to finish always reflects the latest accepted update. A
    /// disabled configuration leaves nothing running.
    pub async fn restart(&self) {
        let mut tasks = self.tasks.lock().await;
        let config = self.engine.get_config().await;
        if let Some(old) = tasks.take() {
            old.cancel.cancel();
            tracing::info!(tasks = old.handles.len(), "Scheduler tasks cancelled");
        }

        if !config.enabled {
            tracing::info!("Audits disabled, scheduler idle");
            return;
        }

        let cancel = CancellationToken::new();
        let handles = vec![
            spawn_periodic("full_audit", config.audit_interval(), cancel.clone(), {
                let engine = Arc::clone(&self.engine);
                move || {
                    let engine = Arc::clone(&engine);
                    async move {
                        engine.run_full_audit().await;
                    }
                }
            }),
            spawn_periodic("recheck", config.recheck_interval(), cancel.clone(), {
                let engine = Arc::clone(&self.engine);
                move || {
                    let engine = Arc::clone(&engine);
                    async move {
                        engine.recheck().await;
                    }
                }
            }),
            spawn_periodic("alert_sweep", config.alert_sweep_interval(), cancel.clone(), {
                let engine = Arc::clone(&self.engine);
                move || {
                    let engine = Arc::clone(&engine);
                    async move {
                        engine.alert_sweep().await;
                    }
                }
            }),
        ];

        tracing::info!(
            frequency_hours = config.frequency_hours,
            recheck_interval_hours = config.recheck_interval_hours,
            alert_sweep_interval_hours = config.alert_sweep_interval_hours,
            "Scheduler started",
        );
        *tasks = Some(RunningTasks { cancel, handles });
    }

    /// Cancel every task and wait for them to exit.
    pub async fn shutdown(&self) {
        let Some(old) = self.tasks.lock().await.take() else {
            return;
        };
        old.cancel.cancel();
        for handle in old.handles {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Scheduler task panicked");
            }
        }
        tracing::info!("Scheduler stopped");
    }

    /// Number of live periodic tasks.
    pub async fn running_tasks(&self) -> usize {
        self.tasks
            .lock()
            .await
            .as_ref()
            .map(|t| t.handles.iter().filter(|h| !h.is_finished()).count())
            .unwrap_or(0)
    }

    pub async fn status(&self) -> SchedulerStatus {
        SchedulerStatus {
            state: self.engine.state(),
            running_tasks: self.running_tasks().await,
        }
    }
}

fn spawn_periodic<F, Fut>(
    name: &'static str,
    period: Duration,
    cancel: CancellationToken,
    mut job: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::debug!(task = name, period_secs = period.as_secs(), "Scheduled task started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!(task = name, "Scheduled task stopping");
                    break;
                }
                _ = interval.tick() => {
                    tracing::debug!(task = name, "Scheduled task tick");
                    job().await;
                }
            }
        }
    })
}
