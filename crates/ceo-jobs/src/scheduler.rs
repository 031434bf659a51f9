//! Cron scheduler for recurring in-process tasks.

use crate::error::{JobError, JobResult};
use crate::metrics::SchedulerMetrics;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cron::Schedule;
use parking_lot::{Mutex, RwLock};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// A unit of recurring work.
#[async_trait]
pub trait ScheduledTask: Send + Sync {
    /// Stable name used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Runs the task once.
    async fn run(&self) -> JobResult<()>;
}

/// A task bound to its cron schedule.
#[derive(Clone)]
struct Entry {
    task: Arc<dyn ScheduledTask>,
    cron: String,
    schedule: Schedule,
}

impl Entry {
    fn next_run_from(&self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule.after(&from).next()
    }
}

/// Registered task as reported by [`Scheduler::list_tasks`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTaskInfo {
    pub name: &'static str,
    pub cron: String,
    pub next_run: Option<DateTime<Utc>>,
}

/// Scheduler statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub running: bool,
    pub tasks: usize,
    pub runs: u64,
    pub failures: u64,
}

#[derive(Default)]
struct Counters {
    runs: AtomicU64,
    failures: AtomicU64,
}

/// Cron scheduler: one tokio loop per registered task.
pub struct Scheduler {
    entries: RwLock<Vec<Entry>>,
    shutdown_tx: broadcast::Sender<()>,
    running: Arc<AtomicBool>,
    counters: Arc<Counters>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Scheduler {
    /// Creates an empty scheduler.
    pub fn new() -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            entries: RwLock::new(Vec::new()),
            shutdown_tx,
            running: Arc::new(AtomicBool::new(false)),
            counters: Arc::new(Counters::default()),
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Registers a task with a six-field cron expression (seconds first).
    pub fn register(&self, task: Arc<dyn ScheduledTask>, cron_expr: &str) -> JobResult<()> {
        let schedule = Schedule::from_str(cron_expr)
            .map_err(|e| JobError::Configuration(format!("Invalid cron expression '{cron_expr}': {e}")))?;

        let mut entries = self.entries.write();
        if entries.iter().any(|e| e.task.name() == task.name()) {
            return Err(JobError::Scheduler(format!("Task already registered: {}", task.name())));
        }

        info!(task = task.name(), cron = %cron_expr, "Registered scheduled task");
        entries.push(Entry {
            task,
            cron: cron_expr.to_string(),
            schedule,
        });
        Ok(())
    }

    /// Spawns the task loops. Calling it again while running is a no-op.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Scheduler already running");
            return;
        }

        let entries = self.entries.read().clone();
        info!(tasks = entries.len(), "Starting scheduler");

        let mut handles = self.handles.lock();
        for entry in entries {
            let shutdown_rx = self.shutdown_tx.subscribe();
            let counters = Arc::clone(&self.counters);
            handles.push(tokio::spawn(run_loop(entry, shutdown_rx, counters)));
        }
    }

    /// Signals every loop to stop.
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            info!("Stopping scheduler");
            let _ = self.shutdown_tx.send(());
        }
    }

    /// Stops the loops and waits for them to exit.
    ///
    /// A task run that is in progress finishes first.
    pub async fn shutdown(&self) {
        self.stop();
        let handles: Vec<JoinHandle<()>> = self.handles.lock().drain(..).collect();
        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "Scheduler loop ended abnormally");
            }
        }
        info!("Scheduler stopped");
    }

    /// Runs a registered task immediately, outside its schedule.
    pub async fn trigger(&self, name: &str) -> JobResult<()> {
        let entry = self
            .entries
            .read()
            .iter()
            .find(|e| e.task.name() == name)
            .cloned()
            .ok_or_else(|| JobError::NotFound(name.to_string()))?;

        execute(&entry, &self.counters).await
    }

    /// Registered tasks with their next fire time.
    pub fn list_tasks(&self) -> Vec<ScheduledTaskInfo> {
        let now = Utc::now();
        self.entries
            .read()
            .iter()
            .map(|e| ScheduledTaskInfo {
                name: e.task.name(),
                cron: e.cron.clone(),
                next_run: e.next_run_from(now),
            })
            .collect()
    }

    /// Whether the loops are running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Current statistics.
    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            running: self.is_running(),
            tasks: self.entries.read().len(),
            runs: self.counters.runs.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("tasks", &self.entries.read().len())
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

async fn run_loop(entry: Entry, mut shutdown_rx: broadcast::Receiver<()>, counters: Arc<Counters>) {
    let name = entry.task.name();
    loop {
        let now = Utc::now();
        let Some(next) = entry.next_run_from(now) else {
            warn!(task = name, "Cron schedule has no upcoming run, stopping loop");
            return;
        };
        let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
        debug!(task = name, next_run = %next, "Waiting for next run");

        tokio::select! {
            _ = shutdown_rx.recv() => {
                debug!(task = name, "Received shutdown signal");
                return;
            }
            () = tokio::time::sleep(wait) => {
                // Failures are logged and counted inside; the loop keeps going
                let _ = execute(&entry, &counters).await;
            }
        }
    }
}

async fn execute(entry: &Entry, counters: &Counters) -> JobResult<()> {
    let name = entry.task.name();
    let started = Instant::now();
    debug!(task = name, "Running scheduled task");

    let result = entry.task.run().await;
    let elapsed = started.elapsed();

    match &result {
        Ok(()) => {
            counters.runs.fetch_add(1, Ordering::Relaxed);
            SchedulerMetrics::task_completed(name, elapsed);
            info!(task = name, duration_ms = duration_ms(elapsed), "Scheduled task completed");
        }
        Err(e) => {
            counters.failures.fetch_add(1, Ordering::Relaxed);
            SchedulerMetrics::task_failed(name, elapsed);
            error!(task = name, error = %e, "Scheduled task failed");
        }
    }
    result
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn duration_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
