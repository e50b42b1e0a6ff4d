//! Named periodic tasks tied to the guide's visible lifetime. Each task is
//! polled from the single event loop, making re-entry impossible and every
//! task independently cancellable.

use std::time::{Duration, Instant};

pub const GUIDE_REFRESH: &str = "guide-refresh";
pub const STATUS_RECLASSIFY: &str = "status-reclassify";
pub const DAY_ROLLOVER: &str = "day-rollover";

pub const REFRESH_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug)]
struct PeriodicTask {
    name: &'static str,
    every: Duration,
    last_run: Option<Instant>,
    running: bool,
}

/// Owns the guide's periodic tasks by name.
#[derive(Debug, Default)]
pub struct Scheduler {
    tasks: Vec<PeriodicTask>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preconfigured with the guide's three 60-second tasks, stopped.
    pub fn for_guide() -> Self {
        let mut scheduler = Self::new();
        scheduler.register(GUIDE_REFRESH, REFRESH_INTERVAL);
        scheduler.register(STATUS_RECLASSIFY, REFRESH_INTERVAL);
        scheduler.register(DAY_ROLLOVER, REFRESH_INTERVAL);
        scheduler
    }

    pub fn register(&mut self, name: &'static str, every: Duration) {
        if self.tasks.iter().any(|t| t.name == name) {
            return;
        }
        self.tasks.push(PeriodicTask {
            name,
            every,
            last_run: None,
            running: false,
        });
    }

    pub fn start(&mut self, name: &str, now: Instant) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.name == name) {
            task.running = true;
            // first firing happens one full interval after start
            task.last_run = Some(now);
        }
    }

    pub fn stop(&mut self, name: &str) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.name == name) {
            task.running = false;
        }
    }

    /// Starts every task; called when the guide becomes visible.
    pub fn start_all(&mut self, now: Instant) {
        for task in &mut self.tasks {
            task.running = true;
            task.last_run = Some(now);
        }
    }

    /// Stops every task; called when the guide is hidden or torn down.
    pub fn stop_all(&mut self) {
        for task in &mut self.tasks {
            task.running = false;
        }
    }

    pub fn is_running(&self, name: &str) -> bool {
        self.tasks.iter().any(|t| t.name == name && t.running)
    }

    /// Names of tasks whose interval has elapsed. Marks them as run, so a
    /// task fires at most once per poll regardless of how late the poll is.
    pub fn due(&mut self, now: Instant) -> Vec<&'static str> {
        let mut fired = Vec::new();
        for task in &mut self.tasks {
            if !task.running {
                continue;
            }
            let elapsed = match task.last_run {
                Some(last) => now.duration_since(last),
                None => task.every,
            };
            if elapsed >= task.every {
                task.last_run = Some(now);
                fired.push(task.name);
            }
        }
        fired
    }
}
