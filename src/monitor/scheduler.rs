// Scheduler - Runs check cycles at a fixed interval until stopped

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, interval_at, Instant, Interval, MissedTickBehavior};

/// Work driven by the scheduler
#[async_trait]
pub trait CycleRunner: Send + Sync {
    /// One full pass over all domains; must not return before the pass is done
    async fn run_cycle(&self);

    /// Periodic liveness message
    async fn heartbeat(&self);
}

/// Periodic driver for a `CycleRunner`.
///
/// The first cycle runs immediately. Cycles never overlap: the next tick is only awaited
/// after the previous cycle returns, and ticks missed while a cycle was running are
/// skipped rather than replayed.
pub struct Scheduler {
    check_interval: Duration,
    heartbeat_interval: Option<Duration>,
    stop_tx: Arc<watch::Sender<bool>>,
    stop_rx: watch::Receiver<bool>,
}

/// Cloneable handle that stops a running scheduler
#[derive(Clone)]
pub struct SchedulerHandle {
    stop_tx: Arc<watch::Sender<bool>>,
}

impl SchedulerHandle {
    /// Request a stop; an in-flight cycle finishes first
    pub fn stop(&self) {
        self.stop_tx.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.stop_tx.borrow()
    }

    /// Resolves once a stop has been requested
    pub async fn stopped(&self) {
        let mut rx = self.stop_tx.subscribe();
        let _ = rx.wait_for(|stopped| *stopped).await;
    }
}

impl Scheduler {
    pub fn new(check_interval: Duration) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        Self {
            check_interval,
            heartbeat_interval: None,
            stop_tx: Arc::new(stop_tx),
            stop_rx,
        }
    }

    pub fn with_heartbeat(mut self, heartbeat_interval: Option<Duration>) -> Self {
        self.heartbeat_interval = heartbeat_interval;
        self
    }

    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            stop_tx: Arc::clone(&self.stop_tx),
        }
    }

    pub fn check_interval(&self) -> Duration {
        self.check_interval
    }

    /// Drive `runner` until the handle is stopped
    pub async fn run<R: CycleRunner + ?Sized>(&self, runner: &R) {
        let mut stop = self.stop_rx.clone();

        let mut checks = interval(self.check_interval);
        checks.set_missed_tick_behavior(MissedTickBehavior::Skip);

        // Heartbeats start one period after startup
        let mut heartbeats = self.heartbeat_interval.map(|period| {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            ticker
        });

        tracing::info!(
            interval_secs = self.check_interval.as_secs(),
            heartbeat_secs = self.heartbeat_interval.map(|d| d.as_secs()),
            "Scheduler started"
        );

        loop {
            if *stop.borrow() {
                break;
            }

            tokio::select! {
                biased;

                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                }
                _ = checks.tick() => {
                    runner.run_cycle().await;
                }
                _ = next_heartbeat(&mut heartbeats) => {
                    runner.heartbeat().await;
                }
            }
        }

        tracing::info!("Scheduler stopped");
    }
}

async fn next_heartbeat(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingRunner {
        cycles: AtomicUsize,
        heartbeats: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        cycle_duration: Duration,
    }

    #[async_trait]
    impl CycleRunner for CountingRunner {
        async fn run_cycle(&self) {
            self.cycles.fetch_add(1, Ordering::SeqCst);
            let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(running, Ordering::SeqCst);
            if !self.cycle_duration.is_zero() {
                tokio::time::sleep(self.cycle_duration).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }

        async fn heartbeat(&self) {
            self.heartbeats.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_cycle_runs_immediately() {
        let scheduler = Arc::new(Scheduler::new(Duration::from_secs(3600)));
        let runner = Arc::new(CountingRunner::default());
        let handle = scheduler.handle();

        let task = {
            let scheduler = Arc::clone(&scheduler);
            let runner = Arc::clone(&runner);
            tokio::spawn(async move { scheduler.run(runner.as_ref()).await })
        };

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(runner.cycles.load(Ordering::SeqCst), 1);

        handle.stop();
        task.await.unwrap();
        assert!(handle.is_stopped());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cycles_follow_interval() {
        let scheduler = Arc::new(Scheduler::new(Duration::from_secs(60)));
        let runner = Arc::new(CountingRunner::default());
        let handle = scheduler.handle();

        let task = {
            let scheduler = Arc::clone(&scheduler);
            let runner = Arc::clone(&runner);
            tokio::spawn(async move { scheduler.run(runner.as_ref()).await })
        };

        tokio::time::sleep(Duration::from_secs(150)).await;
        // t=0, t=60, t=120
        assert_eq!(runner.cycles.load(Ordering::SeqCst), 3);

        handle.stop();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_cycles_never_overlap() {
        let scheduler = Arc::new(Scheduler::new(Duration::from_secs(10)));
        let runner = Arc::new(CountingRunner {
            cycle_duration: Duration::from_secs(25),
            ..Default::default()
        });
        let handle = scheduler.handle();

        let task = {
            let scheduler = Arc::clone(&scheduler);
            let runner = Arc::clone(&runner);
            tokio::spawn(async move { scheduler.run(runner.as_ref()).await })
        };

        tokio::time::sleep(Duration::from_secs(90)).await;
        // Starts at t=0, 25, 50, 75; missed ticks are not replayed as a burst
        assert_eq!(runner.cycles.load(Ordering::SeqCst), 4);
        assert_eq!(runner.max_in_flight.load(Ordering::SeqCst), 1);

        handle.stop();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeat_interval() {
        let scheduler = Arc::new(
            Scheduler::new(Duration::from_secs(3600)).with_heartbeat(Some(Duration::from_secs(600))),
        );
        let runner = Arc::new(CountingRunner::default());
        let handle = scheduler.handle();

        let task = {
            let scheduler = Arc::clone(&scheduler);
            let runner = Arc::clone(&runner);
            tokio::spawn(async move { scheduler.run(runner.as_ref()).await })
        };

        tokio::time::sleep(Duration::from_secs(1300)).await;
        assert_eq!(runner.heartbeats.load(Ordering::SeqCst), 2);
        assert_eq!(runner.cycles.load(Ordering::SeqCst), 1);

        handle.stop();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_before_run() {
        let scheduler = Scheduler::new(Duration::from_secs(1));
        scheduler.handle().stop();

        let runner = CountingRunner::default();
        scheduler.run(&runner).await;
        assert_eq!(runner.cycles.load(Ordering::SeqCst), 0);
    }
}
