//! Cancellable deferred messages.
//!
//! A [`Schedule`] owns at most one spawned task that delivers messages back
//! into a driver's command channel, either once after a delay or repeatedly
//! at an interval. Arming again replaces the previous task. Tasks hold only a
//! weak sender, so they never keep a driver alive on their own.

use std::time::Duration;

use tokio::sync::mpsc::WeakSender;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};

#[derive(Debug, Default)]
pub struct Schedule {
    task: Option<JoinHandle<()>>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a task is armed and has not finished.
    pub fn is_armed(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Deliver `msg` once after `delay`.
    pub fn once<T: Send + 'static>(&mut self, delay: Duration, tx: WeakSender<T>, msg: T) {
        self.cancel();
        self.task = Some(tokio::spawn(async move {
            sleep(delay).await;
            if let Some(tx) = tx.upgrade() {
                let _ = tx.send(msg).await;
            }
        }));
    }

    /// Deliver `make()` every `period`, first one `period` from now.
    ///
    /// Missed ticks are skipped rather than bursted.
    pub fn every<T, F>(&mut self, period: Duration, tx: WeakSender<T>, make: F)
    where
        T: Send + 'static,
        F: Fn() -> T + Send + 'static,
    {
        self.cancel();
        self.task = Some(tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticks.tick().await;
                let Some(tx) = tx.upgrade() else {
                    break;
                };
                if tx.send(make()).await.is_err() {
                    break;
                }
            }
        }));
    }

    /// Abort the armed task.
    ///
    /// Returns `false` if nothing was armed, so repeated cancels are no-ops.
    pub fn cancel(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }
}

impl Drop for Schedule {
    fn drop(&mut self) {
        self.cancel();
    }
}
