/// Deferred tick scheduler on tokio timers.
/// Fired ticks come back to the runtime loop as `HostEvent::TimerFired`.
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tokio::time;
use tracing::debug;

use crate::host::{HostEvent, TimerHandle};

pub struct TickScheduler {
    next_id: u64,
    pending: HashMap<TimerHandle, AbortHandle>,
    events: mpsc::Sender<HostEvent>,
}

impl TickScheduler {
    pub fn new(events: mpsc::Sender<HostEvent>) -> Self {
        Self {
            next_id: 0,
            pending: HashMap::new(),
            events,
        }
    }

    pub fn schedule(&mut self, delay: Duration) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        let tx = self.events.clone();

        let task = tokio::spawn(async move {
            time::sleep(delay).await;
            let _ = tx.send(HostEvent::TimerFired(handle)).await;
        });
        self.pending.insert(handle, task.abort_handle());
        debug!("Scheduled tick {:?} in {}ms", handle, delay.as_millis());
        handle
    }

    /// Cancel a pending tick. Returns false if it already fired or was unknown.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.pending.remove(&handle) {
            Some(task) => {
                task.abort();
                debug!("Cancelled tick {:?}", handle);
                true
            }
            None => false,
        }
    }

    /// Mark a fired tick as delivered. False means it was cancelled after it fired.
    pub fn complete(&mut self, handle: TimerHandle) -> bool {
        self.pending.remove(&handle).is_some()
    }

    #[cfg(test)]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl Drop for TickScheduler {
    fn drop(&mut self) {
        for (_, task) in self.pending.drain() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_ticks_fire_in_delay_order() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut scheduler = TickScheduler::new(tx);

        let slow = scheduler.schedule(Duration::from_secs(5));
        let fast = scheduler.schedule(Duration::from_secs(1));
        assert_eq!(scheduler.pending(), 2);

        assert_eq!(rx.recv().await, Some(HostEvent::TimerFired(fast)));
        assert!(scheduler.complete(fast));
        assert_eq!(rx.recv().await, Some(HostEvent::TimerFired(slow)));
        assert!(scheduler.complete(slow));
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_tick_never_fires() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut scheduler = TickScheduler::new(tx);

        let cancelled = scheduler.schedule(Duration::from_secs(1));
        let kept = scheduler.schedule(Duration::from_secs(2));
        assert!(scheduler.cancel(cancelled));
        assert!(!scheduler.cancel(cancelled));

        assert_eq!(rx.recv().await, Some(HostEvent::TimerFired(kept)));
        assert!(!scheduler.complete(cancelled));
        assert!(scheduler.complete(kept));
    }

    #[tokio::test(start_paused = true)]
    async fn test_handles_are_unique() {
        let (tx, _rx) = mpsc::channel(8);
        let mut scheduler = TickScheduler::new(tx);
        let a = scheduler.schedule(Duration::ZERO);
        let b = scheduler.schedule(Duration::ZERO);
        assert_ne!(a, b);
    }
}
