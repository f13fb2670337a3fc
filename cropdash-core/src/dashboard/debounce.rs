use std::{
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};
use tokio::task::JoinHandle;

/// Runs only the most recently scheduled task, once `delay` has passed
/// without another schedule.
///
/// A task that has already started is never interrupted by a later schedule.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    latest: Arc<AtomicU64>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, latest: Arc::new(AtomicU64::new(0)) }
    }

    /// Schedule `task`. The handle resolves to `true` if the task ran.
    pub fn schedule<F>(&self, task: F) -> JoinHandle<bool>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let latest = Arc::clone(&self.latest);
        let delay = self.delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if latest.load(Ordering::SeqCst) != ticket {
                return false;
            }
            task.await;
            true
        })
    }

    /// Drop whatever is pending without scheduling anything new.
    pub fn cancel(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test(start_paused = true)]
    async fn only_last_schedule_runs() {
        let debouncer = Debouncer::new(Duration::from_millis(400));
        let runs = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..3 {
            let runs = Arc::clone(&runs);
            handles.push(debouncer.schedule(async move {
                runs.fetch_add(1, Ordering::SeqCst);
            }));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        let mut ran = Vec::new();
        for handle in handles {
            ran.push(handle.await.unwrap());
        }

        assert_eq!(ran, [false, false, true]);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn spaced_schedules_all_run() {
        let debouncer = Debouncer::new(Duration::from_millis(400));

        let first = debouncer.schedule(async {});
        tokio::time::sleep(Duration::from_millis(500)).await;
        let second = debouncer.schedule(async {});

        assert!(first.await.unwrap());
        assert!(second.await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_pending_task() {
        let debouncer = Debouncer::new(Duration::from_millis(400));
        let pending = debouncer.schedule(async {});
        debouncer.cancel();
        assert!(!pending.await.unwrap());
    }
}
