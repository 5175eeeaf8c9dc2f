use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::sleep;

/// Cancellable single-shot timer used to coalesce a burst of input events
/// into one recomputation.
///
/// `arm` schedules an action `delay` from now, replacing any shot that is
/// still pending; `cancel` discards a pending shot. Dropping the timer
/// cancels it, so a torn-down owner never gets a late callback.
pub struct Debounce {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    pub fn delay(&self) -> Duration { self.delay }

    pub fn set_delay(&mut self, delay: Duration) { self.delay = delay; }

    /// Schedule `action` to run once, `delay` from now. Any previously armed
    /// shot is cancelled first.
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm(&mut self, action: impl FnOnce() + Send + 'static) {
        self.cancel();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            sleep(delay).await;
            action();
        }));
    }

    /// Discard the pending shot, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_armed(&self) -> bool {
        matches!(&self.pending, Some(handle) if !handle.is_finished())
    }
}

impl Drop for Debounce {
    fn drop(&mut self) { self.cancel(); }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn counter() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let fired = count.clone();
        (count, move || {
            fired.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_after_delay() {
        let mut debounce = Debounce::new(Duration::from_millis(350));
        let (count, action) = counter();

        debounce.arm(action);
        assert!(debounce.is_armed());

        sleep(Duration::from_millis(400)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!debounce.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_discards_pending_shot() {
        let mut debounce = Debounce::new(Duration::from_millis(350));
        let (count, action) = counter();

        debounce.arm(action);
        debounce.cancel();

        sleep(Duration::from_millis(400)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(!debounce.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn rearming_replaces_the_pending_shot() {
        let mut debounce = Debounce::new(Duration::from_millis(350));
        let (first, first_action) = counter();
        let (second, second_action) = counter();

        debounce.arm(first_action);
        sleep(Duration::from_millis(200)).await;
        debounce.arm(second_action);

        // The original deadline passes; only the rescheduled shot may fire.
        sleep(Duration::from_millis(200)).await;
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 0);

        sleep(Duration::from_millis(200)).await;
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_outstanding_shot() {
        let (count, action) = counter();
        {
            let mut debounce = Debounce::new(Duration::from_millis(350));
            debounce.arm(action);
        }

        sleep(Duration::from_millis(400)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
