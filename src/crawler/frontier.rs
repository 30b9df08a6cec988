use crate::core::types::UrlId;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::timeout;

/// One unit of crawl work: a url awaiting fetch and the page that linked
/// to it (`None` for the seed).
#[derive(Debug, Clone)]
pub struct FrontierItem {
    pub url: String,
    pub parent: Option<UrlId>,
}

impl FrontierItem {
    pub fn seed(url: impl Into<String>) -> Self {
        FrontierItem {
            url: url.into(),
            parent: None,
        }
    }
}

/// Thread-safe FIFO frontier. `dequeue` waits at most a bounded interval so
/// callers regularly re-check the stop signal; `in_flight` counts items
/// handed out but not yet acked, which lets workers detect a drained crawl.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: Mutex<VecDeque<FrontierItem>>,
    notify: Notify,
    in_flight: AtomicUsize,
}

impl Frontier {
    pub fn new() -> Self {
        Frontier::default()
    }

    pub fn enqueue(&self, item: FrontierItem) {
        self.queue.lock().push_back(item);
        self.notify.notify_one();
    }

    /// Pops the next item, waiting up to `wait` if the queue is empty.
    /// Returns `None` on timeout. A returned item counts as in-flight until
    /// `task_done` is called.
    pub async fn dequeue(&self, wait: Duration) -> Option<FrontierItem> {
        if let Some(item) = self.try_pop() {
            return Some(item);
        }
        // A notify arriving before `notified()` is stored as a permit, so
        // enqueues between the two polls are not lost.
        let _ = timeout(wait, self.notify.notified()).await;
        self.try_pop()
    }

    fn try_pop(&self) -> Option<FrontierItem> {
        let item = self.queue.lock().pop_front();
        if item.is_some() {
            self.in_flight.fetch_add(1, Ordering::SeqCst);
        }
        item
    }

    /// Acks one dequeued item.
    pub fn task_done(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    /// True when nothing is queued and nothing is being processed: no more
    /// work can ever appear.
    pub fn is_idle(&self) -> bool {
        self.queue.lock().is_empty() && self.in_flight.load(Ordering::SeqCst) == 0
    }

    /// Wakes every blocked `dequeue`, e.g. after the stop signal is raised.
    pub fn wake_all(&self) {
        self.notify.notify_waiters();
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}
