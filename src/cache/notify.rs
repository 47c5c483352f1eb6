//! Notification Queue Module
//!
//! Bounded FIFO of payloads reclaimed by the sweep.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use tokio::sync::Notify;

// == Notification Queue ==
/// Bounded queue of reclaimed payloads.
///
/// Values are stored in a VecDeque where:
/// - Front = Oldest notification
/// - Back = Most recent notification
///
/// Publishing never waits for a consumer. When the queue is full the oldest
/// value is discarded to make room, so a slow consumer loses notifications
/// rather than stalling the sweep.
#[derive(Debug)]
pub struct NotificationQueue {
    values: Mutex<VecDeque<String>>,
    capacity: usize,
    available: Notify,
}

impl NotificationQueue {
    // == Constructor ==
    /// Creates an empty queue holding at most `capacity` values.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            values: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            available: Notify::new(),
        }
    }

    // Poisoning only means a holder panicked mid-operation; the deque is still usable.
    fn lock(&self) -> MutexGuard<'_, VecDeque<String>> {
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // == Push ==
    /// Appends a value, returning the oldest value if it had to be dropped.
    pub(crate) fn push(&self, value: String) -> Option<String> {
        let dropped = {
            let mut values = self.lock();
            let dropped = if values.len() >= self.capacity {
                values.pop_front()
            } else {
                None
            };
            values.push_back(value);
            dropped
        };

        self.available.notify_one();
        dropped
    }

    // == Try Receive ==
    /// Pops the oldest value without waiting.
    pub fn try_recv(&self) -> Option<String> {
        self.lock().pop_front()
    }

    // == Receive ==
    /// Waits for a value and pops the oldest one.
    pub async fn recv(&self) -> String {
        loop {
            // Register interest before checking so a push in between is not missed
            let notified = self.available.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(value) = self.try_recv() {
                return value;
            }

            notified.await;
        }
    }

    // == Drain ==
    /// Pops every queued value, oldest first.
    pub fn drain(&self) -> Vec<String> {
        self.lock().drain(..).collect()
    }

    // == Length ==
    /// Returns the number of queued values.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Returns the fixed bound of the queue.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
