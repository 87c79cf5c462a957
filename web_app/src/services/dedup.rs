//! In-memory memory of recently processed webhook event ids.
//!
//! LINE redelivers events it believes were not received, with the same
//! `webhookEventId`. Remembering the last few ids keeps a redelivery from
//! producing a second completion and reply. Nothing is persisted, so a restart
//! forgets everything.

use std::collections::{HashSet, VecDeque};
use tokio::sync::Mutex;

/// Bounded FIFO set of event ids
pub struct RecentEvents {
    capacity: usize,
    inner: Mutex<Window>,
}

#[derive(Default)]
struct Window {
    order: VecDeque<String>,
    seen: HashSet<String>,
}

impl RecentEvents {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(Window::default()),
        }
    }

    /// Records `event_id`, returning `false` if it was already present.
    ///
    /// The oldest id is evicted once the window is full.
    pub async fn first_time(&self, event_id: &str) -> bool {
        let mut window = self.inner.lock().await;
        if window.seen.contains(event_id) {
            return false;
        }

        if window.order.len() >= self.capacity {
            if let Some(oldest) = window.order.pop_front() {
                window.seen.remove(&oldest);
            }
        }

        window.order.push_back(event_id.to_string());
        window.seen.insert(event_id.to_string());
        true
    }

    #[cfg(test)]
    async fn remembered(&self) -> usize {
        self.inner.lock().await.order.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[ntex::test]
    async fn test_repeated_id_is_detected() {
        let recent = RecentEvents::new(8);

        assert!(recent.first_time("evt-1").await);
        assert!(recent.first_time("evt-2").await);
        assert!(!recent.first_time("evt-1").await);
        assert_eq!(recent.remembered().await, 2);
    }

    #[ntex::test]
    async fn test_oldest_id_is_evicted() {
        let recent = RecentEvents::new(2);

        assert!(recent.first_time("a").await);
        assert!(recent.first_time("b").await);
        assert!(recent.first_time("c").await);
        assert_eq!(recent.remembered().await, 2);

        // "a" fell out of the window
        assert!(recent.first_time("a").await);
        assert!(!recent.first_time("c").await);
    }

    #[ntex::test]
    async fn test_zero_capacity_still_remembers_last() {
        let recent = RecentEvents::new(0);

        assert!(recent.first_time("a").await);
        assert!(!recent.first_time("a").await);
    }
}
