use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use tracing::debug;

/// Ticket handed out when a selection-driven fetch starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

/// Monotonic counter deciding which in-flight response may still be
/// applied. Only the most recently issued generation is current.
#[derive(Clone, Debug, Default)]
pub struct RequestGenerations {
    latest: Arc<AtomicU64>,
}

impl RequestGenerations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> Generation {
        Generation(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.latest.load(Ordering::SeqCst) == generation.0
    }

    /// True when the response for `generation` should be applied; logs and
    /// returns false for a superseded one.
    pub fn accept(&self, generation: Generation, what: &str) -> bool {
        let current = self.is_current(generation);
        if !current {
            debug!(
                generation = generation.0,
                latest = self.latest.load(Ordering::SeqCst),
                what,
                "dropping stale response"
            );
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_latest_is_accepted() {
        let generations = RequestGenerations::new();
        let first = generations.begin();
        let second = generations.begin();
        assert!(first < second);
        assert!(!generations.accept(first, "record"));
        assert!(generations.accept(second, "record"));
    }

    #[test]
    fn clones_share_the_counter() {
        let generations = RequestGenerations::new();
        let other = generations.clone();
        let first = generations.begin();
        other.begin();
        assert!(!generations.is_current(first));
    }
}
