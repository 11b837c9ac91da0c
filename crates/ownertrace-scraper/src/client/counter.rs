use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Count of successful page fetches, shared across clones.
#[derive(Debug, Clone, Default)]
pub struct RequestCounter {
    inner: Arc<AtomicU64>,
}

impl RequestCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self) -> u64 {
        self.inner.load(Ordering::Relaxed)
    }

    pub fn increment(&self) {
        self.inner.fetch_add(1, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.inner.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_same_count() {
        let counter = RequestCounter::new();
        let other = counter.clone();
        counter.increment();
        other.increment();
        assert_eq!(counter.get(), 2);
        other.reset();
        assert_eq!(counter.get(), 0);
    }
}
