use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Monotonically increasing value, named by its slot in a [`CounterSet`]
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    pub fn increment(&self) {
        self.add(1);
    }

    pub fn add(&self, amount: u64) {
        self.value.fetch_add(amount, Ordering::Relaxed);
    }

    pub fn value(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Process-wide counter table, shared by every node that reports into it.
///
/// Counters are created on first use and live as long as the set. A
/// poisoned lock is recovered rather than propagated; counting never fails
/// the caller.
#[derive(Debug, Default)]
pub struct CounterSet {
    counters: RwLock<BTreeMap<String, Arc<Counter>>>,
}

impl CounterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Arc<Counter> {
        {
            let counters = self.counters.read().unwrap_or_else(|e| e.into_inner());
            if let Some(counter) = counters.get(name) {
                return counter.clone();
            }
        }

        let mut counters = self.counters.write().unwrap_or_else(|e| e.into_inner());
        counters
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Counter::default()))
            .clone()
    }

    /// Current value, zero for a counter nobody has touched.
    pub fn value(&self, name: &str) -> u64 {
        let counters = self.counters.read().unwrap_or_else(|e| e.into_inner());
        counters.get(name).map(|c| c.value()).unwrap_or(0)
    }

    pub fn snapshot(&self) -> Vec<(String, u64)> {
        let counters = self.counters.read().unwrap_or_else(|e| e.into_inner());
        counters
            .iter()
            .map(|(name, counter)| (name.clone(), counter.value()))
            .collect()
    }
}
