//! Retry buffer
//!
//! Missed exercises are kept in a bounded buffer per user and re-served at
//! the start of later sessions. The buffer itself is plain data stored in
//! the profile; [`RetryBufferManager`] applies the configured capacity,
//! eviction policy and ordering.

use crate::{EngineConfig, EvictionPolicy, ExerciseRef};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A missed exercise awaiting re-practice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryEntry {
    pub exercise: ExerciseRef,
    pub misses: u32,
    /// Logical tick of the last miss
    pub last_seen: u64,
}

/// Per-user retry buffer contents
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RetryBuffer {
    entries: Vec<RetryEntry>,
    clock: u64,
}

impl RetryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[RetryEntry] {
        &self.entries
    }

    pub fn get(&self, exercise: &ExerciseRef) -> Option<&RetryEntry> {
        self.entries.iter().find(|e| &e.exercise == exercise)
    }

    pub fn contains(&self, exercise: &ExerciseRef) -> bool {
        self.get(exercise).is_some()
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}

/// Applies capacity, eviction and ordering rules to a [`RetryBuffer`]
#[derive(Debug, Clone)]
pub struct RetryBufferManager {
    capacity: usize,
    policy: EvictionPolicy,
}

impl RetryBufferManager {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            capacity: config.retry_buffer_capacity,
            policy: config.retry_eviction,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Insert a miss or bump an existing entry.
    ///
    /// Returns the entries evicted to make room (empty unless the buffer was
    /// full and the exercise is new).
    pub fn record_miss(&self, buffer: &mut RetryBuffer, exercise: &ExerciseRef) -> Vec<RetryEntry> {
        let now = buffer.tick();
        if let Some(entry) = buffer.entries.iter_mut().find(|e| &e.exercise == exercise) {
            entry.misses += 1;
            entry.last_seen = now;
            return Vec::new();
        }

        let mut evicted = Vec::new();
        while buffer.entries.len() >= self.capacity {
            match self.victim(buffer) {
                Some(position) => evicted.push(buffer.entries.remove(position)),
                None => break,
            }
        }
        for entry in &evicted {
            tracing::warn!(
                exercise = %entry.exercise,
                misses = entry.misses,
                policy = %self.policy,
                "Retry buffer full, evicting entry"
            );
        }

        buffer.entries.push(RetryEntry {
            exercise: exercise.clone(),
            misses: 1,
            last_seen: now,
        });
        evicted
    }

    /// Remove an entry after a successful retry. Returns whether it was present.
    pub fn record_success(&self, buffer: &mut RetryBuffer, exercise: &ExerciseRef) -> bool {
        let before = buffer.entries.len();
        buffer.entries.retain(|e| &e.exercise != exercise);
        buffer.entries.len() != before
    }

    /// Up to `n` entries, highest priority first. Nothing is removed.
    pub fn select_for_session(&self, buffer: &RetryBuffer, n: usize) -> Vec<RetryEntry> {
        let mut selected = buffer.entries.clone();
        selected.sort_by(priority);
        selected.truncate(n);
        selected
    }

    fn victim(&self, buffer: &RetryBuffer) -> Option<usize> {
        let candidates = buffer.entries.iter().enumerate();
        match self.policy {
            EvictionPolicy::LowestPriority => candidates
                .min_by_key(|(_, e)| (e.misses, e.last_seen))
                .map(|(i, _)| i),
            EvictionPolicy::Oldest => candidates.min_by_key(|(_, e)| e.last_seen).map(|(i, _)| i),
        }
    }
}

/// Most misses first, then longest unseen
fn priority(a: &RetryEntry, b: &RetryEntry) -> Ordering {
    b.misses
        .cmp(&a.misses)
        .then_with(|| a.last_seen.cmp(&b.last_seen))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Level;
    use proptest::prelude::*;

    fn exercise(n: u8) -> ExerciseRef {
        ExerciseRef {
            level: Level::new("A1"),
            module: 1 + n / 5,
            index: 1 + n % 5,
            exercise_id: format!("ex-{}", n),
        }
    }

    fn manager(capacity: usize, policy: EvictionPolicy) -> RetryBufferManager {
        RetryBufferManager::new(&EngineConfig {
            retry_buffer_capacity: capacity,
            retry_eviction: policy,
            ..Default::default()
        })
    }

    #[test]
    fn test_record_miss_inserts_then_increments() {
        let manager = manager(10, EvictionPolicy::LowestPriority);
        let mut buffer = RetryBuffer::new();

        manager.record_miss(&mut buffer, &exercise(1));
        manager.record_miss(&mut buffer, &exercise(1));

        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.get(&exercise(1)).unwrap().misses, 2);
    }

    #[test]
    fn test_eleventh_distinct_miss_evicts_exactly_one() {
        let manager = manager(10, EvictionPolicy::LowestPriority);
        let mut buffer = RetryBuffer::new();

        for n in 0..10 {
            manager.record_miss(&mut buffer, &exercise(n));
        }
        // Everything but ex-0 gets a second miss, so ex-0 is lowest priority.
        for n in 1..10 {
            manager.record_miss(&mut buffer, &exercise(n));
        }

        let evicted = manager.record_miss(&mut buffer, &exercise(10));
        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].exercise, exercise(0));
        assert_eq!(buffer.len(), 10);
        assert!(buffer.contains(&exercise(10)));
    }

    #[test]
    fn test_lowest_priority_breaks_ties_by_age() {
        let manager = manager(3, EvictionPolicy::LowestPriority);
        let mut buffer = RetryBuffer::new();
        manager.record_miss(&mut buffer, &exercise(1));
        manager.record_miss(&mut buffer, &exercise(2));
        manager.record_miss(&mut buffer, &exercise(3));

        let evicted = manager.record_miss(&mut buffer, &exercise(4));
        assert_eq!(evicted[0].exercise, exercise(1));
    }

    #[test]
    fn test_oldest_policy_ignores_miss_count() {
        let manager = manager(2, EvictionPolicy::Oldest);
        let mut buffer = RetryBuffer::new();
        manager.record_miss(&mut buffer, &exercise(1));
        manager.record_miss(&mut buffer, &exercise(1));
        manager.record_miss(&mut buffer, &exercise(2));
        manager.record_miss(&mut buffer, &exercise(2));
        manager.record_miss(&mut buffer, &exercise(2));

        let evicted = manager.record_miss(&mut buffer, &exercise(3));
        assert_eq!(evicted[0].exercise, exercise(1));
    }

    #[test]
    fn test_record_success_removes() {
        let manager = manager(10, EvictionPolicy::LowestPriority);
        let mut buffer = RetryBuffer::new();
        manager.record_miss(&mut buffer, &exercise(1));

        assert!(manager.record_success(&mut buffer, &exercise(1)));
        assert!(!manager.record_success(&mut buffer, &exercise(1)));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_select_orders_by_priority_without_removing() {
        let manager = manager(10, EvictionPolicy::LowestPriority);
        let mut buffer = RetryBuffer::new();
        manager.record_miss(&mut buffer, &exercise(1));
        manager.record_miss(&mut buffer, &exercise(2));
        manager.record_miss(&mut buffer, &exercise(3));
        manager.record_miss(&mut buffer, &exercise(3));

        let selected = manager.select_for_session(&buffer, 2);
        let ids: Vec<_> = selected.iter().map(|e| e.exercise.exercise_id.as_str()).collect();
        assert_eq!(ids, vec!["ex-3", "ex-1"]);
        assert_eq!(buffer.len(), 3);
    }

    proptest! {
        #[test]
        fn prop_buffer_never_exceeds_capacity(
            capacity in 1usize..12,
            misses in proptest::collection::vec(0u8..40, 0..200),
            oldest in any::<bool>(),
        ) {
            let policy = if oldest { EvictionPolicy::Oldest } else { EvictionPolicy::LowestPriority };
            let manager = manager(capacity, policy);
            let mut buffer = RetryBuffer::new();
            for n in misses {
                manager.record_miss(&mut buffer, &exercise(n));
                prop_assert!(buffer.len() <= capacity);
            }
        }

        #[test]
        fn prop_success_is_never_selected(
            misses in proptest::collection::vec(0u8..20, 1..60),
            pick in any::<prop::sample::Index>(),
        ) {
            let manager = manager(10, EvictionPolicy::LowestPriority);
            let mut buffer = RetryBuffer::new();
            for n in &misses {
                manager.record_miss(&mut buffer, &exercise(*n));
            }
            let removed = exercise(misses[pick.index(misses.len())]);
            manager.record_success(&mut buffer, &removed);

            let selected = manager.select_for_session(&buffer, buffer.len() + 1);
            prop_assert!(selected.iter().all(|e| e.exercise != removed));
        }
    }
}
