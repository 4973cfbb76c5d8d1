//! # Task identity.
//!
//! Every [`Task`](crate::Task) carries a [`TaskId`] drawn from an [`IdGenerator`].
//! The generator is an explicit object owned by the scheduler (and shared with its
//! handles), so there is no hidden process-wide counter.
//!
//! ## Rules
//! - ids start at `1`; `0` is reserved and never produced
//! - ids are strictly increasing in creation order (per generator)
//! - ids are never reused

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier of a task.
///
/// Ordering follows creation order, which is what serial composites rely on
/// to pick their current head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

impl TaskId {
    /// Returns the raw numeric value.
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<TaskId> for u64 {
    fn from(id: TaskId) -> Self {
        id.0
    }
}

/// Thread-safe, monotonically increasing id source.
#[derive(Debug)]
pub struct IdGenerator {
    next: AtomicU64,
}

impl IdGenerator {
    /// Creates a generator whose first id is `1`.
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Returns the next id.
    pub fn next(&self) -> TaskId {
        TaskId(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the id that the next call to [`IdGenerator::next`] would produce.
    pub fn peek(&self) -> TaskId {
        TaskId(self.next.load(Ordering::Relaxed))
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_first_id_is_one() {
        let ids = IdGenerator::new();
        assert_eq!(ids.next().get(), 1);
        assert_eq!(ids.next().get(), 2);
        assert_eq!(ids.peek().get(), 3);
    }

    #[test]
    fn test_ids_increase_in_creation_order() {
        let ids = IdGenerator::new();
        let a = ids.next();
        let b = ids.next();
        let c = ids.next();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_concurrent_ids_are_unique() {
        let ids = Arc::new(IdGenerator::new());
        let threads: Vec<_> = (0..4)
            .map(|_| {
                let ids = Arc::clone(&ids);
                std::thread::spawn(move || (0..1000).map(|_| ids.next()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for t in threads {
            for id in t.join().expect("id thread panicked") {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), 4000);
        assert!(!seen.contains(&TaskId(0)));
    }
}
