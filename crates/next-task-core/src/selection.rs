//! Uniform random selection over cached entries

use rand::rngs::OsRng;
use rand::{Rng, TryRngCore};
use tracing::debug;

use crate::error::CacheError;
use crate::store::TaskStore;
use crate::task::{CacheKey, TaskRecord};

/// A task chosen from the cache, together with the key needed to evict it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Entry key in the store
    pub key: CacheKey,
    /// Decoded task
    pub task: TaskRecord,
}

/// Operating-system entropy source used for production draws
pub fn system_rng() -> impl Rng {
    OsRng.unwrap_err()
}

/// Pick one entry uniformly at random and decode it
///
/// The store is not modified, even when decoding fails.
pub fn select_random<S, R>(store: &S, rng: &mut R) -> Result<Selection, CacheError>
where
    S: TaskStore + ?Sized,
    R: Rng,
{
    let mut keys = store.list_keys()?;
    if keys.is_empty() {
        return Err(CacheError::Empty);
    }

    let index = rng.random_range(0..keys.len());
    let key = keys.swap_remove(index);
    debug!(key = %key, index, candidates = keys.len() + 1, "selected cache entry");

    let task = store.get(&key)?;
    Ok(Selection { key, task })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryTaskStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn tasks(n: usize) -> Vec<TaskRecord> {
        (0..n)
            .map(|i| TaskRecord::new("Jira", format!("A-{i}"), format!("task {i}"), ""))
            .collect()
    }

    #[test]
    fn test_empty_store_is_empty_error() {
        let store = InMemoryTaskStore::new();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            select_random(&store, &mut rng),
            Err(CacheError::Empty)
        ));
    }

    #[test]
    fn test_selects_one_of_the_cached_tasks_without_mutation() {
        let cached = tasks(3);
        let store = InMemoryTaskStore::with_tasks(&cached).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..20 {
            let selection = select_random(&store, &mut rng).unwrap();
            assert!(cached.contains(&selection.task));
            assert_eq!(selection.key, selection.task.cache_key());
        }
        assert_eq!(store.count().unwrap(), 3);
    }

    #[test]
    fn test_single_entry_always_selected() {
        let cached = tasks(1);
        let store = InMemoryTaskStore::with_tasks(&cached).unwrap();
        let selection = select_random(&store, &mut system_rng()).unwrap();
        assert_eq!(selection.task, cached[0]);
    }

    #[test]
    fn test_corrupt_entry_is_decode_error_and_not_removed() {
        let mut store = InMemoryTaskStore::new();
        let key = CacheKey("corrupt".to_string());
        store.insert_raw(key.clone(), "{{{{");
        let mut rng = StdRng::seed_from_u64(3);

        let err = select_random(&store, &mut rng).unwrap_err();
        assert!(matches!(err, CacheError::Decode { .. }));
        assert!(store.contains(&key));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_selection_is_roughly_uniform() {
        const N: usize = 4;
        const TRIALS: usize = 40_000;

        let store = InMemoryTaskStore::with_tasks(&tasks(N)).unwrap();
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut counts: HashMap<CacheKey, usize> = HashMap::new();

        for _ in 0..TRIALS {
            let selection = select_random(&store, &mut rng).unwrap();
            *counts.entry(selection.key).or_default() += 1;
        }

        assert_eq!(counts.len(), N);
        let expected = TRIALS / N;
        for (key, count) in counts {
            let deviation = count.abs_diff(expected);
            assert!(
                deviation < expected / 10,
                "{key} selected {count} times, expected about {expected}"
            );
        }
    }

    #[test]
    fn test_system_rng_reaches_every_entry() {
        let store = InMemoryTaskStore::with_tasks(&tasks(2)).unwrap();
        let mut rng = system_rng();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(select_random(&store, &mut rng).unwrap().key);
        }
        assert_eq!(seen.len(), 2);
    }
}
