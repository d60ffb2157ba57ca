use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rand::seq::SliceRandom;
use rand::Rng;

const SLOT_POOL: [&str; 6] = [
    "6:30 PM", "7:00 PM", "7:15 PM", "8:00 PM", "8:30 PM", "9:00 PM",
];

/// Demo reservation times memoized by entity identity.
///
/// Explicitly owned, cloneable handle shared by whoever normalizes entities;
/// entries are never evicted, so the same key yields the same slot list for
/// the registry's lifetime. Callers must tolerate monotonic growth.
#[derive(Clone, Default)]
pub struct SlotRegistry {
    cache: Arc<Mutex<HashMap<String, Vec<String>>>>,
}

impl SlotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the memoized slot list for `key`, generating one on first use.
    pub fn slots_for(&self, key: &str) -> Vec<String> {
        let mut cache = self.cache.lock().unwrap();
        cache
            .entry(key.to_string())
            .or_insert_with(generate_mock_slots)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.cache.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.lock().unwrap().is_empty()
    }
}

/// 3-4 random evening times from a fixed pool, chronologically sorted.
fn generate_mock_slots() -> Vec<String> {
    let mut rng = rand::thread_rng();
    let mut pool: Vec<&str> = SLOT_POOL.to_vec();
    pool.shuffle(&mut rng);

    let count = 3 + rng.gen_range(0..2usize);
    let mut picked: Vec<&str> = pool.into_iter().take(count).collect();
    picked.sort_by_key(|slot| slot_minutes(slot));
    picked.into_iter().map(String::from).collect()
}

/// Minutes since noon for a "h:mm PM" slot, for chronological ordering.
fn slot_minutes(slot: &str) -> u32 {
    let (time, period) = slot.split_once(' ').unwrap_or((slot, ""));
    let (hour, minute) = time.split_once(':').unwrap_or((time, "0"));
    let hour: u32 = hour.parse().unwrap_or(0);
    let minute: u32 = minute.parse().unwrap_or(0);
    let hour = if hour == 12 { 0 } else { hour };
    hour * 60 + minute + if period == "PM" { 720 } else { 0 }
}
