//! Per-Row Debouncer
//!
//! One timer per key. Scheduling a key that already has a timer replaces it,
//! so a burst of edits fires once, after the last one. Once a timer fires its
//! work runs as a detached task: later reschedules or cancels only affect
//! timers that are still waiting, never a request already on the wire.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;

struct Timer {
    generation: u64,
    handle: JoinHandle<()>,
}

type Timers<K> = Arc<Mutex<HashMap<K, Timer>>>;

fn lock<K>(timers: &Mutex<HashMap<K, Timer>>) -> MutexGuard<'_, HashMap<K, Timer>> {
    match timers.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

pub struct Debouncer<K> {
    timers: Timers<K>,
    next_generation: AtomicU64,
}

impl<K> Default for Debouncer<K> {
    fn default() -> Self {
        Self {
            timers: Arc::new(Mutex::new(HashMap::new())),
            next_generation: AtomicU64::new(0),
        }
    }
}

impl<K> Debouncer<K>
where
    K: Eq + Hash + Clone + Send + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `fire` after `delay` unless `key` is rescheduled or cancelled first.
    ///
    /// `fire` is only polled when the timer elapses, so anything it reads is
    /// read at fire time. The key stops counting as scheduled before `fire`
    /// starts.
    pub fn schedule<F>(&self, key: K, delay: Duration, fire: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let timers = Arc::clone(&self.timers);
        let timer_key = key.clone();

        // Held across the spawn so the timer cannot look itself up before it is stored
        let mut guard = lock(&self.timers);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut timers = lock(&timers);
                let current = timers
                    .get(&timer_key)
                    .map_or(false, |timer| timer.generation == generation);
                if !current {
                    return;
                }
                timers.remove(&timer_key);
            }
            tokio::spawn(fire);
        });

        if let Some(previous) = guard.insert(key, Timer { generation, handle }) {
            previous.handle.abort();
        }
    }

    /// Drop the waiting timer for `key`, if any; returns whether one was waiting
    pub fn cancel(&self, key: &K) -> bool {
        match lock(&self.timers).remove(key) {
            Some(timer) => {
                timer.handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&self) {
        for (_, timer) in lock(&self.timers).drain() {
            timer.handle.abort();
        }
    }

    /// Whether `key` has a timer that has not fired yet
    pub fn is_scheduled(&self, key: &K) -> bool {
        lock(&self.timers).contains_key(key)
    }

    pub fn scheduled_count(&self) -> usize {
        lock(&self.timers).len()
    }
}

impl<K> Drop for Debouncer<K> {
    fn drop(&mut self) {
        for (_, timer) in lock(&self.timers).drain() {
            timer.handle.abort();
        }
    }
}
