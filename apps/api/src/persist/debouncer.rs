//! Keyed debounced writer.
//!
//! Rapid edits to the same key collapse into a single write: every `schedule`
//! replaces the pending value and restarts that key's timer. Only the most
//! recent value is ever handed to the sink. Writes for different keys are
//! independent.
//!
//! The pending snapshot doubles as the freshest copy of the data, so readers
//! must consult [`Debouncer::pending`] before going to storage. A snapshot
//! stays pending until it has been written successfully.

use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Destination of debounced writes.
#[async_trait]
pub trait Sink<K, V>: Send + Sync {
    async fn write(&self, key: &K, value: &V) -> anyhow::Result<()>;
}

struct PendingWrite<V> {
    value: V,
    generation: u64,
    timer: JoinHandle<()>,
}

struct Inner<K, V> {
    pending: HashMap<K, PendingWrite<V>>,
    next_generation: u64,
}

pub struct Debouncer<K, V> {
    sink: Arc<dyn Sink<K, V>>,
    delay: Duration,
    inner: Arc<Mutex<Inner<K, V>>>,
    /// Held for the duration of every sink write so writes land in the order
    /// their values were produced.
    write_lock: Arc<tokio::sync::Mutex<()>>,
}

impl<K, V> Debouncer<K, V>
where
    K: Eq + Hash + Clone + Display + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(sink: Arc<dyn Sink<K, V>>, delay: Duration) -> Self {
        Self {
            sink,
            delay,
            inner: Arc::new(Mutex::new(Inner {
                pending: HashMap::new(),
                next_generation: 0,
            })),
            write_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replaces any pending write for `key` and restarts its timer.
    /// Must be called from inside a tokio runtime.
    pub fn schedule(&self, key: K, value: V) {
        let mut inner = self.inner.lock();
        inner.next_generation += 1;
        let generation = inner.next_generation;

        let timer = tokio::spawn(Self::fire_after(
            Arc::clone(&self.inner),
            Arc::clone(&self.sink),
            Arc::clone(&self.write_lock),
            self.delay,
            key.clone(),
            generation,
        ));

        let replaced = inner.pending.insert(
            key.clone(),
            PendingWrite {
                value,
                generation,
                timer,
            },
        );
        if let Some(old) = replaced {
            old.timer.abort();
            debug!("Rescheduled pending write for {key}");
        }
    }

    /// Latest value scheduled for `key` whose write has not completed yet.
    pub fn pending(&self, key: &K) -> Option<V> {
        self.inner.lock().pending.get(key).map(|p| p.value.clone())
    }

    pub fn has_pending(&self, key: &K) -> bool {
        self.inner.lock().pending.contains_key(key)
    }

    pub fn pending_count(&self) -> usize {
        self.inner.lock().pending.len()
    }

    /// Drops the pending write for `key` without writing it.
    pub fn cancel(&self, key: &K) -> Option<V> {
        let removed = self.inner.lock().pending.remove(key)?;
        removed.timer.abort();
        Some(removed.value)
    }

    /// Writes `value` now, superseding any pending write for `key`.
    /// On failure the pending write is left in place, timer included.
    pub async fn write_now(&self, key: K, value: V) -> anyhow::Result<()> {
        let _writing = self.write_lock.lock().await;
        let superseded = self.generation_of(&key);
        self.sink.write(&key, &value).await?;
        self.clear_if_current(&key, superseded);
        Ok(())
    }

    /// Writes the pending value for `key` now, if there is one. The value
    /// stays pending if the write fails.
    #[allow(dead_code)]
    pub async fn flush(&self, key: &K) -> anyhow::Result<bool> {
        let _writing = self.write_lock.lock().await;
        let Some((value, generation)) = self
            .inner
            .lock()
            .pending
            .get(key)
            .map(|p| (p.value.clone(), p.generation))
        else {
            return Ok(false);
        };
        self.sink.write(key, &value).await?;
        self.clear_if_current(key, Some(generation));
        Ok(true)
    }

    /// Writes every pending value now. Failures are logged and do not stop
    /// the remaining writes. Returns the number of successful writes.
    pub async fn flush_all(&self) -> usize {
        let _writing = self.write_lock.lock().await;
        let drained: Vec<(K, V)> = {
            let mut inner = self.inner.lock();
            inner
                .pending
                .drain()
                .map(|(key, pending)| {
                    pending.timer.abort();
                    (key, pending.value)
                })
                .collect()
        };

        let mut written = 0;
        for (key, value) in drained {
            match self.sink.write(&key, &value).await {
                Ok(()) => written += 1,
                Err(e) => error!("Failed to persist layout for {key}: {e:?}"),
            }
        }
        written
    }

    fn generation_of(&self, key: &K) -> Option<u64> {
        self.inner.lock().pending.get(key).map(|p| p.generation)
    }

    /// Drops the pending write for `key` if it is still the one at `generation`.
    fn clear_if_current(&self, key: &K, generation: Option<u64>) {
        let Some(generation) = generation else {
            return;
        };
        let mut inner = self.inner.lock();
        let current = inner
            .pending
            .get(key)
            .is_some_and(|p| p.generation == generation);
        if current {
            if let Some(old) = inner.pending.remove(key) {
                old.timer.abort();
            }
        }
    }

    async fn fire_after(
        inner: Arc<Mutex<Inner<K, V>>>,
        sink: Arc<dyn Sink<K, V>>,
        write_lock: Arc<tokio::sync::Mutex<()>>,
        delay: Duration,
        key: K,
        generation: u64,
    ) {
        tokio::time::sleep(delay).await;
        let _writing = write_lock.lock().await;

        // A newer schedule, cancel or flush may have superseded this one.
        let value = inner
            .lock()
            .pending
            .get(&key)
            .filter(|p| p.generation == generation)
            .map(|p| p.value.clone());
        let Some(value) = value else {
            return;
        };

        if let Err(e) = sink.write(&key, &value).await {
            // Kept pending so reads stay current and a later flush retries it.
            error!("Failed to persist layout for {key}: {e:?}");
            return;
        }
        debug!("Persisted debounced write for {key}");

        // The snapshot stays readable until it is on disk.
        let mut inner = inner.lock();
        let current = inner
            .pending
            .get(&key)
            .is_some_and(|p| p.generation == generation);
        if current {
            inner.pending.remove(&key);
        }
    }
}
