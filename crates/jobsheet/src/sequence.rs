//! Last-write-wins ordering for overlapping fetches.
//!
//! Every fetch for a resource takes a [`Ticket`] before it starts. When the
//! response arrives it is applied only if no newer ticket was issued for the
//! same resource in the meantime, so a slow, older request can never
//! overwrite the result of a newer one.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;

/// Proof that a request was issued, ordered by issue time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ticket<K> {
    key: K,
    seq: u64,
}

impl<K> Ticket<K> {
    #[must_use]
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Issue number, starting at 1 for each key.
    #[must_use]
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// Issues tickets per resource key and recognises the newest one.
///
/// Shareable across threads; tickets may be issued and accepted from any of
/// them.
///
/// ```rust
/// use jobsheet::sequence::RequestSequencer;
///
/// let sequencer = RequestSequencer::new();
/// let first = sequencer.issue("jobs");
/// let second = sequencer.issue("jobs");
///
/// assert!(!sequencer.accept(&first));
/// assert!(sequencer.accept(&second));
/// ```
#[derive(Debug)]
pub struct RequestSequencer<K> {
    latest: Mutex<HashMap<K, u64>>,
}

impl<K: Hash + Eq + Clone> Default for RequestSequencer<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq + Clone> RequestSequencer<K> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            latest: Mutex::new(HashMap::new()),
        }
    }

    /// Issues the next ticket for `key`.
    pub fn issue(&self, key: K) -> Ticket<K> {
        let mut latest = self.latest.lock().unwrap_or_else(|e| e.into_inner());
        let seq = latest.entry(key.clone()).or_insert(0);
        *seq += 1;
        Ticket { key, seq: *seq }
    }

    /// Returns true if `ticket` is the newest issued for its key.
    pub fn accept(&self, ticket: &Ticket<K>) -> bool {
        let latest = self.latest.lock().unwrap_or_else(|e| e.into_inner());
        let current = latest.get(&ticket.key).copied().unwrap_or(0);
        current == ticket.seq
    }
}

/// A value that only changes when written with a current ticket.
#[derive(Debug, Clone, PartialEq)]
pub struct Latest<T> {
    value: T,
    seq: u64,
}

impl<T: Default> Default for Latest<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Latest<T> {
    pub fn new(value: T) -> Self {
        Self { value, seq: 0 }
    }

    /// Stores `value` if `ticket` is current in `sequencer` and not older
    /// than the value already held. Returns whether it was stored.
    pub fn apply<K: Hash + Eq + Clone + std::fmt::Debug>(
        &mut self,
        sequencer: &RequestSequencer<K>,
        ticket: &Ticket<K>,
        value: T,
    ) -> bool {
        if ticket.seq <= self.seq || !sequencer.accept(ticket) {
            tracing::warn!(key = ?ticket.key, seq = ticket.seq, "dropping stale response");
            return false;
        }
        self.value = value;
        self.seq = ticket.seq;
        true
    }

    #[must_use]
    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}
