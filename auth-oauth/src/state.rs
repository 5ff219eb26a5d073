use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rand::rngs::OsRng;
use rand::seq::SliceRandom;

const STATE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const STATE_LENGTH: usize = 15;

/// Outstanding login states, each usable once before it expires
#[derive(Debug)]
pub struct LoginStateStore {
    states: DashMap<String, DateTime<Utc>>,
    ttl: Duration,
}

impl LoginStateStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            states: DashMap::new(),
            ttl,
        }
    }

    /// Generate and remember a new state
    pub fn issue(&self) -> String {
        let state = Self::random_state();
        self.states.insert(state.clone(), Utc::now());
        state
    }

    /// Forget the state and report whether it was live
    pub fn consume(&self, state: &str) -> bool {
        self.states
            .remove(state)
            .is_some_and(|(_, issued_at)| !self.is_expired(issued_at, Utc::now()))
    }

    /// Drop states older than the lifetime; returns how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.states.len();
        self.states.retain(|_, issued_at| !self.is_expired(*issued_at, now));
        before.saturating_sub(self.states.len())
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    fn is_expired(&self, issued_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(issued_at) >= self.ttl
    }

    fn random_state() -> String {
        let mut rng = OsRng;
        (0..STATE_LENGTH)
            .filter_map(|_| STATE_ALPHABET.choose(&mut rng).copied().map(char::from))
            .collect()
    }
}
