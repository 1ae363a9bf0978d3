//! Event identifiers handed out to clusters at report time.
//!
//! The reporter only sees the [`EventIdGenerator`] trait so tests and
//! reproducible runs can swap the random source for a fixed one.
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const EVENT_ID_LENGTH: usize = 8;

pub trait EventIdGenerator {
    /// Produce the identifier for the next cluster
    fn next_event_id(&mut self) -> String;
}

/// Random lowercase alphanumeric identifiers.
///
/// Letters are drawn from both cases and then lowercased, so uppercase and
/// lowercase draws of the same letter collide. Collisions between clusters
/// are possible and not checked.
pub struct RandomEventIds {
    rng: StdRng,
    length: usize,
}

impl RandomEventIds {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            length: EVENT_ID_LENGTH,
        }
    }

    /// Same seed, same identifiers
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            length: EVENT_ID_LENGTH,
        }
    }

    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }
}

impl Default for RandomEventIds {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl EventIdGenerator for RandomEventIds {
    fn next_event_id(&mut self) -> String {
        (&mut self.rng)
            .sample_iter(&Alphanumeric)
            .take(self.length)
            .map(|b| char::from(b).to_ascii_lowercase())
            .collect()
    }
}

/// `e1`, `e2`, ... in order
#[derive(Debug, Default)]
pub struct SequentialEventIds {
    next: usize,
}

impl SequentialEventIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventIdGenerator for SequentialEventIds {
    fn next_event_id(&mut self) -> String {
        self.next += 1;
        format!("e{}", self.next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_ids_are_lowercase_alphanumeric() {
        let mut ids = RandomEventIds::from_entropy();
        for _ in 0..50 {
            let id = ids.next_event_id();
            assert_eq!(id.len(), EVENT_ID_LENGTH);
            assert!(id
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        }
    }

    #[test]
    fn test_seeded_ids_repeat() {
        let mut a = RandomEventIds::seeded(42);
        let mut b = RandomEventIds::seeded(42);

        let first: Vec<_> = (0..5).map(|_| a.next_event_id()).collect();
        let second: Vec<_> = (0..5).map(|_| b.next_event_id()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_custom_length() {
        let mut ids = RandomEventIds::seeded(7).with_length(12);
        assert_eq!(ids.next_event_id().len(), 12);
    }

    #[test]
    fn test_sequential_ids() {
        let mut ids = SequentialEventIds::new();
        assert_eq!(ids.next_event_id(), "e1");
        assert_eq!(ids.next_event_id(), "e2");
    }
}
