//! Item id generation.

use std::collections::HashSet;

use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const ID_LENGTH: usize = 6;

/// Source of 6-character `[A-Za-z0-9]` item ids.
///
/// Each tree owns its own generator; seed it for reproducible ids.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    rng: StdRng,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map(Self::seeded).unwrap_or_default()
    }

    pub fn generate(&mut self) -> String {
        (&mut self.rng)
            .sample_iter(&Alphanumeric)
            .take(ID_LENGTH)
            .map(char::from)
            .collect()
    }

    /// Split off an independent generator seeded from this one's stream.
    pub fn fork(&mut self) -> Self {
        Self::seeded(self.rng.gen())
    }

    /// Draw ids until one is not in `taken`.
    pub fn generate_unique(&mut self, taken: &HashSet<String>) -> String {
        loop {
            let id = self.generate();
            if !taken.contains(&id) {
                return id;
            }
        }
    }
}

pub fn is_valid_id(id: &str) -> bool {
    id.len() == ID_LENGTH && id.chars().all(|c| c.is_ascii_alphanumeric())
}
