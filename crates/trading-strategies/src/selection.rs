//! Candidate selection for the entry loop.
//!
//! Which buyable symbol gets the next order is a policy, not part of the
//! signal logic. Seeded or deterministic selectors make spend-down runs
//! reproducible.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Picks the next symbol to buy from the current candidate set.
pub trait CandidateSelector: Send + Sync {
    /// Choose one candidate, or `None` if the set is empty.
    fn select<'a>(&mut self, candidates: &'a [String]) -> Option<&'a String>;

    fn name(&self) -> &str;
}

/// Uniform random choice.
#[derive(Debug, Clone)]
pub struct RandomSelector {
    rng: StdRng,
}

impl RandomSelector {
    /// Seeded selectors repeat the same choices for the same inputs.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl CandidateSelector for RandomSelector {
    fn select<'a>(&mut self, candidates: &'a [String]) -> Option<&'a String> {
        candidates.choose(&mut self.rng)
    }

    fn name(&self) -> &str {
        "random"
    }
}

/// Always the lexicographically smallest symbol.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstSelector;

impl CandidateSelector for FirstSelector {
    fn select<'a>(&mut self, candidates: &'a [String]) -> Option<&'a String> {
        candidates.iter().min()
    }

    fn name(&self) -> &str {
        "first"
    }
}

/// Configured selection policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SelectionPolicy {
    #[default]
    Random,
    First,
}

impl SelectionPolicy {
    /// Build the selector for this policy. The seed only affects `Random`.
    pub fn build(self, seed: Option<u64>) -> Box<dyn CandidateSelector> {
        match self {
            SelectionPolicy::Random => Box::new(RandomSelector::new(seed)),
            SelectionPolicy::First => Box::new(FirstSelector),
        }
    }
}
