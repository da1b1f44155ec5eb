use rand::{distributions::WeightedIndex, prelude::Distribution, Rng};

/// What a simulated user does on one step, with the relative frequency of
/// each step in a mixed workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Behavior {
    FetchStatistics,
    FetchTeam,
    CreatePullRequest,
    FetchUserReviews,
    MergePullRequest,
    ToggleUserActivity,
}

impl Behavior {
    pub const ALL: [Behavior; 6] = [
        Behavior::FetchStatistics,
        Behavior::FetchTeam,
        Behavior::CreatePullRequest,
        Behavior::FetchUserReviews,
        Behavior::MergePullRequest,
        Behavior::ToggleUserActivity,
    ];

    pub fn weight(self) -> u32 {
        match self {
            Behavior::FetchStatistics => 10,
            Behavior::FetchTeam => 5,
            Behavior::CreatePullRequest => 8,
            Behavior::FetchUserReviews => 3,
            Behavior::MergePullRequest => 2,
            Behavior::ToggleUserActivity => 1,
        }
    }

    /// Whether the step acts on behalf of a team member.
    pub fn needs_member(self) -> bool {
        !matches!(self, Behavior::FetchStatistics | Behavior::FetchTeam)
    }
}

#[derive(Debug, Clone)]
pub struct BehaviorMix {
    index: WeightedIndex<u32>,
}

impl Default for BehaviorMix {
    fn default() -> Self {
        Self::new()
    }
}

impl BehaviorMix {
    pub fn new() -> Self {
        let index = WeightedIndex::new(Behavior::ALL.iter().map(|b| b.weight()))
            .expect("behavior weights are positive");
        Self { index }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Behavior {
        Behavior::ALL[self.index.sample(rng)]
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn weights_sum_to_mix_total() {
        let total: u32 = Behavior::ALL.iter().map(|b| b.weight()).sum();
        assert_eq!(total, 29);
    }

    #[test]
    fn sampling_follows_weights() {
        let mix = BehaviorMix::new();
        let mut rng = StdRng::seed_from_u64(7);
        let mut counts: HashMap<Behavior, u32> = HashMap::new();
        let draws = 29_000;
        for _ in 0..draws {
            *counts.entry(mix.sample(&mut rng)).or_default() += 1;
        }

        for behavior in Behavior::ALL {
            let expected = draws as f64 * behavior.weight() as f64 / 29.0;
            let got = counts.get(&behavior).copied().unwrap_or(0) as f64;
            assert!(
                (got - expected).abs() < expected * 0.2 + 50.0,
                "{behavior:?}: expected ~{expected}, got {got}"
            );
        }
    }
}
