use crate::types::Strategy;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Point advantage of `a` over `b`: for each location (worth its 1-based
/// rank in points), add the rank where `a` strictly out-allocates `b`,
/// subtract it where `b` strictly out-allocates `a`.
pub fn point_advantage(a: &Strategy, b: &Strategy) -> i64 {
    a.entries()
        .iter()
        .zip(b.entries())
        .enumerate()
        .map(|(i, (x, y))| {
            let value = (i + 1) as i64;
            match x.cmp(y) {
                Ordering::Greater => value,
                Ordering::Less => -value,
                Ordering::Equal => 0,
            }
        })
        .sum()
}

/// Cache of already-judged contests.
///
/// Keys are the `Ord`-canonical ordering of the pair, storing the point
/// advantage of that ordering, so a reversed query hits the same entry.
/// `resolve` derives winner and loser from the advantage relative to the
/// order the query presented: an advantage of zero awards the first
/// argument, which makes the tie-break order-dependent and is load-bearing
/// for reproducibility.
#[derive(Debug, Default)]
pub struct SolvedGames {
    games: HashMap<(Strategy, Strategy), i64>,
}

impl SolvedGames {
    pub fn new() -> Self {
        Self {
            games: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Winner and loser of a contest between `a` and `b`, consulting and
    /// filling the cache. Ties favor `a`.
    pub fn resolve(&mut self, a: &Strategy, b: &Strategy) -> (Strategy, Strategy) {
        if self.advantage(a, b) >= 0 {
            (a.clone(), b.clone())
        } else {
            (b.clone(), a.clone())
        }
    }

    fn advantage(&mut self, a: &Strategy, b: &Strategy) -> i64 {
        let forward = a <= b;
        let (lo, hi) = if forward { (a, b) } else { (b, a) };
        let stored = match self.games.get(&(lo.clone(), hi.clone())) {
            Some(&advantage) => advantage,
            None => {
                let advantage = point_advantage(lo, hi);
                self.games.insert((lo.clone(), hi.clone()), advantage);
                advantage
            }
        };
        if forward {
            stored
        } else {
            -stored
        }
    }

    /// Record a previously solved game, e.g. when restoring a checkpoint.
    pub(crate) fn record(&mut self, a: Strategy, b: Strategy, advantage: i64) {
        if a <= b {
            self.games.insert((a, b), advantage);
        } else {
            self.games.insert((b, a), -advantage);
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&(Strategy, Strategy), &i64)> {
        self.games.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strat(entries: &[u32]) -> Strategy {
        Strategy::new(entries.to_vec())
    }

    #[test]
    fn test_point_advantage_literals() {
        // Location 1 favors the second strategy, worth 1 point.
        assert_eq!(point_advantage(&strat(&[1, 0]), &strat(&[0, 1])), -1);
        assert_eq!(point_advantage(&strat(&[0, 1]), &strat(&[1, 0])), 1);
        assert_eq!(point_advantage(&strat(&[2, 2]), &strat(&[2, 2])), 0);
        // +1 at location 1, +2 at location 2, -3 at location 3.
        assert_eq!(point_advantage(&strat(&[1, 1, 0]), &strat(&[0, 0, 1])), 0);
    }

    #[test]
    fn test_resolve_prefers_higher_value_majority() {
        let mut cache = SolvedGames::new();
        let (winner, loser) = cache.resolve(&strat(&[1, 0]), &strat(&[0, 1]));
        assert_eq!(winner, strat(&[0, 1]));
        assert_eq!(loser, strat(&[1, 0]));
    }

    #[test]
    fn test_resolve_tie_favors_first_argument() {
        let mut cache = SolvedGames::new();
        let (winner, loser) = cache.resolve(&strat(&[1, 0]), &strat(&[1, 0]));
        assert_eq!(winner, strat(&[1, 0]));
        assert_eq!(loser, strat(&[1, 0]));
    }

    #[test]
    fn test_zero_advantage_tie_is_order_dependent() {
        let mut cache = SolvedGames::new();
        let a = strat(&[1, 1, 0]);
        let b = strat(&[0, 0, 1]);
        assert_eq!(cache.resolve(&a, &b).0, a);
        assert_eq!(cache.resolve(&b, &a).0, b);
        // Both orderings share one canonical cache entry.
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_reversed_query_hits_cache_consistently() {
        let mut cache = SolvedGames::new();
        let a = strat(&[3, 0, 2]);
        let b = strat(&[1, 2, 2]);
        let forward = cache.resolve(&a, &b);
        let reversed = cache.resolve(&b, &a);
        assert_eq!(cache.len(), 1);
        assert_eq!(forward.0, reversed.0);
        assert_eq!(forward.1, reversed.1);
    }

    #[test]
    fn test_cache_never_alters_the_answer() {
        let mut cache = SolvedGames::new();
        let a = strat(&[2, 1, 2]);
        let b = strat(&[0, 3, 2]);
        let first = cache.resolve(&a, &b);
        let second = cache.resolve(&a, &b);
        let fresh = SolvedGames::new().resolve(&a, &b);
        assert_eq!(first, second);
        assert_eq!(first, fresh);
    }
}
