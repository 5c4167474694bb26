use crate::error::{BlottoError, Result};
use crate::types::Strategy;
use rand::Rng;

/// Move a single force unit between two distinct locations: the source is
/// chosen uniformly among locations holding a positive count, the
/// destination uniformly among the rest.
///
/// Fails fast with `UnmutableStrategy` when no valid transfer exists
/// (fewer than two locations, or an all-zero vector).
pub fn mutate_once<R: Rng>(strategy: &Strategy, rng: &mut R) -> Result<Strategy> {
    if strategy.len() < 2 {
        return Err(BlottoError::UnmutableStrategy(
            "at least two locations are needed to transfer a unit".to_string(),
        ));
    }
    let sources: Vec<usize> = strategy
        .entries()
        .iter()
        .enumerate()
        .filter(|(_, &count)| count > 0)
        .map(|(i, _)| i)
        .collect();
    if sources.is_empty() {
        return Err(BlottoError::UnmutableStrategy(
            "no location holds a positive force count".to_string(),
        ));
    }

    let source = sources[rng.gen_range(0..sources.len())];
    let mut destination = rng.gen_range(0..strategy.len() - 1);
    if destination >= source {
        destination += 1;
    }

    let mut entries = strategy.entries().to_vec();
    entries[source] -= 1;
    entries[destination] += 1;
    Ok(Strategy::new(entries))
}

/// Produce an offspring of `parent`, applying between zero and many
/// elementary mutations.
///
/// A single uniform draw `u` in `[0, 1)` is compared against the decaying
/// thresholds `mutability * 0.5^k`: as long as `u` is below the threshold,
/// one more mutation is applied. The mutation count is therefore a
/// deterministic function of that one draw, not a run of independent
/// Bernoulli trials; both behave the same marginally but the single-draw
/// form is the reproducibility contract.
pub fn get_child<R: Rng>(parent: &Strategy, mutability: f64, rng: &mut R) -> Result<Strategy> {
    let draw: f64 = rng.gen();
    let mut child = parent.clone();
    let mut mutations = 0;
    while draw < mutability * 0.5f64.powi(mutations) {
        child = mutate_once(&child, rng)?;
        mutations += 1;
    }
    Ok(child)
}
