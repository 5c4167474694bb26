use crate::error::{BlottoError, Result};
use rand::Rng;
use std::fmt;

/// An allocation vector for the General's game.
///
/// One entry per location, where location `i` (1-based) is worth `i` points
/// to whichever side strictly out-allocates the other there. The entries are
/// non-negative force counts summing to the total force pool.
///
/// Strategies are immutable value objects: equality and hashing are
/// structural, so two strategies with identical entries are the same map key.
/// The `Ord` impl exists so a pair of strategies can be put into a canonical
/// order (see the solved-games cache).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Strategy(Vec<u32>);

impl Strategy {
    pub fn new(entries: Vec<u32>) -> Self {
        Strategy(entries)
    }

    /// The "uniformly weak" seed strategy: every force piled on the
    /// least valuable location.
    pub fn uniform_weak(num_locations: usize, num_forces: u32) -> Self {
        let mut entries = vec![0; num_locations];
        entries[0] = num_forces;
        Strategy(entries)
    }

    /// Draw a random strategy with the cut-mark generator: `L - 1` uniform
    /// marks in `[0, F)`, sorted, consecutive differences as bin sizes, the
    /// last bin taking the remainder.
    ///
    /// This is a biased approximation of uniform composition sampling
    /// (duplicate marks push entries toward zero); only the length and sum
    /// invariants are guaranteed.
    pub fn random<R: Rng>(num_locations: usize, num_forces: u32, rng: &mut R) -> Self {
        assert!(num_locations >= 1, "a strategy needs at least one location");
        if num_forces == 0 {
            return Strategy(vec![0; num_locations]);
        }
        if num_locations <= 1 {
            return Strategy(vec![num_forces]);
        }
        let mut marks: Vec<u32> = (0..num_locations - 1)
            .map(|_| rng.gen_range(0..num_forces))
            .collect();
        marks.sort_unstable();

        let mut entries = Vec::with_capacity(num_locations);
        let mut last_mark = 0;
        for mark in marks {
            entries.push(mark - last_mark);
            last_mark = mark;
        }
        entries.push(num_forces - last_mark);
        Strategy(entries)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total force units allocated across all locations.
    pub fn forces(&self) -> u64 {
        self.0.iter().map(|&v| v as u64).sum()
    }

    pub fn entries(&self) -> &[u32] {
        &self.0
    }

    /// Comma-joined decimal form, used as a map key in persisted state.
    pub fn encode(&self) -> String {
        self.0
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Inverse of [`Strategy::encode`]. Anything that does not parse back
    /// into a valid entry list is corrupt persisted state.
    pub fn decode(encoded: &str) -> Result<Self> {
        let entries = encoded
            .split(',')
            .map(|part| {
                part.trim().parse::<u32>().map_err(|_| {
                    BlottoError::CorruptState(format!(
                        "invalid strategy entry '{}' in '{}'",
                        part, encoded
                    ))
                })
            })
            .collect::<Result<Vec<u32>>>()?;
        Ok(Strategy(entries))
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.encode())
    }
}

/// Encode an ordered pair of strategies as a cache key: the two encoded
/// strategies joined by a single space.
pub fn encode_pair(a: &Strategy, b: &Strategy) -> String {
    format!("{} {}", a.encode(), b.encode())
}

/// Inverse of [`encode_pair`]; requires exactly two components.
pub fn decode_pair(encoded: &str) -> Result<(Strategy, Strategy)> {
    let parts: Vec<&str> = encoded.split_whitespace().collect();
    if parts.len() != 2 {
        return Err(BlottoError::CorruptState(format!(
            "expected an encoded strategy pair, got '{}'",
            encoded
        )));
    }
    Ok((Strategy::decode(parts[0])?, Strategy::decode(parts[1])?))
}
