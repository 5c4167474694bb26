use crate::config::SimulationConfig;
use crate::engines::contest::SolvedGames;
use crate::engines::mutation::get_child;
use crate::error::{BlottoError, Result};
use crate::types::Strategy;
use log::{debug, info};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// One row of the append-only step history: the count a strategy held at a
/// given step. Each executed step appends one record per live map entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub step: u64,
    pub strategy: Strategy,
    pub count: u64,
}

/// The population of strategies being evolved.
///
/// Owns all mutable simulation state: the live multiset of strategies, the
/// cumulative lifetime-count table, the solved-games cache, the step
/// history, and the seedable random source. The total of the live counts is
/// invariant for the lifetime of a run; a strategy whose count reaches zero
/// stays in the map (extinct, as opposed to never having existed).
pub struct Population {
    pub(crate) strategies: HashMap<Strategy, u64>,
    pub(crate) cumulative: HashMap<Strategy, u64>,
    pub(crate) solved_games: SolvedGames,
    pub(crate) history: Vec<StepRecord>,
    pub(crate) size: u64,
    pub(crate) num_locations: usize,
    pub(crate) num_forces: u32,
    pub(crate) current_step: u64,
    pub(crate) rng: StdRng,
}

impl Population {
    /// Create a fresh population: either `population_size` random
    /// strategies, or the uniformly weak seed at full multiplicity.
    pub fn create(config: &SimulationConfig) -> Result<Self> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut strategies: HashMap<Strategy, u64> = HashMap::new();
        if config.random_population {
            for _ in 0..config.population_size {
                let strat = Strategy::random(config.num_locations, config.num_forces, &mut rng);
                *strategies.entry(strat).or_insert(0) += 1;
            }
        } else {
            strategies.insert(
                Strategy::uniform_weak(config.num_locations, config.num_forces),
                config.population_size,
            );
        }

        let cumulative = strategies.clone();
        let history = strategies
            .iter()
            .map(|(strat, &count)| StepRecord {
                step: 0,
                strategy: strat.clone(),
                count,
            })
            .collect();

        let population =
            Self::from_parts(strategies, cumulative, SolvedGames::new(), history, rng)?;
        info!(
            "created population {} with {} distinct strategies",
            population.save_name(),
            population.strategies.len()
        );
        Ok(population)
    }

    /// Assemble a population from already-validated parts. Shared by
    /// `create` and checkpoint restoration.
    pub(crate) fn from_parts(
        strategies: HashMap<Strategy, u64>,
        cumulative: HashMap<Strategy, u64>,
        solved_games: SolvedGames,
        history: Vec<StepRecord>,
        rng: StdRng,
    ) -> Result<Self> {
        let (num_locations, num_forces) = match strategies.keys().next() {
            Some(strat) => (strat.len(), strat.forces() as u32),
            None => {
                return Err(BlottoError::CorruptState(
                    "population holds no strategies".to_string(),
                ))
            }
        };
        let size: u64 = strategies.values().sum();
        if size == 0 {
            return Err(BlottoError::CorruptState(
                "population has no live members".to_string(),
            ));
        }
        let current_step = history.iter().map(|record| record.step).max().unwrap_or(0);

        Ok(Self {
            strategies,
            cumulative,
            solved_games,
            history,
            size,
            num_locations,
            num_forces,
            current_step,
            rng,
        })
    }

    /// Execute one simulation step: sample a weighted pair, resolve the
    /// contest, apply the stabilization gate every tenth step, replace the
    /// loser with a mutated child of the winner, and log the distribution.
    pub fn step(&mut self, mutability: f64) -> Result<()> {
        self.current_step += 1;

        let (first, second) = self.sample_pair();
        let (winner, loser) = self.solved_games.resolve(&first, &second);

        if self.current_step % 10 == 0 && self.is_over_represented(&winner) {
            debug!(
                "step {}: stabilization gate suppressed {}",
                self.current_step, winner
            );
        } else {
            let loser_count = self
                .strategies
                .get_mut(&loser)
                .filter(|count| **count > 0)
                .unwrap_or_else(|| {
                    // Both contestants were sampled with positive weight, so
                    // a missing or zero loser count is a logic bug.
                    panic!("population invariant violated: loser {} has no live copies", loser)
                });
            *loser_count -= 1;

            let child = get_child(&winner, mutability, &mut self.rng)?;
            *self.strategies.entry(child.clone()).or_insert(0) += 1;
            *self.cumulative.entry(child).or_insert(0) += 1;
        }

        self.log_distribution();
        Ok(())
    }

    /// Run the simulation, checkpointing to `artifact_dir` every
    /// `steps_between_checkpoints` steps (a value <= 0 checkpoints only at
    /// the end of the call).
    ///
    /// `step_limit` bounds the steps executed by this call; 0 means one
    /// checkpoint interval, after which control returns to the driver. A
    /// call that could never return is rejected up front.
    pub fn run<P: AsRef<Path>>(
        &mut self,
        mutability: f64,
        steps_between_checkpoints: i64,
        step_limit: u64,
        artifact_dir: P,
    ) -> Result<()> {
        if step_limit == 0 && steps_between_checkpoints <= 0 {
            return Err(BlottoError::InvalidConfiguration(
                "step_limit 0 requires a positive checkpoint interval".to_string(),
            ));
        }

        let dir = artifact_dir.as_ref();
        let mut steps_in_this_run: u64 = 0;
        let mut steps_since_checkpoint: i64 = 0;
        loop {
            self.step(mutability)?;
            steps_in_this_run += 1;
            steps_since_checkpoint += 1;

            if steps_between_checkpoints > 0 && steps_since_checkpoint == steps_between_checkpoints
            {
                self.save(dir)?;
                steps_since_checkpoint = 0;
                if step_limit == 0 {
                    break;
                }
            }
            if step_limit > 0 && steps_in_this_run >= step_limit {
                break;
            }
        }
        // The counter is only zero right after an in-loop checkpoint.
        if steps_since_checkpoint != 0 {
            self.save(dir)?;
        }

        info!(
            "ran {} steps, now at step {} with {} distinct strategies ({} solved games)",
            steps_in_this_run,
            self.current_step,
            self.strategies.len(),
            self.solved_games.len()
        );
        Ok(())
    }

    fn sample_pair(&mut self) -> (Strategy, Strategy) {
        // Map iteration order varies per instance; sort the candidates so a
        // seeded draw always lands on the same strategy.
        let mut strategies: Vec<&Strategy> = self.strategies.keys().collect();
        strategies.sort_unstable();
        let weights: Vec<u64> = strategies.iter().map(|strat| self.strategies[*strat]).collect();
        // The live counts always total `size` > 0, so the distribution is
        // well formed; anything else is a fatal bookkeeping bug.
        let weighted = WeightedIndex::new(&weights)
            .expect("population counts must sum to a positive total");
        let first = strategies[weighted.sample(&mut self.rng)].clone();
        let second = strategies[weighted.sample(&mut self.rng)].clone();
        (first, second)
    }

    /// The stabilization correction: is the winner's share of the live
    /// population strictly above its share of all strategies ever produced?
    fn is_over_represented(&self, winner: &Strategy) -> bool {
        let current_prevalence =
            self.strategies.get(winner).copied().unwrap_or(0) as f64 / self.size as f64;
        let cumulative_total: u64 = self.cumulative.values().sum();
        let historic_prevalence =
            self.cumulative.get(winner).copied().unwrap_or(0) as f64 / cumulative_total as f64;
        current_prevalence > historic_prevalence
    }

    fn log_distribution(&mut self) {
        let step = self.current_step;
        let batch: Vec<StepRecord> = self
            .strategies
            .iter()
            .map(|(strat, &count)| StepRecord {
                step,
                strategy: strat.clone(),
                count,
            })
            .collect();
        self.history.extend(batch);
    }

    /// The latest live distribution, for the reporting collaborator.
    pub fn distribution(&self) -> &HashMap<Strategy, u64> {
        &self.strategies
    }

    pub fn current_step(&self) -> u64 {
        self.current_step
    }

    /// Total live count; constant for the lifetime of the run.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn num_locations(&self) -> usize {
        self.num_locations
    }

    pub fn num_forces(&self) -> u32 {
        self.num_forces
    }

    pub fn history(&self) -> &[StepRecord] {
        &self.history
    }

    /// Shared stem of the checkpoint artifact pair.
    pub fn save_name(&self) -> String {
        format!("l{}f{}s{}", self.num_locations, self.num_forces, self.size)
    }
}

impl fmt::Display for Population {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rows: Vec<(&Strategy, u64)> =
            self.strategies.iter().map(|(strat, &count)| (strat, count)).collect();
        rows.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));

        writeln!(f, "Population at step {}:", self.current_step)?;
        for (strat, count) in rows {
            writeln!(f, "{:>8}  {}", count, strat)?;
        }
        Ok(())
    }
}
