use crate::engines::contest::{point_advantage, SolvedGames};
use crate::engines::population::{Population, StepRecord};
use crate::error::{BlottoError, Result};
use crate::types::{decode_pair, encode_pair, Strategy};
use log::info;
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

/// The keyed aggregate artifact: every map key is an encoded strategy (or
/// encoded strategy pair), since the composite keys are not natively
/// serializable.
#[derive(Debug, Serialize, Deserialize)]
struct AggregateState {
    strategies: HashMap<String, u64>,
    cumulative_strategies: HashMap<String, u64>,
    solved_games: HashMap<String, String>,
}

/// Paths of the checkpoint artifact pair for a given save name.
pub fn artifact_paths(dir: &Path, name: &str) -> (PathBuf, PathBuf) {
    (
        dir.join(format!("{}.csv", name)),
        dir.join(format!("{}.json", name)),
    )
}

pub fn artifacts_exist(dir: &Path, name: &str) -> bool {
    let (csv_path, json_path) = artifact_paths(dir, name);
    csv_path.exists() && json_path.exists()
}

impl Population {
    /// Checkpoint the population: the full step history as a tabular CSV
    /// artifact and the aggregate state as a JSON artifact, both rewritten
    /// under the shared `l{locations}f{forces}s{size}` name.
    pub fn save<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        let (csv_path, json_path) = artifact_paths(dir, &self.save_name());

        let steps: Vec<i64> = self.history.iter().map(|r| r.step as i64).collect();
        let strats: Vec<String> = self.history.iter().map(|r| r.strategy.encode()).collect();
        let counts: Vec<i64> = self.history.iter().map(|r| r.count as i64).collect();
        let mut frame = df! {
            "step" => steps,
            "strat" => strats,
            "count" => counts,
        }?;
        let mut file = File::create(&csv_path)?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut frame)?;

        let state = AggregateState {
            strategies: self
                .strategies
                .iter()
                .map(|(strat, &count)| (strat.encode(), count))
                .collect(),
            cumulative_strategies: self
                .cumulative
                .iter()
                .map(|(strat, &count)| (strat.encode(), count))
                .collect(),
            solved_games: self
                .solved_games
                .iter()
                .map(|((lo, hi), &advantage)| {
                    let outcome = if advantage >= 0 {
                        encode_pair(lo, hi)
                    } else {
                        encode_pair(hi, lo)
                    };
                    (encode_pair(lo, hi), outcome)
                })
                .collect(),
        };
        std::fs::write(&json_path, serde_json::to_string(&state)?)?;

        info!(
            "checkpointed {} at step {} ({} history rows)",
            self.save_name(),
            self.current_step,
            self.history.len()
        );
        Ok(())
    }

    /// Restore a population from the artifact pair written by [`save`],
    /// resuming from the maximum step in the history artifact.
    ///
    /// [`save`]: Population::save
    pub fn load<P: AsRef<Path>>(dir: P, name: &str, seed: Option<u64>) -> Result<Population> {
        let dir = dir.as_ref();
        let (csv_path, json_path) = artifact_paths(dir, name);

        let contents = std::fs::read_to_string(&json_path)?;
        let state: AggregateState = serde_json::from_str(&contents)?;

        let strategies = decode_count_map(&state.strategies)?;
        let (num_locations, num_forces) = match strategies.keys().next() {
            Some(strat) => (strat.len(), strat.forces()),
            None => {
                return Err(BlottoError::CorruptState(
                    "aggregate artifact holds no strategies".to_string(),
                ))
            }
        };
        for strat in strategies.keys() {
            check_shape(strat, num_locations, num_forces, "live")?;
        }

        let cumulative = decode_count_map(&state.cumulative_strategies)?;
        for strat in cumulative.keys() {
            check_shape(strat, num_locations, num_forces, "cumulative")?;
        }

        let mut solved_games = SolvedGames::new();
        for (key, value) in &state.solved_games {
            let (a, b) = decode_pair(key)?;
            check_shape(&a, num_locations, num_forces, "solved-game")?;
            check_shape(&b, num_locations, num_forces, "solved-game")?;
            let advantage = point_advantage(&a, &b);
            let expected = if advantage >= 0 {
                encode_pair(&a, &b)
            } else {
                encode_pair(&b, &a)
            };
            if *value != expected {
                return Err(BlottoError::CorruptState(format!(
                    "recorded outcome '{}' for game '{}' disagrees with its point advantage",
                    value, key
                )));
            }
            solved_games.record(a, b, advantage);
        }

        let history = load_history(&csv_path, num_locations, num_forces)?;

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let population = Population::from_parts(strategies, cumulative, solved_games, history, rng)?;
        if population.save_name() != name {
            return Err(BlottoError::CorruptState(format!(
                "artifacts named '{}' describe population '{}'",
                name,
                population.save_name()
            )));
        }
        info!(
            "restored {} at step {}",
            population.save_name(),
            population.current_step()
        );
        Ok(population)
    }
}

fn decode_count_map(raw: &HashMap<String, u64>) -> Result<HashMap<Strategy, u64>> {
    raw.iter()
        .map(|(key, &count)| Ok((Strategy::decode(key)?, count)))
        .collect()
}

fn check_shape(
    strategy: &Strategy,
    num_locations: usize,
    num_forces: u64,
    context: &str,
) -> Result<()> {
    if strategy.len() != num_locations || strategy.forces() != num_forces {
        return Err(BlottoError::CorruptState(format!(
            "{} strategy '{}' does not fit l{}f{}",
            context,
            strategy.encode(),
            num_locations,
            num_forces
        )));
    }
    Ok(())
}

fn load_history(csv_path: &Path, num_locations: usize, num_forces: u64) -> Result<Vec<StepRecord>> {
    let frame = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(csv_path.to_path_buf()))?
        .finish()?;

    let step_col = frame.column("step")?.cast(&DataType::Int64)?;
    let steps = step_col.i64()?;
    let strat_col = frame.column("strat")?;
    let strats = strat_col.str()?;
    let count_col = frame.column("count")?.cast(&DataType::Int64)?;
    let counts = count_col.i64()?;

    let mut history = Vec::with_capacity(frame.height());
    for i in 0..frame.height() {
        let step = steps
            .get(i)
            .filter(|&step| step >= 0)
            .ok_or_else(|| row_error("step", i))?;
        let encoded = strats.get(i).ok_or_else(|| row_error("strat", i))?;
        let count = counts
            .get(i)
            .filter(|&count| count >= 0)
            .ok_or_else(|| row_error("count", i))?;

        let strategy = Strategy::decode(encoded)?;
        check_shape(&strategy, num_locations, num_forces, "history")?;
        history.push(StepRecord {
            step: step as u64,
            strategy,
            count: count as u64,
        });
    }
    if history.is_empty() {
        return Err(BlottoError::CorruptState(
            "history artifact holds no rows".to_string(),
        ));
    }
    Ok(history)
}

fn row_error(column: &str, row: usize) -> BlottoError {
    BlottoError::CorruptState(format!(
        "history artifact has a missing or negative '{}' value at row {}",
        column, row
    ))
}
