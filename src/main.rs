use anyhow::Result;
use blotto_evolver::persistence;
use blotto_evolver::{Population, SimulationConfig};
use log::info;
use std::path::PathBuf;

/// Console driver for the evolutionary engine: loads a TOML configuration,
/// resumes from existing checkpoint artifacts when present, runs one bounded
/// batch of steps, and prints the resulting population report.
fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => SimulationConfig::load_from_file(path)?,
        None => SimulationConfig::default(),
    };
    let artifact_dir = PathBuf::from(args.next().unwrap_or_else(|| ".".to_string()));

    let name = config.save_name();
    let mut population = if persistence::artifacts_exist(&artifact_dir, &name) {
        info!("resuming {} from {}", name, artifact_dir.display());
        Population::load(&artifact_dir, &name, config.seed)?
    } else {
        Population::create(&config)?
    };

    population.run(
        config.mutability,
        config.steps_between_checkpoints,
        config.step_limit,
        &artifact_dir,
    )?;

    print!("{}", population);
    Ok(())
}
