//! polysim - entry point
//!
//! Loads a model description, runs the Gillespie simulation to the
//! configured end time, and exports species counts as CSV.

use anyhow::Result;
use polysim::{CountsExporter, Gillespie, ModelParameters, RunStatus, SimRng};

fn main() -> Result<()> {
    env_logger::init();
    log::info!("polysim starting...");

    let params = match std::env::args().nth(1) {
        Some(path) => ModelParameters::load_or_default(path),
        None => ModelParameters::default(),
    };
    log::info!(
        "Model loaded: genome {} ({} nt), {} genes",
        params.genome.name,
        params.genome.length,
        params.genes.len()
    );

    let (genome, reactions) = params.build()?;

    let rng = match params.simulation.seed {
        Some(seed) => SimRng::seeded(seed),
        None => SimRng::from_entropy(),
    };
    let mut sim = Gillespie::new(rng);
    for pool in params.polymerases.iter().chain(params.ribosomes.iter()) {
        sim.add_species(&pool.name, pool.copy_number);
    }
    sim.register_genome(genome)?;
    for reaction in reactions {
        sim.add_reaction(reaction);
    }

    let mut exporter = CountsExporter::new(params.simulation.sample_interval_sec, "exports")?;
    exporter.record(sim.time(), sim.tracker())?;

    while sim.time() < params.simulation.t_end_sec {
        if sim.step()? == RunStatus::Exhausted {
            break;
        }
        exporter.maybe_record(sim.time(), sim.tracker())?;
    }
    exporter.record(sim.time(), sim.tracker())?;

    let out = exporter.finish()?;
    log::info!(
        "Simulation finished: t = {:.3} s, {} steps, {} polymers, counts in {}",
        sim.time(),
        sim.step_count(),
        sim.polymer_count(),
        out.display()
    );
    Ok(())
}
