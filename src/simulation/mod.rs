//! Gillespie scheduler sequencing polymer executions across simulated time.
//!
//! The scheduler owns every polymer, the species tracker, and the RNG. Each
//! step samples one reaction channel out of two families with the direct
//! method:
//!
//! - species-level binding: a free polymerase finds an exposed binding site,
//!   with propensity `k_on * #free polymerases * #exposed sites`;
//! - polymer translocation: one channel per polymer, with propensity equal
//!   to the polymer's cached propensity sum.
//!
//! The waiting time to the next reaction is exponential in the total
//! propensity. After each step the scheduler drains the signal queues:
//! newly synthesised transcripts are initialized and registered, and
//! terminations return polymerases to their free pools.
//!
//! Reference: Gillespie DT. J Phys Chem. 1977;81:2340-2361

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::SimulationError;
use crate::polymer::{Genome, Polymerase, TerminationEvent, Transcript};
use crate::random::SimRng;
use crate::tracker::SpeciesTracker;

/// A registered polymer: the genome or one of its transcripts.
#[derive(Debug, Clone)]
pub enum SimPolymer {
    Genome(Rc<RefCell<Genome>>),
    Transcript(Rc<RefCell<Transcript>>),
}

impl SimPolymer {
    fn prop_sum(&self) -> f64 {
        match self {
            SimPolymer::Genome(genome) => genome.borrow().prop_sum(),
            SimPolymer::Transcript(transcript) => transcript.borrow().prop_sum(),
        }
    }

    fn uncovered_count(&self, species: &str) -> i64 {
        match self {
            SimPolymer::Genome(genome) => genome.borrow().polymer().uncovered_count(species),
            SimPolymer::Transcript(transcript) => {
                transcript.borrow().polymer().uncovered_count(species)
            }
        }
        .into()
    }

    fn execute(&self, rng: &mut SimRng) -> Result<(), SimulationError> {
        match self {
            SimPolymer::Genome(genome) => genome.borrow_mut().execute(rng),
            SimPolymer::Transcript(transcript) => transcript.borrow_mut().execute(rng),
        }
    }

    fn bind(
        &self,
        pol: Polymerase,
        promoter_name: &str,
        rng: &mut SimRng,
        tracker: &mut SpeciesTracker,
    ) -> Result<(), SimulationError> {
        match self {
            SimPolymer::Genome(genome) => {
                genome.borrow_mut().bind(pol, promoter_name, rng, tracker)
            }
            SimPolymer::Transcript(transcript) => transcript
                .borrow_mut()
                .bind(pol, promoter_name, rng, tracker)
                .map(|_| ()),
        }
    }

    fn take_species_log(&self) -> HashMap<String, i32> {
        match self {
            SimPolymer::Genome(genome) => genome.borrow_mut().polymer_mut().take_species_log(),
            SimPolymer::Transcript(transcript) => {
                transcript.borrow_mut().polymer_mut().take_species_log()
            }
        }
    }
}

/// A species-level binding reaction channel.
#[derive(Debug, Clone)]
pub struct BindingReaction {
    /// Polymerase species drawn from the free pool.
    pub pol_name: String,
    /// Binding-site species the polymerase binds.
    pub promoter_name: String,
    /// Binding constant `k_on`.
    pub rate_constant: f64,
    pub footprint: i64,
    pub speed: f64,
}

/// Outcome of a scheduler step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Active,
    /// Every reaction channel has zero propensity; the state is frozen.
    Exhausted,
}

/// The outer Gillespie scheduler.
pub struct Gillespie {
    time: f64,
    step_count: u64,
    rng: SimRng,
    tracker: SpeciesTracker,
    polymers: Vec<SimPolymer>,
    reactions: Vec<BindingReaction>,
    pending_transcripts: Rc<RefCell<Vec<Rc<RefCell<Transcript>>>>>,
    terminations: Rc<RefCell<Vec<TerminationEvent>>>,
}

impl Gillespie {
    pub fn new(rng: SimRng) -> Self {
        Self {
            time: 0.0,
            step_count: 0,
            rng,
            tracker: SpeciesTracker::new(),
            polymers: Vec::new(),
            reactions: Vec::new(),
            pending_transcripts: Rc::new(RefCell::new(Vec::new())),
            terminations: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Current simulated time in seconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn tracker(&self) -> &SpeciesTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut SpeciesTracker {
        &mut self.tracker
    }

    pub fn polymer_count(&self) -> usize {
        self.polymers.len()
    }

    /// Seed a free-species pool (polymerase or ribosome copy numbers).
    pub fn add_species(&mut self, name: &str, count: i64) {
        self.tracker.increment(name, count);
    }

    /// Register a binding reaction channel.
    pub fn add_reaction(&mut self, reaction: BindingReaction) {
        self.reactions.push(reaction);
    }

    /// Initialize a genome and take ownership of it.
    pub fn register_genome(&mut self, mut genome: Genome) -> Result<(), SimulationError> {
        genome.initialize()?;
        let index = self.polymers.len();
        genome.polymer_mut().set_index(index);

        // Seed the exposure pools from the freshly initialized state and
        // discard the deltas initialization logged; observation starts here.
        for (species, &count) in genome.polymer().uncovered_counts() {
            self.tracker.increment(species, count as i64);
        }
        genome.polymer_mut().take_species_log();

        let queue = self.terminations.clone();
        genome
            .polymer_mut()
            .termination_signal
            .connect(move |event| queue.borrow_mut().push(event.clone()));
        let pending = self.pending_transcripts.clone();
        genome
            .transcript_signal
            .connect(move |transcript| pending.borrow_mut().push(transcript.clone()));

        log::info!(
            "registered genome {} ([{}, {}]) as polymer {}",
            genome.polymer().name(),
            genome.polymer().start(),
            genome.polymer().stop(),
            index
        );
        self.polymers
            .push(SimPolymer::Genome(Rc::new(RefCell::new(genome))));
        Ok(())
    }

    /// Advance the simulation by one reaction. Returns `Exhausted` without
    /// advancing time when every channel has zero propensity.
    pub fn step(&mut self) -> Result<RunStatus, SimulationError> {
        let mut propensities = Vec::with_capacity(self.reactions.len() + self.polymers.len());
        for reaction in &self.reactions {
            let free = self.tracker.count(&reaction.pol_name) as f64;
            let exposed: i64 = self
                .polymers
                .iter()
                .map(|polymer| polymer.uncovered_count(&reaction.promoter_name))
                .sum();
            propensities.push(reaction.rate_constant * free * exposed as f64);
        }
        for polymer in &self.polymers {
            propensities.push(polymer.prop_sum());
        }

        let total: f64 = propensities.iter().sum();
        if total <= 0.0 {
            return Ok(RunStatus::Exhausted);
        }

        self.time += self.rng.exponential(total);
        let choice = self.rng.weighted_index(&propensities)?;
        if choice < self.reactions.len() {
            self.execute_binding(choice)?;
        } else {
            let polymer_index = choice - self.reactions.len();
            self.polymers[polymer_index].execute(&mut self.rng)?;
        }

        self.adopt_transcripts()?;
        self.settle_terminations();

        // Sweep every polymer's coverage deltas into the species pools.
        // A single sweep per step observes each delta exactly once, including
        // those produced on another polymer through a signal subscription.
        for polymer in &self.polymers {
            let log = polymer.take_species_log();
            self.tracker.apply_log(&log);
        }

        self.step_count += 1;
        Ok(RunStatus::Active)
    }

    /// Run steps until the given simulated time (or exhaustion).
    pub fn run_until(&mut self, t_end: f64) -> Result<RunStatus, SimulationError> {
        while self.time < t_end {
            if let RunStatus::Exhausted = self.step()? {
                log::info!(
                    "simulation exhausted at t = {:.6} s after {} steps",
                    self.time,
                    self.step_count
                );
                return Ok(RunStatus::Exhausted);
            }
        }
        Ok(RunStatus::Active)
    }

    /// Fire one binding reaction: pick the target polymer weighted by its
    /// exposed site count, then bind a fresh polymerase from the free pool.
    fn execute_binding(&mut self, reaction_index: usize) -> Result<(), SimulationError> {
        let reaction = self.reactions[reaction_index].clone();
        let weights: Vec<f64> = self
            .polymers
            .iter()
            .map(|polymer| polymer.uncovered_count(&reaction.promoter_name) as f64)
            .collect();
        let target = self.rng.weighted_index(&weights)?;

        let pol = Polymerase::new(&reaction.pol_name, reaction.footprint, reaction.speed);
        self.polymers[target].bind(pol, &reaction.promoter_name, &mut self.rng, &mut self.tracker)?;

        // The polymerase leaves its free pool; the covered site reaches the
        // tracker through the end-of-step log sweep.
        self.tracker.increment(&reaction.pol_name, -1);
        Ok(())
    }

    /// Register transcripts emitted during the last reaction.
    fn adopt_transcripts(&mut self) -> Result<(), SimulationError> {
        let pending: Vec<_> = self.pending_transcripts.borrow_mut().drain(..).collect();
        for transcript in pending {
            let index = self.polymers.len();
            {
                let mut inner = transcript.borrow_mut();
                inner.initialize()?;
                inner.polymer_mut().set_index(index);

                for (species, &count) in inner.polymer().uncovered_counts() {
                    self.tracker.increment(species, count as i64);
                }
                inner.polymer_mut().take_species_log();

                let queue = self.terminations.clone();
                inner
                    .polymer_mut()
                    .termination_signal
                    .connect(move |event| queue.borrow_mut().push(event.clone()));
            }
            log::debug!("adopted transcript as polymer {}", index);
            self.polymers.push(SimPolymer::Transcript(transcript));
        }
        Ok(())
    }

    /// Return terminated polymerases to their pools; a ribosome finishing a
    /// gene yields one protein and leaves the gene's ribosome load.
    fn settle_terminations(&mut self) {
        let events: Vec<_> = self.terminations.borrow_mut().drain(..).collect();
        for event in events {
            self.tracker.increment(&event.pol_name, 1);
            if let Some(SimPolymer::Transcript(_)) = self.polymers.get(event.polymer_index) {
                if !event.last_gene.is_empty() {
                    self.tracker.increment_protein(&event.last_gene, 1);
                    self.tracker.increment_ribo(&event.last_gene, -1);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn minimal_simulation() -> Gillespie {
        let mut genome = Genome::new("plasmid", 100);
        genome.add_promoter(
            "phi1",
            1,
            10,
            HashMap::from([("rnapol".to_string(), 0.5)]),
        );
        genome.add_terminator(
            "t1",
            60,
            61,
            HashMap::from([("rnapol".to_string(), 1.0)]),
        );

        let mut sim = Gillespie::new(SimRng::seeded(21));
        sim.add_species("rnapol", 1);
        sim.register_genome(genome).unwrap();
        sim.add_reaction(BindingReaction {
            pol_name: "rnapol".to_string(),
            promoter_name: "phi1".to_string(),
            rate_constant: 0.5,
            footprint: 10,
            speed: 40.0,
        });
        sim
    }

    #[test]
    fn test_first_step_binds() {
        let mut sim = minimal_simulation();
        assert_eq!(sim.step().unwrap(), RunStatus::Active);
        assert!(sim.time() > 0.0);
        // The only polymerase left its pool, a transcript was adopted.
        assert_eq!(sim.tracker().count("rnapol"), 0);
        assert_eq!(sim.polymer_count(), 2);
    }

    #[test]
    fn test_termination_returns_polymerase() {
        let mut sim = minimal_simulation();
        // Bind, walk to the terminator at [60, 61], terminate. The
        // polymerase needs ~52 moves; leave generous headroom.
        for _ in 0..500 {
            sim.step().unwrap();
            if sim.tracker().count("rnapol") == 1 && sim.step_count() > 1 {
                break;
            }
        }
        assert_eq!(sim.tracker().count("rnapol"), 1);
    }

    #[test]
    fn test_exhausted_without_reactions() {
        let mut sim = Gillespie::new(SimRng::seeded(3));
        let mut genome = Genome::new("plasmid", 100);
        genome.add_promoter(
            "phi1",
            1,
            10,
            HashMap::from([("rnapol".to_string(), 0.5)]),
        );
        sim.register_genome(genome).unwrap();
        assert_eq!(sim.step().unwrap(), RunStatus::Exhausted);
    }
}
