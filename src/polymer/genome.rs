//! The DNA polymer and transcript templating.
//!
//! A genome is a polymer that additionally knows which ribosome binding
//! sites and stop codons the transcript synthesised from any region will
//! carry. Each successful RNA polymerase binding builds a nascent
//! [`Transcript`] covering the downstream region and emits it to the
//! scheduler through `transcript_signal`; the polymerase's move signal then
//! pulls the transcript's mask back one nucleotide per advance.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::SimulationError;
use crate::interval::{Interval, IntervalIndex};
use crate::polymer::{BindingSite, Mask, Polymer, Polymerase, ReleaseSite, Transcript};
use crate::random::SimRng;
use crate::signal::Signal;
use crate::tracker::SpeciesTracker;

/// The DNA polymer.
#[derive(Debug)]
pub struct Genome {
    polymer: Polymer,
    /// Template sites cloned onto every transcript that spans them.
    transcript_rbs: Vec<BindingSite>,
    transcript_stop_sites: Vec<ReleaseSite>,
    transcript_rbs_index: IntervalIndex<usize>,
    transcript_stop_index: IntervalIndex<usize>,
    transcript_weights: Vec<f64>,
    /// Binding-site species registered on this genome and its transcripts,
    /// by name; the scheduler derives its binding reactions from this.
    bindings: HashMap<String, HashMap<String, f64>>,
    /// Emits each newly synthesised transcript to the scheduler.
    pub transcript_signal: Signal<Rc<RefCell<Transcript>>>,
}

impl Genome {
    /// Create a genome of the given length, spanning `[1, length]`.
    pub fn new(name: &str, length: i64) -> Self {
        Self {
            polymer: Polymer::new(name, 1, length),
            transcript_rbs: Vec::new(),
            transcript_stop_sites: Vec::new(),
            transcript_rbs_index: IntervalIndex::default(),
            transcript_stop_index: IntervalIndex::default(),
            transcript_weights: vec![1.0; length as usize],
            bindings: HashMap::new(),
            transcript_signal: Signal::new(),
        }
    }

    /// Mask the genome from `start` to its end. Polymerase species listed in
    /// `interactions` may push the mask back (e.g. a helicase-coupled
    /// polymerase entering not-yet-unwound DNA).
    pub fn add_mask(&mut self, start: i64, interactions: &[String]) {
        let table: HashMap<String, f64> = interactions
            .iter()
            .map(|name| (name.clone(), 1.0))
            .collect();
        let stop = self.polymer.stop();
        self.polymer.set_mask(Mask::new(start, stop, table));
    }

    /// Register a promoter on the DNA.
    pub fn add_promoter(
        &mut self,
        name: &str,
        start: i64,
        stop: i64,
        interactions: HashMap<String, f64>,
    ) {
        self.polymer
            .add_binding_site(BindingSite::new(name, start, stop, interactions.clone()));
        self.bindings.insert(name.to_string(), interactions);
    }

    /// Register a terminator on the DNA.
    pub fn add_terminator(
        &mut self,
        name: &str,
        start: i64,
        stop: i64,
        efficiency: HashMap<String, f64>,
    ) {
        self.polymer
            .add_release_site(ReleaseSite::new(name, start, stop, efficiency));
    }

    /// Register a gene: creates the ribosome binding site (`<name>_rbs`) and
    /// the frame-specific stop codon that transcripts of this region carry.
    pub fn add_gene(
        &mut self,
        name: &str,
        start: i64,
        stop: i64,
        rbs_start: i64,
        rbs_stop: i64,
        rbs_strength: f64,
    ) {
        let binding = HashMap::from([("ribosome".to_string(), rbs_strength)]);
        let term = HashMap::from([("ribosome".to_string(), 1.0)]);

        let rbs_name = format!("{}_rbs", name);
        let mut rbs = BindingSite::new(&rbs_name, rbs_start, rbs_stop, binding.clone());
        rbs.set_gene(name);
        self.transcript_rbs.push(rbs);
        self.bindings.insert(rbs_name, binding);

        let mut stop_codon = ReleaseSite::new("stop_codon", stop - 1, stop, term);
        stop_codon.set_reading_frame(Some((start % 3) as u8));
        stop_codon.set_gene(name);
        self.transcript_stop_sites.push(stop_codon);
    }

    /// Position-dependent translocation weights applied to every transcript
    /// (e.g. codon usage); the vector must span the genome.
    pub fn add_weights(&mut self, weights: Vec<f64>) -> Result<(), SimulationError> {
        let expected = (self.polymer.stop() - self.polymer.start() + 1) as usize;
        if weights.len() != expected {
            return Err(SimulationError::WeightsMismatch {
                expected,
                actual: weights.len(),
            });
        }
        self.transcript_weights = weights;
        Ok(())
    }

    /// Registered binding-site species and their interaction tables.
    pub fn bindings(&self) -> &HashMap<String, HashMap<String, f64>> {
        &self.bindings
    }

    /// Build the DNA interval indices plus the transcript template indices.
    pub fn initialize(&mut self) -> Result<(), SimulationError> {
        self.polymer.initialize()?;
        self.transcript_rbs_index = IntervalIndex::new(
            self.transcript_rbs
                .iter()
                .enumerate()
                .map(|(handle, site)| Interval::new(site.start(), site.stop(), handle))
                .collect(),
        );
        self.transcript_stop_index = IntervalIndex::new(
            self.transcript_stop_sites
                .iter()
                .enumerate()
                .map(|(handle, site)| Interval::new(site.start(), site.stop(), handle))
                .collect(),
        );
        Ok(())
    }

    /// Bind an RNA polymerase, synthesise the nascent transcript for the
    /// downstream region, and emit it to the scheduler. The polymerase's
    /// move signal pulls the transcript's mask; the subscription holds a
    /// weak handle so a retired transcript degrades to a no-op.
    pub fn bind(
        &mut self,
        pol: Polymerase,
        promoter_name: &str,
        rng: &mut SimRng,
        tracker: &mut SpeciesTracker,
    ) -> Result<(), SimulationError> {
        let index = self.polymer.bind(pol, promoter_name, rng, tracker)?;
        let pol_stop = self.polymer.polymerases[index].stop();

        let transcript = Rc::new(RefCell::new(
            self.build_transcript(pol_stop, self.polymer.stop())?,
        ));
        let weak = Rc::downgrade(&transcript);
        self.polymer.polymerases[index]
            .move_signal
            .connect(move |_| {
                if let Some(transcript) = weak.upgrade() {
                    transcript.borrow_mut().shift_mask();
                }
            });

        log::debug!(
            "transcript spawned behind {} on {}",
            self.polymer.polymerases[index].name(),
            self.polymer.name()
        );
        self.transcript_signal.emit(&transcript);
        Ok(())
    }

    /// Construct a transcript whose exposed region is `[start, stop]` as
    /// synthesis begins. Template sites contained in that region are cloned
    /// so each transcript covers independently.
    fn build_transcript(&self, start: i64, stop: i64) -> Result<Transcript, SimulationError> {
        let mut polymer = Polymer::new("rna", self.polymer.start(), self.polymer.stop());
        for handle in self.transcript_rbs_index.find_contained(start, stop) {
            polymer.add_binding_site(self.transcript_rbs[handle].clone_detached());
        }
        for handle in self.transcript_stop_index.find_contained(start, stop) {
            polymer.add_release_site(self.transcript_stop_sites[handle].clone_detached());
        }
        polymer.set_mask(Mask::new(start, stop, HashMap::new()));
        polymer.set_weights(self.transcript_weights.clone())?;
        Ok(Transcript::new(polymer))
    }

    pub fn execute(&mut self, rng: &mut SimRng) -> Result<(), SimulationError> {
        self.polymer.execute(rng)
    }

    pub fn shift_mask(&mut self) {
        self.polymer.shift_mask();
    }

    pub fn prop_sum(&self) -> f64 {
        self.polymer.prop_sum()
    }

    pub fn polymer(&self) -> &Polymer {
        &self.polymer
    }

    pub fn polymer_mut(&mut self) -> &mut Polymer {
        &mut self.polymer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_genome() -> Genome {
        let mut genome = Genome::new("plasmid", 300);
        genome.add_promoter(
            "phi1",
            1,
            10,
            HashMap::from([("rnapol".to_string(), 1.0)]),
        );
        genome.add_gene("proteinX", 50, 200, 35, 50, 1.0);
        genome.add_terminator("t1", 280, 281, HashMap::from([("rnapol".to_string(), 1.0)]));
        genome.initialize().unwrap();
        genome
    }

    #[test]
    fn test_bind_emits_transcript() {
        let mut genome = demo_genome();
        let captured: Rc<RefCell<Vec<Rc<RefCell<Transcript>>>>> =
            Rc::new(RefCell::new(Vec::new()));
        let sink = captured.clone();
        genome
            .transcript_signal
            .connect(move |t| sink.borrow_mut().push(t.clone()));

        let mut rng = SimRng::seeded(9);
        let mut tracker = SpeciesTracker::new();
        genome
            .bind(
                Polymerase::new("rnapol", 10, 40.0),
                "phi1",
                &mut rng,
                &mut tracker,
            )
            .unwrap();

        let transcripts = captured.borrow();
        assert_eq!(transcripts.len(), 1);
        let transcript = transcripts[0].borrow();
        assert_eq!(transcript.polymer().start(), 1);
        assert_eq!(transcript.polymer().stop(), 300);
        // The mask begins at the polymerase front: nothing past position 10
        // has been synthesised yet.
        assert_eq!(transcript.polymer().mask().start(), 10);
        assert_eq!(transcript.polymer().mask().stop(), 300);
    }

    #[test]
    fn test_transcript_carries_cloned_template_sites() {
        let mut genome = demo_genome();
        let captured: Rc<RefCell<Vec<Rc<RefCell<Transcript>>>>> =
            Rc::new(RefCell::new(Vec::new()));
        let sink = captured.clone();
        genome
            .transcript_signal
            .connect(move |t| sink.borrow_mut().push(t.clone()));

        let mut rng = SimRng::seeded(9);
        let mut tracker = SpeciesTracker::new();
        genome
            .bind(
                Polymerase::new("rnapol", 10, 40.0),
                "phi1",
                &mut rng,
                &mut tracker,
            )
            .unwrap();

        let transcripts = captured.borrow();
        let mut transcript = transcripts[0].borrow_mut();
        transcript.initialize().unwrap();
        // The RBS is present but still under the mask.
        assert_eq!(transcript.polymer().uncovered_count("proteinX_rbs"), 0);
    }

    #[test]
    fn test_move_signal_pulls_transcript_mask() {
        let mut genome = demo_genome();
        let captured: Rc<RefCell<Vec<Rc<RefCell<Transcript>>>>> =
            Rc::new(RefCell::new(Vec::new()));
        let sink = captured.clone();
        genome
            .transcript_signal
            .connect(move |t| sink.borrow_mut().push(t.clone()));

        let mut rng = SimRng::seeded(9);
        let mut tracker = SpeciesTracker::new();
        genome
            .bind(
                Polymerase::new("rnapol", 10, 40.0),
                "phi1",
                &mut rng,
                &mut tracker,
            )
            .unwrap();
        let transcript = captured.borrow()[0].clone();
        transcript.borrow_mut().initialize().unwrap();

        // 41 advances expose [10, 51): the RBS spanning [35, 50] becomes
        // fully exposed and available for ribosome binding.
        for _ in 0..41 {
            genome.execute(&mut rng).unwrap();
        }
        assert_eq!(transcript.borrow().polymer().mask().start(), 51);
        assert_eq!(
            transcript.borrow().polymer().uncovered_count("proteinX_rbs"),
            1
        );
    }

    #[test]
    fn test_retired_transcript_is_tolerated() {
        let mut genome = demo_genome();
        let mut rng = SimRng::seeded(9);
        let mut tracker = SpeciesTracker::new();
        // No subscriber keeps the transcript alive: the Rc emitted by bind
        // dies immediately, leaving a dangling move-signal subscription.
        genome
            .bind(
                Polymerase::new("rnapol", 10, 40.0),
                "phi1",
                &mut rng,
                &mut tracker,
            )
            .unwrap();

        for _ in 0..10 {
            genome.execute(&mut rng).unwrap();
        }
        assert_eq!(genome.polymer().polymerases()[0].start(), 11);
    }

    #[test]
    fn test_add_weights_length_checked() {
        let mut genome = Genome::new("plasmid", 300);
        assert!(genome.add_weights(vec![1.0; 299]).is_err());
        assert!(genome.add_weights(vec![1.0; 300]).is_ok());
    }
}
