//! Nascent transcripts.
//!
//! A transcript is a polymer whose binding sites are ribosome binding sites
//! and whose release sites are stop codons. It is created by a [`Genome`]
//! during transcription and exposed nucleotide by nucleotide: the upstream
//! RNA polymerase's move signal pulls the transcript's mask back one
//! position per advance.
//!
//! [`Genome`]: crate::polymer::Genome

use crate::error::SimulationError;
use crate::polymer::{Polymer, Polymerase};
use crate::random::SimRng;
use crate::tracker::SpeciesTracker;

/// An RNA polymer synthesised from a genome.
#[derive(Debug)]
pub struct Transcript {
    polymer: Polymer,
}

impl Transcript {
    pub(crate) fn new(polymer: Polymer) -> Self {
        Self { polymer }
    }

    /// Bind a ribosome and assign its reading frame from the binding
    /// position (`start mod 3`).
    pub fn bind(
        &mut self,
        pol: Polymerase,
        rbs_name: &str,
        rng: &mut SimRng,
        tracker: &mut SpeciesTracker,
    ) -> Result<usize, SimulationError> {
        let index = self.polymer.bind(pol, rbs_name, rng, tracker)?;
        let frame = (self.polymer.polymerases[index].start() % 3) as u8;
        self.polymer.polymerases[index].set_reading_frame(Some(frame));
        Ok(index)
    }

    pub fn initialize(&mut self) -> Result<(), SimulationError> {
        self.polymer.initialize()
    }

    pub fn execute(&mut self, rng: &mut SimRng) -> Result<(), SimulationError> {
        self.polymer.execute(rng)
    }

    /// Expose one more synthesised nucleotide. Connected to the upstream
    /// polymerase's move signal.
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
    use crate::polymer::{BindingSite, Mask, ReleaseSite};
    use std::collections::HashMap;

    fn transcript() -> Transcript {
        // A synthesised prefix of 60 nucleotides on a 300-nucleotide
        // transcript carrying one gene.
        let mut polymer = Polymer::new("rna", 1, 300);
        let mut rbs = BindingSite::new(
            "proteinX_rbs",
            35,
            50,
            HashMap::from([("ribosome".to_string(), 1.0)]),
        );
        rbs.set_gene("proteinX");
        polymer.add_binding_site(rbs);
        let mut stop_codon = ReleaseSite::new(
            "stop_codon",
            199,
            200,
            HashMap::from([("ribosome".to_string(), 1.0)]),
        );
        stop_codon.set_reading_frame(Some(2));
        stop_codon.set_gene("proteinX");
        polymer.add_release_site(stop_codon);
        polymer.set_mask(Mask::new(60, 300, HashMap::new()));
        let mut transcript = Transcript::new(polymer);
        transcript.initialize().unwrap();
        transcript
    }

    #[test]
    fn test_bind_assigns_reading_frame() {
        let mut transcript = transcript();
        let mut rng = SimRng::seeded(5);
        let mut tracker = SpeciesTracker::new();

        let index = transcript
            .bind(
                Polymerase::new("ribosome", 10, 30.0),
                "proteinX_rbs",
                &mut rng,
                &mut tracker,
            )
            .unwrap();

        let pol = &transcript.polymer().polymerases()[index];
        assert_eq!(pol.start(), 35);
        assert_eq!(pol.reading_frame(), Some(2)); // 35 mod 3
        assert_eq!(tracker.ribo_count("proteinX"), 1);
    }

    #[test]
    fn test_mask_blocks_ribosome() {
        // Transcript masks carry no interactions: a ribosome reaching the
        // synthesis front stalls until more of the transcript is made.
        let mut polymer = Polymer::new("rna", 1, 300);
        polymer.add_binding_site(BindingSite::new(
            "proteinX_rbs",
            35,
            44,
            HashMap::from([("ribosome".to_string(), 1.0)]),
        ));
        polymer.set_mask(Mask::new(45, 300, HashMap::new()));
        let mut transcript = Transcript::new(polymer);
        transcript.initialize().unwrap();

        let mut rng = SimRng::seeded(5);
        let mut tracker = SpeciesTracker::new();
        transcript
            .bind(
                Polymerase::new("ribosome", 10, 30.0),
                "proteinX_rbs",
                &mut rng,
                &mut tracker,
            )
            .unwrap();

        let before = transcript.polymer().polymerases()[0].start();
        let prop_before = transcript.prop_sum();
        transcript.execute(&mut rng).unwrap();
        assert_eq!(transcript.polymer().polymerases()[0].start(), before);
        assert_eq!(transcript.prop_sum(), prop_before);
    }
}
