//! Model description structures.
//!
//! Loaded from JSON in the same shape they are declared here; the defaults
//! describe a small three-element phage-like construct so the binary runs
//! without a model file.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SimulationError;
use crate::polymer::Genome;
use crate::simulation::BindingReaction;

/// Top-level model description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelParameters {
    /// Run control (duration, seed, sampling)
    pub simulation: SimulationParameters,
    /// The DNA polymer
    pub genome: GenomeParameters,
    /// RNA polymerase species
    pub polymerases: Vec<PolymeraseParameters>,
    /// Ribosome species
    pub ribosomes: Vec<PolymeraseParameters>,
    /// Promoters on the DNA
    pub promoters: Vec<PromoterParameters>,
    /// Terminators on the DNA
    pub terminators: Vec<TerminatorParameters>,
    /// Genes (each contributes an RBS and a stop codon to transcripts)
    pub genes: Vec<GeneParameters>,
}

impl ModelParameters {
    /// Load a model from a JSON file, or fall back to the defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match std::fs::read_to_string(path.as_ref()) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(params) => {
                    log::info!("Loaded model from {:?}", path.as_ref());
                    params
                }
                Err(e) => {
                    log::warn!("Failed to parse model: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Model file not found, using defaults");
                Self::default()
            }
        }
    }

    /// Populate a genome and derive the binding reaction channels.
    pub fn build(&self) -> Result<(Genome, Vec<BindingReaction>), SimulationError> {
        let mut genome = Genome::new(&self.genome.name, self.genome.length);
        if let Some(mask_start) = self.genome.mask_start {
            genome.add_mask(mask_start, &self.genome.mask_interactions);
        }
        for promoter in &self.promoters {
            genome.add_promoter(
                &promoter.name,
                promoter.start,
                promoter.stop,
                promoter.interactions.clone(),
            );
        }
        for terminator in &self.terminators {
            genome.add_terminator(
                &terminator.name,
                terminator.start,
                terminator.stop,
                terminator.efficiency.clone(),
            );
        }
        for gene in &self.genes {
            genome.add_gene(
                &gene.name,
                gene.start,
                gene.stop,
                gene.rbs_start,
                gene.rbs_stop,
                gene.rbs_strength,
            );
        }
        if let Some(weights) = &self.genome.transcript_weights {
            genome.add_weights(weights.clone())?;
        }

        // One reaction channel per (polymerase species, binding-site
        // species) pair the site lists. Sorted so seeded runs are
        // reproducible regardless of map iteration order.
        let mut reactions = Vec::new();
        for pol in self.polymerases.iter().chain(self.ribosomes.iter()) {
            for (site_name, interactions) in genome.bindings() {
                if let Some(&rate) = interactions.get(&pol.name) {
                    reactions.push(BindingReaction {
                        pol_name: pol.name.clone(),
                        promoter_name: site_name.clone(),
                        rate_constant: rate,
                        footprint: pol.footprint,
                        speed: pol.speed,
                    });
                }
            }
        }
        reactions.sort_by(|a, b| {
            (&a.pol_name, &a.promoter_name).cmp(&(&b.pol_name, &b.promoter_name))
        });
        Ok((genome, reactions))
    }
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            simulation: SimulationParameters::default(),
            genome: GenomeParameters::default(),
            polymerases: vec![PolymeraseParameters {
                name: "rnapol".to_string(),
                footprint: 10,
                speed: 40.0,
                copy_number: 10,
            }],
            ribosomes: vec![PolymeraseParameters {
                name: "ribosome".to_string(),
                footprint: 10,
                speed: 30.0,
                copy_number: 100,
            }],
            promoters: vec![PromoterParameters {
                name: "phi1".to_string(),
                start: 1,
                stop: 10,
                interactions: HashMap::from([("rnapol".to_string(), 0.02)]),
            }],
            terminators: vec![TerminatorParameters {
                name: "t1".to_string(),
                start: 420,
                stop: 421,
                efficiency: HashMap::from([("rnapol".to_string(), 1.0)]),
            }],
            // RBS starts are congruent to the gene starts mod 3 so that
            // ribosomes translate in the stop codon's frame.
            genes: vec![
                GeneParameters {
                    name: "proteinX".to_string(),
                    start: 50,
                    stop: 200,
                    rbs_start: 35,
                    rbs_stop: 49,
                    rbs_strength: 0.01,
                },
                GeneParameters {
                    name: "proteinY".to_string(),
                    start: 240,
                    stop: 400,
                    rbs_start: 225,
                    rbs_stop: 239,
                    rbs_strength: 0.01,
                },
            ],
        }
    }
}

/// Run control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationParameters {
    /// Simulated duration (seconds)
    pub t_end_sec: f64,
    /// RNG seed; omit for an entropy-seeded run
    pub seed: Option<u64>,
    /// CSV sampling interval (seconds)
    pub sample_interval_sec: f64,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            t_end_sec: 60.0,
            seed: Some(34),
            sample_interval_sec: 1.0,
        }
    }
}

/// The DNA polymer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenomeParameters {
    pub name: String,
    /// Length in nucleotides; the genome spans [1, length]
    pub length: i64,
    /// Mask everything from this position to the genome end
    pub mask_start: Option<i64>,
    /// Polymerase species allowed to push the mask back
    #[serde(default)]
    pub mask_interactions: Vec<String>,
    /// Per-position translocation weights applied to transcripts
    #[serde(default)]
    pub transcript_weights: Option<Vec<f64>>,
}

impl Default for GenomeParameters {
    fn default() -> Self {
        Self {
            name: "plasmid".to_string(),
            length: 450,
            mask_start: None,
            mask_interactions: Vec::new(),
            transcript_weights: None,
        }
    }
}

/// A polymerase or ribosome species.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolymeraseParameters {
    pub name: String,
    /// Footprint in nucleotides
    pub footprint: i64,
    /// Base translocation rate (nt/s)
    pub speed: f64,
    /// Initial free copies
    pub copy_number: i64,
}

/// A promoter on the DNA.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoterParameters {
    pub name: String,
    pub start: i64,
    pub stop: i64,
    /// Polymerase name -> binding constant
    pub interactions: HashMap<String, f64>,
}

/// A terminator on the DNA.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminatorParameters {
    pub name: String,
    pub start: i64,
    pub stop: i64,
    /// Polymerase name -> termination efficiency in [0, 1]
    pub efficiency: HashMap<String, f64>,
}

/// A gene and the ribosome binding site its transcripts expose.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneParameters {
    pub name: String,
    pub start: i64,
    pub stop: i64,
    pub rbs_start: i64,
    pub rbs_stop: i64,
    /// Ribosome binding constant of the RBS
    pub rbs_strength: f64,
}
