//! Species population tracking.
//!
//! The tracker is an injected collaborator owned by the scheduler: it holds
//! the free-species pools (polymerases, ribosomes, exposed binding sites)
//! that drive the species-level binding reactions, plus the per-gene
//! ribosome loads and protein totals used for reporting.

use std::collections::HashMap;

/// Population counts for the simulation.
#[derive(Debug, Default)]
pub struct SpeciesTracker {
    species: HashMap<String, i64>,
    ribosomes_per_gene: HashMap<String, i64>,
    proteins: HashMap<String, i64>,
}

impl SpeciesTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adjust a free-species count (polymerase pools, promoter exposure).
    pub fn increment(&mut self, species: &str, delta: i64) {
        *self.species.entry(species.to_string()).or_insert(0) += delta;
    }

    pub fn count(&self, species: &str) -> i64 {
        self.species.get(species).copied().unwrap_or(0)
    }

    /// Record a ribosome gained (or lost) on a gene's transcripts.
    pub fn increment_ribo(&mut self, gene: &str, delta: i64) {
        *self
            .ribosomes_per_gene
            .entry(gene.to_string())
            .or_insert(0) += delta;
    }

    pub fn ribo_count(&self, gene: &str) -> i64 {
        self.ribosomes_per_gene.get(gene).copied().unwrap_or(0)
    }

    /// Record a completed protein for a gene.
    pub fn increment_protein(&mut self, gene: &str, delta: i64) {
        *self.proteins.entry(gene.to_string()).or_insert(0) += delta;
    }

    pub fn protein_count(&self, gene: &str) -> i64 {
        self.proteins.get(gene).copied().unwrap_or(0)
    }

    /// Fold a polymer's coverage deltas into the species pools.
    pub fn apply_log(&mut self, log: &HashMap<String, i32>) {
        for (species, delta) in log {
            self.increment(species, *delta as i64);
        }
    }

    pub fn species(&self) -> &HashMap<String, i64> {
        &self.species
    }

    pub fn proteins(&self) -> &HashMap<String, i64> {
        &self.proteins
    }

    pub fn ribosomes_per_gene(&self) -> &HashMap<String, i64> {
        &self.ribosomes_per_gene
    }
}
