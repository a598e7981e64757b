//! Fixed elements on a polymer: binding sites, release sites, and the mask.
//!
//! Binding sites (promoters, ribosome binding sites) and release sites
//! (terminators, stop codons) share the same coverage machinery: coverage is
//! reference-counted so that several overlapping polymerases stack, and each
//! site keeps a snapshot of its covered state so the polymer can detect
//! covered/uncovered transitions after a move.

use std::collections::HashMap;

/// Reference-counted coverage state with a saved snapshot.
#[derive(Debug, Clone, Copy, Default)]
struct Coverage {
    covered: u32,
    snapshot: u32,
}

impl Coverage {
    fn cover(&mut self) {
        self.covered += 1;
    }

    fn uncover(&mut self) {
        self.covered = self.covered.saturating_sub(1);
    }

    fn is_covered(&self) -> bool {
        self.covered > 0
    }

    /// Covered now but not at the last snapshot.
    fn was_covered(&self) -> bool {
        self.covered > 0 && self.snapshot == 0
    }

    /// Uncovered now but covered at the last snapshot.
    fn was_uncovered(&self) -> bool {
        self.covered == 0 && self.snapshot > 0
    }

    fn save_state(&mut self) {
        self.snapshot = self.covered;
    }
}

/// A site where a polymerase can enter the polymer.
///
/// The interaction table maps polymerase names to binding constants used to
/// weight promoter choice during `bind`.
#[derive(Debug, Clone)]
pub struct BindingSite {
    name: String,
    start: i64,
    stop: i64,
    interactions: HashMap<String, f64>,
    gene: String,
    coverage: Coverage,
}

impl BindingSite {
    pub fn new(name: &str, start: i64, stop: i64, interactions: HashMap<String, f64>) -> Self {
        Self {
            name: name.to_string(),
            start,
            stop,
            interactions,
            gene: String::new(),
            coverage: Coverage::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn stop(&self) -> i64 {
        self.stop
    }

    /// Gene this site belongs to; empty for bare promoters.
    pub fn gene(&self) -> &str {
        &self.gene
    }

    pub fn set_gene(&mut self, gene: &str) {
        self.gene = gene.to_string();
    }

    pub fn interactions(&self) -> &HashMap<String, f64> {
        &self.interactions
    }

    pub fn check_interaction(&self, pol_name: &str) -> bool {
        self.interactions.contains_key(pol_name)
    }

    /// Binding constant for a polymerase; zero when the site does not list it.
    pub fn binding_constant(&self, pol_name: &str) -> f64 {
        self.interactions.get(pol_name).copied().unwrap_or(0.0)
    }

    pub fn cover(&mut self) {
        self.coverage.cover();
    }

    pub fn uncover(&mut self) {
        self.coverage.uncover();
    }

    pub fn is_covered(&self) -> bool {
        self.coverage.is_covered()
    }

    pub fn was_covered(&self) -> bool {
        self.coverage.was_covered()
    }

    pub fn was_uncovered(&self) -> bool {
        self.coverage.was_uncovered()
    }

    pub fn save_state(&mut self) {
        self.coverage.save_state();
    }

    /// Independent copy with fresh coverage state. Transcripts clone their
    /// template sites with this so each transcript covers independently.
    pub fn clone_detached(&self) -> Self {
        Self {
            coverage: Coverage::default(),
            ..self.clone()
        }
    }
}

/// A site where a polymerase may dissociate from the polymer.
///
/// The interaction table maps polymerase names to termination efficiencies
/// in `[0, 1]`. Stop codons additionally carry the reading frame of their
/// gene; a polymerase terminates there only in the matching frame.
#[derive(Debug, Clone)]
pub struct ReleaseSite {
    name: String,
    start: i64,
    stop: i64,
    efficiency: HashMap<String, f64>,
    gene: String,
    reading_frame: Option<u8>,
    readthrough: bool,
    coverage: Coverage,
}

impl ReleaseSite {
    pub fn new(name: &str, start: i64, stop: i64, efficiency: HashMap<String, f64>) -> Self {
        Self {
            name: name.to_string(),
            start,
            stop,
            efficiency,
            gene: String::new(),
            reading_frame: None,
            readthrough: false,
            coverage: Coverage::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn stop(&self) -> i64 {
        self.stop
    }

    /// Gene reported in the termination signal.
    pub fn gene(&self) -> &str {
        &self.gene
    }

    pub fn set_gene(&mut self, gene: &str) {
        self.gene = gene.to_string();
    }

    pub fn reading_frame(&self) -> Option<u8> {
        self.reading_frame
    }

    pub fn set_reading_frame(&mut self, frame: Option<u8>) {
        self.reading_frame = frame;
    }

    /// Whether a polymerase can terminate here: it must appear in the
    /// efficiency table and, when the site is frame-specific, translate in
    /// the matching frame.
    pub fn check_interaction(&self, pol_name: &str, pol_frame: Option<u8>) -> bool {
        if !self.efficiency.contains_key(pol_name) {
            return false;
        }
        match self.reading_frame {
            Some(frame) => pol_frame == Some(frame),
            None => true,
        }
    }

    pub fn efficiency(&self, pol_name: &str) -> f64 {
        self.efficiency.get(pol_name).copied().unwrap_or(0.0)
    }

    /// Latch set when a termination roll fails; suppresses re-testing until
    /// the polymerase has fully passed the site.
    pub fn readthrough(&self) -> bool {
        self.readthrough
    }

    pub fn set_readthrough(&mut self, readthrough: bool) {
        self.readthrough = readthrough;
    }

    pub fn cover(&mut self) {
        self.coverage.cover();
    }

    pub fn uncover(&mut self) {
        self.coverage.uncover();
    }

    pub fn is_covered(&self) -> bool {
        self.coverage.is_covered()
    }

    pub fn was_covered(&self) -> bool {
        self.coverage.was_covered()
    }

    pub fn was_uncovered(&self) -> bool {
        self.coverage.was_uncovered()
    }

    pub fn save_state(&mut self) {
        self.coverage.save_state();
    }

    /// Independent copy with fresh coverage and readthrough state.
    pub fn clone_detached(&self) -> Self {
        Self {
            coverage: Coverage::default(),
            readthrough: false,
            ..self.clone()
        }
    }
}

/// The unexposed suffix of a polymer.
///
/// On DNA the mask models the not-yet-entered portion of the genome and
/// recedes when an interacting polymerase pushes against it. On a nascent
/// transcript it models the not-yet-synthesised portion and is pulled back
/// by the upstream polymerase's move signal.
#[derive(Debug, Clone)]
pub struct Mask {
    start: i64,
    stop: i64,
    interactions: HashMap<String, f64>,
}

impl Mask {
    pub fn new(start: i64, stop: i64, interactions: HashMap<String, f64>) -> Self {
        Self {
            start,
            stop,
            interactions,
        }
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn stop(&self) -> i64 {
        self.stop
    }

    /// The polymer is fully exposed once the mask start passes its stop.
    pub fn is_exhausted(&self) -> bool {
        self.start > self.stop
    }

    /// Shorten the masked region by one position.
    pub fn recede(&mut self) {
        self.start += 1;
    }

    /// Whether the named polymerase may push the mask back.
    pub fn check_interaction(&self, pol_name: &str) -> bool {
        self.interactions.contains_key(pol_name)
    }
}
