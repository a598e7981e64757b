//! Polymer state machine and stochastic step kernel.
//!
//! A polymer is the 1-D substrate along which polymerases translocate: the
//! genome (DNA) or a transcript (RNA). The polymer owns its binding and
//! release sites, the bound polymerases, a movable mask hiding the
//! not-yet-exposed suffix, and the per-polymerase move propensities that the
//! outer Gillespie scheduler samples from.
//!
//! The step kernel is `execute`: pick one polymerase by its cached
//! propensity, advance it one nucleotide, and resolve collisions, mask
//! pushing, termination, and coverage transitions that follow from the move.

mod element;
mod genome;
mod polymerase;
mod transcript;

pub use element::{BindingSite, Mask, ReleaseSite};
pub use genome::Genome;
pub use polymerase::Polymerase;
pub use transcript::Transcript;

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::error::SimulationError;
use crate::interval::{Interval, IntervalIndex};
use crate::random::SimRng;
use crate::signal::Signal;
use crate::tracker::SpeciesTracker;

/// Payload of a polymer's termination signal.
#[derive(Debug, Clone)]
pub struct TerminationEvent {
    /// Scheduler-assigned index of the polymer the polymerase left.
    pub polymer_index: usize,
    /// Name of the dissociating polymerase.
    pub pol_name: String,
    /// Gene label of the release site that fired.
    pub last_gene: String,
}

/// A linear polymer with bound polymerases.
#[derive(Debug)]
pub struct Polymer {
    pub(crate) name: String,
    pub(crate) start: i64,
    pub(crate) stop: i64,
    pub(crate) index: usize,
    /// Position-dependent translocation multipliers, one per nucleotide.
    pub(crate) weights: Vec<f64>,
    pub(crate) mask: Mask,
    pub(crate) binding_elements: Vec<BindingSite>,
    pub(crate) release_elements: Vec<ReleaseSite>,
    binding_index: IntervalIndex<usize>,
    release_index: IntervalIndex<usize>,
    /// Bound polymerases, strictly sorted by start coordinate.
    pub(crate) polymerases: Vec<Polymerase>,
    /// Cached move propensity per polymerase, parallel to `polymerases`.
    prop_list: Vec<f64>,
    prop_sum: f64,
    /// Exposed, uncovered instances per binding-site species.
    uncovered: HashMap<String, i32>,
    /// Signed coverage deltas accumulated since the last `execute` began.
    species_log: HashMap<String, i32>,
    pub termination_signal: Signal<TerminationEvent>,
}

impl Polymer {
    /// Create a polymer spanning the inclusive range `[start, stop]`.
    ///
    /// The mask starts exhausted (fully exposed polymer) and all
    /// translocation weights default to 1.0.
    pub fn new(name: &str, start: i64, stop: i64) -> Self {
        debug_assert!(start <= stop, "polymer range is empty");
        let length = (stop - start + 1) as usize;
        Self {
            name: name.to_string(),
            start,
            stop,
            index: 0,
            weights: vec![1.0; length],
            mask: Mask::new(stop + 1, stop, HashMap::new()),
            binding_elements: Vec::new(),
            release_elements: Vec::new(),
            binding_index: IntervalIndex::default(),
            release_index: IntervalIndex::default(),
            polymerases: Vec::new(),
            prop_list: Vec::new(),
            prop_sum: 0.0,
            uncovered: HashMap::new(),
            species_log: HashMap::new(),
            termination_signal: Signal::new(),
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

    /// Scheduler-assigned index reported in termination events.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    /// Total move propensity; the outer scheduler reads this to weight the
    /// polymer against other reaction channels.
    pub fn prop_sum(&self) -> f64 {
        self.prop_sum
    }

    /// Cached per-polymerase propensities, parallel to `polymerases()`.
    pub fn propensities(&self) -> &[f64] {
        &self.prop_list
    }

    pub fn polymerases(&self) -> &[Polymerase] {
        &self.polymerases
    }

    /// Exposed, uncovered instances of a binding-site species.
    pub fn uncovered_count(&self, species: &str) -> i32 {
        self.uncovered.get(species).copied().unwrap_or(0)
    }

    /// Per-species exposure counts (the map behind `uncovered_count`).
    pub fn uncovered_counts(&self) -> &HashMap<String, i32> {
        &self.uncovered
    }

    /// Coverage deltas since the last `execute` began. Cleared at the start
    /// of the next `execute`; the scheduler reads it between steps.
    pub fn species_log(&self) -> &HashMap<String, i32> {
        &self.species_log
    }

    /// Drain the coverage deltas. The scheduler sweeps every polymer after
    /// each step so deltas produced through signal subscriptions (a genome
    /// polymerase pulling a transcript's mask) are observed exactly once.
    pub fn take_species_log(&mut self) -> HashMap<String, i32> {
        std::mem::take(&mut self.species_log)
    }

    /// Register a binding site. Sites are frozen once `initialize` runs.
    pub fn add_binding_site(&mut self, site: BindingSite) {
        self.binding_elements.push(site);
    }

    /// Register a release site. Sites are frozen once `initialize` runs.
    pub fn add_release_site(&mut self, site: ReleaseSite) {
        self.release_elements.push(site);
    }

    /// Replace the mask. Must happen before `initialize`.
    pub fn set_mask(&mut self, mask: Mask) {
        self.mask = mask;
    }

    /// Replace the translocation weights; the vector must span the polymer.
    pub fn set_weights(&mut self, weights: Vec<f64>) -> Result<(), SimulationError> {
        let expected = (self.stop - self.start + 1) as usize;
        if weights.len() != expected {
            return Err(SimulationError::WeightsMismatch {
                expected,
                actual: weights.len(),
            });
        }
        self.weights = weights;
        Ok(())
    }

    /// Build the interval indices and set the initial coverage state: every
    /// binding site overlapping the mask starts covered, every site strictly
    /// before the mask starts uncovered.
    ///
    /// Idempotent only before the first `bind`.
    pub fn initialize(&mut self) -> Result<(), SimulationError> {
        self.binding_index = IntervalIndex::new(
            self.binding_elements
                .iter()
                .enumerate()
                .map(|(handle, site)| Interval::new(site.start(), site.stop(), handle))
                .collect(),
        );
        self.release_index = IntervalIndex::new(
            self.release_elements
                .iter()
                .enumerate()
                .map(|(handle, site)| Interval::new(site.start(), site.stop(), handle))
                .collect(),
        );

        let masked = self
            .binding_index
            .find_overlapping(self.mask.start(), self.mask.stop());
        for handle in masked {
            let name = self.binding_elements[handle].name().to_string();
            self.cover_binding_site(&name)?;
            let site = &mut self.binding_elements[handle];
            site.cover();
            site.save_state();
        }

        let exposed = self
            .binding_index
            .find_overlapping(self.start, self.mask.start() - 1);
        for handle in exposed {
            if self.binding_elements[handle].stop() >= self.mask.start() {
                continue;
            }
            let name = self.binding_elements[handle].name().to_string();
            self.uncover_binding_site(&name);
            let site = &mut self.binding_elements[handle];
            site.uncover();
            site.save_state();
        }
        Ok(())
    }

    /// Bind a polymerase to a free binding site of the requested species.
    ///
    /// Candidates are the uncovered sites of that species in the exposed
    /// region `[start, mask_start)`, weighted by their binding constant for
    /// the polymerase. Returns the polymerase's index in the sorted list.
    pub fn bind(
        &mut self,
        mut pol: Polymerase,
        promoter_name: &str,
        rng: &mut SimRng,
        tracker: &mut SpeciesTracker,
    ) -> Result<usize, SimulationError> {
        let mut candidates = Vec::new();
        for handle in self
            .binding_index
            .find_overlapping(self.start, self.mask.start())
        {
            let site = &self.binding_elements[handle];
            if site.name() == promoter_name && !site.is_covered() {
                candidates.push(handle);
            }
        }
        if candidates.is_empty() {
            return Err(SimulationError::NoFreePromoter {
                polymer: self.name.clone(),
                pol: pol.name().to_string(),
                promoter: promoter_name.to_string(),
            });
        }

        let strengths: Vec<f64> = candidates
            .iter()
            .map(|&handle| self.binding_elements[handle].binding_constant(pol.name()))
            .collect();
        let chosen = match rng.weighted_index(&strengths) {
            Ok(k) => candidates[k],
            Err(SimulationError::AllWeightsZero(_)) => {
                return Err(SimulationError::NoInteraction {
                    pol: pol.name().to_string(),
                    promoter: promoter_name.to_string(),
                })
            }
            Err(err) => return Err(err),
        };
        if !self.binding_elements[chosen].check_interaction(pol.name()) {
            return Err(SimulationError::NoInteraction {
                pol: pol.name().to_string(),
                promoter: promoter_name.to_string(),
            });
        }

        pol.place_at(self.binding_elements[chosen].start());
        if pol.stop() >= self.mask.start() {
            return Err(SimulationError::MaskOverlapOnBind {
                pol: pol.name().to_string(),
            });
        }

        let site_name = self.binding_elements[chosen].name().to_string();
        self.binding_elements[chosen].cover();
        self.binding_elements[chosen].save_state();
        self.cover_binding_site(&site_name)?;

        log::debug!(
            "{} bound {} at [{}, {}] on {}",
            pol.name(),
            site_name,
            pol.start(),
            pol.stop(),
            self.name
        );

        let ribosome_site = self.binding_elements[chosen].check_interaction("ribosome");
        let gene = self.binding_elements[chosen].gene().to_string();
        let index = self.insert_polymerase(pol)?;

        // Ribosome-visible binding sites feed the per-gene ribosome load.
        if ribosome_site {
            tracker.increment_ribo(&gene, 1);
        }
        Ok(index)
    }

    /// Perform one stochastic step: choose a polymerase by its cached
    /// propensity and move it.
    pub fn execute(&mut self, rng: &mut SimRng) -> Result<(), SimulationError> {
        if self.prop_sum == 0.0 {
            return Err(SimulationError::EmptyPropensity {
                polymer: self.name.clone(),
            });
        }
        self.species_log.clear();
        let index = self.choose_polymerase(rng)?;
        self.move_polymerase(index, rng)
    }

    /// Expose one more nucleotide by receding the mask, uncovering any
    /// binding site that just became fully exposed.
    pub fn shift_mask(&mut self) {
        if self.mask.start() <= self.mask.stop() {
            let old_start = self.mask.start();
            self.mask.recede();
            self.check_behind(old_start, self.mask.start());
        }
    }

    /// Remove the polymerase at `index`, emitting the termination signal.
    pub fn terminate(&mut self, index: usize, last_gene: &str) -> Result<(), SimulationError> {
        self.prop_sum -= self.prop_list[index];
        let event = TerminationEvent {
            polymer_index: self.index,
            pol_name: self.polymerases[index].name().to_string(),
            last_gene: last_gene.to_string(),
        };
        log::debug!(
            "{} released from {} at gene {}",
            event.pol_name,
            self.name,
            last_gene
        );
        self.termination_signal.emit(&event);
        self.polymerases.remove(index);
        self.prop_list.remove(index);
        if self.prop_list.is_empty() {
            // Clear any accumulated round-off so an idle polymer reads as
            // exactly zero propensity.
            self.prop_sum = 0.0;
        }
        if self.prop_list.len() != self.polymerases.len() {
            return Err(SimulationError::InvariantViolation(format!(
                "propensity list ({}) and polymerase list ({}) diverged on polymer {}",
                self.prop_list.len(),
                self.polymerases.len(),
                self.name
            )));
        }
        Ok(())
    }

    fn choose_polymerase(&mut self, rng: &mut SimRng) -> Result<usize, SimulationError> {
        if self.prop_list.is_empty() {
            return Err(SimulationError::InvariantViolation(format!(
                "no active polymerases on polymer {} with propensity {}",
                self.name, self.prop_sum
            )));
        }
        rng.weighted_index(&self.prop_list)
    }

    /// The move pipeline: advance, then resolve collisions, mask pushing,
    /// termination, coverage transitions, and the propensity refresh.
    fn move_polymerase(&mut self, index: usize, rng: &mut SimRng) -> Result<(), SimulationError> {
        let old_start = self.polymerases[index].start();
        let old_stop = self.polymerases[index].stop();

        self.polymerases[index].advance();

        // The polymer end and the next polymerase downstream both behave as
        // collisions: the move simply reverts.
        if self.polymerases[index].stop() > self.stop || self.collides_downstream(index)? {
            self.polymerases[index].retreat();
            return Ok(());
        }

        if self.mask.start() <= self.stop && self.polymerases[index].stop() >= self.mask.start() {
            if self.polymerases[index].stop() - self.mask.start() > 0 {
                return Err(SimulationError::InvariantViolation(format!(
                    "polymerase {} overlaps the mask by more than one position on polymer {}",
                    self.polymerases[index].name(),
                    self.name
                )));
            }
            if self.mask.check_interaction(self.polymerases[index].name()) {
                self.shift_mask();
            } else {
                self.polymerases[index].retreat();
                return Ok(());
            }
        }

        if self.try_terminate(index, rng)? {
            return Ok(());
        }

        let new_start = self.polymerases[index].start();
        let new_stop = self.polymerases[index].stop();
        self.check_behind(old_start, new_start);
        self.check_ahead(old_stop, new_stop)?;

        let new_propensity = self.translocation_propensity(&self.polymerases[index])?;
        self.prop_sum += new_propensity - self.prop_list[index];
        self.prop_list[index] = new_propensity;
        Ok(())
    }

    /// Does the advanced polymerase hit its downstream neighbour? The sorted
    /// invariant means only `index + 1` can be the collision partner.
    fn collides_downstream(&self, index: usize) -> Result<bool, SimulationError> {
        let Some(next) = self.polymerases.get(index + 1) else {
            return Ok(false);
        };
        let pol = &self.polymerases[index];
        if pol.stop() >= next.start() && next.stop() >= pol.start() {
            if pol.stop() > next.start() {
                return Err(SimulationError::InvariantViolation(format!(
                    "polymerase {} [{}, {}] overlaps polymerase {} [{}, {}] by more than one \
                     position on polymer {}",
                    pol.name(),
                    pol.start(),
                    pol.stop(),
                    next.name(),
                    next.start(),
                    next.stop(),
                    self.name
                )));
            }
            return Ok(true);
        }
        Ok(false)
    }

    /// Test every release site under the polymerase. A successful roll walks
    /// the move signal across the rest of the site (so a nascent
    /// transcript's mask exposes the full release region) and terminates; a
    /// failed roll latches the site's readthrough flag.
    fn try_terminate(&mut self, index: usize, rng: &mut SimRng) -> Result<bool, SimulationError> {
        let pol_start = self.polymerases[index].start();
        let pol_stop = self.polymerases[index].stop();
        let pol_frame = self.polymerases[index].reading_frame();
        let pol_name = self.polymerases[index].name().to_string();

        for handle in self.release_index.find_overlapping(pol_start, pol_stop) {
            let eligible = {
                let site = &self.release_elements[handle];
                site.check_interaction(&pol_name, pol_frame) && !site.readthrough()
            };
            if !eligible {
                continue;
            }
            if rng.random() <= self.release_elements[handle].efficiency(&pol_name) {
                let distance = self.release_elements[handle].stop() - pol_stop + 1;
                for _ in 0..distance {
                    self.polymerases[index].move_signal.emit(&());
                }
                let gene = self.release_elements[handle].gene().to_string();
                self.terminate(index, &gene)?;
                return Ok(true);
            }
            self.release_elements[handle].set_readthrough(true);
        }
        Ok(false)
    }

    /// Uncover binding sites the polymerase (or the receding mask) has just
    /// fully passed, and re-arm release sites for the next polymerase.
    ///
    /// A site transitions exactly once per transit: on the move where its
    /// stop first falls behind the new start. Firing on the transition move
    /// keeps the reference counts balanced against `check_ahead`.
    fn check_behind(&mut self, old_start: i64, new_start: i64) {
        for handle in self.binding_index.find_overlapping(old_start, new_start) {
            let stop = self.binding_elements[handle].stop();
            if stop < old_start || stop >= new_start {
                continue;
            }
            self.binding_elements[handle].uncover();
            if self.binding_elements[handle].was_uncovered() {
                let name = self.binding_elements[handle].name().to_string();
                self.uncover_binding_site(&name);
            }
            self.binding_elements[handle].save_state();
        }

        // A release site fully passed becomes eligible for a fresh
        // termination roll by the next polymerase that reaches it.
        for handle in self.release_index.find_overlapping(old_start, new_start) {
            if self.release_elements[handle].stop() < new_start {
                self.release_elements[handle].set_readthrough(false);
            }
        }
    }

    /// Cover binding sites the polymerase front has just reached: those
    /// whose start entered the footprint on this move.
    fn check_ahead(&mut self, old_stop: i64, new_stop: i64) -> Result<(), SimulationError> {
        for handle in self.binding_index.find_overlapping(old_stop, new_stop) {
            let start = self.binding_elements[handle].start();
            if start < old_stop || start >= new_stop {
                continue;
            }
            self.binding_elements[handle].cover();
            if self.binding_elements[handle].was_covered() {
                let name = self.binding_elements[handle].name().to_string();
                self.cover_binding_site(&name)?;
            }
            self.binding_elements[handle].save_state();
        }
        Ok(())
    }

    /// Record that an instance of a binding-site species became covered.
    fn cover_binding_site(&mut self, species: &str) -> Result<(), SimulationError> {
        match self.uncovered.entry(species.to_string()) {
            Entry::Vacant(entry) => {
                entry.insert(0);
            }
            Entry::Occupied(mut entry) => {
                *entry.get_mut() -= 1;
            }
        }
        if self.uncovered[species] < 0 {
            return Err(SimulationError::InvariantViolation(format!(
                "uncovered count for {} went negative on polymer {}",
                species, self.name
            )));
        }
        *self.species_log.entry(species.to_string()).or_insert(0) -= 1;
        Ok(())
    }

    /// Record that an instance of a binding-site species became exposed and
    /// uncovered.
    fn uncover_binding_site(&mut self, species: &str) {
        *self.uncovered.entry(species.to_string()).or_insert(0) += 1;
        *self.species_log.entry(species.to_string()).or_insert(0) += 1;
    }

    /// Insert a polymerase at its sorted position along with its propensity.
    fn insert_polymerase(&mut self, pol: Polymerase) -> Result<usize, SimulationError> {
        let index = self
            .polymerases
            .partition_point(|other| other.start() <= pol.start());
        let propensity = self.translocation_propensity(&pol)?;
        self.prop_sum += propensity;
        self.polymerases.insert(index, pol);
        self.prop_list.insert(index, propensity);
        if self.prop_list.len() != self.polymerases.len() {
            return Err(SimulationError::InvariantViolation(format!(
                "propensity list ({}) and polymerase list ({}) diverged on polymer {}",
                self.prop_list.len(),
                self.polymerases.len(),
                self.name
            )));
        }
        Ok(index)
    }

    /// Move propensity of a polymerase at its current position:
    /// `weights[stop - polymer.start - 1] * speed`.
    fn translocation_propensity(&self, pol: &Polymerase) -> Result<f64, SimulationError> {
        let offset = pol.stop() - self.start - 1;
        let weight = usize::try_from(offset)
            .ok()
            .and_then(|o| self.weights.get(o).copied())
            .ok_or_else(|| {
                SimulationError::InvariantViolation(format!(
                    "no translocation weight at offset {} on polymer {}",
                    offset, self.name
                ))
            })?;
        Ok(weight * pol.speed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interactions(name: &str, value: f64) -> HashMap<String, f64> {
        HashMap::from([(name.to_string(), value)])
    }

    fn polymer_with_promoter() -> Polymer {
        let mut polymer = Polymer::new("plasmid", 1, 100);
        polymer.add_binding_site(BindingSite::new("phi1", 1, 10, interactions("rnapol", 1.0)));
        polymer.initialize().unwrap();
        polymer
    }

    #[test]
    fn test_initialize_exposes_unmasked_sites() {
        let polymer = polymer_with_promoter();
        assert_eq!(polymer.uncovered_count("phi1"), 1);
        assert!(!polymer.binding_elements[0].is_covered());
    }

    #[test]
    fn test_initialize_covers_masked_sites() {
        let mut polymer = Polymer::new("plasmid", 1, 100);
        polymer.add_binding_site(BindingSite::new("phi1", 1, 10, interactions("rnapol", 1.0)));
        polymer.add_binding_site(BindingSite::new("phi2", 60, 70, interactions("rnapol", 1.0)));
        polymer.set_mask(Mask::new(50, 100, HashMap::new()));
        polymer.initialize().unwrap();

        assert_eq!(polymer.uncovered_count("phi1"), 1);
        assert_eq!(polymer.uncovered_count("phi2"), 0);
        assert!(polymer.binding_elements[1].is_covered());
    }

    #[test]
    fn test_bind_places_polymerase_and_updates_propensity() {
        let mut polymer = polymer_with_promoter();
        let mut rng = SimRng::seeded(1);
        let mut tracker = SpeciesTracker::new();

        let pol = Polymerase::new("rnapol", 10, 40.0);
        let index = polymer.bind(pol, "phi1", &mut rng, &mut tracker).unwrap();

        assert_eq!(index, 0);
        assert_eq!(polymer.polymerases()[0].start(), 1);
        assert_eq!(polymer.polymerases()[0].stop(), 10);
        assert_eq!(polymer.prop_sum(), 40.0);
        assert_eq!(polymer.uncovered_count("phi1"), 0);
        assert_eq!(polymer.species_log().get("phi1"), Some(&-1));
    }

    #[test]
    fn test_bind_fails_when_no_free_site() {
        let mut polymer = polymer_with_promoter();
        let mut rng = SimRng::seeded(1);
        let mut tracker = SpeciesTracker::new();

        polymer
            .bind(Polymerase::new("rnapol", 10, 40.0), "phi1", &mut rng, &mut tracker)
            .unwrap();
        let err = polymer
            .bind(Polymerase::new("rnapol", 10, 40.0), "phi1", &mut rng, &mut tracker)
            .unwrap_err();
        assert!(matches!(err, SimulationError::NoFreePromoter { .. }));
    }

    #[test]
    fn test_bind_fails_without_interaction() {
        let mut polymer = polymer_with_promoter();
        let mut rng = SimRng::seeded(1);
        let mut tracker = SpeciesTracker::new();

        let err = polymer
            .bind(Polymerase::new("ecolipol", 10, 40.0), "phi1", &mut rng, &mut tracker)
            .unwrap_err();
        assert!(matches!(err, SimulationError::NoInteraction { .. }));
    }

    #[test]
    fn test_bind_fails_across_mask() {
        // The promoter itself is exposed, but the polymerase footprint would
        // reach into the mask.
        let mut polymer = Polymer::new("plasmid", 1, 100);
        polymer.add_binding_site(BindingSite::new("phi1", 1, 10, interactions("rnapol", 1.0)));
        polymer.set_mask(Mask::new(12, 100, HashMap::new()));
        polymer.initialize().unwrap();
        assert_eq!(polymer.uncovered_count("phi1"), 1);

        let mut rng = SimRng::seeded(1);
        let mut tracker = SpeciesTracker::new();
        let err = polymer
            .bind(Polymerase::new("rnapol", 15, 40.0), "phi1", &mut rng, &mut tracker)
            .unwrap_err();
        assert!(matches!(err, SimulationError::MaskOverlapOnBind { .. }));
    }

    #[test]
    fn test_execute_with_zero_propensity_fails() {
        let mut polymer = polymer_with_promoter();
        let mut rng = SimRng::seeded(1);
        let err = polymer.execute(&mut rng).unwrap_err();
        assert!(matches!(err, SimulationError::EmptyPropensity { .. }));
    }

    #[test]
    fn test_polymerases_stay_sorted() {
        let mut polymer = Polymer::new("plasmid", 1, 200);
        polymer.add_binding_site(BindingSite::new("phi1", 1, 10, interactions("rnapol", 1.0)));
        polymer.add_binding_site(BindingSite::new("phi2", 50, 60, interactions("rnapol", 1.0)));
        polymer.initialize().unwrap();

        let mut rng = SimRng::seeded(1);
        let mut tracker = SpeciesTracker::new();
        polymer
            .bind(Polymerase::new("rnapol", 10, 40.0), "phi2", &mut rng, &mut tracker)
            .unwrap();
        polymer
            .bind(Polymerase::new("rnapol", 10, 40.0), "phi1", &mut rng, &mut tracker)
            .unwrap();

        let pols = polymer.polymerases();
        assert_eq!(pols.len(), 2);
        assert!(pols[0].start() < pols[1].start());
        assert!(pols[0].stop() < pols[1].start());
        assert_eq!(polymer.propensities().len(), 2);
        assert_eq!(polymer.prop_sum(), 80.0);
    }

    #[test]
    fn test_weights_mismatch() {
        let mut polymer = Polymer::new("plasmid", 1, 100);
        let err = polymer.set_weights(vec![1.0; 99]).unwrap_err();
        assert!(matches!(
            err,
            SimulationError::WeightsMismatch {
                expected: 100,
                actual: 99
            }
        ));
        assert!(polymer.set_weights(vec![0.5; 100]).is_ok());
    }

    #[test]
    fn test_position_weight_scales_propensity() {
        let mut polymer = Polymer::new("plasmid", 1, 100);
        polymer.add_binding_site(BindingSite::new("phi1", 1, 10, interactions("rnapol", 1.0)));
        let mut weights = vec![1.0; 100];
        weights[8] = 0.25; // stop - start - 1 for a polymerase bound at [1, 10]
        polymer.set_weights(weights).unwrap();
        polymer.initialize().unwrap();

        let mut rng = SimRng::seeded(1);
        let mut tracker = SpeciesTracker::new();
        polymer
            .bind(Polymerase::new("rnapol", 10, 40.0), "phi1", &mut rng, &mut tracker)
            .unwrap();
        assert_eq!(polymer.prop_sum(), 10.0);
    }

    #[test]
    fn test_shift_mask_uncovers_site() {
        let mut polymer = Polymer::new("plasmid", 1, 100);
        polymer.add_binding_site(BindingSite::new("phi2", 48, 49, interactions("rnapol", 1.0)));
        polymer.set_mask(Mask::new(49, 100, HashMap::new()));
        polymer.initialize().unwrap();
        assert_eq!(polymer.uncovered_count("phi2"), 0);

        polymer.shift_mask();
        assert_eq!(polymer.mask().start(), 50);
        assert_eq!(polymer.uncovered_count("phi2"), 1);
        assert_eq!(polymer.species_log().get("phi2"), Some(&1));
    }
}
