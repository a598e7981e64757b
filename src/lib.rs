//! polysim - stochastic gene expression simulation engine
//!
//! Simulates transcription and translation on linear polymers at
//! single-nucleotide resolution. Polymerases and ribosomes are processive
//! agents that bind to sites, translocate, collide with one another and with
//! the not-yet-exposed "mask" region, and dissociate at release sites.
//! Transcribing a genome spawns nascent transcripts that are themselves
//! polymers open to ribosome binding, so translation begins while
//! transcription is still under way.
//!
//! Reaction timing follows the Gillespie direct method: each polymer keeps
//! its translocation propensities cached and the outer scheduler samples one
//! reaction channel per step.
//!
//! References:
//! - Gillespie DT. J Phys Chem. 1977;81:2340-2361
//! - McClure WR. Annu Rev Biochem. 1985;54:171-204

pub mod config;
pub mod error;
pub mod export;
pub mod interval;
pub mod polymer;
pub mod random;
pub mod signal;
pub mod simulation;
pub mod tracker;

pub use config::ModelParameters;
pub use error::SimulationError;
pub use export::CountsExporter;
pub use interval::{Interval, IntervalIndex};
pub use polymer::{
    BindingSite, Genome, Mask, Polymer, Polymerase, ReleaseSite, TerminationEvent, Transcript,
};
pub use random::SimRng;
pub use signal::{Signal, SlotId};
pub use simulation::{BindingReaction, Gillespie, RunStatus};
pub use tracker::SpeciesTracker;
