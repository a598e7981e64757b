//! Error types for the simulation core.
//!
//! Every variant here is fatal for the current simulation: the scheduler is
//! expected to abort when one surfaces. Recoverable events (polymerase
//! collisions, mask blocking, terminator readthrough) are ordinary state
//! transitions and never produce an error.

use thiserror::Error;

/// Fatal error raised by the polymer state machine or the scheduler.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// `bind` found no uncovered binding site of the requested species.
    #[error("polymerase {pol} could not find a free {promoter} binding site on polymer {polymer}")]
    NoFreePromoter {
        polymer: String,
        pol: String,
        promoter: String,
    },

    /// The chosen binding site does not list the polymerase in its
    /// interaction table.
    #[error("polymerase {pol} does not interact with binding site {promoter}")]
    NoInteraction { pol: String, promoter: String },

    /// Binding would place the polymerase across the mask, where it would
    /// stall indefinitely.
    #[error("polymerase {pol} would overlap the mask upon binding")]
    MaskOverlapOnBind { pol: String },

    /// Internal bookkeeping disagrees with itself.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// `execute` was called on a polymer with zero total move propensity.
    #[error("polymer {polymer} executed with zero total move propensity")]
    EmptyPropensity { polymer: String },

    /// A weights vector does not span the polymer.
    #[error("weights vector length {actual} does not match polymer length {expected}")]
    WeightsMismatch { expected: usize, actual: usize },

    /// Weighted sampling was attempted over weights that sum to zero.
    #[error("cannot sample an index from {0} weights that are all zero")]
    AllWeightsZero(usize),
}
