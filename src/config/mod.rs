//! Configuration module for loading model descriptions.
//!
//! A model description names the genome, the polymerase and ribosome pools,
//! and the ordered element list (promoters, genes with their ribosome
//! binding sites, terminators) that populate the genome before a run.

mod parameters;

pub use parameters::{
    GeneParameters, GenomeParameters, ModelParameters, PolymeraseParameters, PromoterParameters,
    SimulationParameters, TerminatorParameters,
};
