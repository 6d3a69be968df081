// mod.rs - Core logic module

pub mod digestion;
pub mod fragments;
pub mod mass;
pub mod precursors;

// Re-export main types for convenience
pub use digestion::{digest_all, digest_molecule, DigestConfig, DigestProduct, DECOY};
pub use fragments::{CidIon, FragmentCalculator, FragmentConfig};
pub use mass::{format_mz, mz, FivePrimeEnd, IonMode, MassTable, ThreePrimeEnd};
pub use precursors::{Isotope, Ms1Ion, Ms2Precursor, MzWindow, PrecursorCalculator};
