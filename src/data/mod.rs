// mod.rs - Data structures module

pub mod charges;
pub mod report;
pub mod sequence;

// Re-export main types for convenience
pub use charges::ChargeTable;
pub use report::{ReportEntry, ReportLocation};
pub use sequence::{RnaRecord, RnaSequenceSet};
