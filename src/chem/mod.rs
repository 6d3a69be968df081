// mod.rs - Chemistry module (element masses and nucleotide alphabets)

pub mod alphabet;
pub mod elements;

// Re-export main types for convenience
pub use alphabet::{AlphabetDiff, NucleotideAlphabet, NucleotideEntry};
pub use elements::ElementalComposition;
