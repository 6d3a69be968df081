// lib.rs - rnadigest library root

//! # rnadigest - In silico digestion libraries for RNA mass spectrometry
//!
//! This library digests RNA sequences with built-in or template-defined
//! nucleases, expands modified-nucleotide variants and computes precursor
//! (MS1) and CID fragment (MS2) m/z values.
//!
//! ## Features
//!
//! - **Nucleases**: RNase T1, A, U2, cusativin, MC1, MazF, nonspecific, or custom cleavage rules
//! - **Modifications**: per-position variants from a modification table
//! - **Isotopes**: light and heavy alphabets from elemental compositions
//! - **MS2**: precursor losses, free bases and a/a-B/b/c/d/w/x/y/z ladders
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use rnadigest::prelude::*;
//! use rnadigest::templates::ModificationMap;
//!
//! let sequences = RnaSequenceSet::from_fasta(std::path::Path::new("trna.fasta"), None, None)?;
//! let registry = NucleaseRegistry::new();
//! let nuclease = registry.get_nuclease("RNase_T1").ok_or("unknown nuclease")?;
//! let alphabet = NucleotideAlphabet::standard();
//!
//! let products = digest_all(
//!     &sequences,
//!     nuclease,
//!     &DigestConfig::default(),
//!     &ModificationMap::default(),
//!     &alphabet.ext_map(),
//! );
//!
//! let masses = MassTable::from_alphabet(&alphabet);
//! let charges = ChargeTable::default_ms1();
//! let calculator = PrecursorCalculator {
//!     light: &masses,
//!     heavy: None,
//!     ion_mode: IonMode::Negative,
//!     charges: &charges,
//! };
//! let ions = calculator.ms1_ions(&products, MzWindow::new(400.0, 2000.0)?)?;
//! # Ok::<(), String>(())
//! ```

// Re-export all main modules
pub mod chem;
pub mod cli;
pub mod core;
pub mod data;
pub mod enzymes;
pub mod mapping;
pub mod output;
pub mod templates;

// Convenience prelude for common imports
pub mod prelude {
    pub use crate::chem::NucleotideAlphabet;
    pub use crate::cli::{validate_args, Args, ValidationResult};
    pub use crate::core::{digest_all, CidIon, DigestConfig, DigestProduct, IonMode, MassTable, MzWindow};
    pub use crate::core::{FragmentCalculator, FragmentConfig, PrecursorCalculator};
    pub use crate::data::{ChargeTable, RnaSequenceSet};
    pub use crate::enzymes::{Nuclease, NucleaseRegistry, CUSTOM_NUCLEASE};
    pub use crate::templates::{CleavageRuleSet, ModificationTable};
}

// Re-export main types at the root level for convenience
pub use cli::{Args, ValidationResult};
pub use core::{DigestConfig, DigestProduct, IonMode, MassTable};
pub use enzymes::{Nuclease, NucleaseRegistry};
pub use templates::{CleavageRuleSet, ModificationTable};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library information
pub fn get_info() -> String {
    format!(
        "rnadigest v{} - In silico digestion libraries for RNA mass spectrometry",
        VERSION
    )
}
