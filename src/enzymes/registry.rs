// registry.rs - Nuclease registry for managing available enzymes

use std::collections::BTreeMap;
use super::traits::Nuclease;
use super::{Cusativin, NoCleavage, RuleNuclease};
use crate::templates::CleavageRuleSet;

/// Name under which a cleavage template is registered
pub const CUSTOM_NUCLEASE: &str = "custom";
/// Nuclease used when none is named
pub const DEFAULT_NUCLEASE: &str = "RNase_T1";

/// Registry for available nucleases
pub struct NucleaseRegistry {
    nucleases: BTreeMap<String, Box<dyn Nuclease>>,
}

impl NucleaseRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            nucleases: BTreeMap::new(),
        };

        // Register built-in nucleases
        registry.register_nuclease(Box::new(RuleNuclease::from_patterns(
            "RNase_T1", "RNase T1, 3' of G", "G*",
        )));
        registry.register_nuclease(Box::new(RuleNuclease::from_patterns(
            "RNase_A", "RNase A, 3' of pyrimidines", "Y*",
        )));
        registry.register_nuclease(Box::new(RuleNuclease::from_patterns(
            "RNase_U2", "RNase U2, 3' of purines", "R*",
        )));
        registry.register_nuclease(Box::new(RuleNuclease::from_patterns(
            "MC1", "MC1, 5' of U", "*U",
        )));
        registry.register_nuclease(Box::new(RuleNuclease::from_patterns(
            "MAZ", "MazF, 5' of ACA", "*ACA",
        )));
        registry.register_nuclease(Box::new(RuleNuclease::from_patterns(
            "nonspecific", "Nonspecific, every phosphodiester bond", "N*N",
        )));
        registry.register_nuclease(Box::new(Cusativin));
        registry.register_nuclease(Box::new(NoCleavage));

        registry
    }

    /// Register a new nuclease under its own name
    pub fn register_nuclease(&mut self, nuclease: Box<dyn Nuclease>) {
        self.nucleases.insert(nuclease.name().to_string(), nuclease);
    }

    /// Register the rules of a cleavage template as the `custom` nuclease
    pub fn register_custom(&mut self, rules: CleavageRuleSet) {
        self.register_nuclease(Box::new(RuleNuclease::new(
            CUSTOM_NUCLEASE,
            "Custom nuclease from cleavage template",
            rules,
        )));
    }

    /// Get a nuclease by name
    pub fn get_nuclease(&self, name: &str) -> Option<&dyn Nuclease> {
        self.nucleases.get(name).map(|n| n.as_ref())
    }

    /// Check if a nuclease exists
    pub fn has_nuclease(&self, name: &str) -> bool {
        self.nucleases.contains_key(name)
    }

    /// List all available nucleases
    pub fn list_nucleases(&self) -> Vec<(&str, String)> {
        self.nucleases
            .values()
            .map(|n| (n.name(), n.description()))
            .collect()
    }

    /// Get all nuclease names
    pub fn get_nuclease_names(&self) -> Vec<&str> {
        self.nucleases.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for NucleaseRegistry {
    fn default() -> Self {
        Self::new()
    }
}
