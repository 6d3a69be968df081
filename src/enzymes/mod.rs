// mod.rs - Nucleases module root

pub mod builtin;
pub mod registry;
pub mod traits;

// Re-export main types for convenience
pub use builtin::{Cusativin, NoCleavage, RuleNuclease};
pub use registry::{NucleaseRegistry, CUSTOM_NUCLEASE, DEFAULT_NUCLEASE};
pub use traits::Nuclease;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::CleavageRuleSet;

    #[test]
    fn test_registry_builtins() {
        let registry = NucleaseRegistry::new();

        for name in ["RNase_T1", "RNase_A", "RNase_U2", "cusativin", "MC1", "MAZ", "nonspecific", "none"] {
            assert!(registry.has_nuclease(name), "missing {}", name);
        }
        assert!(!registry.has_nuclease("custom"));
        assert!(!registry.has_nuclease("trypsin"));
        assert_eq!(registry.list_nucleases().len(), 8);
    }

    #[test]
    fn test_builtin_sites() {
        let registry = NucleaseRegistry::new();
        let seq = b"AGCCUGACAU";

        let site = |name: &str| registry.get_nuclease(name).unwrap().cleavage_sites(seq);
        assert_eq!(site("RNase_T1"), vec![1, 5]);
        assert_eq!(site("RNase_A"), vec![2, 3, 4, 7]);
        assert_eq!(site("RNase_U2"), vec![0, 1, 5, 6, 8]);
        // C at index 2 is followed by C, no cleavage there
        assert_eq!(site("cusativin"), vec![3, 7]);
        assert_eq!(site("MC1"), vec![3, 8]);
        assert_eq!(site("MAZ"), vec![5]);
        assert_eq!(site("nonspecific"), (0..9).collect::<Vec<_>>());
        assert!(site("none").is_empty());
    }

    #[test]
    fn test_custom_registration() {
        let mut registry = NucleaseRegistry::new();
        let rules = CleavageRuleSet::parse("Y*\n*A\n").unwrap();
        registry.register_custom(rules);

        let custom = registry.get_nuclease("custom").unwrap();
        assert_eq!(custom.cleavage_sites(b"CAUAUG"), vec![0, 2]);
        assert!(custom.description().contains("Y*;*A"));
    }
}
