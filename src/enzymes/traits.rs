// traits.rs - Core trait for nucleases

use std::fmt::Debug;

/// Strategy deciding where an RNA sequence is cleaved
pub trait Nuclease: Send + Sync + Debug {
    /// Get the name used to select this nuclease
    fn name(&self) -> &str;

    /// Get a description of this nuclease
    fn description(&self) -> String;

    /// Whether the bond between 0-based residues `i` and `i + 1` is cleaved
    fn cleaves_after(&self, seq: &[u8], i: usize) -> bool;

    /// 0-based indices of residues followed by a cleaved bond, ascending
    fn cleavage_sites(&self, seq: &[u8]) -> Vec<usize> {
        (0..seq.len().saturating_sub(1))
            .filter(|&i| self.cleaves_after(seq, i))
            .collect()
    }
}
