// builtin.rs - Built-in nucleases and template-defined nucleases

use super::traits::Nuclease;
use crate::templates::CleavageRuleSet;

/// Nuclease whose specificity is a set of cleavage rules
#[derive(Debug, Clone)]
pub struct RuleNuclease {
    name: String,
    summary: String,
    rules: CleavageRuleSet,
}

impl RuleNuclease {
    pub fn new(name: &str, summary: &str, rules: CleavageRuleSet) -> Self {
        Self {
            name: name.to_string(),
            summary: summary.to_string(),
            rules,
        }
    }

    /// Build from pattern strings known to be valid
    pub(crate) fn from_patterns(name: &str, summary: &str, patterns: &str) -> Self {
        let rules = CleavageRuleSet::parse(patterns)
            .unwrap_or_else(|e| panic!("built-in nuclease {} has invalid rules: {}", name, e));
        Self::new(name, summary, rules)
    }

    pub fn rules(&self) -> &CleavageRuleSet {
        &self.rules
    }
}

impl Nuclease for RuleNuclease {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> String {
        format!("{} [{}]", self.summary, self.rules.describe())
    }

    fn cleaves_after(&self, seq: &[u8], i: usize) -> bool {
        self.rules.cleaves_after(seq, i)
    }
}

/// Cusativin: cleaves after C unless the next residue is also C
#[derive(Debug, Clone)]
pub struct Cusativin;

impl Nuclease for Cusativin {
    fn name(&self) -> &str {
        "cusativin"
    }

    fn description(&self) -> String {
        "Cusativin, 3' of C except within CpC [C*, not C*C]".to_string()
    }

    fn cleaves_after(&self, seq: &[u8], i: usize) -> bool {
        i + 1 < seq.len() && seq[i] == b'C' && seq[i + 1] != b'C'
    }
}

/// Leaves every molecule intact
#[derive(Debug, Clone)]
pub struct NoCleavage;

impl Nuclease for NoCleavage {
    fn name(&self) -> &str {
        "none"
    }

    fn description(&self) -> String {
        "No cleavage, whole molecules only".to_string()
    }

    fn cleaves_after(&self, _seq: &[u8], _i: usize) -> bool {
        false
    }
}
