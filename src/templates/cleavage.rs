// cleavage.rs - Custom nuclease cleavage-site rules

use std::fmt;
use std::path::Path;

/// One-letter code allowed in a cleavage pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NucleotideCode {
    A,
    C,
    G,
    U,
    /// Pyrimidine: C or U
    Y,
    /// Purine: A or G
    R,
    /// Any nucleotide
    N,
}

impl NucleotideCode {
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(Self::A),
            'C' => Some(Self::C),
            'G' => Some(Self::G),
            'U' => Some(Self::U),
            'Y' => Some(Self::Y),
            'R' => Some(Self::R),
            'N' => Some(Self::N),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Self::A => 'A',
            Self::C => 'C',
            Self::G => 'G',
            Self::U => 'U',
            Self::Y => 'Y',
            Self::R => 'R',
            Self::N => 'N',
        }
    }

    /// Whether a residue of the sequence is covered by this code
    pub fn matches(&self, residue: u8) -> bool {
        match self {
            Self::A => residue == b'A',
            Self::C => residue == b'C',
            Self::G => residue == b'G',
            Self::U => residue == b'U',
            Self::Y => residue == b'C' || residue == b'U',
            Self::R => residue == b'A' || residue == b'G',
            Self::N => true,
        }
    }
}

/// A cleavage pattern split at the cleaved phosphodiester bond
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleavageRule {
    /// Codes 5' of the bond, in sequence order
    pub upstream: Vec<NucleotideCode>,
    /// Codes 3' of the bond, in sequence order
    pub downstream: Vec<NucleotideCode>,
}

impl CleavageRule {
    /// Parse a pattern such as `G*`, `*ACA` or `Y*N`
    pub fn parse(text: &str) -> Result<Self, String> {
        let pattern = text.trim();
        let stars = pattern.matches('*').count();
        if stars != 1 {
            return Err(format!(
                "Rule '{}' must contain exactly one '*' marking the cleaved bond (found {})",
                pattern, stars
            ));
        }

        let (left, right) = pattern.split_once('*').unwrap_or((pattern, ""));
        let parse_side = |side: &str| -> Result<Vec<NucleotideCode>, String> {
            side.chars()
                .map(|c| {
                    NucleotideCode::from_char(c).ok_or_else(|| {
                        format!("Invalid code '{}' in rule '{}' (allowed: A C G U Y R N)", c, pattern)
                    })
                })
                .collect()
        };

        let upstream = parse_side(left)?;
        let downstream = parse_side(right)?;
        if upstream.is_empty() && downstream.is_empty() {
            return Err(format!("Rule '{}' has no nucleotide codes", pattern));
        }

        Ok(Self { upstream, downstream })
    }

    /// Whether the bond after 0-based residue `i` matches this rule
    pub fn matches_at(&self, seq: &[u8], i: usize) -> bool {
        if i + 1 >= seq.len() {
            return false;
        }
        let up = self.upstream.len();
        let down = self.downstream.len();
        if i + 1 < up || i + 1 + down > seq.len() {
            return false;
        }

        let start = i + 1 - up;
        self.upstream
            .iter()
            .zip(&seq[start..=i])
            .all(|(code, &res)| code.matches(res))
            && self
                .downstream
                .iter()
                .zip(&seq[i + 1..i + 1 + down])
                .all(|(code, &res)| code.matches(res))
    }
}

impl fmt::Display for CleavageRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for code in &self.upstream {
            write!(f, "{}", code.as_char())?;
        }
        write!(f, "*")?;
        for code in &self.downstream {
            write!(f, "{}", code.as_char())?;
        }
        Ok(())
    }
}

/// Rules read from a cleavage template. All rules must hold for a bond to be cleaved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleavageRuleSet {
    pub rules: Vec<CleavageRule>,
}

impl CleavageRuleSet {
    pub fn new(rules: Vec<CleavageRule>) -> Result<Self, String> {
        if rules.is_empty() {
            return Err("Cleavage rule set is empty".to_string());
        }
        Ok(Self { rules })
    }

    /// Parse template text: one rule per line, `#` comments and blank lines ignored
    pub fn parse(text: &str) -> Result<Self, String> {
        let mut rules = Vec::new();
        for (line_num, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let rule = CleavageRule::parse(trimmed)
                .map_err(|e| format!("Cleavage template line {}: {}", line_num + 1, e))?;
            rules.push(rule);
        }

        if rules.is_empty() {
            return Err("Cleavage template contains no rules".to_string());
        }
        Ok(Self { rules })
    }

    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read cleavage template '{}': {}", path.display(), e))?;
        let set = Self::parse(&content).map_err(|e| format!("{}: {}", path.display(), e))?;
        println!("✂️  Cleavage template loaded: {} ({} rules)", path.display(), set.rules.len());
        Ok(set)
    }

    /// Whether the bond between residue `i` and `i + 1` is cleaved
    pub fn cleaves_after(&self, seq: &[u8], i: usize) -> bool {
        self.rules.iter().all(|rule| rule.matches_at(seq, i))
    }

    /// 0-based indices of residues followed by a cleaved bond, ascending
    pub fn cleavage_sites(&self, seq: &[u8]) -> Vec<usize> {
        (0..seq.len().saturating_sub(1))
            .filter(|&i| self.cleaves_after(seq, i))
            .collect()
    }

    /// Compact form used in output headers, e.g. `Y*;*A`
    pub fn describe(&self) -> String {
        self.rules
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// Documented cleavage template, written by `--generate-templates`
pub fn template_text() -> &'static str {
    r#"# Custom nuclease cleavage template
#
# One cleavage rule per line. Lines starting with '#' are comments.
# A rule is a short nucleotide pattern in which '*' marks the cleaved
# phosphodiester bond. Letters left of '*' must match the nucleotides 5'
# of the bond, letters right of '*' the nucleotides 3' of it.
#
# Allowed codes:
#   A C G U   literal bases
#   Y         pyrimidine (C or U)
#   R         purine (A or G)
#   N         any nucleotide (A, C, G or U)
#
# Examples:
#   G*      cleave after every G (RNase T1 like)
#   Y*A     cleave between a pyrimidine and a following A
#   *ACA    cleave before every ACA motif
#
# When several rules are given they are combined with AND: a bond is
# cleaved only if every rule matches at that bond. The two rules
#   Y*
#   *A
# are equivalent to the single rule Y*A.
Y*
"#
}
