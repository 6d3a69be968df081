// mass.rs - Terminal chemistry, ion mode and precursor m/z calculation

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::chem::elements::{H, O, P};
use crate::chem::NucleotideAlphabet;

/// Chemistry of the 5' end of an oligonucleotide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FivePrimeEnd {
    /// 5'-hydroxyl
    Hydroxyl,
    /// 5'-monophosphate
    Phosphate,
}

impl FivePrimeEnd {
    /// Mass added to the sum of chain residues
    pub fn mass_delta(&self) -> f64 {
        match self {
            Self::Hydroxyl => O + H,
            Self::Phosphate => P + O * 4.0 + H * 2.0,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Hydroxyl => "OH",
            Self::Phosphate => "P",
        }
    }
}

impl FromStr for FivePrimeEnd {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "OH" | "oh" => Ok(Self::Hydroxyl),
            "P" | "p" => Ok(Self::Phosphate),
            other => Err(format!("Unknown 5' end chemistry '{}' (use OH or P)", other)),
        }
    }
}

impl fmt::Display for FivePrimeEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Chemistry of the 3' end of an oligonucleotide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThreePrimeEnd {
    /// 3'-hydroxyl
    Hydroxyl,
    /// 3'-monophosphate
    Phosphate,
    /// 2',3'-cyclic phosphate
    CyclicPhosphate,
}

impl ThreePrimeEnd {
    /// Mass added to the sum of chain residues
    pub fn mass_delta(&self) -> f64 {
        match self {
            Self::Hydroxyl => -(P + O * 3.0),
            Self::Phosphate => H,
            Self::CyclicPhosphate => -(O + H),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Hydroxyl => "OH",
            Self::Phosphate => "P",
            Self::CyclicPhosphate => "cP",
        }
    }
}

impl FromStr for ThreePrimeEnd {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "OH" | "oh" => Ok(Self::Hydroxyl),
            "P" | "p" => Ok(Self::Phosphate),
            "cP" | "cp" | ">P" => Ok(Self::CyclicPhosphate),
            other => Err(format!("Unknown 3' end chemistry '{}' (use OH, P or cP)", other)),
        }
    }
}

impl fmt::Display for ThreePrimeEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Polarity of the ions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IonMode {
    Positive,
    Negative,
}

impl IonMode {
    pub fn sign(&self) -> char {
        match self {
            Self::Positive => '+',
            Self::Negative => '-',
        }
    }

    /// Charge label such as `-3`
    pub fn charge_label(&self, charge: u32) -> String {
        format!("{}{}", self.sign(), charge)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }
}

impl FromStr for IonMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "+" | "positive" | "pos" => Ok(Self::Positive),
            "-" | "negative" | "neg" => Ok(Self::Negative),
            other => Err(format!("Unknown ion mode '{}' (use + or -)", other)),
        }
    }
}

/// m/z of a neutral mass carrying `charge` protons (positive) or missing them (negative)
pub fn mz(neutral_mass: f64, charge: u32, mode: IonMode) -> f64 {
    let z = charge as f64;
    match mode {
        IonMode::Positive => (neutral_mass + H * z) / z,
        IonMode::Negative => (neutral_mass - H * z) / z,
    }
}

/// Round to 8 decimals and format the shortest representation
pub fn format_mz(value: f64) -> String {
    let rounded = (value * 1e8).round() / 1e8;
    format!("{}", rounded)
}

/// Residue and base masses taken from one alphabet
#[derive(Debug, Clone)]
pub struct MassTable {
    pub name: String,
    nucleotide: HashMap<char, f64>,
    base: HashMap<char, f64>,
}

/// Per-residue masses of one oligonucleotide
#[derive(Debug, Clone, PartialEq)]
pub struct ResidueMasses {
    pub residues: Vec<char>,
    pub nucleotide: Vec<f64>,
    pub base: Vec<f64>,
}

impl MassTable {
    pub fn from_alphabet(alphabet: &NucleotideAlphabet) -> Self {
        Self {
            name: alphabet.name.clone(),
            nucleotide: alphabet.entries().iter().map(|e| (e.id, e.nucleotide_mass())).collect(),
            base: alphabet.entries().iter().map(|e| (e.id, e.base_mass())).collect(),
        }
    }

    pub fn contains(&self, id: char) -> bool {
        self.nucleotide.contains_key(&id)
    }

    /// Residue masses for a sequence of one-letter codes
    pub fn residue_masses(&self, sequence: &str) -> Result<ResidueMasses, String> {
        let residues: Vec<char> = sequence.chars().collect();
        let mut nucleotide = Vec::with_capacity(residues.len());
        let mut base = Vec::with_capacity(residues.len());
        for &r in &residues {
            let nt = self
                .nucleotide
                .get(&r)
                .ok_or_else(|| format!("Nucleotide '{}' of {} is not part of alphabet {}", r, sequence, self.name))?;
            nucleotide.push(*nt);
            base.push(self.base[&r]);
        }
        Ok(ResidueMasses {
            residues,
            nucleotide,
            base,
        })
    }

    /// Neutral monoisotopic mass of an oligonucleotide with the given ends
    pub fn neutral_mass(
        &self,
        sequence: &str,
        five_prime: FivePrimeEnd,
        three_prime: ThreePrimeEnd,
    ) -> Result<f64, String> {
        let masses = self.residue_masses(sequence)?;
        Ok(masses.nucleotide.iter().sum::<f64>() + five_prime.mass_delta() + three_prime.mass_delta())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> MassTable {
        MassTable::from_alphabet(&NucleotideAlphabet::standard())
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("OH".parse::<FivePrimeEnd>().unwrap(), FivePrimeEnd::Hydroxyl);
        assert_eq!("P".parse::<FivePrimeEnd>().unwrap(), FivePrimeEnd::Phosphate);
        assert!("cP".parse::<FivePrimeEnd>().is_err());
        assert_eq!("cP".parse::<ThreePrimeEnd>().unwrap(), ThreePrimeEnd::CyclicPhosphate);
        assert_eq!(ThreePrimeEnd::CyclicPhosphate.to_string(), "cP");
        assert_eq!("-".parse::<IonMode>().unwrap(), IonMode::Negative);
        assert_eq!(IonMode::Positive.charge_label(2), "+2");
        assert!("x".parse::<IonMode>().is_err());
    }

    #[test]
    fn test_dinucleotide_mass() {
        // HO-GpA-OH, C20H25N10O11P
        let m = table()
            .neutral_mass("GA", FivePrimeEnd::Hydroxyl, ThreePrimeEnd::Hydroxyl)
            .unwrap();
        assert!((m - 612.14419).abs() < 1e-4);
        assert!((mz(m, 1, IonMode::Negative) - 611.13636).abs() < 1e-4);
        assert!((mz(m, 2, IonMode::Positive) - 307.07992).abs() < 1e-4);
    }

    #[test]
    fn test_end_chemistry() {
        let t = table();
        let cp = t.neutral_mass("A", FivePrimeEnd::Hydroxyl, ThreePrimeEnd::CyclicPhosphate).unwrap();
        let p = t.neutral_mass("A", FivePrimeEnd::Hydroxyl, ThreePrimeEnd::Phosphate).unwrap();
        // Cyclic phosphate differs from the linear phosphate by one water
        assert!((p - cp - 18.010565).abs() < 1e-5);
        // The HO-A>p residue equals the chain residue mass
        assert!((cp - 329.05252).abs() < 1e-4);

        let p5 = t.neutral_mass("A", FivePrimeEnd::Phosphate, ThreePrimeEnd::CyclicPhosphate).unwrap();
        assert!((p5 - cp - 79.96633).abs() < 1e-4);
    }

    #[test]
    fn test_unknown_residue() {
        assert!(table().residue_masses("AXG").is_err());
    }

    #[test]
    fn test_format_mz() {
        assert_eq!(format_mz(328.044695105123), "328.04469511");
        assert_eq!(format_mz(0.5), "0.5");
    }
}
