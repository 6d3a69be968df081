// fragments.rs - MS2 fragment ions: precursor losses, free bases and CID ladders

use std::fmt;
use std::str::FromStr;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use crate::chem::elements::{H, O, P};
use crate::core::mass::{format_mz, mz, FivePrimeEnd, IonMode, MassTable, ThreePrimeEnd};
use crate::core::precursors::{Isotope, Ms2Precursor, MzWindow};
use crate::data::ChargeTable;

// Neutral and charged losses from the precursor
const LOSS_H2O: f64 = -(H * 2.0 + O);
const LOSS_PO3H: f64 = -(O * 3.0 + P + H);
const LOSS_PO4H3: f64 = -(P + O * 4.0 + H * 3.0);
const LOSS_PO3: f64 = -(O * 3.0 + P);
const LOSS_PO4H2: f64 = -(P + O * 4.0 + H * 2.0);

/// Sequence-defining CID fragment series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CidIon {
    A,
    /// a ion that also lost its last base
    ABase,
    B,
    C,
    D,
    W,
    X,
    Y,
    Z,
    /// y ion of a 3'-phosphate precursor after losing the phosphate
    YDephospho,
    /// z ion of a 3'-phosphate precursor after losing the phosphate
    ZDephospho,
}

impl CidIon {
    pub const DEFAULT_SERIES: [CidIon; 11] = [
        Self::C,
        Self::Y,
        Self::A,
        Self::ABase,
        Self::W,
        Self::B,
        Self::X,
        Self::D,
        Self::Z,
        Self::YDephospho,
        Self::ZDephospho,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::A => "a",
            Self::ABase => "a-B",
            Self::B => "b",
            Self::C => "c",
            Self::D => "d",
            Self::W => "w",
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
            Self::YDephospho => "y-P",
            Self::ZDephospho => "z-P",
        }
    }

    /// a, a-B, b, c and d contain the 5' end
    pub fn from_five_prime(&self) -> bool {
        matches!(self, Self::A | Self::ABase | Self::B | Self::C | Self::D)
    }

    fn is_dephosphorylated(&self) -> bool {
        matches!(self, Self::YDephospho | Self::ZDephospho)
    }

    /// Mass added to the residue sum of the ladder
    fn ladder_delta(&self) -> f64 {
        match self {
            Self::A => -(P + O * 4.0 + H * 2.0),
            Self::ABase => -(P + O * 4.0 + H * 3.0),
            Self::B => -(P + O * 3.0),
            Self::C => -(O + H),
            Self::D => H,
            Self::Z | Self::ZDephospho => -H,
            Self::Y | Self::YDephospho => O + H,
            Self::X => P + O * 3.0,
            Self::W => P + O * 4.0 + H * 2.0,
        }
    }

    /// Label of the fragment with `residues` nucleotides, e.g. `c2`, `a3-B`, `y1-P`
    fn label(&self, residues: usize) -> String {
        let code = self.code();
        match code.split_once('-') {
            Some((letter, suffix)) => format!("{}{}-{}", letter, residues, suffix),
            None => format!("{}{}", code, residues),
        }
    }
}

impl FromStr for CidIon {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::DEFAULT_SERIES
            .iter()
            .find(|ion| ion.code() == s.trim())
            .copied()
            .ok_or_else(|| {
                format!(
                    "Unknown CID series '{}' (available: c y a a-B w b x d z y-P z-P)",
                    s
                )
            })
    }
}

impl fmt::Display for CidIon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Parameters shared by every fragmented precursor
#[derive(Debug, Clone)]
pub struct FragmentConfig {
    pub ion_mode: IonMode,
    pub cid_series: Vec<CidIon>,
    pub window: MzWindow,
    pub charges: ChargeTable,
}

/// Unique `label:m/z` entries in insertion order
struct IonList {
    window: MzWindow,
    entries: Vec<String>,
}

impl IonList {
    fn push_unfiltered(&mut self, label: String, value: f64) {
        let entry = format!("{}:{}", label, format_mz(value));
        if !self.entries.contains(&entry) {
            self.entries.push(entry);
        }
    }

    fn push(&mut self, label: String, value: f64) {
        if self.window.contains(value) {
            self.push_unfiltered(label, value);
        }
    }
}

pub struct FragmentCalculator<'a> {
    pub light: &'a MassTable,
    pub heavy: Option<&'a MassTable>,
    pub config: &'a FragmentConfig,
}

impl<'a> FragmentCalculator<'a> {
    /// All MS2 ions of one precursor
    pub fn fragment_ions(&self, precursor: &Ms2Precursor) -> Result<Vec<String>, String> {
        let table = match precursor.isotope {
            Isotope::Light => self.light,
            Isotope::Heavy => self
                .heavy
                .ok_or_else(|| "Heavy precursor without a heavy alphabet".to_string())?,
        };
        let product = precursor.product;
        let masses = table.residue_masses(&product.sequence)?;
        let len = masses.residues.len();
        if len == 0 {
            return Ok(Vec::new());
        }

        let mode = self.config.ion_mode;
        let z = precursor.charge;
        let zf = z as f64;
        let prec_mz = precursor.mz;
        let prec_label = mode.charge_label(z);
        let loss_label = mode.charge_label(z.saturating_sub(1));
        let (freebase_corr, charge_corr) = match mode {
            IonMode::Negative => (0.0, 0.0),
            IonMode::Positive => (2.0 * H, -2.0 * H),
        };

        let phosphate_end =
            product.three_prime == ThreePrimeEnd::Phosphate || product.five_prime == FivePrimeEnd::Phosphate;
        let cyclic_end = product.three_prime == ThreePrimeEnd::CyclicPhosphate;

        let mut ions = IonList {
            window: self.config.window,
            entries: Vec::new(),
        };

        ions.push(format!("M-H2O({})", prec_label), prec_mz + LOSS_H2O / zf);

        // Charged losses reduce the charge by one
        let charged = |delta: f64| (prec_mz * zf + delta + charge_corr) / (zf - 1.0);

        if phosphate_end {
            ions.push(format!("M-P({})", prec_label), prec_mz + LOSS_PO3H / zf);
            ions.push(format!("M-H2O-P({})", prec_label), prec_mz + LOSS_PO4H3 / zf);
            if z > 1 {
                ions.push(format!("M-P({})", loss_label), charged(LOSS_PO3));
                ions.push(format!("M-H2O-P({})", loss_label), charged(LOSS_PO4H2));
            }
        } else if cyclic_end && z > 1 {
            ions.push(format!("M-P({})", loss_label), charged(LOSS_PO3));
        }

        let last = masses.residues[len - 1];
        let last_base = masses.base[len - 1];
        let interior = &masses.residues[..len - 1];

        let mut seen = Vec::new();
        for (k, &b) in masses.residues.iter().enumerate() {
            if seen.contains(&b) {
                continue;
            }
            seen.push(b);
            let base = masses.base[k];

            ions.push_unfiltered(format!("{}({}1)", b, mode.sign()), base + freebase_corr);

            if z > 1 {
                ions.push(format!("M-{}({})", b, loss_label), charged(-base));
                if phosphate_end {
                    ions.push(format!("M-P-{}({})", b, loss_label), charged(LOSS_PO3H - base));
                } else if cyclic_end {
                    ions.push(format!("M-P-{}({})", last, loss_label), charged(LOSS_PO3H - last_base));
                    if interior.contains(&b) {
                        ions.push(format!("M-{}-{}({})", b, last, loss_label), charged(-base - last_base));
                    }
                }
            }

            ions.push(format!("M-{}({})", b, prec_label), prec_mz - (base + H) / zf);
            if phosphate_end {
                ions.push(format!("M-P-{}({})", b, prec_label), prec_mz - (base + H - LOSS_PO3H) / zf);
            } else if cyclic_end && interior.contains(&b) {
                ions.push(
                    format!("M-{}-{}({})", b, last, prec_label),
                    prec_mz - (base + H + last_base) / zf,
                );
            }
        }

        for &ion in &self.config.cid_series {
            let order: Vec<usize> = if ion.from_five_prime() {
                (0..len).collect()
            } else {
                (0..len).rev().collect()
            };

            for i in 1..len {
                if !self.config.charges.contains_length(i) {
                    continue;
                }

                let mut mass: f64 = order[..i].iter().map(|&k| masses.nucleotide[k]).sum::<f64>() + ion.ladder_delta();
                if ion == CidIon::ABase {
                    mass -= masses.base[order[i - 1]];
                }

                let mut dephosphorylated = None;
                if ion.from_five_prime() {
                    mass += product.five_prime.mass_delta();
                } else {
                    mass += product.three_prime.mass_delta();
                    if ion.is_dephosphorylated() && product.three_prime == ThreePrimeEnd::Phosphate {
                        dephosphorylated = Some(mass + LOSS_PO3H);
                    }
                }

                for &c in self.config.charges.charges_for(i) {
                    if c > z {
                        continue;
                    }
                    let label = format!("{}({})", ion.label(i), mode.charge_label(c));
                    if !ion.is_dephosphorylated() {
                        ions.push(label.clone(), mz(mass, c, mode));
                    }
                    if let Some(m) = dephosphorylated {
                        ions.push(label, mz(m, c, mode));
                    }
                }
            }
        }

        Ok(ions.entries)
    }

    /// Fragment every precursor in parallel, results in precursor order
    pub fn compute_all(&self, precursors: &[Ms2Precursor]) -> Result<Vec<Vec<String>>, String> {
        let pb = ProgressBar::new(precursors.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} precursors fragmented")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        let results = precursors
            .par_iter()
            .map(|precursor| {
                let ions = self.fragment_ions(precursor);
                pb.inc(1);
                ions
            })
            .collect::<Result<Vec<_>, String>>();

        pb.finish_with_message("✅ MS2 fragments computed");
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chem::NucleotideAlphabet;
    use crate::core::digestion::DigestProduct;

    fn product(sequence: &str, five_prime: FivePrimeEnd, three_prime: ThreePrimeEnd) -> DigestProduct {
        DigestProduct {
            molecule: "m1".to_string(),
            start: 1,
            end: sequence.len(),
            missed: 0,
            sequence: sequence.to_string(),
            sequence_mod: sequence.to_string(),
            five_prime,
            three_prime,
            locations: vec!["m1:1-2".to_string()],
            decoy: false,
        }
    }

    fn config(series: Vec<CidIon>) -> FragmentConfig {
        FragmentConfig {
            ion_mode: IonMode::Negative,
            cid_series: series,
            window: MzWindow::new(100.0, 2000.0).unwrap(),
            charges: ChargeTable::default_ms2(),
        }
    }

    fn value_of(ions: &[String], label: &str) -> Option<f64> {
        ions.iter()
            .find_map(|entry| entry.strip_prefix(&format!("{}:", label)))
            .map(|v| v.parse().unwrap())
    }

    fn run(product: &DigestProduct, charge: u32, config: &FragmentConfig) -> Vec<String> {
        let light = MassTable::from_alphabet(&NucleotideAlphabet::standard());
        let neutral = light
            .neutral_mass(&product.sequence, product.five_prime, product.three_prime)
            .unwrap();
        let precursor = Ms2Precursor {
            product,
            isotope: Isotope::Light,
            charge,
            mz: mz(neutral, charge, config.ion_mode),
        };
        let calc = FragmentCalculator {
            light: &light,
            heavy: None,
            config,
        };
        calc.fragment_ions(&precursor).unwrap()
    }

    #[test]
    fn test_parse_series() {
        assert_eq!("a-B".parse::<CidIon>().unwrap(), CidIon::ABase);
        assert_eq!("z-P".parse::<CidIon>().unwrap(), CidIon::ZDephospho);
        assert!("q".parse::<CidIon>().is_err());
        assert_eq!(CidIon::ABase.label(3), "a3-B");
        assert_eq!(CidIon::YDephospho.label(1), "y1-P");
        assert_eq!(CidIon::W.label(2), "w2");
    }

    #[test]
    fn test_sequence_ladders() {
        let p = product("GA", FivePrimeEnd::Hydroxyl, ThreePrimeEnd::Hydroxyl);
        let ions = run(&p, 1, &config(vec![CidIon::C, CidIon::Y]));

        let c1 = value_of(&ions, "c1(-1)").unwrap();
        assert!((c1 - 344.03960971).abs() < 1e-6);
        let y1 = value_of(&ions, "y1(-1)").unwrap();
        assert!((y1 - 266.0889289).abs() < 1e-6);

        // No fragment as long as the precursor
        assert!(value_of(&ions, "c2(-1)").is_none());
    }

    #[test]
    fn test_precursor_losses_hydroxyl_ends() {
        let p = product("GA", FivePrimeEnd::Hydroxyl, ThreePrimeEnd::Hydroxyl);
        let ions = run(&p, 1, &config(Vec::new()));

        let m_h2o = value_of(&ions, "M-H2O(-1)").unwrap();
        assert!((m_h2o - (611.13636 - 18.01056)).abs() < 1e-4);

        // No phosphate end: no phosphate loss
        assert!(!ions.iter().any(|e| e.starts_with("M-P")));

        // Free bases in order of appearance, then neutral base losses
        assert!(ions.iter().any(|e| e.starts_with("G(-1):")));
        assert!(ions.iter().any(|e| e.starts_with("A(-1):")));
        assert!(value_of(&ions, "M-G(-1)").is_some());
        // Charge 1 precursors have no charged losses
        assert!(!ions.iter().any(|e| e.contains("(-0)")));
    }

    #[test]
    fn test_phosphate_and_cyclic_losses() {
        let p = product("GAU", FivePrimeEnd::Hydroxyl, ThreePrimeEnd::Phosphate);
        let ions = run(&p, 2, &config(Vec::new()));
        assert!(value_of(&ions, "M-P(-2)").is_some());
        assert!(value_of(&ions, "M-H2O-P(-2)").is_some());
        assert!(value_of(&ions, "M-P(-1)").is_some());
        assert!(value_of(&ions, "M-P-G(-2)").is_some());

        let p = product("GAU", FivePrimeEnd::Hydroxyl, ThreePrimeEnd::CyclicPhosphate);
        let ions = run(&p, 2, &config(Vec::new()));
        assert!(value_of(&ions, "M-P(-1)").is_some());
        assert!(value_of(&ions, "M-P(-2)").is_none());
        assert!(value_of(&ions, "M-P-U(-1)").is_some());
        assert!(value_of(&ions, "M-G-U(-2)").is_some());
        // The 3'-terminal base only appears once in the sequence
        assert!(value_of(&ions, "M-U-U(-2)").is_none());
    }

    #[test]
    fn test_dephosphorylated_series() {
        let p = product("GAU", FivePrimeEnd::Hydroxyl, ThreePrimeEnd::Phosphate);
        let ions = run(&p, 2, &config(vec![CidIon::Y, CidIon::YDephospho]));
        let y1 = value_of(&ions, "y1(-1)").unwrap();
        let y1p = value_of(&ions, "y1-P(-1)").unwrap();
        // Loss of HPO3
        assert!((y1 - y1p - 79.96633).abs() < 1e-4);

        // Without a 3' phosphate there is no y-P series
        let p = product("GAU", FivePrimeEnd::Hydroxyl, ThreePrimeEnd::Hydroxyl);
        let ions = run(&p, 2, &config(vec![CidIon::YDephospho]));
        assert!(!ions.iter().any(|e| e.starts_with('y')));
    }

    #[test]
    fn test_positive_mode_corrections() {
        let mut cfg = config(Vec::new());
        cfg.ion_mode = IonMode::Positive;
        let p = product("GAU", FivePrimeEnd::Hydroxyl, ThreePrimeEnd::Phosphate);
        let ions = run(&p, 2, &cfg);

        // Protonated free base: base + 2H
        let g = value_of(&ions, "G(+1)").unwrap();
        assert!((g - 152.05723483).abs() < 1e-6);

        // (M + 2H) - PO3 - 2H from the +2 precursor at 500.07573596
        let m_p = value_of(&ions, "M-P(+1)").unwrap();
        assert!((m_p - 919.17731601).abs() < 1e-6);

        let m_h2o = value_of(&ions, "M-H2O(+2)").unwrap();
        assert!((m_h2o - 491.07045362).abs() < 1e-6);
        assert!(!ions.iter().any(|e| e.contains("(-")));
    }

    #[test]
    fn test_fragment_charge_limited_by_precursor() {
        let p = product("GAUC", FivePrimeEnd::Hydroxyl, ThreePrimeEnd::Hydroxyl);
        let ions = run(&p, 2, &config(vec![CidIon::C]));
        assert!(value_of(&ions, "c3(-2)").is_some());
        assert!(ions.iter().all(|e| !e.contains("(-3)")));
    }

    #[test]
    fn test_window_filters_ladders_not_free_bases() {
        let mut cfg = config(vec![CidIon::C]);
        cfg.window = MzWindow::new(500.0, 2000.0).unwrap();
        let p = product("GA", FivePrimeEnd::Hydroxyl, ThreePrimeEnd::Hydroxyl);
        let ions = run(&p, 1, &cfg);
        assert!(value_of(&ions, "c1(-1)").is_none());
        assert!(ions.iter().any(|e| e.starts_with("G(-1):")));
    }
}
