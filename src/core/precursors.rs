// precursors.rs - MS1 precursor ions and the precursor list handed to MS2

use std::fmt;
use serde::{Deserialize, Serialize};
use crate::core::digestion::DigestProduct;
use crate::core::mass::{mz, IonMode, MassTable};
use crate::data::ChargeTable;

/// m/z interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MzWindow {
    pub low: f64,
    pub high: f64,
}

impl MzWindow {
    pub fn new(low: f64, high: f64) -> Result<Self, String> {
        if !(low >= 0.0 && high > low) {
            return Err(format!("Invalid m/z window {}-{}", low, high));
        }
        Ok(Self { low, high })
    }

    /// Bounds excluded, as for MS1 precursors
    pub fn contains_exclusive(&self, value: f64) -> bool {
        self.low < value && value < self.high
    }

    /// Bounds included, as for MS2 ions
    pub fn contains(&self, value: f64) -> bool {
        self.low <= value && value <= self.high
    }
}

/// Isotopic form of a precursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Isotope {
    Light,
    Heavy,
}

impl fmt::Display for Isotope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light => write!(f, "light"),
            Self::Heavy => write!(f, "heavy"),
        }
    }
}

/// One charge state of a digestion product in the MS1 digest
#[derive(Debug, Clone)]
pub struct Ms1Ion<'a> {
    pub product: &'a DigestProduct,
    pub charge: u32,
    pub mz_light: f64,
    pub mz_heavy: Option<f64>,
}

/// One isotope and charge state selected for fragmentation
#[derive(Debug, Clone)]
pub struct Ms2Precursor<'a> {
    pub product: &'a DigestProduct,
    pub isotope: Isotope,
    pub charge: u32,
    pub mz: f64,
}

/// Masses for light and optionally heavy isotopes
pub struct PrecursorCalculator<'a> {
    pub light: &'a MassTable,
    pub heavy: Option<&'a MassTable>,
    pub ion_mode: IonMode,
    pub charges: &'a ChargeTable,
}

impl<'a> PrecursorCalculator<'a> {
    fn neutral_masses(&self, product: &DigestProduct) -> Result<(f64, Option<f64>), String> {
        let light = self
            .light
            .neutral_mass(&product.sequence, product.five_prime, product.three_prime)?;
        let heavy = match self.heavy {
            Some(table) => Some(table.neutral_mass(&product.sequence, product.five_prime, product.three_prime)?),
            None => None,
        };
        Ok((light, heavy))
    }

    /// Precursor ions of every product kept when the light m/z lies strictly inside the window
    pub fn ms1_ions<'p>(
        &self,
        products: &'p [DigestProduct],
        window: MzWindow,
    ) -> Result<Vec<Ms1Ion<'p>>, String> {
        let mut ions = Vec::new();
        for product in products {
            let (light, heavy) = self.neutral_masses(product)?;
            for &charge in self.charges.charges_for(product.len()) {
                let mz_light = mz(light, charge, self.ion_mode);
                if !window.contains_exclusive(mz_light) {
                    continue;
                }
                ions.push(Ms1Ion {
                    product,
                    charge,
                    mz_light,
                    mz_heavy: heavy.map(|h| mz(h, charge, self.ion_mode)),
                });
            }
        }
        Ok(ions)
    }

    /// Precursors long enough for fragmentation, taken from the MS1 ions.
    ///
    /// A charge state is only considered when it made it into the MS1 digest
    /// (light m/z strictly inside the window); each isotopic form is then kept
    /// when its own m/z lies inside the window, bounds included.
    pub fn ms2_precursors<'p>(
        &self,
        products: &'p [DigestProduct],
        window: MzWindow,
        min_length: usize,
    ) -> Result<Vec<Ms2Precursor<'p>>, String> {
        let mut precursors = Vec::new();
        for ion in self.ms1_ions(products, window)? {
            if ion.product.len() < min_length {
                continue;
            }
            let forms = std::iter::once((Isotope::Light, ion.mz_light))
                .chain(ion.mz_heavy.map(|h| (Isotope::Heavy, h)));
            for (isotope, value) in forms {
                if window.contains(value) {
                    precursors.push(Ms2Precursor {
                        product: ion.product,
                        isotope,
                        charge: ion.charge,
                        mz: value,
                    });
                }
            }
        }
        Ok(precursors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chem::elements::{N, N15};
    use crate::chem::{NucleotideAlphabet, NucleotideEntry};
    use crate::core::mass::{FivePrimeEnd, ThreePrimeEnd};

    fn product(sequence: &str) -> DigestProduct {
        DigestProduct {
            molecule: "m1".to_string(),
            start: 1,
            end: sequence.len(),
            missed: 0,
            sequence: sequence.to_string(),
            sequence_mod: sequence.to_string(),
            five_prime: FivePrimeEnd::Hydroxyl,
            three_prime: ThreePrimeEnd::Hydroxyl,
            locations: vec![format!("m1:1-{}", sequence.len())],
            decoy: false,
        }
    }

    #[test]
    fn test_window_bounds() {
        let w = MzWindow::new(400.0, 2000.0).unwrap();
        assert!(!w.contains_exclusive(400.0));
        assert!(w.contains(400.0));
        assert!(w.contains_exclusive(1999.9));
        assert!(MzWindow::new(500.0, 100.0).is_err());
    }

    #[test]
    fn test_ms1_ions() {
        let light = MassTable::from_alphabet(&NucleotideAlphabet::standard());
        let charges = ChargeTable::parse("2 1,2\n").unwrap();
        let calc = PrecursorCalculator {
            light: &light,
            heavy: None,
            ion_mode: IonMode::Negative,
            charges: &charges,
        };
        let products = vec![product("GA"), product("GAU")];

        // GA: -1 at 611.136, -2 at 305.065; GAU has no charges in the table
        let ions = calc.ms1_ions(&products, MzWindow::new(400.0, 2000.0).unwrap()).unwrap();
        assert_eq!(ions.len(), 1);
        assert_eq!(ions[0].charge, 1);
        assert!((ions[0].mz_light - 611.13636).abs() < 1e-4);
        assert!(ions[0].mz_heavy.is_none());
    }

    #[test]
    fn test_ms2_precursors_with_heavy() {
        let light = MassTable::from_alphabet(&NucleotideAlphabet::standard());
        let heavy = light.clone();
        let charges = ChargeTable::parse("2 1\n3 1\n").unwrap();
        let calc = PrecursorCalculator {
            light: &light,
            heavy: Some(&heavy),
            ion_mode: IonMode::Negative,
            charges: &charges,
        };
        let products = vec![product("GA"), product("GAU")];
        let precursors = calc
            .ms2_precursors(&products, MzWindow::new(300.0, 2000.0).unwrap(), 3)
            .unwrap();

        assert_eq!(precursors.len(), 2);
        assert_eq!(precursors[0].product.sequence, "GAU");
        assert_eq!(precursors[0].isotope, Isotope::Light);
        assert_eq!(precursors[1].isotope, Isotope::Heavy);
        assert_eq!(Isotope::Heavy.to_string(), "heavy");
    }

    #[test]
    fn test_heavy_precursor_requires_light_ms1_ion() {
        let standard = NucleotideAlphabet::standard();
        let labelled: Vec<NucleotideEntry> = standard
            .entries()
            .iter()
            .map(|e| {
                let mut e = e.clone();
                e.base.n15 = e.base.n;
                e.base.n = 0.0;
                e
            })
            .collect();
        let light = MassTable::from_alphabet(&standard);
        let heavy = MassTable::from_alphabet(&NucleotideAlphabet::from_entries("15N", labelled).unwrap());
        let charges = ChargeTable::parse("3 1\n").unwrap();
        let calc = PrecursorCalculator {
            light: &light,
            heavy: Some(&heavy),
            ion_mode: IonMode::Negative,
            charges: &charges,
        };
        let products = vec![product("GAU")];
        let light_mz = mz(
            light.neutral_mass("GAU", FivePrimeEnd::Hydroxyl, ThreePrimeEnd::Hydroxyl).unwrap(),
            1,
            IonMode::Negative,
        );

        // Light ion just below the window: no MS1 row, so no heavy MS2 precursor either
        let above_light = MzWindow::new(light_mz + 1.0, 2000.0).unwrap();
        assert!(calc.ms1_ions(&products, above_light).unwrap().is_empty());
        assert!(calc.ms2_precursors(&products, above_light, 3).unwrap().is_empty());

        let wide = MzWindow::new(light_mz - 1.0, 2000.0).unwrap();
        let precursors = calc.ms2_precursors(&products, wide, 3).unwrap();
        assert_eq!(precursors.len(), 2);
        assert!((precursors[1].mz - precursors[0].mz - 12.0 * (N15 - N)).abs() < 1e-9);
    }
}
