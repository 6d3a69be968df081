// elements.rs - Monoisotopic element masses and elemental compositions

use serde::{Deserialize, Serialize};

pub const C: f64 = 12.0000000;
pub const H: f64 = 1.007825032;
pub const N: f64 = 14.0030740044;
pub const O: f64 = 15.9949146196;
pub const S: f64 = 31.9720711744;
pub const P: f64 = 30.9737619984;
pub const SE: f64 = 79.9165218;
pub const F: f64 = 18.998403163;
pub const H2: f64 = 2.0141017781;
pub const C13: f64 = 13.0033548351;
pub const N15: f64 = 15.0001088989;
pub const O18: f64 = 17.9991596128;

/// Atom counts for one chemical group
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementalComposition {
    pub c: f64,
    pub h: f64,
    pub n: f64,
    pub o: f64,
    pub s: f64,
    pub p: f64,
    pub se: f64,
    pub f: f64,
    pub h2: f64,
    pub c13: f64,
    pub n15: f64,
    pub o18: f64,
}

impl ElementalComposition {
    /// Composition with only the common organic elements
    pub fn chnop(c: f64, h: f64, n: f64, o: f64, p: f64) -> Self {
        Self {
            c,
            h,
            n,
            o,
            p,
            ..Self::default()
        }
    }

    /// Monoisotopic mass of the group
    pub fn mass(&self) -> f64 {
        self.c * C
            + self.h * H
            + self.n * N
            + self.o * O
            + self.s * S
            + self.p * P
            + self.se * SE
            + self.f * F
            + self.h2 * H2
            + self.c13 * C13
            + self.n15 * N15
            + self.o18 * O18
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composition_mass() {
        // Water
        let water = ElementalComposition {
            h: 2.0,
            o: 1.0,
            ..Default::default()
        };
        assert!((water.mass() - 18.0105646837).abs() < 1e-9);

        // Adenine as a base substituent, C5H4N5
        let adenine = ElementalComposition::chnop(5.0, 4.0, 5.0, 0.0, 0.0);
        assert!((adenine.mass() - 134.04667015).abs() < 1e-6);

        // Labelled isotopes shift the mass by their own weight
        let labelled = ElementalComposition {
            n15: 5.0,
            ..ElementalComposition::chnop(5.0, 4.0, 0.0, 0.0, 0.0)
        };
        assert!((labelled.mass() - adenine.mass() - 5.0 * (N15 - N)).abs() < 1e-9);
    }
}
