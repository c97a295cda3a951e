//! Baby Jubjub helpers used outside the circuit.
//!
//! Account keys live on the twisted Edwards curve
//! `a*x^2 + y^2 = 1 + d*x^2*y^2` embedded in the BN254 scalar field. A key is
//! published compressed as `(sign, y)` where `sign` is set iff `-x < x` when
//! both are read as canonical integers.

use ark_bn254::Fr;
use ark_ec::twisted_edwards::TECurveConfig;
use ark_ed_on_bn254::EdwardsConfig;
use ark_ff::{Field, One};

/// Twisted Edwards coefficients
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurveParams {
    pub a: Fr,
    pub d: Fr,
}

impl CurveParams {
    pub fn baby_jubjub() -> Self {
        Self {
            a: EdwardsConfig::COEFF_A,
            d: EdwardsConfig::COEFF_D,
        }
    }

    pub fn is_on_curve(&self, x: Fr, y: Fr) -> bool {
        let x2 = x.square();
        let y2 = y.square();
        self.a * x2 + y2 == Fr::one() + self.d * x2 * y2
    }

    /// Recovers `x` from a compressed key. `None` if no point has this `y`,
    /// or if `sign` is set for the single point with `x = 0`.
    pub fn decompress(&self, sign: bool, y: Fr) -> Option<(Fr, Fr)> {
        let y2 = y.square();
        let denominator = (self.a - self.d * y2).inverse()?;
        let x2 = (Fr::one() - y2) * denominator;
        let root = x2.sqrt()?;
        let x = if sign_bit(root) == sign { root } else { -root };
        (sign_bit(x) == sign).then_some((x, y))
    }
}

impl Default for CurveParams {
    fn default() -> Self {
        Self::baby_jubjub()
    }
}

/// Compression sign bit of an x coordinate.
pub fn sign_bit(x: Fr) -> bool {
    -x < x
}

pub fn compress(x: Fr, y: Fr) -> (bool, Fr) {
    (sign_bit(x), y)
}
