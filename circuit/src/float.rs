//! Compact floating point encoding for amounts.
//!
//! ```text
//! | exponent (high bits) | mantissa (low bits) |   value = mantissa * base^exponent
//! ```
//!
//! Encoding always rounds down, so a decoded amount never exceeds the
//! original. [`Accuracy`] bounds how far below the original it may land.

/// Bit split and base of the float format
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FloatEncoding {
    pub exponent_bits: usize,
    pub mantissa_bits: usize,
    pub base: u32,
}

impl FloatEncoding {
    /// 5 exponent bits, 11 mantissa bits, base 10.
    pub const FLOAT16: Self = Self {
        exponent_bits: 5,
        mantissa_bits: 11,
        base: 10,
    };

    pub const fn num_bits(&self) -> usize {
        self.exponent_bits + self.mantissa_bits
    }

    pub fn max_exponent(&self) -> u32 {
        (1u32 << self.exponent_bits) - 1
    }

    pub fn max_mantissa(&self) -> u128 {
        (1u128 << self.mantissa_bits) - 1
    }

    /// Largest decodable value, `None` if it does not fit in a `u128`.
    pub fn max_value(&self) -> Option<u128> {
        u128::from(self.base)
            .checked_pow(self.max_exponent())?
            .checked_mul(self.max_mantissa())
    }

    /// Encodes `value`, rounding down. Returns `None` if the value needs a
    /// larger exponent than the format holds.
    pub fn encode(&self, value: u128) -> Option<u32> {
        let base = u128::from(self.base);
        let max_mantissa = self.max_mantissa();

        let mut exponent = 0u32;
        let mut scale = 1u128;
        while value / scale > max_mantissa {
            exponent += 1;
            if exponent > self.max_exponent() {
                return None;
            }
            scale = scale.checked_mul(base)?;
        }

        let mantissa = u32::try_from(value / scale).ok()?;
        Some((exponent << self.mantissa_bits) | mantissa)
    }

    /// Decodes a float. Returns `None` if `float` has bits above the format
    /// width or the value overflows.
    pub fn decode(&self, float: u32) -> Option<u128> {
        if u64::from(float) >> self.num_bits() != 0 {
            return None;
        }
        let mantissa = u128::from(float) & self.max_mantissa();
        let exponent = float >> self.mantissa_bits;
        u128::from(self.base)
            .checked_pow(exponent)?
            .checked_mul(mantissa)
    }
}

impl Default for FloatEncoding {
    fn default() -> Self {
        Self::FLOAT16
    }
}

/// Minimum ratio `numerator / denominator` between a decoded and an original
/// amount.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Accuracy {
    pub numerator: u32,
    pub denominator: u32,
}

impl Accuracy {
    /// At most 0.5% below the original.
    pub const FLOAT16: Self = Self {
        numerator: 995,
        denominator: 1000,
    };

    /// `decoded <= original` and `original * N <= decoded * D`.
    pub fn check(&self, decoded: u128, original: u128) -> bool {
        if decoded > original {
            return false;
        }
        let lhs = original.checked_mul(u128::from(self.numerator));
        let rhs = decoded.checked_mul(u128::from(self.denominator));
        match (lhs, rhs) {
            (Some(lhs), Some(rhs)) => lhs <= rhs,
            _ => false,
        }
    }

    /// Bits needed to hold the denominator.
    pub fn num_bits(&self) -> usize {
        (u32::BITS - self.denominator.leading_zeros()) as usize
    }
}

impl Default for Accuracy {
    fn default() -> Self {
        Self::FLOAT16
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ENC: FloatEncoding = FloatEncoding::FLOAT16;

    #[test]
    fn test_zero_is_exact() {
        let f = ENC.encode(0).unwrap();
        assert_eq!(f, 0);
        assert_eq!(ENC.decode(f), Some(0));
    }

    #[test]
    fn test_small_values_are_exact() {
        for value in [1u128, 7, 1000, 2047] {
            let f = ENC.encode(value).unwrap();
            assert_eq!(ENC.decode(f), Some(value));
        }
    }

    #[test]
    fn test_rounds_down() {
        // 2048 needs exponent 1: mantissa 204, value 2040
        let f = ENC.encode(2048).unwrap();
        assert_eq!(f, (1 << 11) | 204);
        assert_eq!(ENC.decode(f), Some(2040));
        assert!(Accuracy::FLOAT16.check(2040, 2048));
    }

    #[test]
    fn test_max_amount_is_encodable() {
        let max = (1u128 << 96) - 1;
        let f = ENC.encode(max).unwrap();
        let decoded = ENC.decode(f).unwrap();
        assert!(decoded <= max);
        assert!(Accuracy::FLOAT16.check(decoded, max));
    }

    #[test]
    fn test_out_of_range() {
        let max = ENC.max_value().unwrap();
        assert!(ENC.encode(max).is_some());
        assert!(ENC.encode(u128::MAX).is_none());
        assert!(ENC.decode(1 << 16).is_none());
    }

    #[test]
    fn test_accuracy_rejects_rounding_up() {
        assert!(!Accuracy::FLOAT16.check(1001, 1000));
        assert!(!Accuracy::FLOAT16.check(994, 1000));
        assert!(Accuracy::FLOAT16.check(995, 1000));
        assert_eq!(Accuracy::FLOAT16.num_bits(), 10);
    }

    proptest! {
        #[test]
        fn prop_accuracy_holds_over_amount_width(value in 0u128..(1u128 << 96)) {
            let f = ENC.encode(value).unwrap();
            let decoded = ENC.decode(f).unwrap();
            prop_assert!(decoded <= value);
            prop_assert!(Accuracy::FLOAT16.check(decoded, value));
        }

        #[test]
        fn prop_encoding_is_idempotent(value in 0u128..(1u128 << 96)) {
            let decoded = ENC.decode(ENC.encode(value).unwrap()).unwrap();
            prop_assert_eq!(ENC.decode(ENC.encode(decoded).unwrap()), Some(decoded));
        }
    }
}
