//! Deployment parameters.
//!
//! Widths are fixed per deployment: changing any of them changes both the
//! constraint system and the public data layout.

use keyroll_config::KeyrollConfig;

use crate::constants::{
    FIELD_BITS, MAX_ACCOUNT_BITS, MAX_ADDRESS_BITS, MAX_AMOUNT_BITS, MAX_NONCE_BITS,
    SIGN_PADDING_BITS, TOKEN_FIELD_BITS,
};
use crate::errors::ParamsError;
use crate::float::{Accuracy, FloatEncoding};

/// Float values are handled as `u32` off-circuit.
const MAX_FLOAT_BITS: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Params {
    /// Published alongside the verifying key. Zero is reserved.
    pub format_version: u32,
    pub address_bits: usize,
    pub account_bits: usize,
    pub nonce_bits: usize,
    pub token_bits: usize,
    pub amount_bits: usize,
    pub float: FloatEncoding,
    pub accuracy: Accuracy,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            format_version: 1,
            address_bits: 160,
            account_bits: 32,
            nonce_bits: 32,
            token_bits: 12,
            amount_bits: 96,
            float: FloatEncoding::FLOAT16,
            accuracy: Accuracy::FLOAT16,
        }
    }
}

fn check_width(field: &'static str, bits: usize, max: usize) -> Result<(), ParamsError> {
    if bits == 0 || bits > max {
        return Err(ParamsError::InvalidWidth { field, bits, max });
    }
    Ok(())
}

impl Params {
    /// Rejects parameter sets that would produce an unsound or
    /// incomplete circuit.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.format_version == 0 {
            return Err(ParamsError::InvalidFormatVersion);
        }
        check_width("address_bits", self.address_bits, MAX_ADDRESS_BITS)?;
        check_width("account_bits", self.account_bits, MAX_ACCOUNT_BITS)?;
        check_width("nonce_bits", self.nonce_bits, MAX_NONCE_BITS)?;
        check_width("token_bits", self.token_bits, TOKEN_FIELD_BITS)?;
        check_width("amount_bits", self.amount_bits, MAX_AMOUNT_BITS)?;
        check_width("exponent_bits", self.float.exponent_bits, 8)?;
        check_width(
            "mantissa_bits",
            self.float.mantissa_bits,
            MAX_FLOAT_BITS - self.float.exponent_bits,
        )?;

        if self.float.base < 2 {
            return Err(ParamsError::InvalidBase(self.float.base));
        }

        let Accuracy {
            numerator,
            denominator,
        } = self.accuracy;
        if denominator == 0 || numerator > denominator {
            return Err(ParamsError::InvalidAccuracy {
                numerator,
                denominator,
            });
        }

        // Scaled float values must fit a u128, which also keeps them far
        // below the field modulus.
        self.float
            .max_value()
            .and_then(|v| v.checked_mul(u128::from(denominator)))
            .ok_or(ParamsError::FloatTooWide)?;

        // Every amount must be encodable:
        // 2^amount_bits - 1 < (max_mantissa + 1) * base^max_exponent
        let ceiling = u128::from(self.float.base)
            .checked_pow(self.float.max_exponent())
            .and_then(|p| p.checked_mul(self.float.max_mantissa() + 1));
        if let Some(ceiling) = ceiling {
            if ceiling < (1u128 << self.amount_bits) {
                return Err(ParamsError::FloatRangeTooSmall {
                    amount_bits: self.amount_bits,
                });
            }
        }

        // Once the exponent is non-zero the mantissa is at least
        // (max_mantissa + 1) / base, so the worst ratio is m / (m + 1).
        let min_mantissa = (self.float.max_mantissa() + 1) / u128::from(self.float.base);
        if min_mantissa * u128::from(denominator) < u128::from(numerator) * (min_mantissa + 1) {
            return Err(ParamsError::AccuracyUnreachable {
                mantissa_bits: self.float.mantissa_bits,
                numerator,
                denominator,
            });
        }

        Ok(())
    }

    /// Zero bits in front of the token id in public data.
    pub fn token_padding_bits(&self) -> usize {
        TOKEN_FIELD_BITS.saturating_sub(self.token_bits)
    }

    /// Public data size of one transaction slot.
    pub fn public_data_bits(&self) -> usize {
        self.address_bits
            + self.account_bits
            + self.nonce_bits
            + 1
            + SIGN_PADDING_BITS
            + FIELD_BITS
            + TOKEN_FIELD_BITS
            + self.float.num_bits()
    }

    pub fn public_data_bytes(&self) -> usize {
        self.public_data_bits().div_ceil(8)
    }
}

impl TryFrom<&KeyrollConfig> for Params {
    type Error = ParamsError;

    fn try_from(config: &KeyrollConfig) -> Result<Self, Self::Error> {
        let width = |bits: u32| usize::try_from(bits).unwrap_or(usize::MAX);
        let params = Self {
            format_version: config.circuit.format_version,
            address_bits: width(config.circuit.address_bits),
            account_bits: width(config.circuit.account_bits),
            nonce_bits: width(config.circuit.nonce_bits),
            token_bits: width(config.circuit.token_bits),
            amount_bits: width(config.circuit.amount_bits),
            float: FloatEncoding {
                exponent_bits: width(config.float.exponent_bits),
                mantissa_bits: width(config.float.mantissa_bits),
                base: config.float.exponent_base,
            },
            accuracy: Accuracy {
                numerator: config.float.accuracy_numerator,
                denominator: config.float.accuracy_denominator,
            },
        };
        params.validate()?;
        Ok(params)
    }
}
