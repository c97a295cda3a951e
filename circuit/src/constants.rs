use ark_bn254::Fr;
use ark_ff::PrimeField;

/// Bits in a canonical decomposition of a BN254 scalar field element.
pub const FIELD_BITS: usize = Fr::MODULUS_BIT_SIZE as usize;

/// Token ids are zero-padded to this many bits in public data.
pub const TOKEN_FIELD_BITS: usize = 16;

/// Zero padding between the compression sign bit and the Y coordinate.
pub const SIGN_PADDING_BITS: usize = 1;

/// Width limits implied by the off-circuit integer types.
pub const MAX_ADDRESS_BITS: usize = 160;
pub const MAX_ACCOUNT_BITS: usize = 32;
pub const MAX_NONCE_BITS: usize = 64;
pub const MAX_AMOUNT_BITS: usize = 120;
