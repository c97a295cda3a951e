//! Canonical public data serialization.
//!
//! Each field is written most significant bit first and fields are
//! concatenated in a fixed order. In-circuit fields are held as little-endian
//! bit vectors, so the projection is [`flatten_reverse`]. Off-circuit the same
//! bytes are reconstructed from plaintext with [`PublicDataWriter`].

use ark_bn254::Fr;
use ark_ff::PrimeField;

use crate::gadgets::bits::field_bit;

/// Bytes packed into one public input field element.
pub const CHUNK_BYTES: usize = 31;

/// Reverses every field and concatenates them.
pub fn flatten_reverse<T: Clone>(fields: &[&[T]]) -> Vec<T> {
    fields
        .iter()
        .flat_map(|field| field.iter().rev().cloned())
        .collect()
}

/// Packs MSB-first bits into bytes. A trailing partial byte is zero padded.
pub fn bits_to_bytes(bits: &[bool]) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |byte, (i, bit)| byte | (u8::from(*bit) << (7 - i)))
        })
        .collect()
}

/// Public inputs committing to public data: consecutive big-endian chunks of
/// [`CHUNK_BYTES`] bytes.
pub fn to_field_elements(bytes: &[u8]) -> Vec<Fr> {
    bytes
        .chunks(CHUNK_BYTES)
        .map(Fr::from_be_bytes_mod_order)
        .collect()
}

/// Builds public data from plaintext values.
#[derive(Clone, Debug, Default)]
pub struct PublicDataWriter {
    bits: Vec<bool>,
}

impl PublicDataWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Low `num_bits` bits of the canonical value of `value`.
    pub fn push_field(&mut self, value: Fr, num_bits: usize) -> &mut Self {
        self.bits
            .extend((0..num_bits).rev().map(|i| field_bit(value, i)));
        self
    }

    pub fn push_uint(&mut self, value: u128, num_bits: usize) -> &mut Self {
        self.bits
            .extend((0..num_bits).rev().map(|i| i < 128 && (value >> i) & 1 == 1));
        self
    }

    pub fn push_bool(&mut self, bit: bool) -> &mut Self {
        self.bits.push(bit);
        self
    }

    pub fn push_zeros(&mut self, num_bits: usize) -> &mut Self {
        self.bits.extend(std::iter::repeat_n(false, num_bits));
        self
    }

    pub fn num_bits(&self) -> usize {
        self.bits.len()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        bits_to_bytes(&self.bits)
    }
}
