//! Output score encoding: precision narrowing and mantissa truncation.

use half::f16;

use crate::config::Precision;

/// Keeps the top `bits` mantissa bits of `score`, zeroing the rest.
///
/// `bits` must already be validated to `0..=22`. Truncation is a pure bit
/// mask, so equal inputs always encode equally.
pub(crate) fn truncate_mantissa(score: f32, bits: u8) -> f32 {
    debug_assert!(bits <= 22);
    let drop = 23 - u32::from(bits);
    let mask = !((1u32 << drop) - 1);
    f32::from_bits(score.to_bits() & mask)
}

/// Encodes a valid detection score for output.
///
/// Mantissa truncation (when configured) is applied first, then fp16 mode
/// rounds the value through `half::f16` so the output matches what a
/// half-precision consumer would read back.
pub(crate) fn encode_score(score: f32, precision: Precision, score_bits: Option<u8>) -> f32 {
    let score = match score_bits {
        Some(bits) => truncate_mantissa(score, bits),
        None => score,
    };
    match precision {
        Precision::Fp32 => score,
        Precision::Fp16 => f16::from_f32(score).to_f32(),
    }
}
