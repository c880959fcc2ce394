//! Signed 8-bit embedding codec.
//!
//! Encoding is lossy: each component of the unit-normalized input is
//! stored as `round(v * 127)` in `[-127, 127]`, so the per-component
//! round-trip error is at most `0.5 / 127`. `-128` is never produced.

use tracing::trace;

use crate::error::VectorError;

/// Quantization scale. 127 rather than 128 keeps the encoding symmetric.
pub const QUANT_SCALE: f32 = 127.0;

/// Inputs whose L2 norm is within this distance of 1.0 are not rescaled.
pub const RENORM_TOLERANCE: f64 = 1e-6;

/// Stateless codec bound to the configured embedding dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorCodec {
    dim: usize,
}

impl VectorCodec {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    pub fn from_settings(settings: &campus_types::Settings) -> Self {
        Self::new(settings.vector_dim)
    }

    /// Get the embedding dimension
    pub fn dimension(&self) -> usize {
        self.dim
    }

    /// Encode `dim` floats into `dim` signed bytes.
    ///
    /// Fails with `DimensionMismatch` on a wrong length, `NonFiniteComponent`
    /// on NaN/inf input and `DegenerateVector` on a zero vector.
    pub fn encode(&self, values: &[f32]) -> Result<Vec<u8>, VectorError> {
        if values.len() != self.dim {
            return Err(VectorError::DimensionMismatch {
                expected: self.dim,
                actual: values.len(),
            });
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(VectorError::NonFiniteComponent { index });
        }

        let norm = values
            .iter()
            .map(|&v| f64::from(v) * f64::from(v))
            .sum::<f64>()
            .sqrt();
        if norm == 0.0 {
            return Err(VectorError::DegenerateVector);
        }

        let divisor = if (norm - 1.0).abs() > RENORM_TOLERANCE {
            trace!(norm, "Renormalizing input vector");
            norm
        } else {
            1.0
        };

        let data: Vec<u8> = values
            .iter()
            .map(|&v| quantize_component(f64::from(v) / divisor) as u8)
            .collect();

        // 1 byte per dimension
        if data.len() != self.dim {
            return Err(VectorError::PackedLengthMismatch {
                expected: self.dim,
                actual: data.len(),
            });
        }
        Ok(data)
    }

    /// Decode `dim` signed bytes back to approximately unit-norm floats.
    pub fn decode(&self, data: &[u8]) -> Result<Vec<f32>, VectorError> {
        if data.len() != self.dim {
            return Err(VectorError::DimensionMismatch {
                expected: self.dim,
                actual: data.len(),
            });
        }
        Ok(dequantize(data))
    }
}

/// Quantize one already-normalized component.
///
/// Rounds half to even and clamps to `[-127, 127]`.
pub fn quantize_component(v: f64) -> i8 {
    let scaled = (v * f64::from(QUANT_SCALE)).round_ties_even();
    scaled.clamp(-127.0, 127.0) as i8
}

/// Reinterpret each byte as `i8` and divide by 127. No length check.
pub fn dequantize(data: &[u8]) -> Vec<f32> {
    data.iter()
        .map(|&b| f32::from(b as i8) / QUANT_SCALE)
        .collect()
}
