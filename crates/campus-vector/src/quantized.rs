//! Persisted quantized vector record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::codec::dequantize;
use crate::error::VectorError;

/// A stored embedding: `dim` signed bytes packed contiguously.
///
/// Immutable once created. Owners reference it by `id`; deleting an owner
/// does not delete the vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantizedVector {
    /// Storage-assigned identifier
    pub id: u64,
    /// Number of components; always equal to `data.len()`
    dim: usize,
    /// One byte per dimension, each an `i8`
    data: Vec<u8>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl QuantizedVector {
    /// Build a record, enforcing `data.len() == dim`.
    pub fn new(id: u64, dim: usize, data: Vec<u8>) -> Result<Self, VectorError> {
        if data.len() != dim {
            return Err(VectorError::PackedLengthMismatch {
                expected: dim,
                actual: data.len(),
            });
        }
        Ok(Self {
            id,
            dim,
            data,
            created_at: Utc::now(),
        })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Signed view of the stored components.
    pub fn components(&self) -> impl Iterator<Item = i8> + '_ {
        self.data.iter().map(|&b| b as i8)
    }

    /// Approximate float reconstruction (`component / 127`).
    pub fn to_floats(&self) -> Vec<f32> {
        dequantize(&self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_checks_length() {
        assert!(QuantizedVector::new(1, 3, vec![0, 1, 2]).is_ok());
        let err = QuantizedVector::new(1, 4, vec![0, 1, 2]).unwrap_err();
        assert!(err.is_internal());
    }

    #[test]
    fn test_components_are_signed() {
        let v = QuantizedVector::new(7, 3, vec![127, 0x81, 0]).unwrap();
        let comps: Vec<i8> = v.components().collect();
        assert_eq!(comps, vec![127, -127, 0]);
        assert_eq!(v.to_floats(), vec![1.0, -1.0, 0.0]);
    }

    #[test]
    fn test_serialization() {
        let v = QuantizedVector::new(2, 2, vec![1, 2]).unwrap();
        let json = serde_json::to_string(&v).unwrap();
        let decoded: QuantizedVector = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, v);
    }
}
