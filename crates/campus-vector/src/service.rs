//! Vector attachment workflow used by user management.
//!
//! A user either references an existing stored vector or supplies raw
//! floats that are encoded and stored on the spot.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::codec::VectorCodec;
use crate::error::VectorError;
use crate::quantized::QuantizedVector;
use crate::store::VectorStore;

/// Where a user's vector comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum VectorSource {
    /// Reference a vector that is already stored
    Existing(u64),
    /// Encode and store these floats
    Inline(Vec<f32>),
}

impl VectorSource {
    /// Combine the two optional request fields.
    ///
    /// Both set is an error; neither set yields `Ok(None)`.
    pub fn from_parts(
        vector_id: Option<u64>,
        values: Option<Vec<f32>>,
    ) -> Result<Option<Self>, VectorError> {
        match (vector_id, values) {
            (Some(_), Some(_)) => Err(VectorError::AmbiguousSource),
            (Some(id), None) => Ok(Some(VectorSource::Existing(id))),
            (None, Some(values)) => Ok(Some(VectorSource::Inline(values))),
            (None, None) => Ok(None),
        }
    }
}

/// Codec plus store, bound to the configured dimension.
pub struct VectorService<S: VectorStore> {
    codec: VectorCodec,
    store: Arc<S>,
}

impl<S: VectorStore> VectorService<S> {
    pub fn new(codec: VectorCodec, store: Arc<S>) -> Self {
        Self { codec, store }
    }

    pub fn codec(&self) -> &VectorCodec {
        &self.codec
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Encode `values` and persist the result.
    pub fn create_from_floats(&self, values: &[f32]) -> Result<QuantizedVector, VectorError> {
        let data = self.codec.encode(values)?;
        let dim = values.len();
        if data.len() != dim {
            return Err(VectorError::PackedLengthMismatch {
                expected: dim,
                actual: data.len(),
            });
        }
        let vector = self.store.insert(dim, data)?;
        debug!(vector_id = vector.id, dim, "Created vector from floats");
        Ok(vector)
    }

    /// Resolve a source to a stored vector with the configured dimension.
    pub fn resolve(&self, source: VectorSource) -> Result<QuantizedVector, VectorError> {
        match source {
            VectorSource::Existing(id) => {
                let vector = self.store.get(id)?.ok_or(VectorError::NotFound(id))?;
                if vector.dim() != self.codec.dimension() {
                    warn!(
                        vector_id = id,
                        stored = vector.dim(),
                        expected = self.codec.dimension(),
                        "Stored vector has stale dimension"
                    );
                    return Err(VectorError::DimensionMismatch {
                        expected: self.codec.dimension(),
                        actual: vector.dim(),
                    });
                }
                Ok(vector)
            }
            VectorSource::Inline(values) => self.create_from_floats(&values),
        }
    }

    /// Resolve when exactly one source is mandatory (attach-vector flow).
    pub fn resolve_required(
        &self,
        source: Option<VectorSource>,
    ) -> Result<QuantizedVector, VectorError> {
        self.resolve(source.ok_or(VectorError::MissingSource)?)
    }

    /// Approximate floats for a stored vector.
    pub fn decode(&self, vector: &QuantizedVector) -> Result<Vec<f32>, VectorError> {
        self.codec.decode(vector.data())
    }
}
