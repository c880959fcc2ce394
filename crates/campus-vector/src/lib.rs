//! # campus-vector
//!
//! Lossy fixed-width encoding for user embeddings.
//!
//! Embeddings arrive as `D` floats (D = `Settings::vector_dim`) and are
//! stored as `D` signed bytes: the input is renormalized to unit length
//! when it is off by more than `1e-6`, then every component is mapped to
//! `round(v * 127)` clamped to `[-127, 127]`. Decoding divides by 127.
//!
//! ## Features
//! - [`VectorCodec`]: stateless encode/decode bound to a dimension
//! - [`QuantizedVector`]: the persisted `{id, dim, data}` record
//! - [`VectorStore`]: seam to the storage collaborator, with an in-memory implementation
//! - [`VectorService`]: create-from-floats / attach-by-id workflow used by user management

pub mod codec;
pub mod error;
pub mod quantized;
pub mod service;
pub mod store;

pub use codec::{dequantize, quantize_component, VectorCodec, QUANT_SCALE, RENORM_TOLERANCE};
pub use error::VectorError;
pub use quantized::QuantizedVector;
pub use service::{VectorService, VectorSource};
pub use store::{InMemoryVectorStore, VectorStore};
