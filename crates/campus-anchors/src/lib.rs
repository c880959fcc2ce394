//! # campus-anchors
//!
//! Anchor catalog for the campus backend.
//!
//! Anchors are meeting-point templates defined as YAML documents, one per
//! file, in a single directory. "Ghost" anchors are ad-hoc join templates
//! with a join window and a notification template; normal anchors carry a
//! fixed group size range.
//!
//! ## Features
//! - [`AnchorDocument`]: schema with kind-dependent required fields
//! - [`AnchorLoader`]: all-or-nothing directory load with vector file checks
//! - [`AnchorCatalog`]: atomically swapped snapshot of normal + ghost anchors
//! - [`views`]: summary/detail response shapes with lazy instructions HTML
//!
//! ## Usage
//!
//! ```rust,no_run
//! use campus_anchors::{AnchorCatalog, LoaderOptions};
//!
//! let catalog = AnchorCatalog::new("data/anchors", LoaderOptions::new(128));
//! catalog.reload().expect("anchor documents are valid");
//! for anchor in catalog.list_ghosts() {
//!     println!("{} ({}-{})", anchor.slug, anchor.meta.min_size, anchor.meta.max_size);
//! }
//! ```

pub mod anchor;
pub mod catalog;
pub mod document;
pub mod error;
pub mod loader;
pub mod views;

pub use anchor::{
    Anchor, AnchorMeta, DEFAULT_NOTIFY_TEMPLATE, GHOST_DEFAULT_JOIN_WINDOW_MIN,
    GHOST_DEFAULT_MAX_SIZE, GHOST_DEFAULT_MIN_SIZE,
};
pub use catalog::{AnchorCatalog, CatalogSnapshot};
pub use document::{AnchorDocument, AnchorKind, SizeRange, VectorRefs};
pub use error::{AnchorError, DimensionCheck};
pub use loader::{AnchorLoader, LoadedAnchors, LoaderOptions, DOCUMENT_EXTENSIONS};
pub use views::{
    read_instructions_html, AnchorDetail, AnchorSummary, DetailOptions, InstructionsResolver,
};
