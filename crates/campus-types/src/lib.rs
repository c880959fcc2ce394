//! # campus-types
//!
//! Shared types for the campus backend.
//!
//! - [`Settings`]: layered process configuration (defaults, config file, env vars)
//! - [`Env`]: deployment environment, drives the default log level
//! - [`CampusError`]: configuration errors shared across crates
//!
//! ## Usage
//!
//! ```rust,no_run
//! use campus_types::Settings;
//!
//! let settings = Settings::load(None).expect("config");
//! assert!(settings.vector_dim > 0);
//! ```

pub mod config;
pub mod error;

pub use crate::config::{Env, Settings, DEFAULT_VECTOR_DIM};
pub use crate::error::CampusError;
