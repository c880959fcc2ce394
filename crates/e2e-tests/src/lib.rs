//! End-to-end test infrastructure for the campus backend.
//!
//! Provides a shared TestHarness and helper functions for E2E tests
//! covering the document-to-snapshot pipeline and the vector codec.

use std::fs;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use campus_anchors::{AnchorCatalog, LoaderOptions};
use campus_types::Settings;

/// Shared test harness for E2E tests.
///
/// Owns a temp directory laid out as a content root with an `anchors/`
/// subdirectory for documents.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    /// Content root; relative paths in documents resolve here
    pub root: PathBuf,
    /// Directory the catalog loads from
    pub anchors_dir: PathBuf,
}

impl TestHarness {
    /// Create a new harness with an empty anchor directory.
    pub fn new() -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        let anchors_dir = root.join("anchors");
        fs::create_dir_all(&anchors_dir).expect("Failed to create anchors dir");

        Self {
            _temp_dir: temp_dir,
            root,
            anchors_dir,
        }
    }

    /// Settings pointing at this harness with the given vector dimension.
    pub fn settings(&self, vector_dim: usize) -> Settings {
        Settings {
            vector_dim,
            anchors_dir: self.anchors_dir.display().to_string(),
            content_root: self.root.display().to_string(),
            ..Settings::default()
        }
    }

    /// Catalog over the harness anchor directory.
    pub fn catalog(&self, vector_dim: usize) -> AnchorCatalog {
        AnchorCatalog::from_settings(&self.settings(vector_dim))
    }

    /// Loader options resolving relative paths against the harness root.
    pub fn loader_options(&self, vector_dim: usize) -> LoaderOptions {
        LoaderOptions::new(vector_dim).with_content_root(&self.root)
    }

    /// Write an anchor document into `dir`, returning its path.
    pub fn write_doc_in(&self, dir: &Path, file_name: &str, yaml: &str) -> PathBuf {
        fs::create_dir_all(dir).expect("Failed to create doc dir");
        let path = dir.join(file_name);
        fs::write(&path, yaml).expect("Failed to write anchor doc");
        path
    }

    /// Write an anchor document into the harness anchor directory.
    pub fn write_doc(&self, file_name: &str, yaml: &str) -> PathBuf {
        self.write_doc_in(&self.anchors_dir, file_name, yaml)
    }

    /// Write a reduced vector file relative to the content root.
    pub fn write_vector(&self, rel_path: &str, values: &[f32]) -> PathBuf {
        let path = self.root.join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create vector dir");
        }
        let json = serde_json::to_string(values).expect("Failed to serialize vector");
        fs::write(&path, json).expect("Failed to write vector file");
        path
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Minimal normal anchor document.
pub fn normal_doc(slug: &str, min: u32, max: u32) -> String {
    format!(
        "slug: {slug}\ntitle: {title}\nmin_size: {min}\nmax_size: {max}\n",
        title = slug.to_uppercase()
    )
}

/// Minimal ghost anchor document relying on every default.
pub fn ghost_doc(slug: &str, title: &str) -> String {
    format!("slug: {slug}\ntitle: {title}\nis_ghost: true\n")
}

/// Deterministic unit-length vectors for codec tests.
pub fn random_unit_vectors(seed: u64, dim: usize, count: usize) -> Vec<Vec<f32>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| loop {
            let v: Vec<f32> = (0..dim).map(|_| rng.random_range(-1.0f32..1.0)).collect();
            let norm = v.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
            if norm > 1e-3 {
                break v.iter().map(|x| (*x as f64 / norm) as f32).collect();
            }
        })
        .collect()
}
