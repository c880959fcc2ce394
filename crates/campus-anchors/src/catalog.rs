//! Atomically published anchor catalog.
//!
//! The normal and ghost maps live together in one immutable
//! [`CatalogSnapshot`]. Publishing swaps the `Arc` behind a lock, so a
//! reader holding a snapshot sees either the complete old pair or the
//! complete new pair. Loading happens outside the lock; a failed load
//! leaves the current snapshot in place.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::anchor::Anchor;
use crate::error::AnchorError;
use crate::loader::{AnchorLoader, LoadedAnchors, LoaderOptions};

/// One published generation of the catalog.
#[derive(Debug)]
pub struct CatalogSnapshot {
    /// 0 for the initial empty catalog, +1 per successful load
    pub generation: u64,
    pub loaded_at: DateTime<Utc>,
    /// Directory the snapshot was loaded from (`None` before the first load)
    pub source_dir: Option<PathBuf>,
    anchors: BTreeMap<String, Arc<Anchor>>,
    ghosts: BTreeMap<String, Arc<Anchor>>,
}

impl CatalogSnapshot {
    fn empty() -> Self {
        Self {
            generation: 0,
            loaded_at: Utc::now(),
            source_dir: None,
            anchors: BTreeMap::new(),
            ghosts: BTreeMap::new(),
        }
    }

    fn from_loaded(loaded: LoadedAnchors, generation: u64, dir: &Path) -> Self {
        Self {
            generation,
            loaded_at: Utc::now(),
            source_dir: Some(dir.to_path_buf()),
            anchors: loaded.normals,
            ghosts: loaded.ghosts,
        }
    }

    /// Normal anchors, ordered by slug.
    pub fn list_anchors(&self) -> Vec<Arc<Anchor>> {
        self.anchors.values().cloned().collect()
    }

    pub fn get_anchor(&self, slug: &str) -> Option<Arc<Anchor>> {
        self.anchors.get(slug).cloned()
    }

    /// Ghost anchors, ordered by slug.
    pub fn list_ghosts(&self) -> Vec<Arc<Anchor>> {
        self.ghosts.values().cloned().collect()
    }

    pub fn get_ghost(&self, slug: &str) -> Option<Arc<Anchor>> {
        self.ghosts.get(slug).cloned()
    }

    pub fn anchor_count(&self) -> usize {
        self.anchors.len()
    }

    pub fn ghost_count(&self) -> usize {
        self.ghosts.len()
    }
}

/// Owner of the published snapshot.
///
/// Thread-safe: share it behind an `Arc` between request handlers and
/// whatever triggers reloads.
#[derive(Debug)]
pub struct AnchorCatalog {
    loader: AnchorLoader,
    dir: PathBuf,
    current: RwLock<Arc<CatalogSnapshot>>,
}

impl AnchorCatalog {
    /// Create an empty catalog that reloads from `dir`.
    pub fn new(dir: impl Into<PathBuf>, options: LoaderOptions) -> Self {
        Self {
            loader: AnchorLoader::new(options),
            dir: dir.into(),
            current: RwLock::new(Arc::new(CatalogSnapshot::empty())),
        }
    }

    pub fn from_settings(settings: &campus_types::Settings) -> Self {
        Self::new(settings.anchors_path(), LoaderOptions::from_settings(settings))
    }

    /// Directory used by [`AnchorCatalog::reload`].
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load `dir` and publish it. All-or-nothing.
    pub fn load(&self, dir: &Path) -> Result<Arc<CatalogSnapshot>, AnchorError> {
        let loaded = match self.loader.load_dir(dir) {
            Ok(loaded) => loaded,
            Err(e) => {
                error!(dir = ?dir, error = %e, "Anchor load failed, keeping current catalog");
                return Err(e);
            }
        };
        let documents = loaded.documents;

        let snapshot = {
            let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
            let snapshot = Arc::new(CatalogSnapshot::from_loaded(
                loaded,
                current.generation + 1,
                dir,
            ));
            *current = Arc::clone(&snapshot);
            snapshot
        };

        info!(
            dir = ?dir,
            documents,
            normals = snapshot.anchor_count(),
            ghosts = snapshot.ghost_count(),
            generation = snapshot.generation,
            "Published anchor catalog"
        );
        Ok(snapshot)
    }

    /// Re-run [`AnchorCatalog::load`] against the configured directory.
    pub fn reload(&self) -> Result<Arc<CatalogSnapshot>, AnchorError> {
        self.load(&self.dir)
    }

    /// The currently published snapshot.
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        // The guarded value is a single Arc, so a poisoned lock still holds a whole snapshot.
        self.current.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn list_anchors(&self) -> Vec<Arc<Anchor>> {
        self.snapshot().list_anchors()
    }

    pub fn get_anchor(&self, slug: &str) -> Option<Arc<Anchor>> {
        self.snapshot().get_anchor(slug)
    }

    pub fn list_ghosts(&self) -> Vec<Arc<Anchor>> {
        self.snapshot().list_ghosts()
    }

    pub fn get_ghost(&self, slug: &str) -> Option<Arc<Anchor>> {
        self.snapshot().get_ghost(slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn catalog(dir: &Path) -> AnchorCatalog {
        AnchorCatalog::new(dir, LoaderOptions::new(4).with_content_root(dir))
    }

    #[test]
    fn test_starts_empty() {
        let tmp = TempDir::new().unwrap();
        let catalog = catalog(tmp.path());
        let snapshot = catalog.snapshot();
        assert_eq!(snapshot.generation, 0);
        assert!(snapshot.source_dir.is_none());
        assert!(catalog.list_anchors().is_empty());
        assert!(catalog.get_ghost("anything").is_none());
    }

    #[test]
    fn test_reload_publishes_new_generation() {
        let tmp = TempDir::new().unwrap();
        let catalog = catalog(tmp.path());
        fs::write(
            tmp.path().join("a.yaml"),
            "slug: a\ntitle: A\nmin_size: 1\nmax_size: 2\n",
        )
        .unwrap();

        let first = catalog.reload().unwrap();
        assert_eq!(first.generation, 1);
        assert_eq!(catalog.get_anchor("a").unwrap().title, "A");

        fs::write(
            tmp.path().join("b.yaml"),
            "slug: b\ntitle: B\nis_ghost: true\n",
        )
        .unwrap();
        let second = catalog.reload().unwrap();
        assert_eq!(second.generation, 2);
        assert_eq!(catalog.list_ghosts().len(), 1);

        // Old snapshot holders keep their view
        assert_eq!(first.ghost_count(), 0);
    }

    #[test]
    fn test_failed_load_keeps_previous_snapshot() {
        let tmp = TempDir::new().unwrap();
        let catalog = catalog(tmp.path());
        fs::write(
            tmp.path().join("a.yaml"),
            "slug: a\ntitle: A\nmin_size: 1\nmax_size: 2\n",
        )
        .unwrap();
        catalog.reload().unwrap();

        fs::write(tmp.path().join("b.yaml"), "slug: b\ntitle: B\n").unwrap();
        assert!(catalog.reload().is_err());

        let snapshot = catalog.snapshot();
        assert_eq!(snapshot.generation, 1);
        assert!(catalog.get_anchor("a").is_some());
        assert!(catalog.get_anchor("b").is_none());
    }

    #[test]
    fn test_missing_dir_publishes_empty() {
        let tmp = TempDir::new().unwrap();
        let catalog = catalog(tmp.path());
        fs::write(
            tmp.path().join("a.yaml"),
            "slug: a\ntitle: A\nmin_size: 1\nmax_size: 2\n",
        )
        .unwrap();
        catalog.reload().unwrap();

        let snapshot = catalog.load(&tmp.path().join("missing")).unwrap();
        assert_eq!(snapshot.generation, 2);
        assert!(catalog.list_anchors().is_empty());
    }

    #[test]
    fn test_listing_is_ordered_by_slug() {
        let tmp = TempDir::new().unwrap();
        let catalog = catalog(tmp.path());
        for (file, slug) in [("1.yaml", "zeta"), ("2.yaml", "alpha"), ("3.yaml", "mid")] {
            fs::write(
                tmp.path().join(file),
                format!("slug: {}\ntitle: T\nmin_size: 1\nmax_size: 2\n", slug),
            )
            .unwrap();
        }
        catalog.reload().unwrap();
        let slugs: Vec<String> = catalog.list_anchors().iter().map(|a| a.slug.clone()).collect();
        assert_eq!(slugs, vec!["alpha", "mid", "zeta"]);
    }
}
