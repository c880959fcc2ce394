//! Anchor directory loader.
//!
//! Reads every `*.yaml` / `*.yml` file directly inside the anchor
//! directory in filename order, validates it, and partitions the result
//! into normal and ghost anchors keyed by slug. Any invalid document
//! fails the whole load.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::anchor::{Anchor, AnchorMeta};
use crate::document::{AnchorDocument, AnchorKind};
use crate::error::{AnchorError, DimensionCheck};

/// File extensions recognized as anchor documents
pub const DOCUMENT_EXTENSIONS: &[&str] = &["yaml", "yml"];

/// Loader configuration
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Configured embedding dimension D
    pub dimension: usize,
    /// Base for relative vector / instructions paths
    pub content_root: PathBuf,
    /// Fail on duplicate slugs instead of last-wins
    pub strict_slugs: bool,
}

impl LoaderOptions {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            content_root: PathBuf::from("."),
            strict_slugs: false,
        }
    }

    pub fn from_settings(settings: &campus_types::Settings) -> Self {
        Self {
            dimension: settings.vector_dim,
            content_root: settings.content_root_path().to_path_buf(),
            strict_slugs: settings.strict_slugs,
        }
    }

    pub fn with_content_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.content_root = root.into();
        self
    }

    pub fn with_strict_slugs(mut self, strict: bool) -> Self {
        self.strict_slugs = strict;
        self
    }

    fn resolve(&self, declared: &str) -> PathBuf {
        let path = Path::new(declared);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.content_root.join(path)
        }
    }
}

/// Result of one load pass, not yet published.
#[derive(Debug, Default)]
pub struct LoadedAnchors {
    pub normals: BTreeMap<String, Arc<Anchor>>,
    pub ghosts: BTreeMap<String, Arc<Anchor>>,
    /// Number of document files read
    pub documents: usize,
}

/// Builds anchors from a directory of documents.
#[derive(Debug, Clone)]
pub struct AnchorLoader {
    options: LoaderOptions,
}

impl AnchorLoader {
    pub fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    /// Load every document in `dir`.
    ///
    /// A missing directory yields an empty result.
    pub fn load_dir(&self, dir: &Path) -> Result<LoadedAnchors, AnchorError> {
        if !dir.exists() {
            info!(dir = ?dir, "Anchor directory does not exist, loading empty catalog");
            return Ok(LoadedAnchors::default());
        }

        let mut loaded = LoadedAnchors::default();
        // (is_ghost, slug) -> first document seen
        let mut seen: HashMap<(bool, String), PathBuf> = HashMap::new();

        for path in document_files(dir)? {
            let anchor = self.load_file(&path)?;
            loaded.documents += 1;

            let key = (anchor.is_ghost(), anchor.slug.clone());
            if let Some(first) = seen.get(&key) {
                if self.options.strict_slugs {
                    return Err(AnchorError::DuplicateSlug {
                        slug: anchor.slug.clone(),
                        first: first.clone(),
                        second: path,
                    });
                }
                warn!(
                    slug = %anchor.slug,
                    first = ?first,
                    second = ?path,
                    "Duplicate anchor slug, last document wins"
                );
            }
            seen.insert(key, path);

            let target = if anchor.is_ghost() {
                &mut loaded.ghosts
            } else {
                &mut loaded.normals
            };
            target.insert(anchor.slug.clone(), Arc::new(anchor));
        }

        Ok(loaded)
    }

    /// Parse, validate and build a single anchor.
    pub fn load_file(&self, path: &Path) -> Result<Anchor, AnchorError> {
        let text = fs::read_to_string(path).map_err(|e| AnchorError::io(path, e))?;
        let doc = AnchorDocument::parse(path, &text, self.options.dimension)?;
        let reduced = self.read_reduced(&doc)?;

        debug!(
            slug = %doc.slug,
            ghost = doc.kind.is_ghost(),
            reduced = reduced.len(),
            "Loaded anchor document"
        );
        Ok(self.build(doc, reduced))
    }

    /// Read and check the reduced vector, if the document references one.
    fn read_reduced(&self, doc: &AnchorDocument) -> Result<Vec<f32>, AnchorError> {
        let Some(declared) = doc.vectors.reduced_vec_file.as_deref() else {
            return Ok(Vec::new());
        };
        let vector_path = self.options.resolve(declared);

        let text = match fs::read_to_string(&vector_path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(AnchorError::MissingVectorFile {
                    slug: doc.slug.clone(),
                    path: doc.source.clone(),
                    vector_path,
                });
            }
            Err(e) => return Err(AnchorError::io(vector_path, e)),
        };

        let reduced = parse_vector_file(&text).map_err(|reason| AnchorError::InvalidVectorFile {
            slug: doc.slug.clone(),
            path: doc.source.clone(),
            vector_path: vector_path.clone(),
            reason,
        })?;

        if reduced.len() != doc.vectors.reduced_dim {
            return Err(AnchorError::DimensionMismatch {
                slug: doc.slug.clone(),
                path: doc.source.clone(),
                check: DimensionCheck::VectorFileLength,
                expected: doc.vectors.reduced_dim,
                actual: reduced.len(),
            });
        }
        if doc.vectors.reduced_dim != self.options.dimension {
            return Err(AnchorError::DimensionMismatch {
                slug: doc.slug.clone(),
                path: doc.source.clone(),
                check: DimensionCheck::ConfiguredDimension,
                expected: self.options.dimension,
                actual: doc.vectors.reduced_dim,
            });
        }
        Ok(reduced)
    }

    fn build(&self, doc: AnchorDocument, reduced: Vec<f32>) -> Anchor {
        let sizes = doc.kind.sizes();
        let is_ghost = doc.kind.is_ghost();
        let (join_window_min, notify_template) = match doc.kind {
            AnchorKind::Ghost {
                join_window_min,
                notify_template,
                ..
            } => (Some(join_window_min), Some(notify_template)),
            AnchorKind::Normal { .. } => (None, None),
        };
        let instructions_html_path = doc
            .instructions_html
            .as_deref()
            .map(|p| self.options.resolve(p));

        Anchor {
            slug: doc.slug,
            title: doc.title,
            description: doc.description,
            tags: doc.tags,
            reduced,
            meta: AnchorMeta {
                version: doc.version,
                is_ghost,
                min_size: sizes.min,
                max_size: sizes.max,
                join_window_min,
                notify_template,
                reducer_id: doc.vectors.reducer_id,
                raw_vec_file: doc.vectors.raw_vec_file,
                raw_dim: doc.vectors.raw_dim,
                reduced_vec_file: doc.vectors.reduced_vec_file,
                reduced_dim: doc.vectors.reduced_dim,
                instructions_url: doc.instructions_url,
                instructions_html: doc.instructions_html,
                instructions_html_path,
                source: doc.source,
            },
        }
    }
}

/// Document files directly inside `dir`, sorted by filename.
///
/// Symlinked documents count; mounted config volumes are symlink farms.
fn document_files(dir: &Path) -> Result<Vec<PathBuf>, AnchorError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf());
            AnchorError::io(path, e.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let known = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| DOCUMENT_EXTENSIONS.contains(&ext));
        if known {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Parse a flat JSON array of numbers.
fn parse_vector_file(text: &str) -> Result<Vec<f32>, String> {
    let value: serde_json::Value = serde_json::from_str(text).map_err(|e| e.to_string())?;
    let serde_json::Value::Array(items) = value else {
        return Err("must be a JSON array".to_string());
    };
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_f64()
                .map(|v| v as f32)
                .ok_or_else(|| format!("element {} is not a number", i))
        })
        .collect()
}
