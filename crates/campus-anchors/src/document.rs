//! Anchor document schema.
//!
//! One YAML document per file. Normal and ghost anchors have different
//! required fields, so parsing resolves the document into an
//! [`AnchorKind`] instead of leaving sizes as nullable fields.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::anchor::{
    DEFAULT_NOTIFY_TEMPLATE, GHOST_DEFAULT_JOIN_WINDOW_MIN, GHOST_DEFAULT_MAX_SIZE,
    GHOST_DEFAULT_MIN_SIZE,
};
use crate::error::AnchorError;

/// Wire format of an anchor file. Unknown keys are ignored.
#[derive(Debug, Clone, Deserialize)]
struct RawAnchorDocument {
    #[serde(default = "default_version")]
    version: u32,
    slug: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    tags: Vec<String>,

    #[serde(default)]
    is_ghost: bool,
    min_size: Option<i64>,
    max_size: Option<i64>,
    join_window_min: Option<u32>,
    notify_template: Option<String>,

    #[serde(default = "default_raw_dim")]
    raw_dim: usize,
    raw_vec_file: Option<String>,
    reduced_dim: Option<usize>,
    reduced_vec_file: Option<String>,
    reducer_id: Option<String>,

    /// External URL, preferred when set
    instructions_url: Option<String>,
    /// Local file such as "static/anchors/foo.html"
    instructions_html: Option<String>,
}

fn default_version() -> u32 {
    1
}

fn default_raw_dim() -> usize {
    384
}

/// Validated group size range: `1 <= min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeRange {
    pub min: u32,
    pub max: u32,
}

impl SizeRange {
    fn checked(min: i64, max: i64, slug: &str, path: &Path) -> Result<Self, AnchorError> {
        let invalid = || AnchorError::InvalidSizeRange {
            slug: slug.to_string(),
            path: path.to_path_buf(),
            min,
            max,
        };
        if min < 1 || max < min {
            return Err(invalid());
        }
        Ok(Self {
            min: u32::try_from(min).map_err(|_| invalid())?,
            max: u32::try_from(max).map_err(|_| invalid())?,
        })
    }
}

/// Normal anchors carry a fixed size range; ghosts carry join settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnchorKind {
    Normal {
        sizes: SizeRange,
    },
    Ghost {
        sizes: SizeRange,
        join_window_min: u32,
        notify_template: String,
    },
}

impl AnchorKind {
    pub fn is_ghost(&self) -> bool {
        matches!(self, AnchorKind::Ghost { .. })
    }

    pub fn sizes(&self) -> SizeRange {
        match self {
            AnchorKind::Normal { sizes } | AnchorKind::Ghost { sizes, .. } => *sizes,
        }
    }
}

/// Vector references declared by a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorRefs {
    pub raw_dim: usize,
    pub raw_vec_file: Option<String>,
    pub reduced_dim: usize,
    pub reduced_vec_file: Option<String>,
    pub reducer_id: Option<String>,
}

/// A parsed and kind-resolved anchor document.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorDocument {
    pub version: u32,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub kind: AnchorKind,
    pub vectors: VectorRefs,
    pub instructions_url: Option<String>,
    pub instructions_html: Option<String>,
    /// File the document was read from
    pub source: PathBuf,
}

impl AnchorDocument {
    /// Parse YAML text read from `source`.
    ///
    /// `default_reduced_dim` fills `reduced_dim` when the document omits it.
    pub fn parse(
        source: &Path,
        text: &str,
        default_reduced_dim: usize,
    ) -> Result<Self, AnchorError> {
        let raw: RawAnchorDocument =
            serde_yaml::from_str(text).map_err(|e| AnchorError::invalid(source, e.to_string()))?;
        Self::resolve(raw, source, default_reduced_dim)
    }

    fn resolve(
        raw: RawAnchorDocument,
        source: &Path,
        default_reduced_dim: usize,
    ) -> Result<Self, AnchorError> {
        let kind = if raw.is_ghost {
            let min = raw.min_size.unwrap_or(i64::from(GHOST_DEFAULT_MIN_SIZE));
            let max = raw.max_size.unwrap_or(i64::from(GHOST_DEFAULT_MAX_SIZE));
            let join_window_min = raw
                .join_window_min
                .unwrap_or(GHOST_DEFAULT_JOIN_WINDOW_MIN);
            if join_window_min == 0 {
                return Err(AnchorError::invalid(
                    source,
                    format!("{}: join_window_min must be at least 1 minute", raw.slug),
                ));
            }
            AnchorKind::Ghost {
                sizes: SizeRange::checked(min, max, &raw.slug, source)?,
                join_window_min,
                notify_template: raw
                    .notify_template
                    .unwrap_or_else(|| DEFAULT_NOTIFY_TEMPLATE.to_string()),
            }
        } else {
            let (Some(min), Some(max)) = (raw.min_size, raw.max_size) else {
                return Err(AnchorError::MissingSizeRange {
                    slug: raw.slug,
                    path: source.to_path_buf(),
                });
            };
            if raw.join_window_min.is_some() || raw.notify_template.is_some() {
                debug!(slug = %raw.slug, "Ignoring ghost-only fields on normal anchor");
            }
            AnchorKind::Normal {
                sizes: SizeRange::checked(min, max, &raw.slug, source)?,
            }
        };

        Ok(Self {
            version: raw.version,
            slug: raw.slug,
            title: raw.title,
            description: raw.description,
            tags: raw.tags,
            kind,
            vectors: VectorRefs {
                raw_dim: raw.raw_dim,
                raw_vec_file: raw.raw_vec_file,
                reduced_dim: raw.reduced_dim.unwrap_or(default_reduced_dim),
                reduced_vec_file: raw.reduced_vec_file,
                reducer_id: raw.reducer_id,
            },
            instructions_url: raw.instructions_url,
            instructions_html: raw.instructions_html,
            source: source.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<AnchorDocument, AnchorError> {
        AnchorDocument::parse(Path::new("anchors/test.yaml"), text, 128)
    }

    #[test]
    fn test_normal_document() {
        let doc = parse(
            "slug: chess-club\ntitle: Chess Club\ntags: [games, quiet]\nmin_size: 2\nmax_size: 8\n",
        )
        .unwrap();
        assert_eq!(doc.slug, "chess-club");
        assert_eq!(doc.tags, vec!["games", "quiet"]);
        assert_eq!(doc.description, "");
        assert_eq!(doc.version, 1);
        assert_eq!(
            doc.kind,
            AnchorKind::Normal {
                sizes: SizeRange { min: 2, max: 8 }
            }
        );
        assert_eq!(doc.vectors.raw_dim, 384);
        assert_eq!(doc.vectors.reduced_dim, 128);
    }

    #[test]
    fn test_ghost_defaults() {
        let doc = parse("slug: study-buddy\ntitle: Study Buddy\nis_ghost: true\n").unwrap();
        match doc.kind {
            AnchorKind::Ghost {
                sizes,
                join_window_min,
                notify_template,
            } => {
                assert_eq!(sizes, SizeRange { min: 2, max: 4 });
                assert_eq!(join_window_min, 15);
                assert_eq!(notify_template, DEFAULT_NOTIFY_TEMPLATE);
            }
            other => panic!("expected ghost, got {:?}", other),
        }
    }

    #[test]
    fn test_ghost_overrides() {
        let doc = parse(
            "slug: pickup\ntitle: Pickup\nis_ghost: true\nmin_size: 3\njoin_window_min: 30\nnotify_template: \"{anchor_title}?\"\n",
        )
        .unwrap();
        assert_eq!(doc.kind.sizes(), SizeRange { min: 3, max: 4 });
        assert!(matches!(
            doc.kind,
            AnchorKind::Ghost { join_window_min: 30, ref notify_template, .. } if notify_template == "{anchor_title}?"
        ));
    }

    #[test]
    fn test_ghost_zero_join_window_rejected() {
        let err = parse("slug: g\ntitle: G\nis_ghost: true\njoin_window_min: 0\n").unwrap_err();
        match err {
            AnchorError::InvalidAnchorDocument { reason, .. } => {
                assert!(reason.contains("join_window_min"));
            }
            other => panic!("expected invalid document, got {:?}", other),
        }
    }

    #[test]
    fn test_normal_missing_sizes() {
        let err = parse("slug: a\ntitle: A\nmin_size: 2\n").unwrap_err();
        assert!(matches!(err, AnchorError::MissingSizeRange { ref slug, .. } if slug == "a"));
    }

    #[test]
    fn test_invalid_size_ranges() {
        let err = parse("slug: a\ntitle: A\nmin_size: 5\nmax_size: 2\n").unwrap_err();
        assert!(matches!(
            err,
            AnchorError::InvalidSizeRange { min: 5, max: 2, .. }
        ));

        let err = parse("slug: a\ntitle: A\nmin_size: 0\nmax_size: 2\n").unwrap_err();
        assert!(matches!(err, AnchorError::InvalidSizeRange { min: 0, .. }));

        // Ghost default max (4) below an explicit min
        let err = parse("slug: g\ntitle: G\nis_ghost: true\nmin_size: 6\n").unwrap_err();
        assert!(matches!(
            err,
            AnchorError::InvalidSizeRange { min: 6, max: 4, .. }
        ));
    }

    #[test]
    fn test_schema_violations() {
        // Missing title
        assert!(matches!(
            parse("slug: a\nmin_size: 1\nmax_size: 2\n"),
            Err(AnchorError::InvalidAnchorDocument { .. })
        ));
        // Wrong type
        assert!(matches!(
            parse("slug: a\ntitle: A\nmin_size: lots\nmax_size: 2\n"),
            Err(AnchorError::InvalidAnchorDocument { .. })
        ));
        // Empty file
        assert!(matches!(
            parse(""),
            Err(AnchorError::InvalidAnchorDocument { .. })
        ));
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let doc = parse("slug: a\ntitle: A\nmin_size: 1\nmax_size: 1\nowner: ops\n").unwrap();
        assert_eq!(doc.kind.sizes(), SizeRange { min: 1, max: 1 });
    }
}
