//! Response shapes for the content-serving layer.
//!
//! Listing rows ([`AnchorSummary`]) and detail bodies ([`AnchorDetail`])
//! are built from published anchors. Local instructions HTML is read
//! lazily at detail time; a missing file becomes `null`, never an error.

use std::fs;
use std::io::ErrorKind;

use serde::Serialize;
use tracing::warn;

use crate::anchor::{Anchor, AnchorMeta};

/// Turns anchor instructions fields into a public URL.
#[derive(Debug, Clone)]
pub struct InstructionsResolver {
    static_url_prefix: String,
}

impl InstructionsResolver {
    pub fn new(static_url_prefix: impl Into<String>) -> Self {
        Self {
            static_url_prefix: static_url_prefix.into(),
        }
    }

    pub fn from_settings(settings: &campus_types::Settings) -> Self {
        Self::new(settings.static_url_prefix.clone())
    }

    /// External URL if set, else the static URL of the local file, else `None`.
    pub fn instructions_url(&self, meta: &AnchorMeta) -> Option<String> {
        if let Some(url) = meta.instructions_url.as_deref().filter(|u| !u.is_empty()) {
            return Some(url.to_string());
        }
        let html_path = meta.instructions_html.as_deref().filter(|p| !p.is_empty())?;
        let rel = match html_path.split_once("static/") {
            Some((_, rest)) => rest,
            None => html_path,
        };
        Some(format!(
            "{}/{}",
            self.static_url_prefix.trim_end_matches('/'),
            rel.trim_start_matches('/')
        ))
    }
}

impl Default for InstructionsResolver {
    fn default() -> Self {
        Self::new("/static/")
    }
}

/// Read the anchor's local instructions file.
///
/// `None` when no file is configured or it cannot be read.
pub fn read_instructions_html(anchor: &Anchor) -> Option<String> {
    let path = anchor.meta.instructions_html_path.as_ref()?;
    match fs::read_to_string(path) {
        Ok(html) => Some(html),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => {
            warn!(slug = %anchor.slug, path = ?path, error = %e, "Failed to read instructions file");
            None
        }
    }
}

/// Listing row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnchorSummary {
    pub slug: String,
    pub title: String,
    pub tags: Vec<String>,
    pub min_size: u32,
    pub max_size: u32,
    pub instructions_url: Option<String>,
    pub is_ghost: bool,
    /// Ghost listings only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join_window_min: Option<u32>,
}

impl AnchorSummary {
    pub fn from_anchor(anchor: &Anchor, resolver: &InstructionsResolver) -> Self {
        Self {
            slug: anchor.slug.clone(),
            title: anchor.title.clone(),
            tags: anchor.tags.clone(),
            min_size: anchor.meta.min_size,
            max_size: anchor.meta.max_size,
            instructions_url: resolver.instructions_url(&anchor.meta),
            is_ghost: anchor.is_ghost(),
            join_window_min: anchor.meta.join_window_min,
        }
    }
}

/// Optional parts of a detail response.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetailOptions {
    /// Include the reduced vector floats
    pub include_reduced: bool,
    /// Inline the local instructions HTML if configured
    pub include_html: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailMeta {
    pub reducer_id: Option<String>,
    pub source: String,
}

/// Detail body for a single anchor or ghost.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnchorDetail {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub min_size: u32,
    pub max_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join_window_min: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_template: Option<String>,
    pub instructions_url: Option<String>,
    pub is_ghost: bool,
    pub meta: DetailMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reduced: Option<Vec<f32>>,
    /// Outer `None`: not requested. `Some(None)`: requested but unavailable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions_html: Option<Option<String>>,
}

impl AnchorDetail {
    pub fn from_anchor(
        anchor: &Anchor,
        resolver: &InstructionsResolver,
        options: DetailOptions,
    ) -> Self {
        let instructions_html = (options.include_html && anchor.meta.instructions_html.is_some())
            .then(|| read_instructions_html(anchor));

        Self {
            slug: anchor.slug.clone(),
            title: anchor.title.clone(),
            description: anchor.description.clone(),
            tags: anchor.tags.clone(),
            min_size: anchor.meta.min_size,
            max_size: anchor.meta.max_size,
            join_window_min: anchor.meta.join_window_min,
            notify_template: anchor.meta.notify_template.clone(),
            instructions_url: resolver.instructions_url(&anchor.meta),
            is_ghost: anchor.is_ghost(),
            meta: DetailMeta {
                reducer_id: anchor.meta.reducer_id.clone(),
                source: anchor.meta.source.display().to_string(),
            },
            reduced: options.include_reduced.then(|| anchor.reduced.clone()),
            instructions_html,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{AnchorLoader, LoaderOptions};
    use std::path::Path;
    use tempfile::TempDir;

    fn load_one(dir: &Path, yaml: &str) -> Anchor {
        let path = dir.join("doc.yaml");
        fs::write(&path, yaml).unwrap();
        AnchorLoader::new(LoaderOptions::new(2).with_content_root(dir))
            .load_file(&path)
            .unwrap()
    }

    #[test]
    fn test_instructions_url_prefers_external() {
        let tmp = TempDir::new().unwrap();
        let anchor = load_one(
            tmp.path(),
            "slug: a\ntitle: A\nmin_size: 1\nmax_size: 2\ninstructions_url: https://example.org/a\ninstructions_html: static/anchors/a.html\n",
        );
        let resolver = InstructionsResolver::default();
        assert_eq!(
            resolver.instructions_url(&anchor.meta).as_deref(),
            Some("https://example.org/a")
        );
    }

    #[test]
    fn test_instructions_url_from_local_file() {
        let tmp = TempDir::new().unwrap();
        let anchor = load_one(
            tmp.path(),
            "slug: a\ntitle: A\nmin_size: 1\nmax_size: 2\ninstructions_html: content/static/anchors/a.html\n",
        );
        let resolver = InstructionsResolver::new("https://cdn.example.org/static");
        assert_eq!(
            resolver.instructions_url(&anchor.meta).as_deref(),
            Some("https://cdn.example.org/static/anchors/a.html")
        );

        let bare = load_one(
            tmp.path(),
            "slug: b\ntitle: B\nmin_size: 1\nmax_size: 2\ninstructions_html: guides/b.html\n",
        );
        assert_eq!(
            InstructionsResolver::default()
                .instructions_url(&bare.meta)
                .as_deref(),
            Some("/static/guides/b.html")
        );
    }

    #[test]
    fn test_no_instructions() {
        let tmp = TempDir::new().unwrap();
        let anchor = load_one(tmp.path(), "slug: a\ntitle: A\nmin_size: 1\nmax_size: 2\n");
        assert!(InstructionsResolver::default()
            .instructions_url(&anchor.meta)
            .is_none());
        let detail = AnchorDetail::from_anchor(
            &anchor,
            &InstructionsResolver::default(),
            DetailOptions {
                include_reduced: false,
                include_html: true,
            },
        );
        assert!(detail.instructions_html.is_none());
    }

    #[test]
    fn test_detail_reads_html_lazily() {
        let tmp = TempDir::new().unwrap();
        let anchor = load_one(
            tmp.path(),
            "slug: a\ntitle: A\nmin_size: 1\nmax_size: 2\ninstructions_html: a.html\n",
        );
        let resolver = InstructionsResolver::default();
        let options = DetailOptions {
            include_reduced: false,
            include_html: true,
        };

        // File appears after load
        fs::write(tmp.path().join("a.html"), "<p>Meet at the fountain</p>").unwrap();
        let detail = AnchorDetail::from_anchor(&anchor, &resolver, options);
        assert_eq!(
            detail.instructions_html,
            Some(Some("<p>Meet at the fountain</p>".to_string()))
        );

        // And disappears again
        fs::remove_file(tmp.path().join("a.html")).unwrap();
        let detail = AnchorDetail::from_anchor(&anchor, &resolver, options);
        assert_eq!(detail.instructions_html, Some(None));
        let json = serde_json::to_value(&detail).unwrap();
        assert!(json["instructions_html"].is_null());
        assert!(json.get("reduced").is_none());
    }

    #[test]
    fn test_ghost_summary_and_detail() {
        let tmp = TempDir::new().unwrap();
        let ghost = load_one(tmp.path(), "slug: g\ntitle: Study\nis_ghost: true\n");
        let resolver = InstructionsResolver::default();

        let summary = AnchorSummary::from_anchor(&ghost, &resolver);
        assert!(summary.is_ghost);
        assert_eq!(summary.join_window_min, Some(15));

        let detail = AnchorDetail::from_anchor(
            &ghost,
            &resolver,
            DetailOptions {
                include_reduced: true,
                include_html: false,
            },
        );
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["min_size"], 2);
        assert_eq!(json["max_size"], 4);
        assert_eq!(json["join_window_min"], 15);
        assert!(json["notify_template"]
            .as_str()
            .unwrap()
            .contains("{initiator_username}"));
        assert_eq!(json["reduced"], serde_json::json!([]));
        assert!(json.get("instructions_html").is_none());
    }

    #[test]
    fn test_normal_summary_omits_ghost_fields() {
        let tmp = TempDir::new().unwrap();
        let anchor = load_one(tmp.path(), "slug: a\ntitle: A\nmin_size: 3\nmax_size: 6\n");
        let json =
            serde_json::to_value(AnchorSummary::from_anchor(&anchor, &InstructionsResolver::default()))
                .unwrap();
        assert_eq!(json["is_ghost"], false);
        assert!(json.get("join_window_min").is_none());
        assert!(json["instructions_url"].is_null());
    }
}
