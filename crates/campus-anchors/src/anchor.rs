//! Published anchor values.

use std::path::PathBuf;

use serde::Serialize;

/// Ghost `min_size` when the document leaves it out.
pub const GHOST_DEFAULT_MIN_SIZE: u32 = 2;
/// Ghost `max_size` when the document leaves it out.
pub const GHOST_DEFAULT_MAX_SIZE: u32 = 4;
/// Ghost `join_window_min` when the document leaves it out.
pub const GHOST_DEFAULT_JOIN_WINDOW_MIN: u32 = 15;
/// Notification sent when someone starts a ghost meetup.
pub const DEFAULT_NOTIFY_TEMPLATE: &str =
    "{initiator_username} wants '{anchor_title}' ({min_size}-{max_size}). Join?";

/// Everything about an anchor that is not its display content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnchorMeta {
    pub version: u32,
    pub is_ghost: bool,
    pub min_size: u32,
    pub max_size: u32,
    /// Ghosts only
    pub join_window_min: Option<u32>,
    /// Ghosts only
    pub notify_template: Option<String>,
    pub reducer_id: Option<String>,
    pub raw_vec_file: Option<String>,
    pub raw_dim: usize,
    pub reduced_vec_file: Option<String>,
    pub reduced_dim: usize,
    pub instructions_url: Option<String>,
    /// Local instructions file as declared in the document
    pub instructions_html: Option<String>,
    /// `instructions_html` resolved against the content root
    #[serde(skip)]
    pub instructions_html_path: Option<PathBuf>,
    /// Document file this anchor was built from
    pub source: PathBuf,
}

/// A meeting-point template. Never mutated after publication.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anchor {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    /// Empty, or exactly `vector_dim` floats
    pub reduced: Vec<f32>,
    pub meta: AnchorMeta,
}

impl Anchor {
    pub fn is_ghost(&self) -> bool {
        self.meta.is_ghost
    }

    /// Fill the notification template for a ghost meetup.
    ///
    /// Returns `None` for normal anchors.
    pub fn render_notification(&self, initiator_username: &str) -> Option<String> {
        let template = self.meta.notify_template.as_deref()?;
        Some(
            template
                .replace("{initiator_username}", initiator_username)
                .replace("{anchor_title}", &self.title)
                .replace("{min_size}", &self.meta.min_size.to_string())
                .replace("{max_size}", &self.meta.max_size.to_string()),
        )
    }
}
