//! Template renderer: turns a validated resume into a format-independent
//! sequence of layout blocks.
//!
//! Data flows one way: `ResumeRecord` + `ResumeEntries` → `render` → `Vec<Block>`
//! → an emitter in `export`. Rendering is pure and single-pass.

pub mod photo;
pub mod sections;
pub mod templates;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::models::resume::{ResumeEntries, ResumeRecord};
use crate::models::theme::Theme;

pub use templates::strategy_for;

// ────────────────────────────────────────────────────────────────────────────
// Blocks
// ────────────────────────────────────────────────────────────────────────────

/// The column a run of blocks flows into. Emitters without columns ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Full,
    /// Left/narrow column.
    Sidebar,
    /// Right/wide column next to the sidebar.
    Main,
}

/// An abstract renderable unit.
///
/// Heading levels: 0 = applicant name, 1 = section, 2 = entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Heading {
        text: String,
        level: u8,
    },
    Paragraph {
        text: String,
    },
    BulletList {
        items: Vec<String>,
    },
    Spacer,
    /// PNG bytes placed at a fixed width.
    Image {
        #[serde(rename = "src", serialize_with = "serialize_data_url")]
        data: Vec<u8>,
        width_mm: f32,
    },
    Region {
        region: Region,
    },
}

impl Block {
    pub fn heading(text: impl Into<String>, level: u8) -> Self {
        Block::Heading {
            text: text.into(),
            level,
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Block::Paragraph { text: text.into() }
    }

    pub fn region(region: Region) -> Self {
        Block::Region { region }
    }
}

fn serialize_data_url<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("data:image/png;base64,{}", STANDARD.encode(data)))
}

/// Section headings (level 1) in the order they appear.
pub fn section_headings(blocks: &[Block]) -> Vec<&str> {
    blocks
        .iter()
        .filter_map(|b| match b {
            Block::Heading { text, level: 1 } => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Entry point
// ────────────────────────────────────────────────────────────────────────────

/// Renders the resume with the template selected by `theme`.
///
/// `photo` is the raw upload; it is decoded and thumbnailed here, and dropped
/// with a warning if it cannot be decoded.
pub fn render(
    record: &ResumeRecord,
    entries: &ResumeEntries,
    theme: Theme,
    photo: Option<&[u8]>,
) -> Vec<Block> {
    let strategy = strategy_for(theme.template);
    debug!(template = %strategy.template(), accent = %theme.accent, "Rendering resume");
    let photo = photo.and_then(|bytes| photo::prepare(bytes, strategy.photo_width_mm()));
    strategy.render(record, entries, photo)
}
