//! Template strategies: one object per layout, selected through a static
//! dispatch table keyed by `Template`.

use crate::models::resume::{ResumeEntries, ResumeRecord};
use crate::models::theme::Template;
use crate::render::{sections, Block, Region};

/// Composes the block sequence for one layout.
pub trait TemplateStrategy: Send + Sync {
    fn template(&self) -> Template;

    /// Fixed width the profile photo is placed at.
    fn photo_width_mm(&self) -> f32;

    fn render(
        &self,
        record: &ResumeRecord,
        entries: &ResumeEntries,
        photo: Option<Block>,
    ) -> Vec<Block>;
}

static CLASSIC: Classic = Classic;
static MODERN: Modern = Modern;
static CREATIVE: Creative = Creative;

/// Returns the strategy for a template.
pub fn strategy_for(template: Template) -> &'static dyn TemplateStrategy {
    match template {
        Template::Classic => &CLASSIC,
        Template::Modern => &MODERN,
        Template::Creative => &CREATIVE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Classic / ATS
// ────────────────────────────────────────────────────────────────────────────

/// Single column: Summary, Experience, Education, Skills, Projects, Certifications.
pub struct Classic;

impl TemplateStrategy for Classic {
    fn template(&self) -> Template {
        Template::Classic
    }

    fn photo_width_mm(&self) -> f32 {
        30.0
    }

    fn render(
        &self,
        record: &ResumeRecord,
        entries: &ResumeEntries,
        photo: Option<Block>,
    ) -> Vec<Block> {
        let mut blocks = header_with_photo(record, photo);
        blocks.extend(sections::summary(record));
        blocks.extend(sections::experience(&entries.experience));
        blocks.extend(sections::education(&entries.education));
        blocks.extend(sections::skills(record));
        blocks.extend(sections::projects(&entries.projects));
        blocks.extend(sections::certifications(record));
        blocks
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Modern / two-column
// ────────────────────────────────────────────────────────────────────────────

/// Header and summary full width, then Skills/Certifications left and
/// Experience/Education/Projects right.
pub struct Modern;

impl TemplateStrategy for Modern {
    fn template(&self) -> Template {
        Template::Modern
    }

    fn photo_width_mm(&self) -> f32 {
        30.0
    }

    fn render(
        &self,
        record: &ResumeRecord,
        entries: &ResumeEntries,
        photo: Option<Block>,
    ) -> Vec<Block> {
        let mut blocks = header_with_photo(record, photo);
        blocks.extend(sections::summary(record));

        let left: Vec<Block> = sections::skills(record)
            .into_iter()
            .chain(sections::certifications(record))
            .collect();
        let right: Vec<Block> = sections::experience(&entries.experience)
            .into_iter()
            .chain(sections::education(&entries.education))
            .chain(sections::projects(&entries.projects))
            .collect();

        if !left.is_empty() || !right.is_empty() {
            blocks.push(Block::region(Region::Sidebar));
            blocks.extend(left);
            blocks.push(Block::region(Region::Main));
            blocks.extend(right);
            blocks.push(Block::region(Region::Full));
        }
        blocks
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Creative / designer
// ────────────────────────────────────────────────────────────────────────────

/// Name across the top, then a narrow sidebar (photo, contact, skills)
/// followed by the main content.
pub struct Creative;

impl TemplateStrategy for Creative {
    fn template(&self) -> Template {
        Template::Creative
    }

    fn photo_width_mm(&self) -> f32 {
        40.0
    }

    fn render(
        &self,
        record: &ResumeRecord,
        entries: &ResumeEntries,
        photo: Option<Block>,
    ) -> Vec<Block> {
        let mut blocks = sections::header(record, false);

        blocks.push(Block::region(Region::Sidebar));
        blocks.extend(photo);
        blocks.extend(sections::contact_card(record));
        blocks.extend(sections::skills(record));

        blocks.push(Block::region(Region::Main));
        blocks.extend(sections::summary(record));
        blocks.extend(sections::experience(&entries.experience));
        blocks.extend(sections::education(&entries.education));
        blocks.extend(sections::projects(&entries.projects));
        blocks.extend(sections::certifications(record));
        blocks.push(Block::region(Region::Full));
        blocks
    }
}

/// Name heading, then the photo (floated by emitters that support it), then
/// the rest of the header.
fn header_with_photo(record: &ResumeRecord, photo: Option<Block>) -> Vec<Block> {
    let mut blocks = sections::header(record, true);
    if let Some(photo) = photo {
        blocks.insert(1, photo);
    }
    blocks
}
