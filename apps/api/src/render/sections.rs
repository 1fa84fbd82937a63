//! Section builders shared by all templates.
//!
//! Every builder returns an empty vec when its source content is blank, so a
//! template can concatenate sections without ever emitting an empty heading.

use crate::models::resume::{non_blank, Entry, ResumeRecord};
use crate::render::Block;

pub const SUMMARY: &str = "Profile Summary";
pub const EXPERIENCE: &str = "Work Experience";
pub const EDUCATION: &str = "Education";
pub const SKILLS: &str = "Skills";
pub const PROJECTS: &str = "Projects";
pub const CERTIFICATIONS: &str = "Certifications";
pub const CONTACT: &str = "Contact";

/// Name, job title, and (optionally) the contact and links lines.
pub fn header(record: &ResumeRecord, with_contact: bool) -> Vec<Block> {
    let mut blocks = vec![Block::heading(record.name.trim(), 0)];
    if let Some(title) = non_blank(&record.title) {
        blocks.push(Block::paragraph(title));
    }
    if with_contact {
        blocks.extend(contact_lines(record));
    }
    blocks.push(Block::Spacer);
    blocks
}

fn contact_lines(record: &ResumeRecord) -> impl Iterator<Item = Block> {
    record
        .contact_line()
        .into_iter()
        .chain(record.links_line())
        .map(|text| Block::Paragraph { text })
}

/// Contact card for sidebar layouts. Email is required, so this is never empty.
pub fn contact_card(record: &ResumeRecord) -> Vec<Block> {
    let mut blocks = vec![Block::heading(CONTACT, 2)];
    blocks.extend(
        [
            ("Email", &record.email),
            ("Phone", &record.phone),
            ("Location", &record.location),
            ("LinkedIn", &record.linkedin),
            ("GitHub", &record.github),
            ("Portfolio", &record.portfolio),
        ]
        .into_iter()
        .filter_map(|(label, value)| {
            non_blank(value).map(|v| Block::paragraph(format!("{label}: {v}")))
        }),
    );
    blocks.push(Block::Spacer);
    blocks
}

pub fn summary(record: &ResumeRecord) -> Vec<Block> {
    match non_blank(&record.summary) {
        Some(text) => vec![
            Block::heading(SUMMARY, 1),
            Block::paragraph(text),
            Block::Spacer,
        ],
        None => Vec::new(),
    }
}

pub fn skills(record: &ResumeRecord) -> Vec<Block> {
    bullet_section(SKILLS, record.skill_items())
}

pub fn certifications(record: &ResumeRecord) -> Vec<Block> {
    bullet_section(CERTIFICATIONS, record.certification_items())
}

pub fn experience(entries: &[Entry]) -> Vec<Block> {
    entry_section(EXPERIENCE, entries)
}

pub fn education(entries: &[Entry]) -> Vec<Block> {
    entry_section(EDUCATION, entries)
}

pub fn projects(entries: &[Entry]) -> Vec<Block> {
    entry_section(PROJECTS, entries)
}

fn bullet_section(title: &str, items: Vec<String>) -> Vec<Block> {
    if items.is_empty() {
        return Vec::new();
    }
    vec![
        Block::heading(title, 1),
        Block::BulletList { items },
        Block::Spacer,
    ]
}

fn entry_section(title: &str, entries: &[Entry]) -> Vec<Block> {
    let body: Vec<Block> = entries.iter().flat_map(entry_blocks).collect();
    if body.is_empty() {
        return Vec::new();
    }
    let mut blocks = Vec::with_capacity(body.len() + 2);
    blocks.push(Block::heading(title, 1));
    blocks.extend(body);
    blocks.push(Block::Spacer);
    blocks
}

fn entry_blocks(entry: &Entry) -> Vec<Block> {
    let mut blocks = Vec::new();
    if let Some(heading) = entry.heading() {
        blocks.push(Block::heading(heading, 2));
    }
    if let Some(meta) = entry.meta_line() {
        blocks.push(Block::paragraph(meta));
    }
    let items = entry.bullet_items();
    if !items.is_empty() {
        blocks.push(Block::BulletList { items });
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_summary_is_omitted() {
        let record = ResumeRecord {
            summary: " \n\t ".into(),
            ..Default::default()
        };
        assert!(summary(&record).is_empty());
    }

    #[test]
    fn test_entry_section_skips_blank_entries() {
        let entries = vec![
            Entry::default(),
            Entry {
                title: "Engineer".into(),
                organization: "ABC".into(),
                period: "2020-2023".into(),
                details: "- Shipped\n".into(),
                ..Default::default()
            },
        ];
        let blocks = experience(&entries);
        assert_eq!(
            blocks,
            vec![
                Block::heading(EXPERIENCE, 1),
                Block::heading("Engineer - ABC", 2),
                Block::paragraph("2020-2023"),
                Block::BulletList {
                    items: vec!["Shipped".into()]
                },
                Block::Spacer,
            ]
        );
        assert!(education(&[Entry::default()]).is_empty());
    }

    #[test]
    fn test_header_without_contact() {
        let record = ResumeRecord {
            name: "  Jane Doe ".into(),
            email: "jane@x.com".into(),
            ..Default::default()
        };
        assert_eq!(
            header(&record, false),
            vec![Block::heading("Jane Doe", 0), Block::Spacer]
        );
        assert_eq!(header(&record, true).len(), 3);
    }

    #[test]
    fn test_contact_card_lists_each_filled_field() {
        let record = ResumeRecord {
            email: "jane@x.com".into(),
            github: "gh/jane".into(),
            ..Default::default()
        };
        let card = contact_card(&record);
        assert_eq!(card[0], Block::heading(CONTACT, 2));
        assert_eq!(card[1], Block::paragraph("Email: jane@x.com"));
        assert_eq!(card[2], Block::paragraph("GitHub: gh/jane"));
        assert_eq!(card.len(), 4);
    }
}
