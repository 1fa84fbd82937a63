//! Resume data model: the flat applicant record, repeated entries, and the
//! request-level input that is validated into both.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::models::theme::{Accent, Template, Theme};

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Please fill at least Name and Email ({0} is missing)")]
    MissingField(&'static str),

    #[error("Unknown {kind} '{value}'")]
    UnknownSelector { kind: &'static str, value: String },
}

// ────────────────────────────────────────────────────────────────────────────
// Text helpers
// ────────────────────────────────────────────────────────────────────────────

/// Returns the trimmed value, or `None` when nothing but whitespace remains.
pub fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Splits a comma-separated field into trimmed, non-empty items.
///
/// `"A, B, ,C,"` → `["A", "B", "C"]`. An all-blank field yields an empty vec.
pub fn split_commas(value: &str) -> Vec<String> {
    value
        .split(',')
        .filter_map(non_blank)
        .map(String::from)
        .collect()
}

/// Trims `line` and removes one leading list marker (`-`, `*`, `•`).
fn strip_marker(line: &str) -> &str {
    let line = line.trim();
    line.strip_prefix('-')
        .or_else(|| line.strip_prefix('*'))
        .or_else(|| line.strip_prefix('•'))
        .unwrap_or(line)
        .trim()
}

/// Splits free text into non-empty lines, stripping list markers.
pub fn split_lines(value: &str) -> Vec<String> {
    value
        .lines()
        .filter_map(|line| non_blank(strip_marker(line)).map(String::from))
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Record & entries
// ────────────────────────────────────────────────────────────────────────────

/// Identity, contact links, and the single-valued sections.
///
/// Only `name` and `email` are required; blank strings mean "absent".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeRecord {
    pub name: String,
    pub title: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub linkedin: String,
    pub github: String,
    pub portfolio: String,
    pub summary: String,
    /// Comma separated.
    pub skills: String,
    /// Comma separated.
    pub certifications: String,
}

impl ResumeRecord {
    pub fn skill_items(&self) -> Vec<String> {
        split_commas(&self.skills)
    }

    pub fn certification_items(&self) -> Vec<String> {
        split_commas(&self.certifications)
    }

    /// `Email: … | Phone: … | Location: …` with blank parts left out.
    pub fn contact_line(&self) -> Option<String> {
        labelled_join(&[
            ("Email", &self.email),
            ("Phone", &self.phone),
            ("Location", &self.location),
        ])
    }

    /// `LinkedIn: … | GitHub: … | Portfolio: …`, `None` when all three are blank.
    pub fn links_line(&self) -> Option<String> {
        labelled_join(&[
            ("LinkedIn", &self.linkedin),
            ("GitHub", &self.github),
            ("Portfolio", &self.portfolio),
        ])
    }
}

fn labelled_join(parts: &[(&str, &String)]) -> Option<String> {
    let filled: Vec<String> = parts
        .iter()
        .filter_map(|(label, value)| non_blank(value).map(|v| format!("{label}: {v}")))
        .collect();
    (!filled.is_empty()).then(|| filled.join(" | "))
}

/// One Experience / Education / Project item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Entry {
    /// Role, degree, or project name.
    pub title: String,
    /// Company, institution, or client.
    pub organization: String,
    pub period: String,
    pub location: String,
    /// Newline separated achievements / description lines.
    pub details: String,
    /// Comma separated.
    pub responsibilities: String,
}

impl Entry {
    /// `title - organization`, or whichever of the two is present.
    pub fn heading(&self) -> Option<String> {
        match (non_blank(&self.title), non_blank(&self.organization)) {
            (Some(t), Some(o)) => Some(format!("{t} - {o}")),
            (Some(t), None) => Some(t.to_string()),
            (None, Some(o)) => Some(o.to_string()),
            (None, None) => None,
        }
    }

    /// `period | location`, blank parts left out.
    pub fn meta_line(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.period, &self.location]
            .into_iter()
            .filter_map(|v| non_blank(v))
            .collect();
        (!parts.is_empty()).then(|| parts.join(" | "))
    }

    /// Detail lines followed by the comma-split responsibilities.
    pub fn bullet_items(&self) -> Vec<String> {
        let mut items = split_lines(&self.details);
        items.extend(split_commas(&self.responsibilities));
        items
    }

    pub fn is_blank(&self) -> bool {
        self.heading().is_none() && self.meta_line().is_none() && self.bullet_items().is_empty()
    }

    /// Parses a free-text section as the builder form collects it:
    /// entries separated by blank lines, the first line of each block is the
    /// entry title and the remaining lines are details.
    ///
    /// ```text
    /// ABC Corp - Software Engineer (2020-2023)
    /// - Developed a machine learning pipeline
    ///
    /// XYZ Ltd - Intern (2019)
    /// ```
    pub fn parse_section(text: &str) -> Vec<Entry> {
        let mut entries = Vec::new();
        let mut block: Vec<&str> = Vec::new();

        for line in text.lines().chain(std::iter::once("")) {
            if non_blank(line).is_some() {
                block.push(line);
                continue;
            }
            if let Some((first, rest)) = block.split_first() {
                let entry = Entry {
                    title: strip_marker(first).to_string(),
                    details: rest.join("\n"),
                    ..Default::default()
                };
                if !entry.is_blank() {
                    entries.push(entry);
                }
            }
            block.clear();
        }
        entries
    }
}

/// Repeated sections, each in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResumeEntries {
    pub experience: Vec<Entry>,
    pub education: Vec<Entry>,
    pub projects: Vec<Entry>,
}

// ────────────────────────────────────────────────────────────────────────────
// Request input
// ────────────────────────────────────────────────────────────────────────────

/// A repeated section as submitted: either the free-text area or a
/// list of structured entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SectionInput {
    Text(String),
    Entries(Vec<Entry>),
}

impl Default for SectionInput {
    fn default() -> Self {
        SectionInput::Entries(Vec::new())
    }
}

impl SectionInput {
    fn into_entries(self) -> Vec<Entry> {
        match self {
            SectionInput::Text(text) => Entry::parse_section(&text),
            SectionInput::Entries(entries) => {
                entries.into_iter().filter(|e| !e.is_blank()).collect()
            }
        }
    }
}

/// Everything one form submission carries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeInput {
    #[serde(flatten)]
    pub record: ResumeRecord,
    pub experience: SectionInput,
    pub education: SectionInput,
    pub projects: SectionInput,
    pub template: Option<String>,
    pub theme: Option<String>,
    /// Base64 photo for JSON clients; multipart uploads set `photo` directly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_base64: Option<String>,
    #[serde(skip)]
    pub photo: Option<Bytes>,
}

/// Input that passed validation and is ready to render.
#[derive(Debug, Clone)]
pub struct ValidatedResume {
    pub record: ResumeRecord,
    pub entries: ResumeEntries,
    pub theme: Theme,
    pub photo: Option<Bytes>,
}

impl ResumeInput {
    /// Checks required fields and selectors. Blank selectors fall back to `defaults`.
    pub fn validate(self, defaults: Theme) -> Result<ValidatedResume, ValidationError> {
        if non_blank(&self.record.name).is_none() {
            return Err(ValidationError::MissingField("name"));
        }
        if non_blank(&self.record.email).is_none() {
            return Err(ValidationError::MissingField("email"));
        }

        let template = match self.template.as_deref().and_then(non_blank) {
            Some(s) => s.parse::<Template>()?,
            None => defaults.template,
        };
        let accent = match self.theme.as_deref().and_then(non_blank) {
            Some(s) => s.parse::<Accent>()?,
            None => defaults.accent,
        };

        let photo = match (self.photo, self.photo_base64.as_deref().and_then(non_blank)) {
            (Some(bytes), _) if !bytes.is_empty() => Some(bytes),
            (_, Some(encoded)) => match STANDARD.decode(encoded) {
                Ok(raw) => Some(Bytes::from(raw)),
                Err(e) => {
                    warn!("Ignoring photo with invalid base64 payload: {e}");
                    None
                }
            },
            _ => None,
        };

        Ok(ValidatedResume {
            record: self.record,
            entries: ResumeEntries {
                experience: self.experience.into_entries(),
                education: self.education.into_entries(),
                projects: self.projects.into_entries(),
            },
            theme: Theme::new(template, accent),
            photo,
        })
    }

    /// The "Load Sample Resume" record.
    pub fn sample() -> Self {
        ResumeInput {
            record: ResumeRecord {
                name: "Jane Doe".into(),
                title: "Software Engineer".into(),
                email: "jane.doe@example.com".into(),
                phone: "+234 801 234 5678".into(),
                location: "Lagos, Nigeria".into(),
                linkedin: "https://linkedin.com/in/janedoe".into(),
                github: "https://github.com/janedoe".into(),
                portfolio: String::new(),
                summary: "A motivated software engineer with experience in Python, \
                          Machine Learning, and Web Development."
                    .into(),
                skills: "Python, Machine Learning, Streamlit, Data Analysis".into(),
                certifications: String::new(),
            },
            experience: SectionInput::Entries(vec![Entry {
                title: "Software Engineer".into(),
                organization: "ABC Corp".into(),
                period: "2020-2023".into(),
                details: "Developed a machine learning pipeline\n\
                          Improved app performance by 30%"
                    .into(),
                ..Default::default()
            }]),
            education: SectionInput::Entries(vec![Entry {
                title: "B.Sc Computer Science".into(),
                organization: "XYZ University".into(),
                period: "2020".into(),
                ..Default::default()
            }]),
            projects: SectionInput::Entries(vec![Entry {
                title: "Resume Builder Project".into(),
                details: "Built a professional resume builder".into(),
                ..Default::default()
            }]),
            template: None,
            theme: None,
            photo_base64: None,
            photo: None,
        }
    }
}
