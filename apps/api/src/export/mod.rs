//! Document emitters and the download endpoints built on them.
//!
//! Both emitters consume the same `Vec<Block>`, so section order and section
//! presence are identical across formats by construction.

pub mod docx;
pub mod form;
pub mod handlers;
pub mod pdf;

use chrono::{DateTime, TimeZone};
use thiserror::Error;

use crate::models::theme::Theme;
use crate::render::Block;

/// Failure inside a document library. Image problems never surface here; they
/// are logged and the image is dropped.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("DOCX packaging failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error while writing document: {0}")]
    Io(#[from] std::io::Error),
}

/// Output formats offered for download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "application/pdf",
            DocumentFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    /// Runs the matching emitter.
    pub fn emit(&self, blocks: &[Block], theme: Theme) -> Result<Vec<u8>, EmitError> {
        match self {
            DocumentFormat::Pdf => pdf::to_pdf(blocks, theme),
            DocumentFormat::Docx => docx::to_docx(blocks, theme),
        }
    }
}

/// Replaces every character that is not alphanumeric, `_` or `-` with `_`.
pub fn sanitize_filename(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// `{name}_{Template}_{Theme}_Resume_{YYYYmmdd_HHMM}.{ext}`
pub fn download_filename<Tz>(
    name: &str,
    theme: Theme,
    format: DocumentFormat,
    at: &DateTime<Tz>,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}_{}_{}_Resume_{}.{}",
        sanitize_filename(name),
        theme.template,
        sanitize_filename(theme.accent.as_str()),
        at.format("%Y%m%d_%H%M"),
        format.extension()
    )
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use chrono::Utc;

    use super::*;
    use crate::layout::font_metrics::PdfFont;
    use crate::layout::{lay_out, Placed};
    use crate::models::resume::{Entry, ResumeEntries, ResumeRecord};
    use crate::models::theme::{Accent, Template};
    use crate::render::{render, section_headings};

    #[test]
    fn test_sanitize_replaces_unsafe_characters() {
        assert_eq!(sanitize_filename("Jane Doe"), "Jane_Doe");
        assert_eq!(sanitize_filename("../etc/passwd"), "___etc_passwd");
        assert_eq!(sanitize_filename("Zoë O'Neil-Smith"), "Zoë_O_Neil-Smith");
    }

    #[test]
    fn test_download_filename_layout() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
        let theme = Theme::new(Template::Modern, Accent::DarkGray);
        assert_eq!(
            download_filename("Jane Doe", theme, DocumentFormat::Docx, &at),
            "Jane_Doe_Modern_Dark_Gray_Resume_20240309_1405.docx"
        );
        assert_eq!(
            download_filename("Jane", Theme::default(), DocumentFormat::Pdf, &at),
            "Jane_Classic_Blue_Resume_20240309_1405.pdf"
        );
    }

    fn full_record() -> (ResumeRecord, ResumeEntries) {
        let record = ResumeRecord {
            name: "Jane Doe".into(),
            email: "jane@x.com".into(),
            summary: "Engineer".into(),
            skills: "Rust, Go".into(),
            certifications: "CKA".into(),
            ..Default::default()
        };
        let entries = ResumeEntries {
            experience: vec![Entry {
                title: "Engineer".into(),
                organization: "ABC".into(),
                details: "Built X".into(),
                ..Default::default()
            }],
            education: vec![Entry {
                title: "B.Sc".into(),
                ..Default::default()
            }],
            projects: Vec::new(),
        };
        (record, entries)
    }

    /// Level-1 headings as the PDF layout draws them: bold section-size text.
    fn pdf_section_headings(blocks: &[Block], theme: Theme) -> Vec<String> {
        lay_out(blocks, theme)
            .into_iter()
            .flat_map(|p| p.items)
            .filter_map(|item| match item {
                Placed::Text {
                    text,
                    font: PdfFont::HelveticaBold,
                    size_pt,
                    color,
                    ..
                } if size_pt == 14.0 && color == theme.accent.rgb() => Some(text),
                _ => None,
            })
            .collect()
    }

    fn docx_section_headings(bytes: Vec<u8>) -> Vec<String> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        xml.split("<w:p>")
            .filter(|p| p.contains(r#"<w:pStyle w:val="Heading1"/>"#))
            .filter_map(|p| {
                let start = p.find("<w:t xml:space=\"preserve\">")? + 26;
                let end = p[start..].find("</w:t>")? + start;
                Some(p[start..end].to_string())
            })
            .collect()
    }

    #[test]
    fn test_pdf_and_docx_share_section_order() {
        let (record, entries) = full_record();
        for template in Template::ALL {
            let theme = Theme::new(template, Accent::Navy);
            let blocks = render(&record, &entries, theme, None);
            let expected: Vec<String> = section_headings(&blocks)
                .into_iter()
                .map(String::from)
                .collect();
            assert!(!expected.is_empty());
            assert_eq!(pdf_section_headings(&blocks, theme), expected, "{template}");
            let docx = DocumentFormat::Docx.emit(&blocks, theme).unwrap();
            assert_eq!(docx_section_headings(docx), expected, "{template}");
        }
    }
}
