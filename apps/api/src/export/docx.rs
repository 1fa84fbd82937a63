//! Word document emitter.
//!
//! Writes a minimal WordprocessingML package by hand:
//!
//! ```text
//! [Content_Types].xml
//! _rels/.rels
//! word/document.xml            body paragraphs
//! word/styles.xml              Title, Heading1, Heading2, ListBullet
//! word/numbering.xml           bullet definition used by ListBullet
//! word/_rels/document.xml.rels styles, numbering, one entry per image
//! word/media/imageN.png
//! ```
//!
//! Region markers are ignored: Word output is always a single column.

use std::io::{Cursor, Write};

use html_escape::encode_text;
use tracing::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::export::EmitError;
use crate::models::theme::{Rgb, Theme};
use crate::render::{photo, Block};

/// English Metric Units per millimetre.
const EMU_PER_MM: f32 = 36_000.0;

const NS_DECLS: &str = concat!(
    r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" "#,
    r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture""#
);

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

/// `styles.xml` with section headings colored by `accent`.
fn styles(accent: Rgb) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:cs="Calibri"/><w:sz w:val="22"/></w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:after="80"/></w:pPr></w:pPrDefault></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style><w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:spacing w:after="120"/></w:pPr><w:rPr><w:b/><w:sz w:val="44"/><w:color w:val="1E1E1E"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:spacing w:before="240" w:after="80"/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:sz w:val="28"/><w:color w:val="{accent}"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:spacing w:before="120" w:after="40"/><w:outlineLvl w:val="1"/></w:pPr><w:rPr><w:b/><w:sz w:val="23"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="ListBullet"><w:name w:val="List Bullet"/><w:basedOn w:val="Normal"/><w:qFormat/><w:pPr><w:numPr><w:ilvl w:val="0"/><w:numId w:val="1"/></w:numPr><w:spacing w:after="40"/></w:pPr></w:style></w:styles>"#,
        accent = accent.hex().trim_start_matches('#')
    )
}

const NUMBERING: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:abstractNum w:abstractNumId="0"><w:multiLevelType w:val="singleLevel"/><w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="•"/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="720" w:hanging="360"/></w:pPr></w:lvl></w:abstractNum><w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num></w:numbering>"#;

// Relationship ids 1 and 2 are styles and numbering; images start at 3.
const FIRST_IMAGE_RID: usize = 3;

/// Renders `blocks` to a `.docx` package. Only the theme accent applies; the
/// template's columns are not reproduced.
pub fn to_docx(blocks: &[Block], theme: Theme) -> Result<Vec<u8>, EmitError> {
    let mut body = String::new();
    let mut media: Vec<Vec<u8>> = Vec::new();

    for block in blocks {
        match block {
            Block::Heading { text, level } => {
                body.push_str(&styled_paragraph(heading_style(*level), text));
            }
            Block::Paragraph { text } => body.push_str(&plain_paragraph(text)),
            Block::BulletList { items } => {
                for item in items {
                    body.push_str(&styled_paragraph("ListBullet", item));
                }
            }
            Block::Spacer => body.push_str("<w:p></w:p>"),
            Block::Image { data, width_mm } => match photo::as_png(data) {
                Ok((png, w, h)) if w > 0 && h > 0 => {
                    let index = media.len() + 1;
                    let cx = (width_mm * EMU_PER_MM).round() as u64;
                    let cy = (width_mm * h as f32 / w as f32 * EMU_PER_MM).round() as u64;
                    body.push_str(&image_paragraph(index, cx, cy));
                    media.push(png.into_owned());
                }
                Ok(_) => warn!("Skipping zero-sized image in DOCX"),
                Err(e) => warn!("Skipping image that could not be embedded in DOCX: {e}"),
            },
            Block::Region { .. } => {}
        }
    }

    let document = format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            "\n<w:document {ns}><w:body>{body}",
            r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/>"#,
            r#"<w:pgMar w:top="850" w:right="850" w:bottom="850" w:left="850" w:header="0" w:footer="0" w:gutter="0"/>"#,
            "</w:sectPr></w:body></w:document>"
        ),
        ns = NS_DECLS,
        body = body
    );

    let styles = styles(theme.accent.rgb());
    let rels = document_rels(media.len());
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (path, content) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", PACKAGE_RELS),
        ("word/document.xml", document.as_str()),
        ("word/styles.xml", styles.as_str()),
        ("word/numbering.xml", NUMBERING),
        ("word/_rels/document.xml.rels", rels.as_str()),
    ] {
        zip.start_file(path, options)?;
        zip.write_all(content.as_bytes())?;
    }
    for (i, png) in media.iter().enumerate() {
        zip.start_file(format!("word/media/image{}.png", i + 1), options)?;
        zip.write_all(png)?;
    }

    let bytes = zip.finish()?.into_inner();
    debug!(images = media.len(), bytes = bytes.len(), "Rendered DOCX");
    Ok(bytes)
}

fn heading_style(level: u8) -> &'static str {
    match level {
        0 => "Title",
        1 => "Heading1",
        _ => "Heading2",
    }
}

/// Replaces characters XML 1.0 forbids (C0 controls other than tab, and the
/// U+FFFE/U+FFFF noncharacters) with a space.
fn xml_safe(line: &str) -> String {
    line.chars()
        .map(|c| match c {
            '\t' => c,
            '\u{0}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}' => ' ',
            _ => c,
        })
        .collect()
}

/// Escaped run text; embedded newlines become line breaks within the run.
fn run(text: &str) -> String {
    let lines: Vec<String> = text
        .lines()
        .map(|line| {
            format!(
                r#"<w:t xml:space="preserve">{}</w:t>"#,
                encode_text(&xml_safe(line))
            )
        })
        .collect();
    format!("<w:r>{}</w:r>", lines.join("<w:br/>"))
}

fn styled_paragraph(style: &str, text: &str) -> String {
    format!(
        r#"<w:p><w:pPr><w:pStyle w:val="{style}"/></w:pPr>{}</w:p>"#,
        run(text)
    )
}

fn plain_paragraph(text: &str) -> String {
    format!("<w:p>{}</w:p>", run(text))
}

fn image_paragraph(index: usize, cx: u64, cy: u64) -> String {
    let rid = index + FIRST_IMAGE_RID - 1;
    format!(
        concat!(
            r#"<w:p><w:r><w:drawing><wp:inline distT="0" distB="0" distL="0" distR="0">"#,
            r#"<wp:extent cx="{cx}" cy="{cy}"/><wp:docPr id="{n}" name="Picture {n}"/>"#,
            r#"<wp:cNvGraphicFramePr><a:graphicFrameLocks noChangeAspect="1"/></wp:cNvGraphicFramePr>"#,
            r#"<a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
            r#"<pic:pic><pic:nvPicPr><pic:cNvPr id="{n}" name="image{n}.png"/><pic:cNvPicPr/></pic:nvPicPr>"#,
            r#"<pic:blipFill><a:blip r:embed="rId{rid}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
            r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
            r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr></pic:pic>"#,
            r#"</a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>"#
        ),
        cx = cx,
        cy = cy,
        n = index,
        rid = rid
    )
}

fn document_rels(image_count: usize) -> String {
    let mut rels = String::from(concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        "\n",
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
        r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering" Target="numbering.xml"/>"#
    ));
    for i in 1..=image_count {
        rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/image{}.png"/>"#,
            i + FIRST_IMAGE_RID - 1,
            i
        ));
    }
    rels.push_str("</Relationships>");
    rels
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;
    use crate::models::theme::{Accent, Template};

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut out = String::new();
        archive.by_name(name).unwrap().read_to_string(&mut out).unwrap();
        out
    }

    fn part_names(bytes: &[u8]) -> Vec<String> {
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        archive.file_names().map(String::from).collect()
    }

    #[test]
    fn test_headings_map_to_native_styles() {
        let blocks = vec![
            Block::heading("Jane Doe", 0),
            Block::heading("Work Experience", 1),
            Block::heading("Engineer - ABC", 2),
        ];
        let doc = read_part(&to_docx(&blocks, Theme::default()).unwrap(), "word/document.xml");
        assert!(doc.contains(r#"<w:pStyle w:val="Title"/></w:pPr><w:r><w:t xml:space="preserve">Jane Doe</w:t>"#));
        assert!(doc.contains(r#"<w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t xml:space="preserve">Work Experience</w:t>"#));
        assert!(doc.contains(r#"<w:pStyle w:val="Heading2"/>"#));
    }

    #[test]
    fn test_bullets_use_list_style_bound_to_numbering() {
        let blocks = vec![Block::BulletList {
            items: vec!["A".into(), "B".into(), "C".into()],
        }];
        let bytes = to_docx(&blocks, Theme::default()).unwrap();
        let doc = read_part(&bytes, "word/document.xml");
        assert_eq!(doc.matches(r#"<w:pStyle w:val="ListBullet"/>"#).count(), 3);
        let styles = read_part(&bytes, "word/styles.xml");
        assert!(styles.contains(r#"w:styleId="ListBullet""#));
        assert!(read_part(&bytes, "word/numbering.xml").contains(r#"<w:numFmt w:val="bullet"/>"#));
    }

    #[test]
    fn test_text_is_xml_escaped() {
        let blocks = vec![Block::paragraph("R&D <lead> | C++")];
        let doc = read_part(&to_docx(&blocks, Theme::default()).unwrap(), "word/document.xml");
        assert!(doc.contains("R&amp;D &lt;lead&gt; | C++"));
    }

    #[test]
    fn test_control_characters_are_replaced() {
        let blocks = vec![
            Block::heading("Jane\u{7}Doe", 0),
            Block::paragraph("Led team\u{c}of five\u{b}x"),
            Block::BulletList {
                items: vec!["tab\tkept\u{0}".into()],
            },
        ];
        let doc = read_part(
            &to_docx(&blocks, Theme::default()).unwrap(),
            "word/document.xml",
        );
        assert!(!doc
            .chars()
            .any(|c| c < '\u{20}' && !matches!(c, '\t' | '\n' | '\r')));
        assert!(doc.contains("Jane Doe"));
        assert!(doc.contains("Led team of five x"));
        assert!(doc.contains("tab\tkept "));
    }

    #[test]
    fn test_heading_style_uses_theme_accent() {
        let bytes = to_docx(
            &[Block::heading("Skills", 1)],
            Theme::new(Template::Classic, Accent::Green),
        )
        .unwrap();
        let styles = read_part(&bytes, "word/styles.xml");
        assert!(styles.contains(r#"<w:color w:val="009900"/>"#));
        assert!(!styles.contains("0066CC"));
    }

    #[test]
    fn test_multiline_paragraph_uses_line_breaks() {
        let doc = read_part(
            &to_docx(&[Block::paragraph("one\ntwo")], Theme::default()).unwrap(),
            "word/document.xml",
        );
        assert!(doc.contains(
            r#"<w:t xml:space="preserve">one</w:t><w:br/><w:t xml:space="preserve">two</w:t>"#
        ));
    }

    #[test]
    fn test_image_is_embedded_at_block_width() {
        let blocks = vec![
            Block::heading("Jane Doe", 0),
            Block::Image {
                data: photo::sample_png(100, 50),
                width_mm: 40.0,
            },
        ];
        let bytes = to_docx(&blocks, Theme::default()).unwrap();
        assert!(part_names(&bytes).contains(&"word/media/image1.png".to_string()));
        let doc = read_part(&bytes, "word/document.xml");
        assert!(doc.contains(r#"<wp:extent cx="1440000" cy="720000"/>"#));
        assert!(doc.contains(r#"r:embed="rId3""#));
        let rels = read_part(&bytes, "word/_rels/document.xml.rels");
        assert!(rels.contains(r#"Id="rId3""#) && rels.contains("media/image1.png"));
    }

    #[test]
    fn test_corrupt_image_is_skipped() {
        let blocks = vec![
            Block::Image {
                data: b"nope".to_vec(),
                width_mm: 30.0,
            },
            Block::paragraph("after"),
        ];
        let bytes = to_docx(&blocks, Theme::default()).unwrap();
        assert!(!part_names(&bytes).iter().any(|n| n.starts_with("word/media/")));
        let doc = read_part(&bytes, "word/document.xml");
        assert!(!doc.contains("<w:drawing>"));
        assert!(doc.contains("after"));
    }

    #[test]
    fn test_region_markers_are_ignored() {
        use crate::render::Region;
        let plain = to_docx(&[Block::paragraph("x")], Theme::default()).unwrap();
        let with_regions = to_docx(
            &[
                Block::region(Region::Sidebar),
                Block::paragraph("x"),
                Block::region(Region::Full),
            ],
            Theme::default(),
        )
        .unwrap();
        assert_eq!(
            read_part(&plain, "word/document.xml"),
            read_part(&with_regions, "word/document.xml")
        );
    }
}
