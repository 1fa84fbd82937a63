//! PDF emitter: lays blocks out with `layout::flow` and writes the result as
//! printpdf operators using the built-in Helvetica fonts.

use printpdf::{
    BuiltinFont, Color, Line, LinePoint, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, Point, Pt,
    RawImage, RawImageData, RawImageFormat, Rgb as PdfRgb, TextItem, XObjectTransform,
};
use tracing::{debug, warn};

use crate::export::EmitError;
use crate::layout::font_metrics::PdfFont;
use crate::layout::{lay_out, page_layout, Placed};
use crate::models::theme::{Rgb, Theme};
use crate::render::Block;

/// Renders `blocks` to an A4 PDF styled by `theme`.
pub fn to_pdf(blocks: &[Block], theme: Theme) -> Result<Vec<u8>, EmitError> {
    let layout = page_layout(theme.template);
    let laid_out = lay_out(blocks, theme);

    let mut doc = PdfDocument::new("Resume");
    let mut pages = Vec::with_capacity(laid_out.len());
    for page in laid_out {
        let mut ops = Vec::new();
        for item in page.items {
            emit_item(&mut doc, &mut ops, item, layout.width_mm, layout.height_mm);
        }
        pages.push(PdfPage::new(Mm(layout.width_mm), Mm(layout.height_mm), ops));
    }

    let page_count = pages.len();
    let mut warnings = Vec::new();
    let bytes = doc
        .with_pages(pages)
        .save(&PdfSaveOptions::default(), &mut warnings);
    if !warnings.is_empty() {
        debug!(count = warnings.len(), "printpdf reported warnings");
    }
    if bytes.is_empty() {
        return Err(EmitError::Pdf("document serialized to zero bytes".to_string()));
    }
    debug!(pages = page_count, bytes = bytes.len(), "Rendered PDF");
    Ok(bytes)
}

fn emit_item(doc: &mut PdfDocument, ops: &mut Vec<Op>, item: Placed, page_w: f32, page_h: f32) {
    match item {
        Placed::Text {
            x_mm,
            baseline_mm,
            text,
            font,
            size_pt,
            color,
        } => {
            let font = builtin(font);
            ops.push(Op::StartTextSection);
            ops.push(Op::SetFillColor { col: pdf_color(color) });
            ops.push(Op::SetFontSizeBuiltinFont {
                size: Pt(size_pt),
                font,
            });
            ops.push(Op::SetTextCursor {
                pos: point(x_mm, page_h - baseline_mm),
            });
            ops.push(Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(text)],
                font,
            });
            ops.push(Op::EndTextSection);
        }
        Placed::Rule {
            x1_mm,
            x2_mm,
            y_mm,
            thickness_pt,
            color,
        } => {
            ops.push(Op::SetOutlineColor { col: pdf_color(color) });
            ops.push(Op::SetOutlineThickness {
                pt: Pt(thickness_pt),
            });
            ops.push(Op::DrawLine {
                line: polyline(&[(x1_mm, page_h - y_mm), (x2_mm, page_h - y_mm)], false),
            });
        }
        Placed::Border { inset_mm, color } => {
            let (left, right) = (inset_mm, page_w - inset_mm);
            let (bottom, top) = (inset_mm, page_h - inset_mm);
            ops.push(Op::SetOutlineColor { col: pdf_color(color) });
            ops.push(Op::SetOutlineThickness { pt: Pt(1.0) });
            ops.push(Op::DrawLine {
                line: polyline(
                    &[(left, bottom), (right, bottom), (right, top), (left, top)],
                    true,
                ),
            });
        }
        Placed::Image {
            x_mm,
            top_mm,
            width_mm,
            height_mm,
            data,
        } => {
            let raw = match decode_rgb(&data) {
                Ok(raw) => raw,
                Err(e) => {
                    warn!("Skipping image that could not be embedded in PDF: {e}");
                    return;
                }
            };
            // At 72 dpi one pixel is one point, so scale = target points / pixels.
            let scale_x = Mm(width_mm).into_pt().0 / raw.width as f32;
            let scale_y = Mm(height_mm).into_pt().0 / raw.height as f32;
            let id = doc.add_image(&raw);
            ops.push(Op::UseXobject {
                id,
                transform: XObjectTransform {
                    translate_x: Some(Mm(x_mm).into_pt()),
                    translate_y: Some(Mm(page_h - top_mm - height_mm).into_pt()),
                    scale_x: Some(scale_x),
                    scale_y: Some(scale_y),
                    dpi: Some(72.0),
                    ..Default::default()
                },
            });
        }
    }
}

fn builtin(font: PdfFont) -> BuiltinFont {
    match font {
        PdfFont::Helvetica => BuiltinFont::Helvetica,
        PdfFont::HelveticaBold => BuiltinFont::HelveticaBold,
    }
}

fn pdf_color(rgb: Rgb) -> Color {
    Color::Rgb(PdfRgb::new(
        f32::from(rgb.0) / 255.0,
        f32::from(rgb.1) / 255.0,
        f32::from(rgb.2) / 255.0,
        None,
    ))
}

/// Converts millimetres from the bottom-left into a PDF point.
fn point(x_mm: f32, y_mm: f32) -> Point {
    Point {
        x: Mm(x_mm).into_pt(),
        y: Mm(y_mm).into_pt(),
    }
}

fn polyline(points: &[(f32, f32)], is_closed: bool) -> Line {
    Line {
        points: points
            .iter()
            .map(|&(x, y)| LinePoint {
                p: point(x, y),
                bezier: false,
            })
            .collect(),
        is_closed,
    }
}

/// Decodes PNG/JPEG bytes into an 8-bit RGB raster printpdf can embed.
fn decode_rgb(data: &[u8]) -> Result<RawImage, image::ImageError> {
    let rgb = image::load_from_memory(data)?.to_rgb8();
    let (width, height) = rgb.dimensions();
    Ok(RawImage {
        pixels: RawImageData::U8(rgb.into_raw()),
        width: width as usize,
        height: height as usize,
        data_format: RawImageFormat::RGB8,
        tag: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::theme::{Accent, Template};
    use crate::render::photo;

    fn sample_blocks() -> Vec<Block> {
        vec![
            Block::heading("Jane Doe", 0),
            Block::paragraph("Email: jane@x.com | Phone: +1 555 0100"),
            Block::Spacer,
            Block::heading("Skills", 1),
            Block::BulletList {
                items: vec!["Rust".into(), "Go".into()],
            },
        ]
    }

    #[test]
    fn test_to_pdf_produces_pdf_bytes_for_every_template() {
        for template in Template::ALL {
            let bytes = to_pdf(&sample_blocks(), Theme::new(template, Accent::Green)).unwrap();
            assert!(bytes.starts_with(b"%PDF"), "{template}");
        }
    }

    #[test]
    fn test_to_pdf_handles_empty_input() {
        let bytes = to_pdf(&[], Theme::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_to_pdf_embeds_photo() {
        let mut blocks = sample_blocks();
        blocks.insert(
            1,
            Block::Image {
                data: photo::sample_png(60, 80),
                width_mm: 30.0,
            },
        );
        let with_photo = to_pdf(&blocks, Theme::default()).unwrap();
        let without = to_pdf(&sample_blocks(), Theme::default()).unwrap();
        assert!(with_photo.starts_with(b"%PDF"));
        assert!(with_photo.len() > without.len());
    }

    #[test]
    fn test_to_pdf_skips_corrupt_image() {
        let mut blocks = sample_blocks();
        blocks.push(Block::Image {
            data: b"not an image".to_vec(),
            width_mm: 30.0,
        });
        let bytes = to_pdf(&blocks, Theme::new(Template::Creative, Accent::Navy)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_decode_rgb_reports_dimensions() {
        let raw = decode_rgb(&photo::sample_png(12, 7)).unwrap();
        assert_eq!((raw.width, raw.height), (12, 7));
        assert!(decode_rgb(b"garbage").is_err());
    }
}
