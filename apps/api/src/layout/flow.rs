//! Flow layout: positions a block sequence on A4 pages.
//!
//! The output is backend-neutral (`Placed` items in millimetres, y measured
//! from the top edge); `export::pdf` turns it into PDF operators.
//!
//! # Columns
//! `Region::Sidebar` and `Region::Main` both start at the y where the full-width
//! flow stopped and then flow independently, each breaking onto new pages on
//! its own. Returning to `Region::Full` resumes below the longer column.

use tracing::warn;

use crate::layout::font_metrics::{get_metrics, PdfFont, MM_PER_PT};
use crate::layout::page::{page_layout, Column, PageLayout, BORDER_INSET_MM};
use crate::models::theme::{Rgb, Theme};
use crate::render::{photo, Block, Region};

const NAME_SIZE_PT: f32 = 22.0;
const SECTION_SIZE_PT: f32 = 14.0;
const ENTRY_SIZE_PT: f32 = 11.5;
const BODY_SIZE_PT: f32 = 11.0;
const LINE_SPACING: f32 = 1.3;
const BULLET_INDENT_MM: f32 = 5.0;
const SPACER_MM: f32 = 3.0;
const FLOAT_GAP_MM: f32 = 4.0;

const NAME_COLOR: Rgb = Rgb(30, 30, 30);
const BODY_COLOR: Rgb = Rgb(50, 50, 50);
const BORDER_COLOR: Rgb = Rgb(180, 180, 180);

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

/// One positioned drawing instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Placed {
    Text {
        x_mm: f32,
        /// Baseline, from the top edge.
        baseline_mm: f32,
        text: String,
        font: PdfFont,
        size_pt: f32,
        color: Rgb,
    },
    Rule {
        x1_mm: f32,
        x2_mm: f32,
        y_mm: f32,
        thickness_pt: f32,
        color: Rgb,
    },
    Image {
        x_mm: f32,
        top_mm: f32,
        width_mm: f32,
        height_mm: f32,
        data: Vec<u8>,
    },
    Border {
        inset_mm: f32,
        color: Rgb,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaidOutPage {
    pub items: Vec<Placed>,
}

// ────────────────────────────────────────────────────────────────────────────
// Flow state
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cursor {
    page: usize,
    y_mm: f32,
}

impl Cursor {
    fn later(self, other: Cursor) -> Cursor {
        if (other.page, other.y_mm) > (self.page, self.y_mm) {
            other
        } else {
            self
        }
    }
}

/// Area on one page that full-width text must wrap around.
#[derive(Debug, Clone, Copy)]
struct Float {
    page: usize,
    bottom_mm: f32,
    left_mm: f32,
}

struct TextStyle {
    font: PdfFont,
    size_pt: f32,
    color: Rgb,
}

impl TextStyle {
    fn line_height_mm(&self) -> f32 {
        self.size_pt * MM_PER_PT * LINE_SPACING
    }
}

struct Flow {
    layout: PageLayout,
    accent: Rgb,
    pages: Vec<LaidOutPage>,
    region: Region,
    full: Cursor,
    sidebar: Cursor,
    main: Cursor,
    float: Option<Float>,
}

impl Flow {
    fn new(theme: Theme) -> Self {
        let layout = page_layout(theme.template);
        let start = Cursor {
            page: 0,
            y_mm: layout.margin_mm,
        };
        Self {
            layout,
            accent: theme.accent.rgb(),
            pages: vec![LaidOutPage::default()],
            region: Region::Full,
            full: start,
            sidebar: start,
            main: start,
            float: None,
        }
    }

    fn cursor(&mut self) -> &mut Cursor {
        match self.region {
            Region::Full => &mut self.full,
            Region::Sidebar => &mut self.sidebar,
            Region::Main => &mut self.main,
        }
    }

    fn column(&self) -> Column {
        self.layout.column(self.region)
    }

    fn switch_region(&mut self, region: Region) {
        match (self.region, region) {
            (from, to) if from == to => {}
            (Region::Full, _) => {
                let mut start = self.full;
                if let Some(f) = self.float {
                    if f.page == start.page && start.y_mm < f.bottom_mm {
                        start.y_mm = f.bottom_mm + FLOAT_GAP_MM;
                    }
                }
                self.sidebar = start;
                self.main = start;
            }
            (_, Region::Full) => {
                self.full = self.sidebar.later(self.main);
            }
            _ => {}
        }
        self.region = region;
    }

    /// Reserves `height_mm` in the current column, breaking to the next page
    /// when it does not fit. Returns the top of the reserved area.
    fn reserve(&mut self, height_mm: f32) -> Cursor {
        let top = self.layout.margin_mm;
        let bottom = self.layout.content_bottom_mm();
        let cursor = self.cursor();
        if cursor.y_mm + height_mm > bottom && cursor.y_mm > top {
            cursor.page += 1;
            cursor.y_mm = top;
        }
        let at = *cursor;
        cursor.y_mm += height_mm;
        while self.pages.len() <= at.page {
            self.pages.push(LaidOutPage::default());
        }
        at
    }

    fn skip(&mut self, height_mm: f32) {
        self.cursor().y_mm += height_mm;
    }

    fn push(&mut self, page: usize, item: Placed) {
        self.pages[page].items.push(item);
    }

    /// Usable width for full-width text starting at the cursor, narrowed when a
    /// floated image occupies the right edge.
    fn text_width(&mut self, column: Column) -> f32 {
        let at = *self.cursor();
        match self.float {
            Some(f) if self.region == Region::Full && f.page == at.page && at.y_mm < f.bottom_mm => {
                (f.left_mm - FLOAT_GAP_MM - column.x_mm).max(column.width_mm / 2.0)
            }
            _ => column.width_mm,
        }
    }

    /// Wraps and places `text`, returning `(page, baseline)` for every line.
    fn write_lines(
        &mut self,
        text: &str,
        style: &TextStyle,
        indent_mm: f32,
        center: bool,
    ) -> Vec<(usize, f32)> {
        let column = self.column();
        let width = self.text_width(column) - indent_mm;
        let metrics = get_metrics(style.font);
        let line_height = style.line_height_mm();
        let mut placed = Vec::new();
        for line in metrics.wrap(text, style.size_pt, width) {
            let at = self.reserve(line_height);
            let x_mm = if center {
                column.x_mm + ((width - metrics.width_mm(&line, style.size_pt)) / 2.0).max(0.0)
            } else {
                column.x_mm + indent_mm
            };
            let baseline_mm = at.y_mm + line_height * 0.75;
            placed.push((at.page, baseline_mm));
            self.push(
                at.page,
                Placed::Text {
                    x_mm,
                    baseline_mm,
                    text: line,
                    font: style.font,
                    size_pt: style.size_pt,
                    color: style.color,
                },
            );
        }
        placed
    }

    fn rule(&mut self, thickness_pt: f32, color: Rgb) {
        let column = self.column();
        let width = self.text_width(column);
        let at = self.reserve(1.0);
        self.push(
            at.page,
            Placed::Rule {
                x1_mm: column.x_mm,
                x2_mm: column.x_mm + width,
                y_mm: at.y_mm,
                thickness_pt,
                color,
            },
        );
    }

    // ── block handlers ──────────────────────────────────────────────────────

    fn heading(&mut self, text: &str, level: u8) {
        match level {
            0 => {
                let style = TextStyle {
                    font: PdfFont::HelveticaBold,
                    size_pt: NAME_SIZE_PT,
                    color: NAME_COLOR,
                };
                let center = self.layout.center_name;
                self.write_lines(text, &style, 0.0, center);
                self.rule(0.5, NAME_COLOR);
                self.skip(2.0);
            }
            1 => {
                let style = TextStyle {
                    font: PdfFont::HelveticaBold,
                    size_pt: SECTION_SIZE_PT,
                    color: self.accent,
                };
                // Keep the heading together with at least one body line.
                let keep = style.line_height_mm() + 1.0 + BODY_SIZE_PT * MM_PER_PT * LINE_SPACING;
                let at = self.reserve(keep);
                *self.cursor() = at;
                self.write_lines(text, &style, 0.0, false);
                self.rule(0.3, BODY_COLOR);
                self.skip(1.5);
            }
            _ => {
                let style = TextStyle {
                    font: PdfFont::HelveticaBold,
                    size_pt: ENTRY_SIZE_PT,
                    color: NAME_COLOR,
                };
                self.write_lines(text, &style, 0.0, false);
            }
        }
    }

    fn paragraph(&mut self, text: &str) {
        for line in text.lines() {
            self.write_lines(line, &body_style(), 0.0, false);
        }
    }

    fn bullets(&mut self, items: &[String]) {
        let style = body_style();
        for item in items {
            let placed = self.write_lines(item, &style, BULLET_INDENT_MM, false);
            // Marker sits on the baseline of the item's first line.
            if let Some(&(page, baseline_mm)) = placed.first() {
                let x_mm = self.column().x_mm + 1.0;
                self.push(
                    page,
                    Placed::Text {
                        x_mm,
                        baseline_mm,
                        text: "-".to_string(),
                        font: style.font,
                        size_pt: style.size_pt,
                        color: style.color,
                    },
                );
            }
        }
    }

    fn image(&mut self, data: &[u8], width_mm: f32) {
        let (w_px, h_px) = match photo::dimensions(data) {
            Ok((w, h)) if w > 0 && h > 0 => (w, h),
            Ok(_) => {
                warn!("Skipping zero-sized image block");
                return;
            }
            Err(e) => {
                warn!("Skipping image block that could not be read: {e}");
                return;
            }
        };
        let column = self.column();
        let max_height_mm = if self.region == Region::Full {
            self.layout.content_bottom_mm() - self.cursor().y_mm
        } else {
            // Room for the image plus its gap on an otherwise empty page.
            self.layout.content_bottom_mm() - self.layout.margin_mm - 2.0
        };
        let (width_mm, height_mm) = fit_image(
            width_mm.min(column.width_mm),
            h_px as f32 / w_px as f32,
            max_height_mm.max(1.0),
        );

        if self.region == Region::Full {
            let at = *self.cursor();
            let x_mm = column.right_mm() - width_mm;
            self.float = Some(Float {
                page: at.page,
                bottom_mm: at.y_mm + height_mm,
                left_mm: x_mm,
            });
            self.push(
                at.page,
                Placed::Image {
                    x_mm,
                    top_mm: at.y_mm,
                    width_mm,
                    height_mm,
                    data: data.to_vec(),
                },
            );
        } else {
            let at = self.reserve(height_mm + 2.0);
            self.push(
                at.page,
                Placed::Image {
                    x_mm: column.x_mm,
                    top_mm: at.y_mm,
                    width_mm,
                    height_mm,
                    data: data.to_vec(),
                },
            );
        }
    }

    fn finish(mut self) -> Vec<LaidOutPage> {
        if self.layout.page_border {
            for page in &mut self.pages {
                page.items.push(Placed::Border {
                    inset_mm: BORDER_INSET_MM,
                    color: BORDER_COLOR,
                });
            }
        }
        self.pages
    }
}

/// Size at `width_mm` keeping `aspect` (height / width), shrunk uniformly when
/// taller than `max_height_mm`.
fn fit_image(width_mm: f32, aspect: f32, max_height_mm: f32) -> (f32, f32) {
    let height_mm = width_mm * aspect;
    if height_mm > max_height_mm {
        (max_height_mm / aspect, max_height_mm)
    } else {
        (width_mm, height_mm)
    }
}

fn body_style() -> TextStyle {
    TextStyle {
        font: PdfFont::Helvetica,
        size_pt: BODY_SIZE_PT,
        color: BODY_COLOR,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Entry point
// ────────────────────────────────────────────────────────────────────────────

/// Lays out `blocks` with the geometry of `theme.template` and the heading
/// color of `theme.accent`. Always returns at least one page.
pub fn lay_out(blocks: &[Block], theme: Theme) -> Vec<LaidOutPage> {
    let mut flow = Flow::new(theme);
    for block in blocks {
        match block {
            Block::Heading { text, level } => flow.heading(text, *level),
            Block::Paragraph { text } => flow.paragraph(text),
            Block::BulletList { items } => flow.bullets(items),
            Block::Spacer => flow.skip(SPACER_MM),
            Block::Image { data, width_mm } => flow.image(data, *width_mm),
            Block::Region { region } => flow.switch_region(*region),
        }
    }
    flow.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::page::{MARGIN_MM, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};
    use crate::models::theme::{Accent, Template};

    fn texts(pages: &[LaidOutPage]) -> Vec<&str> {
        pages
            .iter()
            .flat_map(|p| &p.items)
            .filter_map(|i| match i {
                Placed::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn long_list(n: usize) -> Block {
        Block::BulletList {
            items: (0..n).map(|i| format!("Achievement number {i}")).collect(),
        }
    }

    #[test]
    fn test_empty_block_list_yields_one_page() {
        let pages = lay_out(&[], Theme::new(Template::Modern, Accent::Blue));
        assert_eq!(pages.len(), 1);
        assert!(pages[0].items.is_empty());
    }

    #[test]
    fn test_section_heading_uses_accent_color() {
        let blocks = vec![
            Block::heading("Skills", 1),
            Block::BulletList {
                items: vec!["Rust".into()],
            },
        ];
        let theme = Theme::new(Template::Classic, Accent::Green);
        let pages = lay_out(&blocks, theme);
        let color = pages[0].items.iter().find_map(|i| match i {
            Placed::Text { text, color, .. } if text == "Skills" => Some(*color),
            _ => None,
        });
        assert_eq!(color, Some(Accent::Green.rgb()));
    }

    #[test]
    fn test_overflow_breaks_onto_new_page() {
        let blocks = vec![Block::heading("Jane Doe", 0), long_list(120)];
        let pages = lay_out(&blocks, Theme::new(Template::Classic, Accent::Blue));
        assert!(pages.len() >= 2, "expected a page break");
        for page in &pages {
            for item in &page.items {
                if let Placed::Text { baseline_mm, .. } = item {
                    assert!(*baseline_mm >= MARGIN_MM);
                    assert!(*baseline_mm <= PAGE_HEIGHT_MM - MARGIN_MM);
                }
            }
        }
        // Every item plus its marker is present exactly once.
        let all = texts(&pages);
        assert_eq!(all.iter().filter(|t| **t == "-").count(), 120);
        assert!(all.contains(&"Achievement number 119"));
    }

    #[test]
    fn test_border_on_every_page_when_template_has_one() {
        let blocks = vec![long_list(150)];
        let classic = lay_out(&blocks, Theme::new(Template::Classic, Accent::Blue));
        assert!(classic
            .iter()
            .all(|p| p.items.iter().any(|i| matches!(i, Placed::Border { .. }))));
        let modern = lay_out(&blocks, Theme::new(Template::Modern, Accent::Blue));
        assert!(modern
            .iter()
            .all(|p| !p.items.iter().any(|i| matches!(i, Placed::Border { .. }))));
    }

    #[test]
    fn test_columns_start_level_and_full_width_resumes_below() {
        let blocks = vec![
            Block::heading("Jane Doe", 0),
            Block::region(Region::Sidebar),
            Block::heading("Skills", 1),
            long_list(3),
            Block::region(Region::Main),
            Block::heading("Work Experience", 1),
            long_list(10),
            Block::region(Region::Full),
            Block::paragraph("Footer line"),
        ];
        let pages = lay_out(&blocks, Theme::new(Template::Modern, Accent::Blue));
        let find = |needle: &str| {
            pages[0]
                .items
                .iter()
                .find_map(|i| match i {
                    Placed::Text {
                        text,
                        x_mm,
                        baseline_mm,
                        ..
                    } if text == needle => Some((*x_mm, *baseline_mm)),
                    _ => None,
                })
                .unwrap()
        };
        let (skills_x, skills_y) = find("Skills");
        let (exp_x, exp_y) = find("Work Experience");
        let (_, footer_y) = find("Footer line");
        let (_, last_y) = find("Achievement number 9");
        assert!((skills_y - exp_y).abs() < 1e-3, "columns start level");
        assert!(skills_x < exp_x);
        assert!(footer_y > last_y, "full width resumes below longer column");
    }

    #[test]
    fn test_full_width_photo_floats_right_and_narrows_text() {
        let png = photo::sample_png(100, 100);
        let long = "word ".repeat(60);
        let blocks = vec![
            Block::heading("Jane Doe", 0),
            Block::Image {
                data: png,
                width_mm: 30.0,
            },
            Block::paragraph(long.clone()),
        ];
        let pages = lay_out(&blocks, Theme::new(Template::Classic, Accent::Blue));
        let image = pages[0].items.iter().find_map(|i| match i {
            Placed::Image { x_mm, width_mm, .. } => Some((*x_mm, *width_mm)),
            _ => None,
        });
        let (x, w) = image.expect("image placed");
        assert!((x + w - (PAGE_WIDTH_MM - MARGIN_MM)).abs() < 1e-3);
        let metrics = get_metrics(PdfFont::Helvetica);
        let first_body_line = pages[0]
            .items
            .iter()
            .find_map(|i| match i {
                Placed::Text { text, font: PdfFont::Helvetica, .. } => Some(text.clone()),
                _ => None,
            })
            .unwrap();
        assert!(metrics.width_mm(&first_body_line, BODY_SIZE_PT) < x - MARGIN_MM);
    }

    #[test]
    fn test_tall_image_is_scaled_to_fit_the_page() {
        let tall = photo::sample_png(10, 150);
        for template in Template::ALL {
            let sidebar_first = template == Template::Creative;
            let mut blocks = vec![Block::heading("Jane Doe", 0)];
            if sidebar_first {
                blocks.push(Block::region(Region::Sidebar));
            }
            blocks.push(Block::Image {
                data: tall.clone(),
                width_mm: 30.0,
            });
            blocks.push(Block::paragraph("word ".repeat(80)));
            let pages = lay_out(&blocks, Theme::new(template, Accent::Blue));
            let (top, width, height) = pages
                .iter()
                .flat_map(|p| &p.items)
                .find_map(|i| match i {
                    Placed::Image {
                        top_mm,
                        width_mm,
                        height_mm,
                        ..
                    } => Some((*top_mm, *width_mm, *height_mm)),
                    _ => None,
                })
                .expect("image placed");
            assert!(top + height <= PAGE_HEIGHT_MM - MARGIN_MM + 1e-3, "{template}");
            assert!(width < 30.0, "{template}: width shrinks with height");
            assert!((height / width - 15.0).abs() < 1e-2, "{template}: aspect kept");
        }
    }

    #[test]
    fn test_fit_image_keeps_images_that_fit() {
        assert_eq!(fit_image(30.0, 0.5, 100.0), (30.0, 15.0));
        assert_eq!(fit_image(30.0, 10.0, 150.0), (15.0, 150.0));
    }

    #[test]
    fn test_unreadable_image_is_skipped() {
        let blocks = vec![
            Block::Image {
                data: b"corrupt".to_vec(),
                width_mm: 30.0,
            },
            Block::paragraph("Still here"),
        ];
        let pages = lay_out(&blocks, Theme::new(Template::Creative, Accent::Navy));
        assert!(!pages[0]
            .items
            .iter()
            .any(|i| matches!(i, Placed::Image { .. })));
        assert_eq!(texts(&pages), vec!["Still here"]);
    }
}
