//! Page and column geometry per template (A4, millimetres, origin top-left).

use crate::models::theme::Template;
use crate::render::Region;

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const MARGIN_MM: f32 = 15.0;
/// Distance of the decorative border from the paper edge.
pub const BORDER_INSET_MM: f32 = 5.0;

/// A vertical strip text flows into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub x_mm: f32,
    pub width_mm: f32,
}

impl Column {
    pub fn right_mm(&self) -> f32 {
        self.x_mm + self.width_mm
    }
}

/// Geometry and decoration for one template.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub width_mm: f32,
    pub height_mm: f32,
    pub margin_mm: f32,
    pub full: Column,
    pub sidebar: Column,
    pub main: Column,
    pub page_border: bool,
    pub center_name: bool,
}

impl PageLayout {
    pub fn column(&self, region: Region) -> Column {
        match region {
            Region::Full => self.full,
            Region::Sidebar => self.sidebar,
            Region::Main => self.main,
        }
    }

    /// Lowest y a line may end at before a page break.
    pub fn content_bottom_mm(&self) -> f32 {
        self.height_mm - self.margin_mm
    }
}

/// Returns the page layout for a template.
///
/// Classic: one 180 mm column, centered name, page border.
/// Modern: 80 mm left / 90 mm right columns, centered name, no border.
/// Creative: 50 mm sidebar / 120 mm main column, left-aligned name, page border.
pub fn page_layout(template: Template) -> PageLayout {
    let full = Column {
        x_mm: MARGIN_MM,
        width_mm: PAGE_WIDTH_MM - 2.0 * MARGIN_MM,
    };
    let (sidebar, main, page_border, center_name) = match template {
        Template::Classic => (full, full, true, true),
        Template::Modern => (
            Column {
                x_mm: MARGIN_MM,
                width_mm: 80.0,
            },
            Column {
                x_mm: 105.0,
                width_mm: 90.0,
            },
            false,
            true,
        ),
        Template::Creative => (
            Column {
                x_mm: MARGIN_MM,
                width_mm: 50.0,
            },
            Column {
                x_mm: 75.0,
                width_mm: 120.0,
            },
            true,
            false,
        ),
    };
    PageLayout {
        width_mm: PAGE_WIDTH_MM,
        height_mm: PAGE_HEIGHT_MM,
        margin_mm: MARGIN_MM,
        full,
        sidebar,
        main,
        page_border,
        center_name,
    }
}
