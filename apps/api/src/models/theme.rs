//! Template and color-theme selectors.
//!
//! A `Theme` is pure presentation: it never changes which sections are rendered,
//! only how they are laid out (template) and which accent color headings use.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::resume::ValidationError;

// ────────────────────────────────────────────────────────────────────────────
// Template
// ────────────────────────────────────────────────────────────────────────────

/// The three layout strategies offered by the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Template {
    /// Single column, ATS-friendly fixed section order.
    #[default]
    Classic,
    /// Two columns: skills on the left, career history on the right.
    Modern,
    /// Narrow contact/skills sidebar followed by the main content.
    Creative,
}

impl Template {
    pub const ALL: [Template; 3] = [Template::Classic, Template::Modern, Template::Creative];

    pub fn as_str(&self) -> &'static str {
        match self {
            Template::Classic => "Classic",
            Template::Modern => "Modern",
            Template::Creative => "Creative",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Template::Classic => "Single column, fixed section order (ATS-safe)",
            Template::Modern => "Two columns: skills left, experience right",
            Template::Creative => "Contact and skills sidebar, main content beside it",
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Template {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classic" | "ats" => Ok(Template::Classic),
            "modern" | "two-column" => Ok(Template::Modern),
            "creative" | "designer" => Ok(Template::Creative),
            _ => Err(ValidationError::UnknownSelector {
                kind: "template",
                value: s.to_string(),
            }),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Accent color
// ────────────────────────────────────────────────────────────────────────────

/// Heading accent colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Accent {
    #[default]
    Blue,
    Navy,
    Green,
    DarkGray,
}

/// An 8-bit RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

impl Accent {
    pub const ALL: [Accent; 4] = [Accent::Blue, Accent::Navy, Accent::Green, Accent::DarkGray];

    pub fn as_str(&self) -> &'static str {
        match self {
            Accent::Blue => "Blue",
            Accent::Navy => "Navy",
            Accent::Green => "Green",
            Accent::DarkGray => "Dark Gray",
        }
    }

    pub fn rgb(&self) -> Rgb {
        match self {
            Accent::Blue => Rgb(0, 102, 204),
            Accent::Navy => Rgb(0, 0, 102),
            Accent::Green => Rgb(0, 153, 0),
            Accent::DarkGray => Rgb(50, 50, 50),
        }
    }
}

impl fmt::Display for Accent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Accent {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "blue" => Ok(Accent::Blue),
            "navy" => Ok(Accent::Navy),
            "green" => Ok(Accent::Green),
            "darkgray" | "darkgrey" => Ok(Accent::DarkGray),
            _ => Err(ValidationError::UnknownSelector {
                kind: "theme",
                value: s.to_string(),
            }),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Theme
// ────────────────────────────────────────────────────────────────────────────

/// Template × accent. Selected once per render request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Theme {
    pub template: Template,
    pub accent: Accent,
}

impl Theme {
    pub fn new(template: Template, accent: Accent) -> Self {
        Self { template, accent }
    }
}
