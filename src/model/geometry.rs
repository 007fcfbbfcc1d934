//! Fixed page geometry for rendered documents.
//!
//! All values are PDF points (1/72 inch). The defaults reproduce an A4
//! page with 20 mm margins; a `[page]` table in the config file may
//! override individual fields at startup.

use serde::{Deserialize, Serialize};

/// Points per millimetre.
pub const MM: f32 = 72.0 / 25.4;

/// Font size and line advance for one kind of text line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Font size in points.
    pub size: f32,
    /// Vertical advance (baseline to baseline) in points.
    pub leading: f32,
}

/// Page size, margins and line metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    /// Extra space after the subject line.
    pub subject_gap: f32,
    /// Space above and below the rule separating headers from the body.
    pub rule_gap: f32,
    /// Height of a blank body line.
    pub blank_line: f32,
    /// Extra space after each body paragraph line.
    pub paragraph_gap: f32,
    /// Subject line at the top of the first page.
    pub subject: TextStyle,
    /// Labeled header lines (From, To, Cc, Date).
    pub header: TextStyle,
    /// Body text.
    pub body: TextStyle,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            width: 595.28,
            height: 841.89,
            margin_top: 20.0 * MM,
            margin_bottom: 20.0 * MM,
            margin_left: 20.0 * MM,
            margin_right: 20.0 * MM,
            subject_gap: 4.0 * MM,
            rule_gap: 5.0 * MM,
            blank_line: 3.0 * MM,
            paragraph_gap: 1.0 * MM,
            subject: TextStyle {
                size: 14.0,
                leading: 20.0,
            },
            header: TextStyle {
                size: 9.0,
                leading: 14.0,
            },
            body: TextStyle {
                size: 10.0,
                leading: 16.0,
            },
        }
    }
}

impl PageGeometry {
    /// Horizontal space available for text.
    pub fn text_width(&self) -> f32 {
        (self.width - self.margin_left - self.margin_right).max(0.0)
    }

    /// Y coordinate of the first baseline area (top of the text box).
    pub fn top(&self) -> f32 {
        self.height - self.margin_top
    }

    /// Lowest Y coordinate a baseline may reach.
    pub fn bottom(&self) -> f32 {
        self.margin_bottom
    }
}
