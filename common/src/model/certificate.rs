//! The certificate design document: colors, fonts, placeholder texts, borders
//! and the logical-canvas position of every positionable text element.

use crate::model::canvas::Point;
use crate::validation::{border_width, hex_color, not_blank};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// How a border line is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
    Double,
    None,
}

/// One of the three independent frame lines.
///
/// `dash_length` and `dash_gap` are kept for every style so switching back and
/// forth in the editor does not lose them, but they only mean something when
/// `style` is `Dashed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BorderConfig {
    #[validate(custom(function = "border_width"))]
    pub width: f64,
    #[validate(custom(function = "hex_color"))]
    pub color: String,
    pub style: BorderStyle,
    #[validate(range(min = 0.5, max = 100.0))]
    pub dash_length: f64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub dash_gap: f64,
}

impl BorderConfig {
    fn new(width: f64, color: &str, style: BorderStyle, dash_length: f64, dash_gap: f64) -> Self {
        Self {
            width,
            color: color.to_string(),
            style,
            dash_length,
            dash_gap,
        }
    }

    /// `(dash length, gap)` when the border is dashed.
    pub fn dash_pattern(&self) -> Option<(f64, f64)> {
        match self.style {
            BorderStyle::Dashed => Some((self.dash_length, self.dash_gap)),
            _ => None,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.width > 0.0 && self.style != BorderStyle::None
    }
}

/// Distance of the outer, first inner and second inner border from the
/// canvas edge, in logical units.
pub const BORDER_INSETS: [f64; 3] = [12.0, 24.0, 32.0];

/// The logo has no stored position. It is fitted into a box of
/// `LOGO_MAX_WIDTH` × `LOGO_MAX_HEIGHT`, centred horizontally, `LOGO_TOP`
/// below the top edge.
pub const LOGO_TOP: f64 = 14.0;
pub const LOGO_MAX_WIDTH: f64 = 110.0;
pub const LOGO_MAX_HEIGHT: f64 = 40.0;

/// Every presentation property of a certificate.
///
/// Positions are the anchor (horizontal center, text baseline) of each element
/// in logical canvas units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DesignElements {
    #[validate(custom(function = "hex_color"))]
    pub background_color: String,
    #[validate(custom(function = "hex_color"))]
    pub text_color: String,
    #[validate(custom(function = "hex_color"))]
    pub title_color: String,
    #[validate(custom(function = "not_blank"))]
    pub font_family: String,
    #[validate(range(min = 6.0, max = 96.0))]
    pub font_size: f64,

    #[validate(custom(function = "not_blank"), length(max = 120))]
    pub title_text: String,
    #[validate(length(max = 120))]
    pub student_name_placeholder: String,
    #[validate(length(max = 120))]
    pub course_name_placeholder: String,
    #[validate(length(max = 120))]
    pub issue_date_text: String,
    #[validate(length(max = 120))]
    pub issue_date_placeholder: String,
    #[validate(length(max = 120))]
    pub signature_text: String,
    pub logo_url: Option<String>,

    pub title_pos_x: f64,
    pub title_pos_y: f64,
    pub student_name_pos_x: f64,
    pub student_name_pos_y: f64,
    pub course_name_pos_x: f64,
    pub course_name_pos_y: f64,
    pub issue_date_text_pos_x: f64,
    pub issue_date_text_pos_y: f64,
    pub issue_date_value_pos_x: f64,
    pub issue_date_value_pos_y: f64,
    pub signature_block_pos_x: f64,
    pub signature_block_pos_y: f64,

    #[validate(nested)]
    pub outer_border: BorderConfig,
    #[validate(nested)]
    pub inner_border1: BorderConfig,
    #[validate(nested)]
    pub inner_border2: BorderConfig,
}

impl Default for DesignElements {
    fn default() -> Self {
        Self {
            background_color: "#fffdf7".to_string(),
            text_color: "#333333".to_string(),
            title_color: "#8b6f47".to_string(),
            font_family: "Georgia".to_string(),
            font_size: 16.0,

            title_text: "Certificate of Completion".to_string(),
            student_name_placeholder: "[Student Name]".to_string(),
            course_name_placeholder: "[Course Name]".to_string(),
            issue_date_text: "Date of issue".to_string(),
            issue_date_placeholder: "[Issue Date]".to_string(),
            signature_text: "Academy Director".to_string(),
            logo_url: None,

            // 50% / 15%
            title_pos_x: 360.0,
            title_pos_y: 76.275,
            // 50% / 40%
            student_name_pos_x: 360.0,
            student_name_pos_y: 203.4,
            // 50% / 58%
            course_name_pos_x: 360.0,
            course_name_pos_y: 294.93,
            // 20% / 80%
            issue_date_text_pos_x: 144.0,
            issue_date_text_pos_y: 406.8,
            // 20% / 86%
            issue_date_value_pos_x: 144.0,
            issue_date_value_pos_y: 437.31,
            // 75% / 80%
            signature_block_pos_x: 540.0,
            signature_block_pos_y: 406.8,

            outer_border: BorderConfig::new(8.0, "#8b6f47", BorderStyle::Solid, 10.0, 5.0),
            inner_border1: BorderConfig::new(2.0, "#c9a96e", BorderStyle::Dashed, 8.0, 4.0),
            inner_border2: BorderConfig::new(1.0, "#8b6f47", BorderStyle::Solid, 6.0, 3.0),
        }
    }
}

impl DesignElements {
    /// Current position of `element`, `None` for elements without stored
    /// coordinates (the logo).
    pub fn position(&self, element: ElementName) -> Option<Point> {
        let (x, y) = match element {
            ElementName::Title => (self.title_pos_x, self.title_pos_y),
            ElementName::StudentName => (self.student_name_pos_x, self.student_name_pos_y),
            ElementName::CourseName => (self.course_name_pos_x, self.course_name_pos_y),
            ElementName::IssueDateText => (self.issue_date_text_pos_x, self.issue_date_text_pos_y),
            ElementName::IssueDateValue => {
                (self.issue_date_value_pos_x, self.issue_date_value_pos_y)
            }
            ElementName::SignatureBlock => {
                (self.signature_block_pos_x, self.signature_block_pos_y)
            }
            ElementName::Logo => return None,
        };
        Some(Point::new(x, y))
    }

    /// Writes the two coordinate fields owned by `element`. Returns `false`
    /// and leaves everything untouched for elements without stored coordinates.
    pub fn set_position(&mut self, element: ElementName, point: Point) -> bool {
        let (x, y) = match element {
            ElementName::Title => (&mut self.title_pos_x, &mut self.title_pos_y),
            ElementName::StudentName => {
                (&mut self.student_name_pos_x, &mut self.student_name_pos_y)
            }
            ElementName::CourseName => (&mut self.course_name_pos_x, &mut self.course_name_pos_y),
            ElementName::IssueDateText => {
                (&mut self.issue_date_text_pos_x, &mut self.issue_date_text_pos_y)
            }
            ElementName::IssueDateValue => {
                (&mut self.issue_date_value_pos_x, &mut self.issue_date_value_pos_y)
            }
            ElementName::SignatureBlock => {
                (&mut self.signature_block_pos_x, &mut self.signature_block_pos_y)
            }
            ElementName::Logo => return false,
        };
        *x = point.x;
        *y = point.y;
        true
    }

    /// Text shown for `element` while designing, before any recipient values
    /// are substituted.
    pub fn placeholder_text(&self, element: ElementName) -> &str {
        match element {
            ElementName::Title => &self.title_text,
            ElementName::StudentName => &self.student_name_placeholder,
            ElementName::CourseName => &self.course_name_placeholder,
            ElementName::IssueDateText => &self.issue_date_text,
            ElementName::IssueDateValue => &self.issue_date_placeholder,
            ElementName::SignatureBlock => &self.signature_text,
            ElementName::Logo => self.logo_url.as_deref().unwrap_or(""),
        }
    }
}

/// Fills every field missing from `stored` with the compiled-in default.
///
/// Works on the raw JSON so that documents written before a field existed
/// still load: objects are merged key by key (nested border objects too),
/// `null` counts as absent, keys the current schema does not know are
/// dropped. Merging an already complete document returns it unchanged.
pub fn merge_with_defaults(stored: &Value) -> Result<DesignElements, serde_json::Error> {
    let mut merged = serde_json::to_value(DesignElements::default())?;
    overlay(&mut merged, stored);
    serde_json::from_value(merged)
}

fn overlay(target: &mut Value, stored: &Value) {
    match (target, stored) {
        (_, Value::Null) => {}
        (Value::Object(defaults), Value::Object(values)) => {
            for (key, slot) in defaults.iter_mut() {
                if let Some(value) = values.get(key) {
                    overlay(slot, value);
                }
            }
        }
        (slot, value) => *slot = value.clone(),
    }
}

/// The closed set of elements the canvas lets a designer drag around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementName {
    Title,
    StudentName,
    CourseName,
    IssueDateText,
    IssueDateValue,
    SignatureBlock,
    Logo,
}

impl ElementName {
    /// Elements with persisted coordinates, in drawing order.
    pub const POSITIONED: [ElementName; 6] = [
        ElementName::Title,
        ElementName::StudentName,
        ElementName::CourseName,
        ElementName::IssueDateText,
        ElementName::IssueDateValue,
        ElementName::SignatureBlock,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ElementName::Title => "title",
            ElementName::StudentName => "studentName",
            ElementName::CourseName => "courseName",
            ElementName::IssueDateText => "issueDateText",
            ElementName::IssueDateValue => "issueDateValue",
            ElementName::SignatureBlock => "signatureBlock",
            ElementName::Logo => "logo",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ElementName::Title => "Title",
            ElementName::StudentName => "Student name",
            ElementName::CourseName => "Course name",
            ElementName::IssueDateText => "Issue date label",
            ElementName::IssueDateValue => "Issue date",
            ElementName::SignatureBlock => "Signature",
            ElementName::Logo => "Logo",
        }
    }

    /// Relative font size used when drawing the element.
    pub fn size_factor(&self) -> f64 {
        match self {
            ElementName::Title => 2.0,
            ElementName::StudentName => 1.75,
            ElementName::CourseName => 1.25,
            _ => 1.0,
        }
    }
}

impl fmt::Display for ElementName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownElement(pub String);

impl fmt::Display for UnknownElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown certificate element `{}`", self.0)
    }
}

impl std::error::Error for UnknownElement {}

impl FromStr for ElementName {
    type Err = UnknownElement;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ElementName::POSITIONED
            .iter()
            .chain(std::iter::once(&ElementName::Logo))
            .find(|e| e.as_str() == s)
            .copied()
            .ok_or_else(|| UnknownElement(s.to_string()))
    }
}
