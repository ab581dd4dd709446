//! Pure helpers for the certificate editor: drag geometry, form field
//! application and the CSS used to draw the design on screen.

use base64::{engine::general_purpose, Engine as _};
use common::model::canvas::{CanvasScale, Point, LOGICAL_HEIGHT, LOGICAL_WIDTH};
use common::model::certificate::{
    BorderConfig, BorderStyle, DesignElements, ElementName, BORDER_INSETS, LOGO_MAX_HEIGHT,
    LOGO_MAX_WIDTH, LOGO_TOP,
};

/// Font families offered in the editor. The backend resolves each one to a
/// font file of the same name and falls back to its configured family.
pub const FONT_FAMILIES: [&str; 4] = ["Georgia", "Times New Roman", "Garamond", "Helvetica"];

/// Share of a line box above the baseline. Used to put the element anchor on
/// the text baseline.
const BASELINE_PERCENT: u8 = 80;

/// A drag in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragState {
    pub element: ElementName,
    /// Client coordinates where the pointer went down.
    pub pointer_start: Point,
    /// Logical position of the element at that moment.
    pub element_start: Point,
}

impl DragState {
    /// Logical position for the element when the pointer is at `pointer`.
    pub fn target(&self, pointer: Point, scale: CanvasScale) -> Point {
        let delta = scale.to_logical(Point::new(
            pointer.x - self.pointer_start.x,
            pointer.y - self.pointer_start.y,
        ));
        Point::new(self.element_start.x + delta.x, self.element_start.y + delta.y)
    }
}

/// Design properties edited through plain form inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesignField {
    BackgroundColor,
    TextColor,
    TitleColor,
    FontFamily,
    FontSize,
    TitleText,
    StudentNamePlaceholder,
    CourseNamePlaceholder,
    IssueDateText,
    IssueDatePlaceholder,
    SignatureText,
}

impl DesignField {
    pub const TEXTS: [(DesignField, &'static str); 6] = [
        (DesignField::TitleText, "Title"),
        (DesignField::StudentNamePlaceholder, "Student name placeholder"),
        (DesignField::CourseNamePlaceholder, "Course name placeholder"),
        (DesignField::IssueDateText, "Issue date label"),
        (DesignField::IssueDatePlaceholder, "Issue date placeholder"),
        (DesignField::SignatureText, "Signature"),
    ];

    pub const COLORS: [(DesignField, &'static str); 3] = [
        (DesignField::BackgroundColor, "Background"),
        (DesignField::TextColor, "Text"),
        (DesignField::TitleColor, "Title"),
    ];

    pub fn value(&self, design: &DesignElements) -> String {
        match self {
            DesignField::BackgroundColor => design.background_color.clone(),
            DesignField::TextColor => design.text_color.clone(),
            DesignField::TitleColor => design.title_color.clone(),
            DesignField::FontFamily => design.font_family.clone(),
            DesignField::FontSize => design.font_size.to_string(),
            DesignField::TitleText => design.title_text.clone(),
            DesignField::StudentNamePlaceholder => design.student_name_placeholder.clone(),
            DesignField::CourseNamePlaceholder => design.course_name_placeholder.clone(),
            DesignField::IssueDateText => design.issue_date_text.clone(),
            DesignField::IssueDatePlaceholder => design.issue_date_placeholder.clone(),
            DesignField::SignatureText => design.signature_text.clone(),
        }
    }

    /// Writes `value` into `design`. Returns `false` when the input could not
    /// be understood, leaving `design` untouched.
    pub fn apply(&self, design: &mut DesignElements, value: &str) -> bool {
        let slot = match self {
            DesignField::FontSize => {
                return match value.trim().parse::<f64>() {
                    Ok(size) if size.is_finite() => {
                        design.font_size = size;
                        true
                    }
                    _ => false,
                };
            }
            DesignField::BackgroundColor => &mut design.background_color,
            DesignField::TextColor => &mut design.text_color,
            DesignField::TitleColor => &mut design.title_color,
            DesignField::FontFamily => &mut design.font_family,
            DesignField::TitleText => &mut design.title_text,
            DesignField::StudentNamePlaceholder => &mut design.student_name_placeholder,
            DesignField::CourseNamePlaceholder => &mut design.course_name_placeholder,
            DesignField::IssueDateText => &mut design.issue_date_text,
            DesignField::IssueDatePlaceholder => &mut design.issue_date_placeholder,
            DesignField::SignatureText => &mut design.signature_text,
        };
        *slot = value.to_string();
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderSlot {
    Outer,
    Inner1,
    Inner2,
}

impl BorderSlot {
    pub const ALL: [BorderSlot; 3] = [BorderSlot::Outer, BorderSlot::Inner1, BorderSlot::Inner2];

    pub fn label(&self) -> &'static str {
        match self {
            BorderSlot::Outer => "Outer border",
            BorderSlot::Inner1 => "First inner border",
            BorderSlot::Inner2 => "Second inner border",
        }
    }

    pub fn inset(&self) -> f64 {
        match self {
            BorderSlot::Outer => BORDER_INSETS[0],
            BorderSlot::Inner1 => BORDER_INSETS[1],
            BorderSlot::Inner2 => BORDER_INSETS[2],
        }
    }

    pub fn get<'a>(&self, design: &'a DesignElements) -> &'a BorderConfig {
        match self {
            BorderSlot::Outer => &design.outer_border,
            BorderSlot::Inner1 => &design.inner_border1,
            BorderSlot::Inner2 => &design.inner_border2,
        }
    }

    pub fn get_mut<'a>(&self, design: &'a mut DesignElements) -> &'a mut BorderConfig {
        match self {
            BorderSlot::Outer => &mut design.outer_border,
            BorderSlot::Inner1 => &mut design.inner_border1,
            BorderSlot::Inner2 => &mut design.inner_border2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderField {
    Width,
    Color,
    Style,
    DashLength,
    DashGap,
}

pub const BORDER_STYLES: [(BorderStyle, &str); 5] = [
    (BorderStyle::Solid, "solid"),
    (BorderStyle::Dashed, "dashed"),
    (BorderStyle::Dotted, "dotted"),
    (BorderStyle::Double, "double"),
    (BorderStyle::None, "none"),
];

/// Same contract as [`DesignField::apply`].
pub fn apply_border_field(border: &mut BorderConfig, field: BorderField, value: &str) -> bool {
    let number = || value.trim().parse::<f64>().ok().filter(|n| n.is_finite());
    match field {
        BorderField::Color => border.color = value.to_string(),
        BorderField::Style => match BORDER_STYLES.iter().find(|(_, name)| *name == value) {
            Some((style, _)) => border.style = *style,
            None => return false,
        },
        BorderField::Width => match number() {
            Some(n) => border.width = n,
            None => return false,
        },
        BorderField::DashLength => match number() {
            Some(n) => border.dash_length = n,
            None => return false,
        },
        BorderField::DashGap => match number() {
            Some(n) => border.dash_gap = n,
            None => return false,
        },
    }
    true
}

/// One SVG rectangle of a border, in screen pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct BorderRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub stroke_width: f64,
    pub dash_array: Option<String>,
}

/// Rectangles drawing `border` at `inset` from the canvas edge. Double borders
/// are two thin lines around the inset.
pub fn border_rects(border: &BorderConfig, inset: f64, scale: CanvasScale) -> Vec<BorderRect> {
    if !border.is_visible() {
        return Vec::new();
    }
    let f = scale.factor();
    let rect = |inset: f64, thickness: f64, dash_array: Option<String>| BorderRect {
        x: inset * f,
        y: inset * f,
        width: (LOGICAL_WIDTH - 2.0 * inset) * f,
        height: (LOGICAL_HEIGHT - 2.0 * inset) * f,
        stroke_width: thickness * f,
        dash_array,
    };
    let dashes = |on: f64, off: f64| Some(format!("{} {}", on * f, off * f));
    match border.style {
        BorderStyle::Double => {
            let third = border.width / 3.0;
            vec![rect(inset - third, third, None), rect(inset + third, third, None)]
        }
        BorderStyle::Dashed => vec![rect(
            inset,
            border.width,
            dashes(border.dash_length, border.dash_gap),
        )],
        BorderStyle::Dotted => vec![rect(
            inset,
            border.width,
            dashes(border.width, border.width * 1.5),
        )],
        BorderStyle::Solid | BorderStyle::None => vec![rect(inset, border.width, None)],
    }
}

/// Inline CSS placing `element` with its anchor on the stored position.
pub fn element_style(design: &DesignElements, element: ElementName, scale: CanvasScale) -> String {
    let position = design.position(element).unwrap_or_default();
    let screen = scale.to_screen(position);
    let color = if element == ElementName::Title {
        &design.title_color
    } else {
        &design.text_color
    };
    format!(
        "position:absolute;left:{:.2}px;top:{:.2}px;transform:translate(-50%,-{}%);\
         white-space:nowrap;line-height:1;cursor:move;user-select:none;\
         font-family:'{}';font-size:{:.2}px;color:{};",
        screen.x,
        screen.y,
        BASELINE_PERCENT,
        design.font_family,
        design.font_size * element.size_factor() * scale.factor(),
        color,
    )
}

/// Inline CSS fitting the logo into its box, centred horizontally.
pub fn logo_style(scale: CanvasScale) -> String {
    let f = scale.factor();
    format!(
        "position:absolute;left:50%;top:{:.2}px;transform:translateX(-50%);\
         max-width:{:.2}px;max-height:{:.2}px;",
        LOGO_TOP * f,
        LOGO_MAX_WIDTH * f,
        LOGO_MAX_HEIGHT * f,
    )
}

pub fn canvas_style(design: &DesignElements, scale: CanvasScale) -> String {
    let (width, height) = scale.screen_size();
    format!(
        "position:relative;width:{:.2}px;height:{:.2}px;background:{};overflow:hidden;",
        width, height, design.background_color
    )
}

pub fn logo_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, general_purpose::STANDARD.encode(bytes))
}

/// Preview URL with a cache-busting timestamp.
pub fn pdf_preview_url(template_id: &str, timestamp: u64) -> String {
    format!("/api/certificates/templates/{template_id}/pdf?t={timestamp}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_converts_screen_delta_to_logical_units() {
        let drag = DragState {
            element: ElementName::SignatureBlock,
            pointer_start: Point::new(100.0, 100.0),
            element_start: Point::new(540.0, 406.5),
        };
        let scale = CanvasScale::fit_width(1440.0);
        let target = drag.target(Point::new(-44.0, 144.0), scale);
        assert_eq!(target, Point::new(468.0, 428.5));
    }

    #[test]
    fn drag_is_not_clamped() {
        let drag = DragState {
            element: ElementName::Title,
            pointer_start: Point::new(0.0, 0.0),
            element_start: Point::new(360.0, 76.275),
        };
        let target = drag.target(Point::new(-1000.0, 0.0), CanvasScale::IDENTITY);
        assert_eq!(target.x, -640.0);
        assert!(!target.is_on_canvas());
    }

    #[test]
    fn form_fields_write_the_matching_property() {
        let mut design = DesignElements::default();
        assert!(DesignField::TitleText.apply(&mut design, "Diploma"));
        assert!(DesignField::TitleColor.apply(&mut design, "#112233"));
        assert!(DesignField::FontSize.apply(&mut design, " 18.5 "));
        assert_eq!(design.title_text, "Diploma");
        assert_eq!(design.title_color, "#112233");
        assert_eq!(design.font_size, 18.5);
        assert_eq!(DesignField::FontSize.value(&design), "18.5");
    }

    #[test]
    fn unreadable_numbers_are_ignored() {
        let mut design = DesignElements::default();
        assert!(!DesignField::FontSize.apply(&mut design, "big"));
        assert!(!apply_border_field(&mut design.outer_border, BorderField::Width, ""));
        assert!(!apply_border_field(&mut design.outer_border, BorderField::Style, "wavy"));
        assert_eq!(design, DesignElements::default());
    }

    #[test]
    fn border_fields_round_trip_through_names() {
        let mut border = DesignElements::default().outer_border;
        assert!(apply_border_field(&mut border, BorderField::Style, "double"));
        assert_eq!(border.style, BorderStyle::Double);
        assert!(apply_border_field(&mut border, BorderField::DashGap, "7"));
        assert_eq!(border.dash_gap, 7.0);
    }

    #[test]
    fn border_geometry_follows_style() {
        let scale = CanvasScale::fit_width(360.0);
        let mut border = DesignElements::default().inner_border1;
        let rects = border_rects(&border, 24.0, scale);
        assert_eq!(rects.len(), 1);
        assert_eq!(rects[0].x, 12.0);
        assert_eq!(rects[0].width, 336.0);
        assert_eq!(rects[0].dash_array.as_deref(), Some("4 2"));

        border.style = BorderStyle::Double;
        border.width = 6.0;
        let rects = border_rects(&border, 24.0, CanvasScale::IDENTITY);
        let insets: Vec<f64> = rects.iter().map(|r| r.x).collect();
        assert_eq!(insets, vec![22.0, 26.0]);
        assert!(rects.iter().all(|r| r.stroke_width == 2.0));

        border.style = BorderStyle::None;
        assert!(border_rects(&border, 24.0, scale).is_empty());
    }

    #[test]
    fn element_css_scales_font_and_position() {
        let design = DesignElements::default();
        let css = element_style(&design, ElementName::Title, CanvasScale::fit_width(360.0));
        assert!(css.contains("left:180.00px;"));
        assert!(css.contains("font-size:16.00px"));
        assert!(css.contains("color:#8b6f47"));
        assert!(css.contains("translate(-50%,-80%)"));
    }

    #[test]
    fn logo_urls_are_data_urls() {
        assert_eq!(logo_data_url("image/png", b"png"), "data:image/png;base64,cG5n");
        assert_eq!(pdf_preview_url("t-1", 42), "/api/certificates/templates/t-1/pdf?t=42");
    }
}
