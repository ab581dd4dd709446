//! Maps a certificate design onto a physical page.
//!
//! Everything here is plain geometry in millimetres with the origin at the
//! top-left corner of the page, so it can be checked without a font or a PDF
//! backend. `pdf.rs` turns a `Layout` into drawing calls.
//!
//! genpdf only draws lines at the PDF default width, so anything thicker
//! (a border, the page background) is planned as a band of parallel hairlines
//! close enough together to print solid.

use common::model::canvas::{CanvasScale, Point, LOGICAL_HEIGHT, LOGICAL_WIDTH};
use common::model::certificate::{
    BorderConfig, BorderStyle, DesignElements, ElementName, BORDER_INSETS, LOGO_MAX_HEIGHT,
    LOGO_MAX_WIDTH, LOGO_TOP,
};

/// A4 landscape.
pub const PAGE_WIDTH_MM: f64 = 297.0;
pub const PAGE_HEIGHT_MM: f64 = 210.0;

const PT_PER_MM: f64 = 72.0 / 25.4;

/// Width genpdf strokes every line with: one point.
pub const HAIRLINE_MM: f64 = 25.4 / 72.0;

/// Distance between neighbouring hairlines of a band. Below `HAIRLINE_MM`
/// so the lines overlap.
const LINE_PITCH_MM: f64 = HAIRLINE_MM * 0.75;

/// Upper bound on the hairlines of one band.
const MAX_BAND_LINES: usize = 1024;

/// Upper bound on the dashes along one side of a border.
pub const MAX_DASHES_PER_SIDE: usize = 1000;

const LOGO_CENTER_X: f64 = LOGICAL_WIDTH / 2.0;

pub type Rgb = (u8, u8, u8);

/// `#rgb` or `#rrggbb`.
pub fn parse_hex_color(value: &str) -> Option<Rgb> {
    let digits = value.trim().strip_prefix('#')?;
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match digits.len() {
        3 => {
            let mut expanded = digits.chars().map(|c| {
                let pair: String = [c, c].iter().collect();
                channel(&pair)
            });
            Some((expanded.next()??, expanded.next()??, expanded.next()??))
        }
        6 => Some((
            channel(digits.get(0..2)?)?,
            channel(digits.get(2..4)?)?,
            channel(digits.get(4..6)?)?,
        )),
        _ => None,
    }
}

/// Values substituted into the recipient-specific elements.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipient {
    pub student_name: String,
    pub course_name: String,
    pub issue_date: String,
}

/// One line of text, centred on `center_x` with its baseline on `baseline_y`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub element: ElementName,
    pub text: String,
    pub center_x: f64,
    pub baseline_y: f64,
    pub font_size_pt: u8,
    pub color: Rgb,
}

/// An open polyline drawn one hairline wide.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub points: Vec<(f64, f64)>,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogoBox {
    pub source: String,
    pub center_x: f64,
    pub top: f64,
    pub max_width: f64,
    pub max_height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    /// Millimetres per logical canvas unit.
    pub scale: f64,
    /// Horizontal hairlines filling the page, drawn first.
    pub background: Vec<Line>,
    pub borders: Vec<Line>,
    pub texts: Vec<TextRun>,
    pub logo: Option<LogoBox>,
}

/// Plans a page of `page_width` × `page_height` mm.
///
/// Without a recipient the design's own placeholder strings are shown, which
/// is what the preview renders.
pub fn plan(
    design: &DesignElements,
    recipient: Option<&Recipient>,
    page_width: f64,
    page_height: f64,
) -> Layout {
    let scale = CanvasScale::fit(page_width, page_height);
    let mm = scale.factor();
    let text_color = parse_hex_color(&design.text_color).unwrap_or((0, 0, 0));
    let title_color = parse_hex_color(&design.title_color).unwrap_or(text_color);
    let background_color = parse_hex_color(&design.background_color).unwrap_or((255, 255, 255));

    let background = band_offsets(page_height)
        .into_iter()
        .map(|offset| {
            let y = page_height / 2.0 + offset;
            Line {
                points: vec![(0.0, y), (page_width, y)],
                color: background_color,
            }
        })
        .collect();

    let borders = [&design.outer_border, &design.inner_border1, &design.inner_border2]
        .into_iter()
        .zip(BORDER_INSETS)
        .flat_map(|(border, inset)| border_lines(border, inset, scale))
        .collect();

    let texts = ElementName::POSITIONED
        .into_iter()
        .filter_map(|element| {
            let anchor = scale.to_screen(design.position(element)?);
            let text = element_text(design, recipient, element);
            if text.trim().is_empty() {
                return None;
            }
            let size_px = design.font_size * element.size_factor();
            Some(TextRun {
                element,
                text,
                center_x: anchor.x,
                baseline_y: anchor.y,
                font_size_pt: font_size_pt(size_px * mm),
                color: if element == ElementName::Title {
                    title_color
                } else {
                    text_color
                },
            })
        })
        .collect();

    let logo = design
        .logo_url
        .as_ref()
        .filter(|url| !url.trim().is_empty())
        .map(|url| LogoBox {
            source: url.clone(),
            center_x: LOGO_CENTER_X * mm,
            top: LOGO_TOP * mm,
            max_width: LOGO_MAX_WIDTH * mm,
            max_height: LOGO_MAX_HEIGHT * mm,
        });

    Layout {
        scale: mm,
        background,
        borders,
        texts,
        logo,
    }
}

fn element_text(
    design: &DesignElements,
    recipient: Option<&Recipient>,
    element: ElementName,
) -> String {
    match (recipient, element) {
        (Some(r), ElementName::StudentName) => r.student_name.clone(),
        (Some(r), ElementName::CourseName) => r.course_name.clone(),
        (Some(r), ElementName::IssueDateValue) => r.issue_date.clone(),
        _ => design.placeholder_text(element).to_string(),
    }
}

/// Converts a glyph size in millimetres to whole points (genpdf takes `u8`).
fn font_size_pt(size_mm: f64) -> u8 {
    (size_mm * PT_PER_MM).round().clamp(1.0, 255.0) as u8
}

/// Offsets, across a band `thickness` mm wide, of the hairlines that fill it.
/// A band no wider than a hairline is the single line through its centre.
fn band_offsets(thickness: f64) -> Vec<f64> {
    let span = thickness - HAIRLINE_MM;
    if !span.is_finite() || span <= 0.0 {
        return vec![0.0];
    }
    let steps = ((span / LINE_PITCH_MM).ceil() as usize).clamp(1, MAX_BAND_LINES - 1);
    (0..=steps)
        .map(|i| -span / 2.0 + span * i as f64 / steps as f64)
        .collect()
}

/// Hairlines for one border rectangle `inset` logical units inside the canvas.
fn border_lines(border: &BorderConfig, inset: f64, scale: CanvasScale) -> Vec<Line> {
    if !border.is_visible() {
        return Vec::new();
    }
    let mm = scale.factor();
    let color = parse_hex_color(&border.color).unwrap_or((0, 0, 0));
    let thickness = border.width * mm;
    let frame = |center: f64, thickness: f64| {
        band_offsets(thickness)
            .into_iter()
            .map(move |offset| Line {
                points: rectangle(center + offset / mm, scale).to_vec(),
                color,
            })
    };

    match border.style {
        BorderStyle::None => Vec::new(),
        BorderStyle::Solid => frame(inset, thickness).collect(),
        BorderStyle::Double => {
            // Two lines a third of the width each, with a third of gap between.
            let offset = border.width / 3.0;
            frame(inset - offset, thickness / 3.0)
                .chain(frame(inset + offset, thickness / 3.0))
                .collect()
        }
        BorderStyle::Dashed | BorderStyle::Dotted => {
            let (dash, gap) = match border.dash_pattern() {
                Some((dash, gap)) => (dash * mm, gap * mm),
                None => (thickness, thickness * 1.5),
            };
            let offsets = band_offsets(thickness);
            let corners = rectangle(inset, scale);
            let mut lines = Vec::new();
            for side in corners.windows(2) {
                let normal = unit_normal(side[0], side[1]);
                for (from, to) in dashes(side[0], side[1], dash, gap) {
                    lines.extend(offsets.iter().map(|&offset| {
                        let shift =
                            |p: (f64, f64)| (p.0 + normal.0 * offset, p.1 + normal.1 * offset);
                        Line {
                            points: vec![shift(from), shift(to)],
                            color,
                        }
                    }));
                }
            }
            lines
        }
    }
}

/// Closed rectangle `inset` logical units inside the canvas, in page mm.
fn rectangle(inset: f64, scale: CanvasScale) -> [(f64, f64); 5] {
    let corner = |x: f64, y: f64| {
        let p = scale.to_screen(Point::new(x, y));
        (p.x, p.y)
    };
    let (left, top) = (inset, inset);
    let (right, bottom) = (LOGICAL_WIDTH - inset, LOGICAL_HEIGHT - inset);
    [
        corner(left, top),
        corner(right, top),
        corner(right, bottom),
        corner(left, bottom),
        corner(left, top),
    ]
}

fn unit_normal(from: (f64, f64), to: (f64, f64)) -> (f64, f64) {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let length = (dx * dx + dy * dy).sqrt();
    if length == 0.0 {
        (0.0, 0.0)
    } else {
        (-dy / length, dx / length)
    }
}

/// Splits the segment `from → to` into dashes of `dash` separated by `gap`.
/// The last dash is cut at the segment end.
///
/// Dashes are at least a hairline long, and a pattern that would need more
/// than `MAX_DASHES_PER_SIDE` dashes is stretched to exactly that many.
fn dashes(from: (f64, f64), to: (f64, f64), dash: f64, gap: f64) -> Vec<((f64, f64), (f64, f64))> {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let length = (dx * dx + dy * dy).sqrt();
    if !length.is_finite() || length == 0.0 {
        return Vec::new();
    }
    let mut dash = if dash.is_finite() { dash.max(HAIRLINE_MM) } else { length };
    let gap = if gap.is_finite() { gap.max(0.0) } else { 0.0 };
    let mut period = dash + gap;
    let cap = MAX_DASHES_PER_SIDE as f64;
    if length / period > cap {
        let stretch = length / (cap * period);
        dash *= stretch;
        period *= stretch;
    }
    let count = ((length / period).ceil() as usize).clamp(1, MAX_DASHES_PER_SIDE);
    let at = |d: f64| (from.0 + dx * d / length, from.1 + dy * d / length);
    (0..count)
        .map(|i| i as f64 * period)
        .filter(|&start| start < length)
        .map(|start| (at(start), at((start + dash).min(length))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn a4() -> Layout {
        plan(&DesignElements::default(), None, PAGE_WIDTH_MM, PAGE_HEIGHT_MM)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn hex_colors_parse_in_both_lengths() {
        assert_eq!(parse_hex_color("#8b6f47"), Some((0x8b, 0x6f, 0x47)));
        assert_eq!(parse_hex_color("#fff"), Some((255, 255, 255)));
        assert_eq!(parse_hex_color("8b6f47"), None);
        assert_eq!(parse_hex_color("#12345"), None);
        assert_eq!(parse_hex_color("#gggggg"), None);
    }

    #[test]
    fn logical_canvas_maps_linearly_onto_a4() {
        let layout = a4();
        assert!(close(layout.scale, PAGE_WIDTH_MM / LOGICAL_WIDTH));

        let title = &layout.texts[0];
        assert_eq!(title.element, ElementName::Title);
        assert!(close(title.center_x, 360.0 * layout.scale));
        assert!(close(title.baseline_y, 76.275 * layout.scale));
        assert_eq!(title.color, (0x8b, 0x6f, 0x47));

        let signature = layout
            .texts
            .iter()
            .find(|t| t.element == ElementName::SignatureBlock)
            .unwrap();
        assert!(close(signature.center_x, 540.0 * layout.scale));
        assert_eq!(signature.color, (0x33, 0x33, 0x33));
    }

    #[test]
    fn moved_elements_move_on_the_page_and_nothing_else_does() {
        let mut design = DesignElements::default();
        let before = plan(&design, None, PAGE_WIDTH_MM, PAGE_HEIGHT_MM);
        design.set_position(ElementName::SignatureBlock, Point::new(468.0, 428.5));
        let after = plan(&design, None, PAGE_WIDTH_MM, PAGE_HEIGHT_MM);

        for (old, new) in before.texts.iter().zip(&after.texts) {
            if new.element == ElementName::SignatureBlock {
                assert!(close(new.center_x, 468.0 * after.scale));
                assert!(close(new.baseline_y, 428.5 * after.scale));
            } else {
                assert_eq!(old, new);
            }
        }
        assert_eq!(before.borders, after.borders);
    }

    #[test]
    fn recipients_replace_only_their_placeholders() {
        let recipient = Recipient {
            student_name: "Ana Souza".into(),
            course_name: "Thai massage".into(),
            issue_date: "March 3, 2025".into(),
        };
        let layout = plan(
            &DesignElements::default(),
            Some(&recipient),
            PAGE_WIDTH_MM,
            PAGE_HEIGHT_MM,
        );
        let text = |element| {
            layout
                .texts
                .iter()
                .find(|t| t.element == element)
                .map(|t| t.text.clone())
                .unwrap()
        };
        let defaults = DesignElements::default();
        assert_eq!(text(ElementName::StudentName), "Ana Souza");
        assert_eq!(text(ElementName::CourseName), "Thai massage");
        assert_eq!(text(ElementName::IssueDateValue), "March 3, 2025");
        assert_eq!(text(ElementName::Title), defaults.title_text);
        assert_eq!(text(ElementName::IssueDateText), defaults.issue_date_text);
    }

    #[test]
    fn font_sizes_follow_element_factors() {
        let layout = a4();
        let size = |element| {
            layout
                .texts
                .iter()
                .find(|t| t.element == element)
                .unwrap()
                .font_size_pt
        };
        // 16 logical units at 0.4125 mm each is about 18.7 pt.
        assert_eq!(size(ElementName::IssueDateText), 19);
        assert_eq!(size(ElementName::Title), 37);
        assert!(size(ElementName::StudentName) > size(ElementName::CourseName));
    }

    #[test]
    fn blank_texts_are_skipped() {
        let mut design = DesignElements::default();
        design.signature_text = "  ".into();
        let layout = plan(&design, None, PAGE_WIDTH_MM, PAGE_HEIGHT_MM);
        assert!(layout
            .texts
            .iter()
            .all(|t| t.element != ElementName::SignatureBlock));
    }

    /// Design with only the outer border showing.
    fn outer_only(style: BorderStyle, width: f64) -> DesignElements {
        let mut design = DesignElements::default();
        design.outer_border.style = style;
        design.outer_border.width = width;
        design.inner_border1.style = BorderStyle::None;
        design.inner_border2.style = BorderStyle::None;
        design
    }

    /// Distinct `y` values of the top side of every closed frame.
    fn top_edges(layout: &Layout) -> Vec<f64> {
        let mut ys: Vec<f64> = layout
            .borders
            .iter()
            .filter(|l| l.points.len() == 5)
            .map(|l| l.points[0].1)
            .collect();
        ys.sort_by(f64::total_cmp);
        ys
    }

    #[test]
    fn default_borders_are_solid_dashed_solid() {
        let layout = a4();
        let outer = (0x8b, 0x6f, 0x47);
        let frames = layout
            .borders
            .iter()
            .filter(|l| l.points.len() == 5 && l.color == outer)
            .count();
        // The 8-unit outer band needs several hairlines, the 1-unit inner one a single line.
        assert!(frames > 2);
        let dashed: Vec<&Line> = layout.borders.iter().filter(|l| l.points.len() == 2).collect();
        assert!(dashed.len() > 4);
        assert!(dashed.iter().all(|l| l.color == (0xc9, 0xa9, 0x6e)));
    }

    #[test]
    fn border_width_sets_the_printed_band() {
        for width in [2.0, 8.0, 20.0] {
            let layout = plan(
                &outer_only(BorderStyle::Solid, width),
                None,
                PAGE_WIDTH_MM,
                PAGE_HEIGHT_MM,
            );
            let ys = top_edges(&layout);
            let printed = ys[ys.len() - 1] - ys[0] + HAIRLINE_MM;
            assert!(close(printed, width * layout.scale), "width {width}");
            assert!(ys.windows(2).all(|pair| pair[1] - pair[0] < HAIRLINE_MM));
            let center = (ys[0] + ys[ys.len() - 1]) / 2.0;
            assert!(close(center, BORDER_INSETS[0] * layout.scale));
        }

        let thin = plan(
            &outer_only(BorderStyle::Solid, 0.25),
            None,
            PAGE_WIDTH_MM,
            PAGE_HEIGHT_MM,
        );
        assert_eq!(thin.borders.len(), 1);
    }

    #[test]
    fn double_borders_print_two_bands() {
        let layout = plan(
            &outer_only(BorderStyle::Double, 12.0),
            None,
            PAGE_WIDTH_MM,
            PAGE_HEIGHT_MM,
        );
        let ys = top_edges(&layout);
        let gaps: Vec<f64> = ys.windows(2).map(|pair| pair[1] - pair[0]).collect();
        let wide = gaps.iter().filter(|&&gap| gap > HAIRLINE_MM).count();
        assert_eq!(wide, 1);
        // Two thirds of ink around one third of gap, spanning the full width.
        let printed = ys[ys.len() - 1] - ys[0] + HAIRLINE_MM;
        assert!(close(printed, 12.0 * layout.scale));
    }

    #[test]
    fn hidden_borders_draw_nothing() {
        let mut design = DesignElements::default();
        design.outer_border.style = BorderStyle::None;
        design.inner_border1.width = 0.0;
        design.inner_border2.style = BorderStyle::Double;
        let layout = plan(&design, None, PAGE_WIDTH_MM, PAGE_HEIGHT_MM);
        assert_eq!(layout.borders.len(), 2);
        assert!(layout.borders.iter().all(|s| s.points.len() == 5));
    }

    #[test]
    fn dashes_cover_the_segment_with_gaps() {
        let segments = dashes((0.0, 0.0), (10.0, 0.0), 3.0, 1.0);
        let starts: Vec<f64> = segments.iter().map(|(from, _)| from.0).collect();
        assert_eq!(starts, vec![0.0, 4.0, 8.0]);
        assert_eq!(segments[2].1, (10.0, 0.0));
        assert!(dashes((1.0, 1.0), (1.0, 1.0), 3.0, 1.0).is_empty());
    }

    #[test]
    fn degenerate_dash_patterns_stay_bounded() {
        let side = ((0.0, 0.0), (280.0, 0.0));
        for (dash, gap) in [(1e-9, 0.0), (0.0, 0.0), (-1.0, -1.0), (f64::NAN, f64::NAN)] {
            let segments = dashes(side.0, side.1, dash, gap);
            assert!(!segments.is_empty());
            assert!(segments.len() <= MAX_DASHES_PER_SIDE);
            assert!(segments.iter().all(|(from, to)| to.0 >= from.0));
        }

        let mut design = outer_only(BorderStyle::Dashed, 2.0);
        design.outer_border.dash_length = 1e-9;
        design.outer_border.dash_gap = 0.0;
        let layout = plan(&design, None, PAGE_WIDTH_MM, PAGE_HEIGHT_MM);
        let per_dash = band_offsets(2.0 * layout.scale).len();
        assert!(layout.borders.len() <= 4 * MAX_DASHES_PER_SIDE * per_dash);
    }

    #[test]
    fn band_offsets_are_bounded() {
        assert_eq!(band_offsets(0.0), vec![0.0]);
        assert_eq!(band_offsets(f64::NAN), vec![0.0]);
        assert_eq!(band_offsets(f64::INFINITY), vec![0.0]);
        assert!(band_offsets(1e9).len() <= MAX_BAND_LINES);
    }

    #[test]
    fn background_covers_the_page() {
        let layout = a4();
        let ys: Vec<f64> = layout.background.iter().map(|l| l.points[0].1).collect();
        assert!(close(ys[0], HAIRLINE_MM / 2.0));
        assert!(close(ys[ys.len() - 1], PAGE_HEIGHT_MM - HAIRLINE_MM / 2.0));
        assert!(ys.windows(2).all(|pair| pair[1] - pair[0] < HAIRLINE_MM));
        assert!(layout.background.iter().all(|l| {
            let y = l.points[0].1;
            l.color == (0xff, 0xfd, 0xf7) && l.points == vec![(0.0, y), (PAGE_WIDTH_MM, y)]
        }));
        assert!(layout.logo.is_none());
    }
}
