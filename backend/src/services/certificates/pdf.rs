//! Certificate PDFs.
//!
//! genpdf lays elements out top to bottom; a certificate places everything
//! absolutely, so the whole page is one custom `Element` that replays a
//! `layout::Layout` onto the page area.

use super::layout::{self, Layout, Line, LogoBox, Recipient, Rgb, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};
use crate::config::Config;
use crate::responses::error_response;
use crate::state::AppState;
use actix_web::http::header;
use actix_web::{web, HttpResponse};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use common::model::certificate::DesignElements;
use common::model::template::CertificateTemplate;
use common::{Error, Result};
use genpdf::elements::Image as PdfImage;
use genpdf::fonts::{FontData, FontFamily};
use genpdf::render::Area;
use genpdf::style::{Color, Style};
use genpdf::{Context, Document, Element, Mm, Position, RenderResult, Size};
use image::{load_from_memory, DynamicImage, GenericImageView};
use log::warn;
use png::{BitDepth as PngBitDepth, ColorType as PngColorType, Encoder as PngEncoder};
use std::io::Write;
use tempfile::NamedTempFile;

/// Share of the line height above the baseline, for placing text by its
/// baseline.
const ASCENT_RATIO: f64 = 0.8;

/// `GET /api/certificates/templates/{id}/pdf`: the template with its
/// placeholder texts, shown inline.
pub(crate) async fn process(state: web::Data<AppState>, id: web::Path<String>) -> HttpResponse {
    let template: CertificateTemplate = match state.repo.find(&id) {
        Ok(template) => template,
        Err(err) => return error_response(&err),
    };
    let config = state.config.clone();
    let rendered = web::block(move || {
        let mut bytes = Vec::new();
        render_certificate(template.design(), None, &config, template.name(), &mut bytes)
            .map(|_| bytes)
    })
    .await;

    match rendered {
        Ok(Ok(bytes)) => HttpResponse::Ok()
            .content_type("application/pdf")
            .insert_header((
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}.pdf\"", id.as_str()),
            ))
            .body(bytes),
        Ok(Err(err)) => error_response(&err),
        Err(err) => error_response(&Error::Render(err.to_string())),
    }
}

/// Renders one certificate page into `out`.
pub fn render_certificate<W: Write>(
    design: &DesignElements,
    recipient: Option<&Recipient>,
    config: &Config,
    title: &str,
    out: W,
) -> Result<()> {
    let layout = layout::plan(design, recipient, PAGE_WIDTH_MM, PAGE_HEIGHT_MM);
    let logo = match &layout.logo {
        Some(logo_box) => match load_logo(logo_box) {
            Ok(logo) => Some(logo),
            Err(err) => {
                warn!("Skipping certificate logo: {}", err);
                None
            }
        },
        None => None,
    };

    let mut doc = configure_document(config, &design.font_family)?;
    doc.set_title(title);
    doc.push(CertificatePage { layout, logo });
    doc.render(out).map_err(|e| Error::Render(e.to_string()))
}

/// The design's own font family when it is installed, the configured one
/// otherwise.
fn load_font(config: &Config, preferred: &str) -> Result<FontFamily<FontData>> {
    if let Ok(family) = genpdf::fonts::from_files(&config.fonts_dir, preferred, None) {
        return Ok(family);
    }
    genpdf::fonts::from_files(&config.fonts_dir, &config.font_family, None).map_err(|e| {
        Error::Render(format!(
            "font `{}` not found in {}: {}",
            config.font_family,
            config.fonts_dir.display(),
            e
        ))
    })
}

/// A4 landscape without margins, so the page area is the whole sheet.
fn configure_document(config: &Config, preferred_font: &str) -> Result<Document> {
    let font_family = load_font(config, preferred_font)?;
    let mut doc = Document::new(font_family);
    doc.set_paper_size(Size::new(PAGE_WIDTH_MM, PAGE_HEIGHT_MM));
    doc.set_line_spacing(1.0);

    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(0);
    doc.set_page_decorator(decorator);
    Ok(doc)
}

/// A decoded logo ready to be placed. The temporary PNG has to outlive the
/// render.
struct Logo {
    image: PdfImage,
    _file: NamedTempFile,
}

/// Decodes a `data:` URL logo and sizes it into `logo_box`. Remote URLs are
/// not fetched.
fn load_logo(logo_box: &LogoBox) -> std::result::Result<Logo, String> {
    let bytes = decode_data_url(&logo_box.source)?;
    let img = load_from_memory(&bytes).map_err(|e| e.to_string())?;
    let (width_px, height_px) = img.dimensions();
    if width_px == 0 || height_px == 0 {
        return Err("logo has no pixels".to_string());
    }

    // Flatten alpha over white and hand genpdf a plain RGB PNG.
    let rgba = img.to_rgba8();
    let mut background =
        image::RgbaImage::from_pixel(width_px, height_px, image::Rgba([255, 255, 255, 255]));
    image::imageops::overlay(&mut background, &rgba, 0, 0);
    let raw = DynamicImage::ImageRgba8(background).to_rgb8().into_raw();

    let mut tmp = NamedTempFile::new().map_err(|e| e.to_string())?;
    {
        let mut encoder = PngEncoder::new(tmp.as_file_mut(), width_px, height_px);
        encoder.set_color(PngColorType::Rgb);
        encoder.set_depth(PngBitDepth::Eight);
        let mut writer = encoder.write_header().map_err(|e| e.to_string())?;
        writer.write_image_data(&raw).map_err(|e| e.to_string())?;
    }

    let (dpi, width_mm) = fit_dpi(width_px, height_px, logo_box.max_width, logo_box.max_height);
    let position = Position::new(logo_box.center_x - width_mm / 2.0, logo_box.top);
    let mut image = PdfImage::from_path(tmp.path()).map_err(|e| e.to_string())?;
    image.set_dpi(dpi);
    image.set_position(position);
    Ok(Logo { image, _file: tmp })
}

/// DPI at which an image of the given pixel size fits the box, and the
/// resulting width in millimetres.
fn fit_dpi(width_px: u32, height_px: u32, max_width_mm: f64, max_height_mm: f64) -> (f64, f64) {
    let by_width = f64::from(width_px) * 25.4 / max_width_mm;
    let by_height = f64::from(height_px) * 25.4 / max_height_mm;
    let dpi = by_width.max(by_height);
    (dpi, f64::from(width_px) * 25.4 / dpi)
}

/// Expects `data:<mime>;base64,<payload>`.
fn decode_data_url(url: &str) -> std::result::Result<Vec<u8>, String> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| "only embedded (data:) logos are supported".to_string())?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| "data URL without payload".to_string())?;
    if !meta.ends_with(";base64") {
        return Err("data URL is not base64 encoded".to_string());
    }
    BASE64.decode(payload.trim()).map_err(|e| e.to_string())
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

fn line_style(line: &Line) -> Style {
    Style::new().with_color(color(line.color))
}

fn draw(area: &Area<'_>, line: &Line) {
    let points: Vec<Position> = line
        .points
        .iter()
        .map(|&(x, y)| Position::new(x, y))
        .collect();
    area.draw_line(points, line_style(line));
}

struct CertificatePage {
    layout: Layout,
    logo: Option<Logo>,
}

impl Element for CertificatePage {
    fn render(
        &mut self,
        context: &Context,
        area: Area<'_>,
        style: Style,
    ) -> std::result::Result<RenderResult, genpdf::error::Error> {
        for line in self.layout.background.iter().chain(&self.layout.borders) {
            draw(&area, line);
        }

        if let Some(logo) = &mut self.logo {
            logo.image.render(context, area.clone(), style)?;
        }

        for run in &self.layout.texts {
            let text_style = style
                .with_font_size(run.font_size_pt)
                .with_color(color(run.color));
            let width = text_style.str_width(&context.font_cache, &run.text);
            let ascent = text_style.line_height(&context.font_cache) * ASCENT_RATIO;
            let position = Position::new(
                Mm::from(run.center_x) - width / 2.0,
                Mm::from(run.baseline_y) - ascent,
            );
            if !area.print_str(&context.font_cache, position, text_style, &run.text)? {
                warn!("`{}` does not fit on the page", run.element);
            }
        }

        Ok(RenderResult {
            size: area.size(),
            has_more: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_urls_decode() {
        let url = format!("data:image/png;base64,{}", BASE64.encode(b"\x89PNG"));
        assert_eq!(decode_data_url(&url).unwrap(), b"\x89PNG");
        assert!(decode_data_url("https://example.com/logo.png").is_err());
        assert!(decode_data_url("data:image/png,raw").is_err());
        assert!(decode_data_url("data:image/png;base64").is_err());
    }

    #[test]
    fn logos_fit_the_tighter_side_of_the_box() {
        // Wide logo: width bound.
        let (dpi, width) = fit_dpi(1000, 100, 50.0, 20.0);
        assert!((width - 50.0).abs() < 1e-9);
        assert!((dpi - 508.0).abs() < 1e-9);
        // Tall logo: height bound, narrower than the box.
        let (_, width) = fit_dpi(100, 400, 50.0, 20.0);
        assert!((width - 5.0).abs() < 1e-9);
    }

    #[test]
    fn missing_fonts_are_render_errors() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            fonts_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        let err = render_certificate(
            &DesignElements::default(),
            None,
            &config,
            "preview",
            Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Render(_)));
    }
}
