//! Paginated PDF export
//!
//! A4 portrait. The diagram is scaled to the printable width and split into
//! page-height bands; each object is drawn on the page holding its top edge.
//! Image assets are rasterised and embedded; everything else stays vector.
//! An equipment list table follows on its own pages.

use printpdf::image_crate::{DynamicImage, RgbImage};
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color as PdfColor, Image, ImageTransform, IndirectFontRef, Line, Mm,
    PdfDocument, PdfDocumentReference, PdfLayerReference, Point, Polygon, Rgb,
};
use tracing::{debug, span, warn, Level};

use super::svg::document_bounds;
use crate::core::{text_width, Color, Primitive, RackError, Rect, TextAnchor};
use crate::loader::ImageAsset;
use crate::scene::{EquipmentEntry, Scene, SceneObject};

pub const PDF_PAGE_WIDTH_MM: f64 = 210.0;
pub const PDF_PAGE_HEIGHT_MM: f64 = 297.0;
const MARGIN_MM: f64 = 10.0;
const TITLE_BAND_MM: f64 = 12.0;
const ROW_HEIGHT_MM: f64 = 7.0;
const PT_PER_MM: f64 = 72.0 / 25.4;
const CIRCLE_SEGMENTS: usize = 24;

/// Most diagram pages one export may produce
pub const MAX_PDF_PAGES: usize = 100;
/// SVG assets are rasterised at this multiple of their natural size
const IMAGE_RASTER_SCALE: f32 = 2.0;
const IMAGE_DPI: f64 = 300.0;

const IMAGE_FRAME_FILL: Color = Color::rgb(0xe5, 0xe7, 0xeb);
const IMAGE_FRAME_TEXT: Color = Color::rgb(0x37, 0x41, 0x51);
const TABLE_RULE: Color = Color::rgb(0x9c, 0xa3, 0xaf);

/// Equipment table columns: header and left edge in mm
const COLUMNS: [(&str, f64); 4] = [
    ("Position", MARGIN_MM),
    ("Equipment", MARGIN_MM + 25.0),
    ("Category", MARGIN_MM + 115.0),
    ("Units", MARGIN_MM + 165.0),
];

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

fn pdf_error(context: &str, error: impl std::fmt::Debug) -> RackError {
    RackError::export_error(format!("{}: {:?}", context, error))
}

fn pdf_color(color: Color) -> PdfColor {
    PdfColor::Rgb(Rgb::new(
        f32::from(color.r) / 255.0,
        f32::from(color.g) / 255.0,
        f32::from(color.b) / 255.0,
        None,
    ))
}

fn mm(value: f64) -> Mm {
    Mm(value as f32)
}

/// Maps scene pixels on one page band to page millimetres
#[derive(Debug, Clone, Copy)]
struct PageTransform {
    mm_per_px: f64,
    left_px: f64,
    band_top_px: f64,
    top_mm: f64,
}

impl PageTransform {
    fn x(&self, px: f64) -> f64 {
        MARGIN_MM + (px - self.left_px) * self.mm_per_px
    }

    /// PDF y grows upwards from the page bottom
    fn y(&self, px: f64) -> f64 {
        self.top_mm - (px - self.band_top_px) * self.mm_per_px
    }

    fn len(&self, px: f64) -> f64 {
        px * self.mm_per_px
    }
}

/// Render the scene as an A4 document with an equipment list
pub fn export_pdf(scene: &Scene, title: &str) -> Result<Vec<u8>, RackError> {
    let pdf_span = span!(Level::INFO, "export_pdf", objects = scene.len());
    let _enter = pdf_span.enter();

    let document = document_bounds(scene);
    let printable_w = PDF_PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
    let printable_h = PDF_PAGE_HEIGHT_MM - 2.0 * MARGIN_MM - TITLE_BAND_MM;
    let mm_per_px = printable_w / document.width;
    let band_px = printable_h / mm_per_px;
    let pages = page_count(document.height, band_px)?;

    let (doc, first_page, first_layer) = PdfDocument::new(
        title,
        mm(PDF_PAGE_WIDTH_MM),
        mm(PDF_PAGE_HEIGHT_MM),
        "Diagram",
    );
    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| pdf_error("failed to load font", e))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| pdf_error("failed to load font", e))?,
    };

    let objects: Vec<&SceneObject> = scene.iter().collect();
    for page in 0..pages {
        let layer = if page == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (p, l) = doc.add_page(mm(PDF_PAGE_WIDTH_MM), mm(PDF_PAGE_HEIGHT_MM), "Diagram");
            doc.get_page(p).get_layer(l)
        };

        let heading = if pages > 1 {
            format!("{} ({}/{})", title, page + 1, pages)
        } else {
            title.to_string()
        };
        draw_text(
            &layer,
            &fonts.bold,
            &heading,
            14.0,
            MARGIN_MM,
            PDF_PAGE_HEIGHT_MM - MARGIN_MM - 6.0,
            Color::BLACK,
        );

        let transform = PageTransform {
            mm_per_px,
            left_px: document.x,
            band_top_px: document.y + page as f64 * band_px,
            top_mm: PDF_PAGE_HEIGHT_MM - MARGIN_MM - TITLE_BAND_MM,
        };
        let on_page = objects
            .iter()
            .filter(|object| page_of(object.y - document.y, band_px, pages) == page);
        for object in on_page {
            draw_object(&layer, &fonts, &transform, object);
        }
    }

    draw_equipment_list(&doc, &fonts, &scene.equipment_list());

    let bytes = doc
        .save_to_bytes()
        .map_err(|e| pdf_error("failed to write PDF", e))?;
    debug!(pages, bytes = bytes.len(), "PDF written");
    Ok(bytes)
}

/// Number of page bands needed for a diagram `height_px` tall
fn page_count(height_px: f64, band_px: f64) -> Result<usize, RackError> {
    let pages = (height_px / band_px).ceil().max(1.0);
    // also rejects NaN
    if !(pages <= MAX_PDF_PAGES as f64) {
        return Err(RackError::export_error(format!(
            "diagram needs {} pages, more than the {} page limit",
            pages, MAX_PDF_PAGES
        )));
    }
    Ok(pages as usize)
}

/// Page index holding a top edge `y` pixels below the document top
fn page_of(y: f64, band_px: f64, pages: usize) -> usize {
    let page = (y.max(0.0) / band_px).floor();
    (page as usize).min(pages - 1)
}

fn draw_object(
    layer: &PdfLayerReference,
    fonts: &Fonts,
    transform: &PageTransform,
    object: &SceneObject,
) {
    // object-local pixels to scene pixels
    let sx = |x: f64| object.x + x * object.scale;
    let sy = |y: f64| object.y + y * object.scale;
    let sl = |l: f64| l * object.scale;

    for primitive in object.surface.primitives() {
        match primitive {
            Primitive::Rect {
                rect, fill, stroke, ..
            } => {
                let r = Rect::new(sx(rect.x), sy(rect.y), sl(rect.width), sl(rect.height));
                draw_rect(
                    layer,
                    transform,
                    r,
                    *fill,
                    stroke.map(|s| (s.color, sl(s.width))),
                );
            }
            Primitive::Line {
                x1,
                y1,
                x2,
                y2,
                stroke,
            } => {
                set_stroke(layer, stroke.color, transform.len(sl(stroke.width)));
                layer.add_line(Line {
                    points: vec![
                        (point(transform, sx(*x1), sy(*y1)), false),
                        (point(transform, sx(*x2), sy(*y2)), false),
                    ],
                    is_closed: false,
                });
            }
            Primitive::Circle {
                cx,
                cy,
                r,
                fill,
                stroke,
            } => {
                let (cx, cy, r) = (sx(*cx), sy(*cy), sl(*r));
                let ring: Vec<(Point, bool)> = (0..CIRCLE_SEGMENTS)
                    .map(|i| {
                        let angle = i as f64 / CIRCLE_SEGMENTS as f64 * std::f64::consts::TAU;
                        (point(transform, cx + r * angle.cos(), cy + r * angle.sin()), false)
                    })
                    .collect();
                draw_ring(
                    layer,
                    ring,
                    *fill,
                    stroke.map(|s| (s.color, transform.len(sl(s.width)))),
                );
            }
            Primitive::Text {
                x,
                y,
                text,
                size,
                color,
                anchor,
                bold,
            } => {
                let size_px = sl(*size);
                let width_px = text_width(text, size_px);
                let left = match anchor {
                    TextAnchor::Start => sx(*x),
                    TextAnchor::Middle => sx(*x) - width_px / 2.0,
                    TextAnchor::End => sx(*x) - width_px,
                };
                let font = if *bold { &fonts.bold } else { &fonts.regular };
                draw_text(
                    layer,
                    font,
                    text,
                    transform.len(size_px) * PT_PER_MM,
                    transform.x(left),
                    transform.y(sy(*y)),
                    *color,
                );
            }
            Primitive::Image { rect, asset } => {
                let r = Rect::new(sx(rect.x), sy(rect.y), sl(rect.width), sl(rect.height));
                match embed_image(layer, transform, r, asset) {
                    Ok(()) => continue,
                    Err(e) => warn!(error = %e, "Image not embedded, drawing a labelled frame"),
                }
                draw_rect(
                    layer,
                    transform,
                    r,
                    Some(IMAGE_FRAME_FILL),
                    Some((TABLE_RULE, 1.0)),
                );
                let size_px = (r.height * 0.35).min(14.0);
                let width_px = text_width(&object.equipment_name, size_px);
                draw_text(
                    layer,
                    &fonts.regular,
                    &object.equipment_name,
                    transform.len(size_px) * PT_PER_MM,
                    transform.x(r.center_x() - width_px / 2.0),
                    transform.y(r.center_y() + size_px * 0.35),
                    IMAGE_FRAME_TEXT,
                );
            }
        }
    }
}

/// Place a rasterised asset stretched over `rect`
fn embed_image(
    layer: &PdfLayerReference,
    transform: &PageTransform,
    rect: Rect,
    asset: &ImageAsset,
) -> Result<(), RackError> {
    let rgba = asset.rasterize(IMAGE_RASTER_SCALE)?;
    let (width, height) = rgba.dimensions();
    let bitmap = RgbImage::from_raw(width, height, flatten_onto_white(&rgba))
        .ok_or_else(|| RackError::export_error("bitmap size mismatch"))?;
    let image = Image::from_dynamic_image(&DynamicImage::ImageRgb8(bitmap));

    // size at IMAGE_DPI before scaling, in mm
    let natural_w = f64::from(width) / IMAGE_DPI * 25.4;
    let natural_h = f64::from(height) / IMAGE_DPI * 25.4;
    image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(mm(transform.x(rect.x))),
            translate_y: Some(mm(transform.y(rect.bottom()))),
            scale_x: Some((transform.len(rect.width) / natural_w) as f32),
            scale_y: Some((transform.len(rect.height) / natural_h) as f32),
            dpi: Some(IMAGE_DPI as f32),
            ..ImageTransform::default()
        },
    );
    debug!(path = %asset.path, width, height, "Image embedded");
    Ok(())
}

/// RGB bytes of `rgba` composited over white
fn flatten_onto_white(rgba: &image::RgbaImage) -> Vec<u8> {
    rgba.pixels()
        .flat_map(|pixel| {
            let [r, g, b, a] = pixel.0;
            let alpha = u32::from(a);
            let over = |c: u8| ((u32::from(c) * alpha + 255 * (255 - alpha)) / 255) as u8;
            [over(r), over(g), over(b)]
        })
        .collect()
}

fn point(transform: &PageTransform, x: f64, y: f64) -> Point {
    Point::new(mm(transform.x(x)), mm(transform.y(y)))
}

fn set_stroke(layer: &PdfLayerReference, color: Color, width_mm: f64) {
    layer.set_outline_color(pdf_color(color));
    layer.set_outline_thickness((width_mm * PT_PER_MM).max(0.1) as f32);
}

fn draw_rect(
    layer: &PdfLayerReference,
    transform: &PageTransform,
    rect: Rect,
    fill: Option<Color>,
    stroke_px: Option<(Color, f64)>,
) {
    let ring = vec![
        (point(transform, rect.x, rect.y), false),
        (point(transform, rect.right(), rect.y), false),
        (point(transform, rect.right(), rect.bottom()), false),
        (point(transform, rect.x, rect.bottom()), false),
    ];
    draw_ring(
        layer,
        ring,
        fill,
        stroke_px.map(|(color, width)| (color, transform.len(width))),
    );
}

/// Closed shape, stroke width already in mm
fn draw_ring(
    layer: &PdfLayerReference,
    ring: Vec<(Point, bool)>,
    fill: Option<Color>,
    stroke: Option<(Color, f64)>,
) {
    let mode = match (fill, stroke) {
        (Some(_), Some(_)) => PaintMode::FillStroke,
        (Some(_), None) => PaintMode::Fill,
        (None, Some(_)) => PaintMode::Stroke,
        (None, None) => return,
    };
    if let Some(color) = fill {
        layer.set_fill_color(pdf_color(color));
    }
    if let Some((color, width)) = stroke {
        set_stroke(layer, color, width);
    }
    layer.add_polygon(Polygon {
        rings: vec![ring],
        mode,
        winding_order: WindingOrder::NonZero,
    });
}

fn draw_text(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    text: &str,
    size_pt: f64,
    x_mm: f64,
    y_mm: f64,
    color: Color,
) {
    layer.set_fill_color(pdf_color(color));
    layer.use_text(text, size_pt as f32, mm(x_mm), mm(y_mm), font);
}

/// Table rows per page, leaving room for the heading and column header
fn rows_per_page() -> usize {
    let usable = PDF_PAGE_HEIGHT_MM - 2.0 * MARGIN_MM - TITLE_BAND_MM - ROW_HEIGHT_MM;
    (usable / ROW_HEIGHT_MM).floor() as usize
}

fn draw_equipment_list(doc: &PdfDocumentReference, fonts: &Fonts, entries: &[EquipmentEntry]) {
    let per_page = rows_per_page();
    let chunks: Vec<&[EquipmentEntry]> = if entries.is_empty() {
        vec![entries]
    } else {
        entries.chunks(per_page).collect()
    };

    for (index, chunk) in chunks.iter().enumerate() {
        let (page, layer) = doc.add_page(
            mm(PDF_PAGE_WIDTH_MM),
            mm(PDF_PAGE_HEIGHT_MM),
            "Equipment List",
        );
        let layer = doc.get_page(page).get_layer(layer);
        let heading = if index == 0 {
            "Equipment List".to_string()
        } else {
            "Equipment List (continued)".to_string()
        };
        let mut y = PDF_PAGE_HEIGHT_MM - MARGIN_MM - 6.0;
        draw_text(&layer, &fonts.bold, &heading, 14.0, MARGIN_MM, y, Color::BLACK);

        y = PDF_PAGE_HEIGHT_MM - MARGIN_MM - TITLE_BAND_MM;
        for (header, x) in COLUMNS {
            draw_text(&layer, &fonts.bold, header, 10.0, x, y, Color::BLACK);
        }
        rule(&layer, y - 2.0);

        if chunk.is_empty() {
            y -= ROW_HEIGHT_MM;
            draw_text(
                &layer,
                &fonts.regular,
                "No equipment placed",
                10.0,
                MARGIN_MM,
                y,
                TABLE_RULE,
            );
        }
        for entry in chunk.iter() {
            y -= ROW_HEIGHT_MM;
            let position = entry
                .rack_position
                .map_or_else(|| "-".to_string(), |p| format!("U{}", p));
            let cells = [
                position,
                entry.equipment_name.clone(),
                entry.category.clone(),
                entry.rack_units.to_string(),
            ];
            for ((_, x), cell) in COLUMNS.iter().zip(cells.iter()) {
                draw_text(&layer, &fonts.regular, cell, 10.0, *x, y, Color::BLACK);
            }
            rule(&layer, y - 2.0);
        }
    }
}

fn rule(layer: &PdfLayerReference, y_mm: f64) {
    set_stroke(layer, TABLE_RULE, 0.2);
    layer.add_line(Line {
        points: vec![
            (Point::new(mm(MARGIN_MM), mm(y_mm)), false),
            (Point::new(mm(PDF_PAGE_WIDTH_MM - MARGIN_MM), mm(y_mm)), false),
        ],
        is_closed: false,
    });
}
