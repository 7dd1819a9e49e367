//! Page model for the report, serialized with `printpdf`.
//!
//! Pages are described as lists of [`DrawOp`] in a top-left coordinate
//! system (y grows downward, units are PDF points), which keeps the layout
//! inspectable in tests. [`PdfDocument::render`] replays them onto printpdf
//! layers in PDF space, with the built-in Helvetica faces.

use crate::error::Result;
use image::{DynamicImage, ImageFormat};
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, CustomPdfConformance, Image, ImageTransform, IndirectFontRef, Line, Mm,
    PdfConformance, PdfLayerReference, Point, Polygon, Pt, Rgb,
};
use tracing::debug;

/// US Letter, in points.
pub const LETTER_WIDTH: f32 = 612.0;
pub const LETTER_HEIGHT: f32 = 792.0;

const LAYER_NAME: &str = "Content";

/// Built-in Type1 fonts available to every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    fn builtin(self) -> BuiltinFont {
        match self {
            Self::Regular => BuiltinFont::Helvetica,
            Self::Bold => BuiltinFont::HelveticaBold,
        }
    }

    /// Advance width of `text` at `size`, in points.
    pub fn text_width(self, text: &str, size: f32) -> f32 {
        let units: u32 = text
            .chars()
            .map(|ch| u32::from(glyph_width(self, ch)))
            .sum();
        units as f32 * size / 1000.0
    }
}

/// Helvetica advance widths for printable ASCII, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // digits
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// Helvetica-Bold advance widths for printable ASCII, in 1/1000 em.
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // digits
    333, 333, 584, 584, 584, 611, 975, // ':'..'@'
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    333, 278, 333, 584, 556, 333, // '['..'`'
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // 'a'..'m'
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // 'n'..'z'
    389, 280, 389, 584, // '{'..'~'
];

fn glyph_width(font: Font, ch: char) -> u16 {
    let table = match font {
        Font::Regular => &HELVETICA_WIDTHS,
        Font::Bold => &HELVETICA_BOLD_WIDTHS,
    };
    let ch = match printable(ch) {
        ascii @ ' '..='~' => ascii,
        latin1 => base_letter(latin1),
    };
    table[(u32::from(ch) - 32) as usize]
}

/// ASCII letter whose advance an accented Latin-1 letter shares.
fn base_letter(ch: char) -> char {
    match ch {
        'À'..='Å' => 'A',
        'Ç' => 'C',
        'È'..='Ë' => 'E',
        'Ì'..='Ï' => 'I',
        'Ñ' => 'N',
        'Ò'..='Ö' | 'Ø' => 'O',
        'Ù'..='Ü' => 'U',
        'Ý' => 'Y',
        'à'..='å' => 'a',
        'ç' => 'c',
        'è'..='ë' => 'e',
        'ì'..='ï' => 'i',
        'ñ' => 'n',
        'ò'..='ö' | 'ø' => 'o',
        'ù'..='ü' => 'u',
        'ý' | 'ÿ' => 'y',
        _ => 'o',
    }
}

/// Characters the WinAnsi-encoded base fonts cannot show become '?'.
fn printable(ch: char) -> char {
    if (' '..='~').contains(&ch) || ('\u{a0}'..='\u{ff}').contains(&ch) {
        ch
    } else {
        '?'
    }
}

/// RGB colour with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl PdfColor {
    pub const BLACK: Self = Self::gray(0.0);

    pub const fn gray(level: f32) -> Self {
        Self {
            r: level,
            g: level,
            b: level,
        }
    }

    fn to_printpdf(self) -> Color {
        Color::Rgb(Rgb::new(self.r, self.g, self.b, None))
    }
}

/// Decoded image ready to embed.
#[derive(Debug, Clone)]
pub struct PdfImage {
    pub width: u32,
    pub height: u32,
    image: DynamicImage,
}

impl PdfImage {
    pub fn from_png(bytes: &[u8]) -> Result<Self> {
        let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Png)?.to_rgb8();
        Ok(Self {
            width: decoded.width(),
            height: decoded.height(),
            image: DynamicImage::ImageRgb8(decoded),
        })
    }
}

/// Handle to an image registered with [`PdfDocument::add_image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageId(usize);

/// One drawing instruction, in top-left page coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Text whose baseline starts at `(x, y)`.
    Text {
        x: f32,
        y: f32,
        size: f32,
        font: Font,
        color: PdfColor,
        text: String,
    },
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: PdfColor,
    },
    StrokeRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        line_width: f32,
        color: PdfColor,
    },
    /// Image with its top-left corner at `(x, y)`.
    Image {
        image: ImageId,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

impl DrawOp {
    /// Black text in the given font.
    pub fn text(x: f32, y: f32, size: f32, font: Font, text: impl Into<String>) -> Self {
        Self::Text {
            x,
            y,
            size,
            font,
            color: PdfColor::BLACK,
            text: text.into(),
        }
    }
}

/// A page under construction.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

/// A paginated document, serialized by [`PdfDocument::render`].
#[derive(Debug, Clone)]
pub struct PdfDocument {
    width: f32,
    height: f32,
    title: String,
    pages: Vec<Page>,
    images: Vec<PdfImage>,
}

impl PdfDocument {
    pub fn new(width: f32, height: f32, title: impl Into<String>) -> Self {
        Self {
            width,
            height,
            title: title.into(),
            pages: Vec::new(),
            images: Vec::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Append an empty page and return its index.
    pub fn add_page(&mut self) -> usize {
        self.pages.push(Page::default());
        self.pages.len() - 1
    }

    /// Register an image for use by [`DrawOp::Image`].
    pub fn add_image(&mut self, image: PdfImage) -> ImageId {
        self.images.push(image);
        ImageId(self.images.len() - 1)
    }

    /// Append an operation to the last page, creating one if needed.
    pub fn push(&mut self, op: DrawOp) {
        if self.pages.is_empty() {
            self.add_page();
        }
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    /// Serialize to PDF bytes.
    ///
    /// `footer` is called once per page with the 1-based page number and the
    /// page count; its operations are drawn on top of the page content.
    pub fn render<F>(self, footer: F) -> Result<Vec<u8>>
    where
        F: Fn(usize, usize) -> Vec<DrawOp>,
    {
        let page_width = Mm::from(Pt(self.width));
        let page_height = Mm::from(Pt(self.height));
        let (doc, first_page, first_layer) =
            printpdf::PdfDocument::new(&self.title, page_width, page_height, LAYER_NAME);
        let doc = doc.with_conformance(PdfConformance::Custom(CustomPdfConformance {
            requires_icc_profile: false,
            requires_xmp_metadata: false,
            ..Default::default()
        }));

        let fonts = Fonts {
            regular: doc.add_builtin_font(Font::Regular.builtin())?,
            bold: doc.add_builtin_font(Font::Bold.builtin())?,
        };

        let total = self.pages.len();
        for (index, page) in self.pages.iter().enumerate() {
            let (page_index, layer_index) = if index == 0 {
                (first_page, first_layer)
            } else {
                doc.add_page(page_width, page_height, LAYER_NAME)
            };
            let layer = doc.get_page(page_index).get_layer(layer_index);

            for op in page.ops.iter().chain(footer(index + 1, total).iter()) {
                self.draw(&layer, &fonts, op);
            }
        }

        let bytes = doc.save_to_bytes()?;
        debug!("Rendered PDF: {} pages, {} bytes", total, bytes.len());
        Ok(bytes)
    }

    /// PDF-space point for a top-left coordinate.
    fn point(&self, x: f32, y: f32) -> Point {
        Point::new(Mm::from(Pt(x)), Mm::from(Pt(self.height - y)))
    }

    fn rect_ring(&self, x: f32, y: f32, width: f32, height: f32) -> Vec<(Point, bool)> {
        vec![
            (self.point(x, y), false),
            (self.point(x + width, y), false),
            (self.point(x + width, y + height), false),
            (self.point(x, y + height), false),
        ]
    }

    fn draw(&self, layer: &PdfLayerReference, fonts: &Fonts, op: &DrawOp) {
        match op {
            DrawOp::Text {
                x,
                y,
                size,
                font,
                color,
                text,
            } => {
                let safe: String = text.chars().map(printable).collect();
                layer.set_fill_color(color.to_printpdf());
                layer.use_text(
                    safe,
                    *size,
                    Mm::from(Pt(*x)),
                    Mm::from(Pt(self.height - y)),
                    fonts.get(*font),
                );
            }
            DrawOp::FillRect {
                x,
                y,
                width,
                height,
                color,
            } => {
                layer.set_fill_color(color.to_printpdf());
                layer.add_polygon(Polygon {
                    rings: vec![self.rect_ring(*x, *y, *width, *height)],
                    mode: PaintMode::Fill,
                    winding_order: WindingOrder::NonZero,
                });
            }
            DrawOp::StrokeRect {
                x,
                y,
                width,
                height,
                line_width,
                color,
            } => {
                layer.set_outline_color(color.to_printpdf());
                layer.set_outline_thickness(*line_width);
                layer.add_line(Line {
                    points: self.rect_ring(*x, *y, *width, *height),
                    is_closed: true,
                });
            }
            DrawOp::Image {
                image,
                x,
                y,
                width,
                height,
            } => {
                let Some(source) = self.images.get(image.0) else {
                    return;
                };
                // At 72 dpi one pixel is one point before scaling.
                Image::from_dynamic_image(&source.image).add_to_layer(
                    layer.clone(),
                    ImageTransform {
                        translate_x: Some(Mm::from(Pt(*x))),
                        translate_y: Some(Mm::from(Pt(self.height - y - height))),
                        scale_x: Some(width / source.width as f32),
                        scale_y: Some(height / source.height as f32),
                        dpi: Some(72.0),
                        ..Default::default()
                    },
                );
            }
        }
    }
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    fn get(&self, font: Font) -> &IndirectFontRef {
        match font {
            Font::Regular => &self.regular,
            Font::Bold => &self.bold,
        }
    }
}
