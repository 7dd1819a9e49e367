//! Report layout.
//!
//! Lays out the analysis artifacts on US Letter pages in a fixed order:
//! summary statistics, missing data table, outlier table, histogram page and
//! correlation page. Everything is built from the artifacts alone; the
//! dataset itself is never consulted.

use super::pdf::{DrawOp, Font, LETTER_HEIGHT, LETTER_WIDTH, PdfColor, PdfDocument, PdfImage};
use crate::error::{AnalysisError, Result};
use crate::plots::PlotArtifact;
use crate::types::{MissingSummary, OutlierSummary, SummaryStatistics, format_stat};
use tracing::{debug, info};

pub const REPORT_TITLE: &str = "Data Analysis Report";
pub const PAGE_MARGIN: f32 = 40.0;

/// Minimum space a statistics block needs before a page break is forced.
const MIN_BLOCK_SPACE: f32 = 100.0;

const TITLE_SIZE: f32 = 18.0;
const HEADING_SIZE: f32 = 14.0;
const SUBHEADING_SIZE: f32 = 11.0;
const BODY_SIZE: f32 = 10.0;
const FOOTER_SIZE: f32 = 9.0;
const LINE_HEIGHT: f32 = 14.0;
const ROW_HEIGHT: f32 = 18.0;
const CELL_PADDING: f32 = 4.0;
const STAT_INDENT: f32 = 12.0;
const SECTION_GAP: f32 = 10.0;

/// Header fill of the missing-data table.
const MISSING_HEADER_FILL: PdfColor = PdfColor::gray(0.8);
/// Header fill of the outlier table.
const OUTLIER_HEADER_FILL: PdfColor = PdfColor {
    r: 0.68,
    g: 0.85,
    b: 0.9,
};
const GRID_COLOR: PdfColor = PdfColor::gray(0.4);

/// Usable width between the margins.
fn content_width() -> f32 {
    LETTER_WIDTH - 2.0 * PAGE_MARGIN
}

/// Inputs of the report.
pub struct ReportParams<'a> {
    pub statistics: &'a SummaryStatistics,
    pub missing: &'a MissingSummary,
    pub outliers: &'a OutlierSummary,
    pub histogram: &'a PlotArtifact,
    pub correlation: &'a PlotArtifact,
}

/// Builds the PDF report.
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    title: String,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self {
            title: REPORT_TITLE.to_string(),
        }
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lay out and serialize the report.
    pub fn generate(&self, params: &ReportParams<'_>) -> Result<Vec<u8>> {
        let doc = self.layout(params)?;
        info!("Rendering report ({} pages)", doc.page_count());
        doc.render(footer_ops)
    }

    /// Lay out every section without serializing.
    pub fn layout(&self, params: &ReportParams<'_>) -> Result<PdfDocument> {
        let mut page = PageCursor::new(PdfDocument::new(LETTER_WIDTH, LETTER_HEIGHT, &self.title));

        page.new_page();
        page.text(&self.title, Font::Bold, TITLE_SIZE, TITLE_SIZE * 1.6);
        self.summary_section(&mut page, params.statistics);

        page.new_page();
        page.heading("Missing Data Summary");
        let rows: Vec<Vec<String>> = params
            .missing
            .iter()
            .map(|(column, count)| vec![column.clone(), count.to_string()])
            .collect();
        page.table(
            &["Column", "Missing Values"],
            &[0.6, 0.4],
            &rows,
            MISSING_HEADER_FILL,
        );

        page.new_page();
        page.heading("Outliers Summary");
        let rows: Vec<Vec<String>> = params
            .outliers
            .iter()
            .map(|(column, stats)| {
                vec![
                    column.clone(),
                    stats.count.to_string(),
                    format_bound(stats.lower_bound),
                    format_bound(stats.upper_bound),
                ]
            })
            .collect();
        page.table(
            &["Column", "Outliers", "Lower Bound", "Upper Bound"],
            &[0.4, 0.2, 0.2, 0.2],
            &rows,
            OUTLIER_HEADER_FILL,
        );

        page.new_page();
        page.heading("Histogram Plot");
        page.image(params.histogram)?;

        page.new_page();
        page.heading("Correlation Matrix");
        page.image(params.correlation)?;

        Ok(page.finish())
    }

    fn summary_section(&self, page: &mut PageCursor, statistics: &SummaryStatistics) {
        page.heading("Summary Statistics by Column");

        for (column, stats) in statistics {
            let rows = stats.display_rows();
            let block_height = SUBHEADING_SIZE * 1.6 + rows.len() as f32 * LINE_HEIGHT + SECTION_GAP;
            if page.remaining() < MIN_BLOCK_SPACE.max(block_height) {
                debug!("Page break before statistics of '{}'", column);
                page.new_page();
            }

            let name = fit_text(column, Font::Bold, SUBHEADING_SIZE, content_width());
            page.text(&name, Font::Bold, SUBHEADING_SIZE, SUBHEADING_SIZE * 1.6);
            for (stat, value) in rows {
                page.indented_text(&format!("{}: {}", stat, value), STAT_INDENT);
            }
            page.advance(SECTION_GAP);
        }
    }
}

fn format_bound(bound: Option<f64>) -> String {
    match bound {
        Some(v) if v.is_finite() => format!("{:.2}", v),
        other => format_stat(other),
    }
}

/// Footer of one page: `Page N`, right-aligned, on every page but the first.
pub fn footer_ops(page: usize, _total: usize) -> Vec<DrawOp> {
    if page < 2 {
        return Vec::new();
    }
    let label = format!("Page {}", page);
    let width = Font::Regular.text_width(&label, FOOTER_SIZE);
    vec![DrawOp::text(
        LETTER_WIDTH - PAGE_MARGIN - width,
        LETTER_HEIGHT - PAGE_MARGIN / 2.0,
        FOOTER_SIZE,
        Font::Regular,
        label,
    )]
}

/// Shorten `text` with a trailing "..." until it fits `max_width`.
pub fn fit_text(text: &str, font: Font, size: f32, max_width: f32) -> String {
    if font.text_width(text, size) <= max_width {
        return text.to_string();
    }
    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate: String = chars.iter().collect::<String>() + "...";
        if font.text_width(&candidate, size) <= max_width {
            return candidate;
        }
    }
    String::new()
}

/// Vertical layout state over a document.
struct PageCursor {
    doc: PdfDocument,
    y: f32,
}

impl PageCursor {
    fn new(doc: PdfDocument) -> Self {
        Self { doc, y: PAGE_MARGIN }
    }

    fn finish(self) -> PdfDocument {
        self.doc
    }

    fn new_page(&mut self) {
        self.doc.add_page();
        self.y = PAGE_MARGIN;
    }

    fn bottom(&self) -> f32 {
        LETTER_HEIGHT - PAGE_MARGIN
    }

    fn remaining(&self) -> f32 {
        self.bottom() - self.y
    }

    fn advance(&mut self, height: f32) {
        self.y += height;
    }

    /// Text at the left margin occupying `height` of vertical space.
    fn text(&mut self, text: &str, font: Font, size: f32, height: f32) {
        self.doc
            .push(DrawOp::text(PAGE_MARGIN, self.y + size, size, font, text));
        self.advance(height);
    }

    fn indented_text(&mut self, text: &str, indent: f32) {
        let max_width = content_width() - indent;
        let fitted = fit_text(text, Font::Regular, BODY_SIZE, max_width);
        self.doc.push(DrawOp::text(
            PAGE_MARGIN + indent,
            self.y + BODY_SIZE,
            BODY_SIZE,
            Font::Regular,
            fitted,
        ));
        self.advance(LINE_HEIGHT);
    }

    fn heading(&mut self, text: &str) {
        self.text(text, Font::Bold, HEADING_SIZE, HEADING_SIZE * 1.8);
    }

    /// Grid table; overflowing rows continue on a new page under a repeated
    /// header.
    fn table(&mut self, headers: &[&str], fractions: &[f32], rows: &[Vec<String>], header_fill: PdfColor) {
        let widths: Vec<f32> = fractions.iter().map(|f| f * content_width()).collect();

        if self.remaining() < 2.0 * ROW_HEIGHT {
            self.new_page();
        }
        self.table_row(headers.iter().map(|h| h.to_string()), &widths, Some(header_fill));

        for row in rows {
            if self.remaining() < ROW_HEIGHT {
                self.new_page();
                self.table_row(headers.iter().map(|h| h.to_string()), &widths, Some(header_fill));
            }
            self.table_row(row.iter().cloned(), &widths, None);
        }
    }

    fn table_row(&mut self, cells: impl Iterator<Item = String>, widths: &[f32], fill: Option<PdfColor>) {
        let font = if fill.is_some() { Font::Bold } else { Font::Regular };
        let mut x = PAGE_MARGIN;

        if let Some(color) = fill {
            self.doc.push(DrawOp::FillRect {
                x,
                y: self.y,
                width: content_width(),
                height: ROW_HEIGHT,
                color,
            });
        }

        for (cell, &width) in cells.zip(widths) {
            let fitted = fit_text(&cell, font, BODY_SIZE, width - 2.0 * CELL_PADDING);
            self.doc.push(DrawOp::text(
                x + CELL_PADDING,
                self.y + ROW_HEIGHT - 5.5,
                BODY_SIZE,
                font,
                fitted,
            ));
            self.doc.push(DrawOp::StrokeRect {
                x,
                y: self.y,
                width,
                height: ROW_HEIGHT,
                line_width: 0.5,
                color: GRID_COLOR,
            });
            x += width;
        }

        self.advance(ROW_HEIGHT);
    }

    /// Image scaled to the content width, shrunk further to fit the
    /// remaining height. Aspect ratio is preserved.
    fn image(&mut self, artifact: &PlotArtifact) -> Result<()> {
        let image = PdfImage::from_png(&artifact.png)?;
        if image.width == 0 || image.height == 0 {
            return Err(AnalysisError::Report(format!(
                "{} image is empty",
                artifact.kind
            )));
        }

        let aspect = image.height as f32 / image.width as f32;
        let mut width = content_width();
        let mut height = width * aspect;
        if height > self.remaining() {
            height = self.remaining();
            width = height / aspect;
        }

        let x = PAGE_MARGIN + (content_width() - width) / 2.0;
        let id = self.doc.add_image(image);
        self.doc.push(DrawOp::Image {
            image: id,
            x,
            y: self.y,
            width,
            height,
        });
        self.advance(height);
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
