//! Tabular PDF documents: a header block (institution, title, generation
//! date), one table split across pages, and a footer on every page.

pub mod csv_templates;
pub mod pv;
pub mod schedule;

use std::path::Path;

use chrono::{Local, NaiveDate};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rgb,
};
use tracing::info;

use crate::config::ClientConfig;
use crate::error::AppError;

const MARGIN: f32 = 12.0;
const ROW_HEIGHT: f32 = 7.0;
const BOTTOM_LIMIT: f32 = 16.0;
const FOOTER_Y: f32 = 8.0;
const BODY_FONT_SIZE: f32 = 8.0;
/// Average Helvetica glyph width at 1pt, in mm.
const GLYPH_WIDTH_MM: f32 = 0.3528 * 0.5;
const MAX_COLUMN_WEIGHT: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    /// A4 width and height in mm.
    pub fn size(self) -> (f32, f32) {
        match self {
            Orientation::Portrait => (210.0, 297.0),
            Orientation::Landscape => (297.0, 210.0),
        }
    }
}

/// Institution name and the date printed under the title.
#[derive(Debug, Clone)]
pub struct DocumentContext {
    pub institution: String,
    pub generated_on: NaiveDate,
}

impl DocumentContext {
    pub fn new(institution: impl Into<String>, generated_on: NaiveDate) -> Self {
        Self {
            institution: institution.into(),
            generated_on,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.institution.clone(), Local::now().date_naive())
    }

    /// `Generated on: January 5, 2025`
    pub fn generated_on_label(&self) -> String {
        format!("Generated on: {}", self.generated_on.format("%B %-d, %Y"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableDocument {
    pub orientation: Orientation,
    pub institution: String,
    pub title: String,
    pub generated_on: String,
    /// Extra lines printed between the title block and the table.
    pub details: Vec<String>,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Left part of the footer; the right part is the page counter.
    pub caption: String,
}

impl TableDocument {
    pub fn new(
        orientation: Orientation,
        ctx: &DocumentContext,
        title: impl Into<String>,
        headers: &[&str],
        caption: impl Into<String>,
    ) -> Self {
        Self {
            orientation,
            institution: ctx.institution.clone(),
            title: title.into(),
            generated_on: ctx.generated_on_label(),
            details: Vec::new(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
            caption: caption.into(),
        }
    }

    fn table_top(&self) -> f32 {
        let (_, height) = self.orientation.size();
        height - 36.0 - self.details.len() as f32 * 5.0
    }

    pub fn rows_per_page(&self) -> usize {
        let usable = self.table_top() - ROW_HEIGHT - BOTTOM_LIMIT;
        ((usable / ROW_HEIGHT).floor() as usize).max(1)
    }

    /// Row chunks, one per page. An empty table still has one page.
    pub fn pages(&self) -> Vec<&[Vec<String>]> {
        if self.rows.is_empty() {
            let empty: &[Vec<String>] = &[];
            return vec![empty];
        }
        self.rows.chunks(self.rows_per_page()).collect()
    }

    pub fn page_count(&self) -> usize {
        self.pages().len()
    }

    /// `Page i of n` for a 1-based page index.
    pub fn page_label(&self, page: usize) -> String {
        format!("Page {} of {}", page, self.page_count())
    }

    /// Column widths in mm, proportional to content length.
    pub fn column_widths(&self) -> Vec<f32> {
        let (width, _) = self.orientation.size();
        let usable = width - 2.0 * MARGIN;

        let weights: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(1)
                    .clamp(4, MAX_COLUMN_WEIGHT)
            })
            .collect();
        let total: usize = weights.iter().sum::<usize>().max(1);

        weights
            .iter()
            .map(|w| usable * *w as f32 / total as f32)
            .collect()
    }

    pub fn render_pdf(&self) -> Result<Vec<u8>, AppError> {
        let (width, height) = self.orientation.size();
        let (doc, first_page, first_layer) =
            PdfDocument::new(self.title.as_str(), Mm(width), Mm(height), "Layer 1");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(pdf_error)?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_error)?;

        let widths = self.column_widths();
        let pages = self.pages();

        for (index, rows) in pages.into_iter().enumerate() {
            let layer = if index == 0 {
                doc.get_page(first_page).get_layer(first_layer)
            } else {
                let (page, layer) = doc.add_page(Mm(width), Mm(height), "Layer 1");
                doc.get_page(page).get_layer(layer)
            };

            self.draw_header(&layer, &regular, &bold);
            self.draw_table(&layer, &regular, &bold, &widths, rows);
            self.draw_footer(&layer, &regular, index + 1);
        }

        doc.save_to_bytes().map_err(pdf_error)
    }

    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        let bytes = self.render_pdf()?;
        std::fs::write(path, &bytes)?;
        info!(
            "Saved {} ({} pages, {} rows) to {}",
            self.title,
            self.page_count(),
            self.rows.len(),
            path.display()
        );
        Ok(())
    }

    fn draw_header(&self, layer: &PdfLayerReference, regular: &IndirectFontRef, bold: &IndirectFontRef) {
        let (_, height) = self.orientation.size();
        layer.set_fill_color(black());
        layer.use_text(self.institution.as_str(), 13.0, Mm(MARGIN), Mm(height - 15.0), bold);
        layer.use_text(self.title.as_str(), 16.0, Mm(MARGIN), Mm(height - 23.0), bold);
        layer.use_text(self.generated_on.as_str(), 9.0, Mm(MARGIN), Mm(height - 29.0), regular);

        for (i, detail) in self.details.iter().enumerate() {
            let y = height - 35.0 - i as f32 * 5.0;
            layer.use_text(detail.as_str(), 9.0, Mm(MARGIN), Mm(y), regular);
        }
    }

    fn draw_table(
        &self,
        layer: &PdfLayerReference,
        regular: &IndirectFontRef,
        bold: &IndirectFontRef,
        widths: &[f32],
        rows: &[Vec<String>],
    ) {
        let (width, _) = self.orientation.size();
        let mut y = self.table_top();

        layer.set_outline_thickness(0.3);
        layer.set_outline_color(grey());
        horizontal_rule(layer, y, width);

        let mut x = MARGIN;
        for (header, w) in self.headers.iter().zip(widths) {
            let text = fit_text(header, max_chars(*w));
            layer.use_text(text, BODY_FONT_SIZE, Mm(x + 1.0), Mm(y - 5.0), bold);
            x += w;
        }
        y -= ROW_HEIGHT;
        horizontal_rule(layer, y, width);

        for row in rows {
            let mut x = MARGIN;
            for (cell, w) in row.iter().zip(widths) {
                let text = fit_text(cell, max_chars(*w));
                layer.use_text(text, BODY_FONT_SIZE, Mm(x + 1.0), Mm(y - 5.0), regular);
                x += w;
            }
            y -= ROW_HEIGHT;
            horizontal_rule(layer, y, width);
        }
    }

    fn draw_footer(&self, layer: &PdfLayerReference, font: &IndirectFontRef, page: usize) {
        let (width, _) = self.orientation.size();
        let counter = self.page_label(page);
        layer.use_text(self.caption.as_str(), 8.0, Mm(MARGIN), Mm(FOOTER_Y), font);
        layer.use_text(counter, 8.0, Mm(width - MARGIN - 22.0), Mm(FOOTER_Y), font);
    }
}

fn horizontal_rule(layer: &PdfLayerReference, y: f32, page_width: f32) {
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(MARGIN), Mm(y)), false),
            (Point::new(Mm(page_width - MARGIN), Mm(y)), false),
        ],
        is_closed: false,
    });
}

fn black() -> Color {
    Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None))
}

fn grey() -> Color {
    Color::Rgb(Rgb::new(0.6, 0.6, 0.6, None))
}

fn max_chars(column_width: f32) -> usize {
    (((column_width - 2.0) / (BODY_FONT_SIZE * GLYPH_WIDTH_MM)).floor() as usize).max(3)
}

/// Truncates to `max` characters, ending with `...` when cut.
pub fn fit_text(text: &str, max: usize) -> String {
    let count = text.chars().count();
    if count <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut cut: String = text.chars().take(keep).collect();
    cut.push_str("...");
    cut
}

fn pdf_error(err: printpdf::Error) -> AppError {
    AppError::Document(format!("{:?}", err))
}
