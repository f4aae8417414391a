//! PDF report export: title page with a paginated statistics table, followed
//! by one full-width chart figure per page.
//!
//! The table is laid out on A4 with fixed cell metrics. Wide tables are split
//! into column blocks; each block reprints the statistic label column, and a
//! block that runs past the bottom margin continues on a new page with its
//! header row repeated.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::Local;
use printpdf::{
    BuiltinFont, ColorBits, ColorSpace, Image, ImageTransform, ImageXObject, IndirectFontRef, Line,
    Mm, PdfDocument, PdfDocumentReference, PdfLayerIndex, PdfLayerReference, PdfPageIndex, Point,
    Px,
};

use crate::statistics::{ColumnSummary, MEASURES};

pub const FIGURE_WIDTH_MM: f64 = 170.0;

const IMAGE_DPI: f64 = 300.0;

/// Fixed A4 cell metrics for the statistics table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageMetrics {
    pub page_width: f64,
    pub page_height: f64,
    pub col_width: f64,
    pub row_height: f64,
}

impl Default for PageMetrics {
    fn default() -> Self {
        Self {
            page_width: 210.0,
            page_height: 297.0,
            col_width: 45.0,
            row_height: 8.0,
        }
    }
}

impl PageMetrics {
    /// Data columns per block. The 35mm reserve covers the margins and the
    /// statistic label column.
    pub fn columns_per_block(&self) -> usize {
        (((self.page_width - 35.0) / self.col_width) as usize).max(1)
    }

    pub fn rows_per_page(&self) -> usize {
        (((self.page_height - 40.0) / self.row_height) as usize).max(1)
    }

    fn needs_page_break(&self, y_top: f64) -> bool {
        y_top + self.row_height > self.page_height - 20.0
    }
}

/// Splits `columns` into blocks of at most `per_block`, preserving order.
pub fn paginate(columns: &[String], per_block: usize) -> Vec<Vec<String>> {
    columns
        .chunks(per_block.max(1))
        .map(|chunk| chunk.to_vec())
        .collect()
}

struct ReportWriter {
    doc: PdfDocumentReference,
    page: PdfPageIndex,
    layer: PdfLayerIndex,
    font: IndirectFontRef,
    bold: IndirectFontRef,
    metrics: PageMetrics,
    /// Cursor from the top of the page, in mm.
    y_top: f64,
}

impl ReportWriter {
    fn new(title: &str, metrics: PageMetrics) -> color_eyre::Result<Self> {
        let (doc, page, layer) = PdfDocument::new(
            title,
            Mm(metrics.page_width),
            Mm(metrics.page_height),
            "Layer 1",
        );
        let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
        Ok(Self {
            doc,
            page,
            layer,
            font,
            bold,
            metrics,
            y_top: 15.0,
        })
    }

    fn layer(&self) -> PdfLayerReference {
        self.doc.get_page(self.page).get_layer(self.layer)
    }

    fn add_page(&mut self) {
        let (page, layer) = self.doc.add_page(
            Mm(self.metrics.page_width),
            Mm(self.metrics.page_height),
            "Layer 1",
        );
        self.page = page;
        self.layer = layer;
        self.y_top = 20.0;
    }

    /// Baseline for text inside the cell row starting at `y_top`.
    fn baseline(&self, y_top: f64) -> Mm {
        Mm(self.metrics.page_height - y_top - self.metrics.row_height + 2.5)
    }

    fn title(&mut self, text: &str) {
        let layer = self.layer();
        layer.use_text(
            text,
            16.0,
            Mm(10.0),
            Mm(self.metrics.page_height - self.y_top),
            &self.bold,
        );
        let stamp = Local::now().format("%Y-%m-%d %H:%M").to_string();
        layer.use_text(
            format!("Generated {}", stamp),
            9.0,
            Mm(10.0),
            Mm(self.metrics.page_height - self.y_top - 6.0),
            &self.font,
        );
        self.y_top += 16.0;
    }

    fn rule(&self, x0: f64, y0_top: f64, x1: f64, y1_top: f64) {
        let h = self.metrics.page_height;
        let line = Line {
            points: vec![
                (Point::new(Mm(x0), Mm(h - y0_top)), false),
                (Point::new(Mm(x1), Mm(h - y1_top)), false),
            ],
            is_closed: false,
            has_fill: false,
            has_stroke: true,
            is_clipping_path: false,
        };
        self.layer().add_shape(line);
    }

    /// One table row: a label cell followed by value cells, with its grid.
    fn table_row(&mut self, label: &str, cells: &[String], bold: bool) {
        if self.metrics.needs_page_break(self.y_top) {
            self.add_page();
        }
        let m = self.metrics;
        let font = if bold { &self.bold } else { &self.font };
        let layer = self.layer();
        let y = self.baseline(self.y_top);

        layer.use_text(label, 9.0, Mm(12.0), y, font);
        for (i, cell) in cells.iter().enumerate() {
            let x = 10.0 + 25.0 + i as f64 * m.col_width;
            layer.use_text(cell.as_str(), 9.0, Mm(x + 2.0), y, font);
        }

        let right = 10.0 + 25.0 + cells.len() as f64 * m.col_width;
        let y0 = self.y_top;
        let y1 = self.y_top + m.row_height;
        self.rule(10.0, y0, right, y0);
        self.rule(10.0, y1, right, y1);
        self.rule(10.0, y0, 10.0, y1);
        self.rule(35.0, y0, 35.0, y1);
        for i in 1..=cells.len() {
            let x = 10.0 + 25.0 + i as f64 * m.col_width;
            self.rule(x, y0, x, y1);
        }

        self.y_top += m.row_height;
    }

    /// One column block of the statistics table. A mid-block page break
    /// repeats the header row; the emitted header count comes back, one per
    /// page the block touches.
    fn table_block(&mut self, block: &[&ColumnSummary]) -> usize {
        let header: Vec<String> = block.iter().map(|s| s.name.clone()).collect();
        self.table_row("statistic", &header, true);
        let mut headers_emitted = 1;
        for (row, measure) in MEASURES.iter().enumerate() {
            if self.metrics.needs_page_break(self.y_top) {
                self.add_page();
                self.table_row("statistic", &header, true);
                headers_emitted += 1;
            }
            let cells: Vec<String> = block
                .iter()
                .map(|s| format!("{:.2}", s.values()[row]))
                .collect();
            self.table_row(measure, &cells, false);
        }
        self.y_top += self.metrics.row_height;
        headers_emitted
    }

    fn figure(&mut self, path: &Path) -> color_eyre::Result<()> {
        let img = image::open(path)?.to_rgb8();
        let (w, h) = img.dimensions();
        let native_width_mm = w as f64 * 25.4 / IMAGE_DPI;
        let native_height_mm = h as f64 * 25.4 / IMAGE_DPI;
        let scale = FIGURE_WIDTH_MM / native_width_mm;
        let height_mm = native_height_mm * scale;

        self.add_page();
        let x = (self.metrics.page_width - FIGURE_WIDTH_MM) / 2.0;
        let y = self.metrics.page_height - self.y_top - height_mm;

        let xobj = ImageXObject {
            width: Px(w as usize),
            height: Px(h as usize),
            color_space: ColorSpace::Rgb,
            bits_per_component: ColorBits::Bit8,
            interpolate: true,
            image_data: img.into_raw(),
            image_filter: None,
            clipping_bbox: None,
        };
        Image::from(xobj).add_to_layer(
            self.layer(),
            ImageTransform {
                translate_x: Some(Mm(x)),
                translate_y: Some(Mm(y)),
                scale_x: Some(scale),
                scale_y: Some(scale),
                dpi: Some(IMAGE_DPI),
                ..Default::default()
            },
        );
        Ok(())
    }

    fn save(self, path: &Path) -> color_eyre::Result<()> {
        self.doc.save(&mut BufWriter::new(File::create(path)?))?;
        Ok(())
    }
}

/// Writes the report PDF: title, statistics table for `summaries`, then one
/// page per figure in `figures`. Figures that fail to decode are skipped;
/// their paths come back so the caller can warn about them.
pub fn write_report(
    path: &Path,
    title: &str,
    summaries: &[ColumnSummary],
    figures: &[PathBuf],
    metrics: PageMetrics,
) -> color_eyre::Result<Vec<PathBuf>> {
    if summaries.is_empty() && figures.is_empty() {
        return Err(color_eyre::eyre::eyre!("nothing to report"));
    }

    let mut writer = ReportWriter::new(title, metrics)?;
    writer.title(title);

    let names: Vec<String> = summaries.iter().map(|s| s.name.clone()).collect();
    for block_names in paginate(&names, metrics.columns_per_block()) {
        let block: Vec<&ColumnSummary> = block_names
            .iter()
            .filter_map(|n| summaries.iter().find(|s| &s.name == n))
            .collect();
        writer.table_block(&block);
    }

    let mut skipped = Vec::new();
    for figure in figures {
        if writer.figure(figure).is_err() {
            skipped.push(figure.clone());
        }
    }

    writer.save(path)?;
    Ok(skipped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn summary(name: &str) -> ColumnSummary {
        ColumnSummary {
            name: name.to_string(),
            count: 4,
            mean: 2.5,
            std: 1.29,
            min: 1.0,
            q25: 1.5,
            median: 2.5,
            q75: 3.5,
            max: 4.0,
        }
    }

    #[test]
    fn block_header_reprinted_on_every_page() {
        // 80mm page holds 5 rows; header + 8 measures span two pages
        let metrics = PageMetrics {
            page_width: 210.0,
            page_height: 80.0,
            col_width: 45.0,
            row_height: 8.0,
        };
        let a = summary("a");
        let b = summary("b");
        let mut writer = ReportWriter::new("t", metrics).unwrap();
        assert_eq!(writer.table_block(&[&a, &b]), 2);
    }

    #[test]
    fn block_on_one_page_prints_one_header() {
        let a = summary("a");
        let mut writer = ReportWriter::new("t", PageMetrics::default()).unwrap();
        assert_eq!(writer.table_block(&[&a]), 1);
    }

    #[test]
    fn paginate_splits_in_order() {
        let blocks = paginate(&names(&["a", "b", "c", "d"]), 2);
        assert_eq!(blocks, vec![names(&["a", "b"]), names(&["c", "d"])]);
    }

    #[test]
    fn paginate_uneven_tail() {
        let blocks = paginate(&names(&["a", "b", "c", "d", "e"]), 2);
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[2], names(&["e"]));
    }

    #[test]
    fn paginate_zero_per_block_still_advances() {
        let blocks = paginate(&names(&["a", "b"]), 0);
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn default_metrics_block_and_row_capacity() {
        let m = PageMetrics::default();
        // (210 - 35) / 45
        assert_eq!(m.columns_per_block(), 3);
        // (297 - 40) / 8
        assert_eq!(m.rows_per_page(), 32);
    }

    #[test]
    fn page_break_near_bottom_margin() {
        let m = PageMetrics::default();
        assert!(!m.needs_page_break(269.0));
        assert!(m.needs_page_break(270.0));
    }
}
