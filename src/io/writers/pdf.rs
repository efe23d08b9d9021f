//! PDF assembly with lopdf: one A4 page per BPMN document holding the title,
//! the rendered diagram and the detail tables (conditions, nodes, input
//! parameters, scripts).
//!
//! The output carries no timestamps or generated ids, so identical input
//! produces identical bytes.
use std::io::Write;
use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, StringFormat, dictionary};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::io::bpmn::BpmnDocument;
use crate::types::Orientation;

/// A4 portrait in points.
pub const A4: (f32, f32) = (595.0, 842.0);
/// 10 mm.
pub const MARGIN: f32 = 28.35;
/// Longest input parameter value printed before it is cut with `...`.
pub const MAX_VALUE_CHARS: usize = 50;

const TITLE_SIZE: f32 = 14.0;
const SECTION_SIZE: f32 = 11.0;
const HEADER_SIZE: f32 = 10.0;
const CELL_SIZE: f32 = 8.0;
const HEADER_HEIGHT: f32 = 18.0;
const ROW_HEIGHT: f32 = 12.0;
/// Extra height per wrapped line in a table cell.
const CELL_LINE: f32 = 9.5;
const SCRIPT_SIZE: f32 = 8.0;
const SCRIPT_LINE: f32 = 10.0;
const NOTE_HEIGHT: f32 = 12.0;
const BLOCK_GAP: f32 = 10.0;

type Rgb = (f32, f32, f32);

const GREY: Rgb = (0.5, 0.5, 0.5);
const LIGHT_GREY: Rgb = (0.827, 0.827, 0.827);
const LIGHT_CYAN: Rgb = (0.878, 1.0, 1.0);
const LIGHT_BLUE: Rgb = (0.678, 0.847, 0.902);
const BEIGE: Rgb = (0.961, 0.961, 0.863);
const BLACK: Rgb = (0.0, 0.0, 0.0);
const WHITE: Rgb = (1.0, 1.0, 1.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Font {
    Regular,
    Bold,
    Mono,
}

impl Font {
    fn resource(self) -> &'static [u8] {
        match self {
            Font::Regular => b"F1",
            Font::Bold => b"F2",
            Font::Mono => b"F3",
        }
    }
}

/// Encode text for the WinAnsi-encoded standard fonts; characters outside
/// Latin-1 become `?`.
fn pdf_string(text: &str) -> Object {
    let bytes = text
        .chars()
        .map(|c| if (c as u32) <= 0xFF { c as u32 as u8 } else { b'?' })
        .collect();
    Object::String(bytes, StringFormat::Literal)
}

/// Cut `text` to `max` characters, ending in `...` when shortened.
pub fn truncate_text(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Characters of `size` pt Helvetica that fit in a cell `width` pt wide.
fn cell_chars(width: f32, size: f32) -> usize {
    ((width - 4.0) / (0.5 * size)).floor().max(1.0) as usize
}

/// Word-wrap a table cell to `max` characters per line, splitting words
/// that are longer than a line.
fn wrap_cell(text: &str, max: usize) -> Vec<String> {
    let max = max.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let chars: Vec<char> = word.chars().collect();
        if chars.len() > max {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let mut chunks = chars.chunks(max).peekable();
            while let Some(chunk) = chunks.next() {
                let piece: String = chunk.iter().collect();
                if chunks.peek().is_some() {
                    lines.push(piece);
                } else {
                    current = piece;
                }
            }
            continue;
        }
        let len = current.chars().count();
        if len > 0 && len + 1 + chars.len() > max {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Hard-wrap a monospace line to `width` characters, keeping empty lines.
fn wrap_mono(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut out = Vec::new();
    for line in text.lines() {
        let chars: Vec<char> = line.trim_end().chars().collect();
        if chars.is_empty() {
            out.push(String::new());
            continue;
        }
        for chunk in chars.chunks(width) {
            out.push(chunk.iter().collect());
        }
    }
    out
}

/// Operations for one page content stream, in PDF user space (origin at the
/// bottom-left corner).
#[derive(Default)]
struct Canvas {
    ops: Vec<Operation>,
}

impl Canvas {
    fn text(&mut self, x: f32, y: f32, font: Font, size: f32, color: Rgb, text: &str) {
        self.ops.push(Operation::new(
            "rg",
            vec![Object::Real(color.0), Object::Real(color.1), Object::Real(color.2)],
        ));
        self.ops.push(Operation::new("BT", vec![]));
        self.ops.push(Operation::new(
            "Tf",
            vec![Object::Name(font.resource().to_vec()), Object::Real(size)],
        ));
        self.ops
            .push(Operation::new("Td", vec![Object::Real(x), Object::Real(y)]));
        self.ops.push(Operation::new("Tj", vec![pdf_string(text)]));
        self.ops.push(Operation::new("ET", vec![]));
    }

    fn rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.ops.push(Operation::new(
            "re",
            vec![Object::Real(x), Object::Real(y), Object::Real(w), Object::Real(h)],
        ));
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb) {
        self.ops.push(Operation::new(
            "rg",
            vec![Object::Real(color.0), Object::Real(color.1), Object::Real(color.2)],
        ));
        self.rect(x, y, w, h);
        self.ops.push(Operation::new("f", vec![]));
    }

    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb, width: f32) {
        self.ops.push(Operation::new(
            "RG",
            vec![Object::Real(color.0), Object::Real(color.1), Object::Real(color.2)],
        ));
        self.ops.push(Operation::new("w", vec![Object::Real(width)]));
        self.rect(x, y, w, h);
        self.ops.push(Operation::new("S", vec![]));
    }

    fn image(&mut self, name: &[u8], x: f32, y: f32, w: f32, h: f32) {
        self.ops.push(Operation::new("q", vec![]));
        self.ops.push(Operation::new(
            "cm",
            vec![
                Object::Real(w),
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(h),
                Object::Real(x),
                Object::Real(y),
            ],
        ));
        self.ops
            .push(Operation::new("Do", vec![Object::Name(name.to_vec())]));
        self.ops.push(Operation::new("Q", vec![]));
    }

    fn encode(self) -> Result<Vec<u8>> {
        Content { operations: self.ops }.encode().map_err(Error::pdf)
    }
}

struct Table<'a> {
    title: &'a str,
    headers: &'a [&'a str],
    widths: &'a [f32],
    background: Rgb,
    rows: Vec<Vec<String>>,
}

/// Flows content top to bottom on one page and counts what did not fit.
struct PageFlow {
    canvas: Canvas,
    left: f32,
    width: f32,
    /// Current top edge of free space.
    y: f32,
    bottom: f32,
    omitted: usize,
}

impl PageFlow {
    fn fits(&self, height: f32) -> bool {
        self.y - height >= self.bottom
    }

    fn section_title(&mut self, title: &str) {
        self.canvas.text(
            self.left,
            self.y - SECTION_SIZE,
            Font::Bold,
            SECTION_SIZE,
            BLACK,
            title,
        );
        self.y -= SECTION_SIZE + 5.0;
    }

    fn table(&mut self, table: &Table<'_>) {
        if table.rows.is_empty() {
            return;
        }
        if self.omitted > 0 || !self.fits(SECTION_SIZE + 5.0 + HEADER_HEIGHT + ROW_HEIGHT) {
            self.omitted += table.rows.len();
            return;
        }
        self.section_title(table.title);

        let natural: f32 = table.widths.iter().sum();
        let factor = if natural > self.width { self.width / natural } else { 1.0 };
        let widths: Vec<f32> = table.widths.iter().map(|w| w * factor).collect();
        let total: f32 = widths.iter().sum();

        self.canvas
            .fill_rect(self.left, self.y - HEADER_HEIGHT, total, HEADER_HEIGHT, GREY);
        self.headers(table.headers, &widths);
        self.y -= HEADER_HEIGHT;

        let mut x = self.left;
        for w in &widths {
            self.canvas
                .stroke_rect(x, self.y, *w, HEADER_HEIGHT, BLACK, 0.5);
            x += w;
        }

        let mut shown = 0;
        for row in &table.rows {
            let cells: Vec<Vec<String>> = row
                .iter()
                .zip(&widths)
                .map(|(text, w)| wrap_cell(text, cell_chars(*w, CELL_SIZE)))
                .collect();
            let lines = cells.iter().map(Vec::len).max().unwrap_or(1).max(1);
            let height = ROW_HEIGHT + (lines - 1) as f32 * CELL_LINE;
            if !self.fits(height) {
                break;
            }
            self.canvas
                .fill_rect(self.left, self.y - height, total, height, table.background);
            let first_baseline = self.y - (ROW_HEIGHT + CELL_SIZE) / 2.0 + 1.5;
            let mut x = self.left;
            for (cell, w) in cells.iter().zip(&widths) {
                for (i, line) in cell.iter().enumerate() {
                    self.canvas.text(
                        x + 2.0,
                        first_baseline - i as f32 * CELL_LINE,
                        Font::Regular,
                        CELL_SIZE,
                        BLACK,
                        line,
                    );
                }
                self.canvas
                    .stroke_rect(x, self.y - height, *w, height, BLACK, 0.5);
                x += w;
            }
            self.y -= height;
            shown += 1;
        }
        self.omitted += table.rows.len() - shown;
        self.y -= BLOCK_GAP;
    }

    fn headers(&mut self, headers: &[&str], widths: &[f32]) {
        let baseline = self.y - (HEADER_HEIGHT + HEADER_SIZE) / 2.0 + 1.5;
        let mut x = self.left;
        for (text, w) in headers.iter().zip(widths) {
            let max_chars = cell_chars(*w, HEADER_SIZE);
            self.canvas.text(
                x + 2.0,
                baseline,
                Font::Bold,
                HEADER_SIZE,
                WHITE,
                &truncate_text(text, max_chars),
            );
            x += w;
        }
    }

    fn scripts(&mut self, doc: &BpmnDocument) {
        if doc.scripts.is_empty() {
            return;
        }
        if self.omitted > 0 || !self.fits(SECTION_SIZE + 5.0 + 14.0 + SCRIPT_LINE) {
            self.omitted += doc.scripts.len();
            return;
        }
        self.section_title("JEXL Scripts");

        let per_line = ((self.width - 8.0) / (0.6 * SCRIPT_SIZE)).floor().max(1.0) as usize;
        for (idx, script) in doc.scripts.iter().enumerate() {
            let lines = wrap_mono(&script.text, per_line);
            let body = lines.len().max(1) as f32 * SCRIPT_LINE + 4.0;
            if !self.fits(14.0 + body) {
                self.omitted += doc.scripts.len() - idx;
                return;
            }
            self.canvas
                .fill_rect(self.left, self.y - 14.0, self.width, 14.0, LIGHT_GREY);
            let heading = format!("{} | {}", script.node_name, script.param_name);
            self.canvas.text(
                self.left + 3.0,
                self.y - 10.5,
                Font::Bold,
                9.0,
                BLACK,
                &truncate_text(&heading, 100),
            );
            self.y -= 14.0;

            let top = self.y;
            for line in &lines {
                self.canvas.text(
                    self.left + 4.0,
                    self.y - SCRIPT_LINE + 2.0,
                    Font::Mono,
                    SCRIPT_SIZE,
                    BLACK,
                    line,
                );
                self.y -= SCRIPT_LINE;
            }
            self.y = top - body;
            self.canvas
                .stroke_rect(self.left, self.y, self.width, body, GREY, 0.5);
            self.y -= 6.0;
        }
    }
}

/// Collects pages and writes them as a single PDF.
pub struct PdfWriter {
    doc: Document,
    pages_id: ObjectId,
    fonts_id: ObjectId,
    page_ids: Vec<ObjectId>,
    orientation: Orientation,
    landscape_threshold: u32,
}

impl PdfWriter {
    pub fn new(orientation: Orientation, landscape_threshold: u32) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut font = |base: &str| {
            doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => base,
                "Encoding" => "WinAnsiEncoding",
            })
        };
        let regular = font("Helvetica");
        let bold = font("Helvetica-Bold");
        let mono = font("Courier");
        let fonts_id = doc.add_object(dictionary! {
            "F1" => regular,
            "F2" => bold,
            "F3" => mono,
        });
        Self {
            doc,
            pages_id,
            fonts_id,
            page_ids: Vec::new(),
            orientation,
            landscape_threshold,
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn page_size(&self, image_width: u32) -> (f32, f32) {
        let landscape = match self.orientation {
            Orientation::Landscape => true,
            Orientation::Portrait => false,
            Orientation::Auto => image_width > self.landscape_threshold,
        };
        if landscape { (A4.1, A4.0) } else { A4 }
    }

    /// Append a page for one document. Returns how many table rows and
    /// scripts did not fit on the page.
    pub fn add_page(&mut self, title: &str, png: &[u8], bpmn: &BpmnDocument) -> Result<usize> {
        let rgb = image::load_from_memory_with_format(png, image::ImageFormat::Png)?.to_rgb8();
        let (img_w, img_h) = rgb.dimensions();
        let (page_w, page_h) = self.page_size(img_w);
        debug!(
            "Page '{}': {}x{} px diagram on {}x{} pt",
            title, img_w, img_h, page_w, page_h
        );

        let image_id = self.doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => img_w as i64,
                "Height" => img_h as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8i64,
            },
            rgb.into_raw(),
        ));

        let mut flow = PageFlow {
            canvas: Canvas::default(),
            left: MARGIN,
            width: page_w - 2.0 * MARGIN,
            y: page_h - MARGIN,
            bottom: MARGIN + NOTE_HEIGHT,
            omitted: 0,
        };

        flow.canvas
            .text(flow.left, flow.y - TITLE_SIZE, Font::Bold, TITLE_SIZE, BLACK, title);
        flow.y -= TITLE_SIZE + 8.0;

        if img_w > 0 && img_h > 0 {
            let max_h = (1.2 * flow.width).min(flow.y - flow.bottom);
            let mut draw_w = flow.width;
            let mut draw_h = img_h as f32 * draw_w / img_w as f32;
            if draw_h > max_h {
                draw_h = max_h;
                draw_w = img_w as f32 * draw_h / img_h as f32;
            }
            let x = flow.left + (flow.width - draw_w) / 2.0;
            flow.canvas.image(b"Im1", x, flow.y - draw_h, draw_w, draw_h);
            flow.y -= draw_h + 12.0;
        }

        for table in detail_tables(bpmn) {
            flow.table(&table);
        }
        flow.scripts(bpmn);

        let omitted = flow.omitted;
        if omitted > 0 {
            warn!("{}: {} table rows or scripts did not fit on the page", title, omitted);
            flow.canvas.text(
                MARGIN,
                MARGIN + 2.0,
                Font::Regular,
                CELL_SIZE,
                GREY,
                &format!("... {omitted} more not shown"),
            );
        }

        let content_id = self
            .doc
            .add_object(Stream::new(dictionary! {}, flow.canvas.encode()?));
        let resources_id = self.doc.add_object(dictionary! {
            "Font" => self.fonts_id,
            "XObject" => dictionary! { "Im1" => image_id },
        });
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(page_w),
                Object::Real(page_h),
            ],
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        self.page_ids.push(page_id);
        Ok(omitted)
    }

    /// Finish the document and serialize it.
    pub fn into_bytes(mut self) -> Result<Vec<u8>> {
        let kids: Vec<Object> = self.page_ids.iter().map(|&id| id.into()).collect();
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => self.page_ids.len() as i64,
        };
        self.doc
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        let info_id = self.doc.add_object(dictionary! {
            "Producer" => Object::string_literal(concat!("bpmn-print ", env!("CARGO_PKG_VERSION"))),
        });
        self.doc.trailer.set("Info", info_id);
        self.doc.compress();

        let mut bytes = Vec::new();
        self.doc.save_to(&mut bytes).map_err(Error::pdf)?;
        Ok(bytes)
    }

    /// Write the PDF through a temporary file in the destination folder,
    /// renamed into place once complete.
    pub fn save(self, path: &Path) -> Result<()> {
        let bytes = self.into_bytes()?;
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.flush()?;
        tmp.persist(path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }
}

fn detail_tables(doc: &BpmnDocument) -> Vec<Table<'static>> {
    let conditions = doc
        .conditions()
        .into_iter()
        .map(|c| vec![c.number.to_string(), c.expression])
        .collect();
    let nodes = doc
        .activities
        .iter()
        .map(|a| vec![a.name.clone(), a.kind.to_string(), a.target.clone()])
        .collect();
    let params = doc
        .parameters
        .iter()
        .map(|p| {
            vec![
                p.node_name.clone(),
                p.param_name.clone(),
                truncate_text(&p.value, MAX_VALUE_CHARS),
            ]
        })
        .collect();

    vec![
        Table {
            title: "Branch Conditions",
            headers: &["#", "Condition"],
            widths: &[30.0, 430.0],
            background: LIGHT_CYAN,
            rows: conditions,
        },
        Table {
            title: "Nodes (Activities and Tasks)",
            headers: &["Node Name", "Type", "Called Element / Class"],
            widths: &[150.0, 80.0, 230.0],
            background: LIGHT_BLUE,
            rows: nodes,
        },
        Table {
            title: "Input Parameters",
            headers: &["Node Name", "Parameter Name", "Value"],
            widths: &[150.0, 120.0, 190.0],
            background: BEIGE,
            rows: params,
        },
    ]
}
