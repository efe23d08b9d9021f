//! High-level library API: discover BPMN files in a folder, render single
//! documents to SVG or PNG, and convert whole folders into a printable PDF.
//! Prefer these entrypoints over the lower-level layout and writer modules
//! when integrating bpmn-print.
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::core::layout::{LayoutConfig, layout_document};
use crate::core::params::ConvertOptions;
use crate::error::{Error, Result};
use crate::io::bpmn::{BpmnDocument, read_bpmn_file};
use crate::io::writers::{PdfWriter, Rasterizer, render_svg};

/// PDF file stem used when neither a name nor an input folder name is available.
pub const DEFAULT_PDF_STEM: &str = "bpmn-print";

/// Outcome of a folder conversion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionReport {
    pub documents: usize,
    pub pdf_files: Vec<PathBuf>,
    /// PNG diagrams left in the output folder; empty unless `keep_png` is set
    pub png_files: Vec<PathBuf>,
    /// Pages whose detail tables were cut to fit
    pub truncated_pages: usize,
}

/// Extension of the files picked up from the input folder, matched exactly.
const BPMN_EXTENSION: &str = "bpmn";

fn is_bpmn_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == BPMN_EXTENSION)
}

/// Return the `.bpmn` files directly inside `input_dir`, sorted by path.
/// Other spellings of the extension such as `.BPMN` are ignored.
pub fn discover_bpmn_files(input_dir: &Path) -> Result<Vec<PathBuf>> {
    if !input_dir.exists() {
        return Err(Error::InputNotFound {
            path: input_dir.to_path_buf(),
        });
    }
    if !input_dir.is_dir() {
        return Err(Error::InputNotADirectory {
            path: input_dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(input_dir)? {
        let path = entry?.path();
        if path.is_file() && is_bpmn_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Lay out a parsed document and render it as SVG.
pub fn render_bpmn_svg(doc: &BpmnDocument) -> String {
    render_svg(&layout_document(doc, &LayoutConfig::default()))
}

/// Read one BPMN file and write its diagram to `output` as PNG. Returns the
/// parsed document together with the PNG bytes.
pub fn render_bpmn_to_png(
    input: &Path,
    output: &Path,
    rasterizer: &Rasterizer,
) -> Result<(BpmnDocument, Vec<u8>)> {
    let doc = read_bpmn_file(input).map_err(|source| Error::MalformedBpmn {
        path: input.to_path_buf(),
        source,
    })?;
    debug!(
        "{}: {} nodes, {} flows",
        input.display(),
        doc.nodes.len(),
        doc.flows.len()
    );
    let svg = render_bpmn_svg(&doc);
    let png = rasterizer.write_png(&svg, output)?;
    Ok((doc, png))
}

/// File stem of the combined PDF: the configured name, else the input
/// folder's name, else `bpmn-print`.
pub fn pdf_stem(input_dir: &Path, options: &ConvertOptions) -> String {
    if let Some(name) = options.pdf_name.as_deref().map(str::trim) {
        let lower = name.to_ascii_lowercase();
        let stem = if lower.ends_with(".pdf") && name.len() > 4 {
            &name[..name.len() - 4]
        } else {
            name
        };
        if !stem.is_empty() {
            return stem.to_string();
        }
    }
    input_dir
        .canonicalize()
        .ok()
        .and_then(|dir| dir.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| DEFAULT_PDF_STEM.to_string())
}

fn remove_files(paths: &[PathBuf]) {
    for path in paths {
        match fs::remove_file(path) {
            Ok(()) => debug!("Deleted {}", path.display()),
            Err(e) => warn!("Could not delete {}: {}", path.display(), e),
        }
    }
}

/// Convert every BPMN file in `input_dir` into PNG diagrams and a PDF in
/// `output_dir`.
///
/// The input folder is validated before anything is created. Intermediate
/// PNGs are removed afterwards unless `options.keep_png` is set, including
/// when the run fails part-way.
pub fn convert_folder(
    input_dir: &Path,
    output_dir: &Path,
    options: &ConvertOptions,
) -> Result<ConversionReport> {
    options.validate()?;

    let files = discover_bpmn_files(input_dir)?;
    if files.is_empty() {
        return Err(Error::NoBpmnFiles {
            path: input_dir.to_path_buf(),
        });
    }
    info!("Found {} BPMN file(s) to process", files.len());

    fs::create_dir_all(output_dir).map_err(|source| Error::OutputDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let rasterizer = Rasterizer::new(options.scale);
    let mut written = Vec::with_capacity(files.len());
    let result = convert_files(
        &files,
        input_dir,
        output_dir,
        options,
        &rasterizer,
        &mut written,
    );

    if !options.keep_png {
        remove_files(&written);
    }
    let mut report = result?;
    if options.keep_png {
        report.png_files = written;
    }
    Ok(report)
}

fn convert_files(
    files: &[PathBuf],
    input_dir: &Path,
    output_dir: &Path,
    options: &ConvertOptions,
    rasterizer: &Rasterizer,
    written: &mut Vec<PathBuf>,
) -> Result<ConversionReport> {
    let mut report = ConversionReport {
        documents: files.len(),
        ..Default::default()
    };
    let new_writer = || PdfWriter::new(options.orientation, options.landscape_threshold);
    let mut combined = (!options.split).then(new_writer);

    for file in files {
        let title = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = file
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!("Processing {}...", title);

        let png_path = output_dir.join(format!("{stem}.png"));
        let (doc, png) = render_bpmn_to_png(file, &png_path, rasterizer)?;
        written.push(png_path);

        match combined.as_mut() {
            Some(writer) => {
                if writer.add_page(&title, &png, &doc)? > 0 {
                    report.truncated_pages += 1;
                }
            }
            None => {
                let mut writer = new_writer();
                if writer.add_page(&title, &png, &doc)? > 0 {
                    report.truncated_pages += 1;
                }
                let pdf_path = output_dir.join(format!("{stem}.pdf"));
                writer.save(&pdf_path)?;
                info!("Generated {}", pdf_path.display());
                report.pdf_files.push(pdf_path);
            }
        }
    }

    if let Some(writer) = combined {
        let pdf_path = output_dir.join(format!("{}.pdf", pdf_stem(input_dir, options)));
        let pages = writer.page_count();
        writer.save(&pdf_path)?;
        info!("Generated {} ({} pages)", pdf_path.display(), pages);
        report.pdf_files.push(pdf_path);
    }
    Ok(report)
}
