//! Output writers: SVG markup for a laid-out diagram, PNG rasterization and
//! PDF assembly.
pub mod pdf;
pub mod png;
pub mod svg;

pub use pdf::PdfWriter;
pub use png::Rasterizer;
pub use svg::render_svg;
