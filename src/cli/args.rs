use clap::Parser;
use std::path::PathBuf;

use bpmn_print::types::Orientation;

#[derive(Parser, Debug)]
#[command(
    name = "bpmn-print",
    version,
    about = "Print BPMN workflow for developer readings",
    disable_version_flag = true
)]
pub struct CliArgs {
    /// Folder containing the .bpmn files to print
    pub input_folder: PathBuf,

    /// Folder where the PDF (and kept PNG diagrams) are written
    pub output_folder: PathBuf,

    /// Print version
    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    pub version: Option<bool>,

    /// Keep the intermediate PNG diagrams
    #[arg(short = 'k', long = "keep", default_value_t = false)]
    pub keep: bool,

    /// Write one PDF per BPMN file instead of a combined PDF
    #[arg(short = 's', long, default_value_t = false)]
    pub split: bool,

    /// File name of the combined PDF (defaults to the input folder name)
    #[arg(short = 'n', long)]
    pub name: Option<String>,

    /// Raster scale of the diagrams (0 < scale <= 8)
    #[arg(long)]
    pub scale: Option<f32>,

    /// Diagram width in pixels above which pages are printed landscape
    #[arg(long)]
    pub landscape_threshold: Option<u32>,

    /// Page orientation (auto applies the landscape threshold)
    #[arg(long, value_enum)]
    pub orientation: Option<Orientation>,

    /// JSON file with conversion options; command-line flags override it
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, default_value_t = false)]
    pub debug: bool,
}
