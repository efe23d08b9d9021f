//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Wraps I/O, BPMN reader, image and PDF failures, and provides semantic variants
//! for input validation and rendering failures.
use std::path::PathBuf;

use thiserror::Error;

use crate::io::bpmn::BpmnError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input folder does not exist: {}", .path.display())]
    InputNotFound { path: PathBuf },

    #[error("Input path is not a folder: {}", .path.display())]
    InputNotADirectory { path: PathBuf },

    #[error("No BPMN files found in {}", .path.display())]
    NoBpmnFiles { path: PathBuf },

    #[error("Malformed BPMN file {}: {source}", .path.display())]
    MalformedBpmn {
        path: PathBuf,
        #[source]
        source: BpmnError,
    },

    #[error("Failed to render diagram to {}: {reason}", .path.display())]
    Render { path: PathBuf, reason: String },

    #[error("Cannot create output folder {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Invalid argument: {arg}={value}")]
    InvalidArgument { arg: &'static str, value: String },
}

impl Error {
    pub fn pdf<E: std::fmt::Display>(e: E) -> Self {
        Error::Pdf(e.to_string())
    }

    pub fn render<E: std::fmt::Display>(path: impl Into<PathBuf>, e: E) -> Self {
        Error::Render {
            path: path.into(),
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_path() {
        let err = Error::NoBpmnFiles {
            path: PathBuf::from("/tmp/processes"),
        };
        assert_eq!(err.to_string(), "No BPMN files found in /tmp/processes");

        let err = Error::MalformedBpmn {
            path: PathBuf::from("broken.bpmn"),
            source: BpmnError::Empty,
        };
        assert!(err.to_string().starts_with("Malformed BPMN file broken.bpmn: "));
    }

    #[test]
    fn render_helper_keeps_reason() {
        let err = Error::render("out/a.png", "pixmap too large");
        assert_eq!(
            err.to_string(),
            "Failed to render diagram to out/a.png: pixmap too large"
        );
    }
}
