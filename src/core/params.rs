use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Orientation;

/// Largest accepted rasterization scale.
pub const MAX_SCALE: f32 = 8.0;

/// Conversion parameters suitable for config files and command-line overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Keep the intermediate PNG diagrams next to the PDF
    pub keep_png: bool,
    /// One PDF per BPMN file instead of a single combined PDF
    pub split: bool,
    /// File name of the combined PDF; defaults to the input folder name
    pub pdf_name: Option<String>,
    /// Pixels per layout unit when rasterizing diagrams
    pub scale: f32,
    /// Diagram width in pixels above which `Orientation::Auto` picks landscape
    pub landscape_threshold: u32,
    pub orientation: Orientation,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            keep_png: false,
            split: false,
            pdf_name: None,
            scale: 1.5,
            landscape_threshold: 2200,
            orientation: Orientation::Auto,
        }
    }
}

impl ConvertOptions {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.scale > 0.0 && self.scale <= MAX_SCALE) {
            return Err(Error::InvalidArgument {
                arg: "scale",
                value: self.scale.to_string(),
            });
        }
        if let Some(name) = &self.pdf_name {
            let stem = name.trim();
            if stem.is_empty() || stem.contains(['/', '\\']) {
                return Err(Error::InvalidArgument {
                    arg: "pdf_name",
                    value: name.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_take_defaults() {
        let options = ConvertOptions::from_json_str(r#"{"keep_png": true}"#).unwrap();
        assert!(options.keep_png);
        assert_eq!(options.scale, 1.5);
        assert_eq!(options.orientation, Orientation::Auto);
    }

    #[test]
    fn orientation_reads_lowercase() {
        let options =
            ConvertOptions::from_json_str(r#"{"orientation": "landscape", "split": true}"#)
                .unwrap();
        assert_eq!(options.orientation, Orientation::Landscape);
        assert!(options.split);
    }

    #[test]
    fn rejects_out_of_range_scale() {
        let err = ConvertOptions::from_json_str(r#"{"scale": 0}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
        let mut options = ConvertOptions::default();
        options.scale = 9.0;
        assert!(options.validate().is_err());
    }

    #[test]
    fn rejects_pdf_names_with_separators() {
        let mut options = ConvertOptions::default();
        options.pdf_name = Some("../out".to_string());
        assert!(options.validate().is_err());
        options.pdf_name = Some("report".to_string());
        assert!(options.validate().is_ok());
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = ConvertOptions::from_json_str("{").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
