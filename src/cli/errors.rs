use std::path::PathBuf;

use thiserror::Error;

/// Status for failures of the conversion itself or of its inputs.
pub const EXIT_FAILURE: u8 = 2;
/// Status for failures inside the image or PDF libraries.
pub const EXIT_INTERNAL: u8 = 3;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Cannot load config file {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: bpmn_print::Error,
    },

    #[error("Invalid scale: {scale}. Must be greater than 0 and at most {max}")]
    InvalidScale { scale: f32, max: f32 },

    #[error(transparent)]
    Convert(#[from] bpmn_print::Error),
}

impl AppError {
    /// Process exit status reported for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Convert(bpmn_print::Error::Image(_) | bpmn_print::Error::Pdf(_)) => {
                EXIT_INTERNAL
            }
            _ => EXIT_FAILURE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_and_io_failures_exit_with_two() {
        let missing = AppError::Convert(bpmn_print::Error::InputNotFound {
            path: PathBuf::from("nope"),
        });
        assert_eq!(missing.exit_code(), EXIT_FAILURE);

        let io = AppError::Convert(bpmn_print::Error::Io(std::io::Error::other("denied")));
        assert_eq!(io.exit_code(), EXIT_FAILURE);

        let scale = AppError::InvalidScale {
            scale: 0.0,
            max: 8.0,
        };
        assert_eq!(scale.exit_code(), EXIT_FAILURE);
    }

    #[test]
    fn library_failures_exit_with_three() {
        let pdf = AppError::Convert(bpmn_print::Error::pdf("xref broken"));
        assert_eq!(pdf.exit_code(), EXIT_INTERNAL);
    }
}
