use std::io::IsTerminal;

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use bpmn_print::api::convert_folder;
use bpmn_print::core::params::{ConvertOptions, MAX_SCALE};

use super::args::CliArgs;
use super::errors::AppError;

fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    // A subscriber may already be installed when embedded or under test.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .try_init();
}

/// Build the effective options: defaults, then the config file, then flags.
pub fn resolve_options(args: &CliArgs) -> Result<ConvertOptions, AppError> {
    let mut options = match &args.config {
        Some(path) => ConvertOptions::from_json_file(path).map_err(|source| AppError::Config {
            path: path.clone(),
            source,
        })?,
        None => ConvertOptions::default(),
    };

    if args.keep {
        options.keep_png = true;
    }
    if args.split {
        options.split = true;
    }
    if let Some(name) = &args.name {
        options.pdf_name = Some(name.clone());
    }
    if let Some(scale) = args.scale {
        if !(scale > 0.0 && scale <= MAX_SCALE) {
            return Err(AppError::InvalidScale {
                scale,
                max: MAX_SCALE,
            });
        }
        options.scale = scale;
    }
    if let Some(threshold) = args.landscape_threshold {
        options.landscape_threshold = threshold;
    }
    if let Some(orientation) = args.orientation {
        options.orientation = orientation;
    }
    options.validate()?;
    Ok(options)
}

pub fn run(args: CliArgs) -> Result<(), AppError> {
    init_logging(args.debug);

    let options = resolve_options(&args)?;
    debug!("Options: {:?}", options);
    info!("Input folder: {:?}", args.input_folder);
    info!("Output folder: {:?}", args.output_folder);

    let report = convert_folder(&args.input_folder, &args.output_folder, &options)?;
    if report.truncated_pages > 0 {
        info!(
            "{} page(s) had detail tables cut to fit",
            report.truncated_pages
        );
    }
    if options.keep_png {
        info!("Kept {} PNG file(s)", report.png_files.len());
    }
    println!("Done.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use bpmn_print::types::Orientation;
    use clap::Parser;

    fn parse(argv: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("print.json");
        fs::write(
            &config,
            r#"{"scale": 2.0, "orientation": "portrait", "pdf_name": "from-config"}"#,
        )
        .unwrap();
        let config = config.to_string_lossy().into_owned();

        let args = parse(&[
            "bpmn-print",
            "-c",
            &config,
            "--orientation",
            "landscape",
            "-k",
            "in",
            "out",
        ]);
        let options = resolve_options(&args).unwrap();
        assert_eq!(options.scale, 2.0);
        assert_eq!(options.orientation, Orientation::Landscape);
        assert_eq!(options.pdf_name.as_deref(), Some("from-config"));
        assert!(options.keep_png);
    }

    #[test]
    fn rejects_bad_scale() {
        let args = parse(&["bpmn-print", "--scale", "0", "in", "out"]);
        assert!(matches!(
            resolve_options(&args),
            Err(AppError::InvalidScale { .. })
        ));
    }

    #[test]
    fn missing_config_file_is_reported() {
        let args = parse(&["bpmn-print", "-c", "/nonexistent/print.json", "in", "out"]);
        assert!(matches!(
            resolve_options(&args),
            Err(AppError::Config { .. })
        ));
    }

    #[test]
    fn unparsable_config_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("print.json");
        fs::write(&config, r#"{"scale": "big"}"#).unwrap();
        let config = config.to_string_lossy().into_owned();

        let args = parse(&["bpmn-print", "-c", &config, "in", "out"]);
        let err = resolve_options(&args).unwrap_err();
        assert!(matches!(
            err,
            AppError::Config {
                source: bpmn_print::Error::Config(_),
                ..
            }
        ));
        assert!(err.to_string().starts_with("Cannot load config file "));
    }
}
