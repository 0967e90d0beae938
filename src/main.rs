// SPDX-License-Identifier: MPL-2.0
use std::path::PathBuf;
use std::process::ExitCode;

use photo_variants::{config, paths, VariantPipeline};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
Usage: photo-variants [OPTIONS] INPUT

Options:
  --mode MODE          enhance, colorize, or both (default: enhance)
  --output-dir DIR     where variants are written (default: settings or current dir)
  --model-dir DIR      directory holding the colorization model files
  --config FILE        settings file to use instead of the default location
  --config-dir DIR     directory holding settings.toml
  -h, --help           print this help";

struct Flags {
    mode: String,
    output_dir: Option<PathBuf>,
    model_dir: Option<String>,
    config_file: Option<PathBuf>,
    config_dir: Option<String>,
    input: PathBuf,
}

fn parse_flags() -> Result<Option<Flags>, String> {
    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        return Ok(None);
    }

    let opt = |args: &mut pico_args::Arguments, key: &'static str| -> Result<Option<String>, String> {
        args.opt_value_from_str(key).map_err(|e| e.to_string())
    };
    let mode = opt(&mut args, "--mode")?.unwrap_or_else(|| "enhance".to_string());
    let output_dir = opt(&mut args, "--output-dir")?.map(PathBuf::from);
    let model_dir = opt(&mut args, "--model-dir")?;
    let config_file = opt(&mut args, "--config")?.map(PathBuf::from);
    let config_dir = opt(&mut args, "--config-dir")?;

    let input = args
        .finish()
        .into_iter()
        .next()
        .map(PathBuf::from)
        .ok_or_else(|| "missing INPUT".to_string())?;

    Ok(Some(Flags {
        mode,
        output_dir,
        model_dir,
        config_file,
        config_dir,
        input,
    }))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let flags = match parse_flags() {
        Ok(Some(flags)) => flags,
        Ok(None) => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(message) => {
            eprintln!("error: {message}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    paths::init_cli_overrides(flags.model_dir, flags.config_dir);

    let settings = match &flags.config_file {
        Some(path) => config::load_from_path(path),
        None => config::load(),
    };
    let settings = match settings {
        Ok(settings) => settings,
        Err(err) => {
            tracing::warn!(%err, "could not read settings, using defaults");
            config::Config::default()
        }
    };

    let output_dir = flags
        .output_dir
        .or_else(|| settings.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));

    let pipeline = VariantPipeline::new(&settings);
    match pipeline.process(&flags.input, &output_dir, &flags.mode) {
        Ok(outputs) => {
            for path in outputs {
                println!("{}", path.display());
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
