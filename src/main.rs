use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use playlist_features_lib::config::{Config, DEFAULT_CONFIG_FILE};

/// Collect audio features of a liked and a disliked playlist into a TSV file.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// TOML file with credentials, playlist ids and output path
    #[arg(short, long, env = "PLAYLIST_FEATURES_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Write here instead of the configured file_name
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = Config::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    if let Some(output) = args.output {
        config.file_name = output;
    }

    match playlist_features_lib::run(&config) {
        Ok(rows) => {
            log::info!("Done: {} rows in {}", rows, config.file_name.display());
            Ok(())
        }
        Err(e) => {
            log::error!("Acquisition failed: {}", e);
            Err(e.into())
        }
    }
}
