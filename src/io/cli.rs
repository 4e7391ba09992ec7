use crate::io::config::ViewerConfig;
use clap::Parser;
use log::{info, warn};

/// Minimal CLI: configuration lives in TOML, flags only select the config
/// file, the asset pair, and the run mode.
#[derive(Parser, Debug)]
#[command(name = "objview")]
#[command(about = "Interactive viewer for textured OBJ models")]
pub struct Cli {
    /// Configuration file path (TOML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<String>,

    /// Render a single frame to disk instead of opening a window
    #[arg(long)]
    pub headless: bool,

    /// Override the asset directory from the config
    #[arg(long, value_name = "DIR")]
    pub asset_dir: Option<String>,

    /// Override the asset basename from the config
    #[arg(long, value_name = "NAME")]
    pub asset_name: Option<String>,
}

impl Cli {
    /// Parses arguments and resolves the effective configuration.
    /// Returns the settings and whether the GUI should start.
    pub fn process() -> Result<(ViewerConfig, bool), String> {
        let cli = Self::parse();

        let mut config = if let Some(config_path) = &cli.config {
            info!("Loading configuration: {config_path}");
            ViewerConfig::load(config_path)?
        } else {
            info!("Using default configuration");
            ViewerConfig::default()
        };

        if let Some(dir) = cli.asset_dir {
            config.asset.dir = dir;
        }
        if let Some(name) = cli.asset_name {
            config.asset.name = name;
        }

        if config.asset.name.ends_with(".obj") || config.asset.name.ends_with(".mtl") {
            warn!(
                "Asset name '{}' carries an extension; the pair is resolved by basename",
                config.asset.name
            );
        }

        Ok((config, !cli.headless))
    }
}
