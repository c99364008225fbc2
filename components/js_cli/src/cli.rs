//! Command-line argument parsing

use crate::error::CliResult;
use clap::Parser;
use js_bridge::BridgeConfig;
use std::path::{Path, PathBuf};

/// Run JavaScript with Node-style `require` and host modules
#[derive(Parser, Debug)]
#[command(name = "jsbridge", version, long_about = None)]
pub struct Cli {
    /// JavaScript file to execute
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Evaluate inline JavaScript code
    #[arg(short, long, value_name = "CODE")]
    pub eval: Option<String>,

    /// Start interactive REPL
    #[arg(short, long)]
    pub repl: bool,

    /// Add a module search root (repeatable, searched in order)
    #[arg(short = 'I', long = "search-path", value_name = "DIR")]
    pub search_paths: Vec<PathBuf>,

    /// Load bridge settings from a JSON file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Let `require('host/...')` reach the built-in host modules
    #[arg(long)]
    pub host_modules: bool,

    /// Expose an empty `process.env`
    #[arg(long)]
    pub no_env: bool,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    /// Log module resolution
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Builds the bridge configuration from `--config` and the flags.
    ///
    /// Search roots are ordered: the script's own directory, then
    /// `-I` roots, then roots from the configuration file.
    pub fn bridge_config(&self) -> CliResult<BridgeConfig> {
        let mut config = match &self.config {
            Some(path) => BridgeConfig::load(path)?,
            None => BridgeConfig::default(),
        };

        let mut roots: Vec<PathBuf> = Vec::new();
        if let Some(dir) = self.file.as_deref().map(script_dir) {
            roots.push(dir);
        }
        roots.extend(self.search_paths.iter().cloned());
        roots.append(&mut config.search_paths);
        config.search_paths = roots;

        if self.host_modules {
            config.enable_host_modules = true;
        }
        if self.no_env {
            config.snapshot_env = false;
        }
        Ok(config)
    }

    /// Default log level implied by `--verbose`.
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "warn"
        }
    }
}

fn script_dir(file: &Path) -> PathBuf {
    match file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
