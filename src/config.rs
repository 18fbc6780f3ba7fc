// Configuration management for Chordmood

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Server configuration, loaded from a TOML file. Missing fields fall back
/// to defaults, so a partial config is fine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the HTTP server binds to
    pub bind_address: String,

    /// Port the HTTP server listens on
    pub port: u16,

    /// Directory holding `{mood}_chord_model.json` artifacts
    pub models_dir: PathBuf,

    /// Directory holding `{mood}_mappings.json` files
    pub mappings_dir: PathBuf,

    /// Directory where generated progression MIDI files are written
    pub midi_dir: PathBuf,

    /// Directory for cached single-chord MIDI files
    pub chord_cache_dir: PathBuf,

    /// SQLite prediction log path
    pub database_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 5000,
            models_dir: PathBuf::from("models"),
            mappings_dir: PathBuf::from("mappings"),
            midi_dir: PathBuf::from("midi"),
            chord_cache_dir: PathBuf::from("static/midi"),
            database_path: PathBuf::from("predictions.db"),
        }
    }
}

impl Config {
    /// Load config from disk or return default
    pub fn load_or_default(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => return config,
                Err(e) => {
                    log::warn!("Failed to parse config: {}", e);
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                log::warn!("Failed to read config file: {}", e);
            }
        }

        Self::default()
    }
}
