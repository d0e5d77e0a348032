use std::path::Path;

use anyhow::{bail, Context};
use confique::Config as DeriveConfig;
use sfs::{Coercion, DuplicateKeys, ExportOptions, ParseOptions};

/// Name of the configuration file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "ksv.toml";

#[derive(Debug, DeriveConfig)]
pub struct Config {
    /// Deepest nesting level of the save file to keep. Anything below is left out of the output.
    /// `0` keeps everything.
    #[config(env = "KSV_MAX_DEPTH", default = 0)]
    pub max_depth: usize,

    /// Format the JSON output with indentation and newlines.
    #[config(env = "KSV_PRETTY", default = false)]
    pub pretty: bool,

    /// Infer types for every value (numbers, booleans, vectors) instead of exporting the text
    /// exactly as it appears in the save file. Float values may not re-encode to the same text.
    #[config(env = "KSV_RECURSIVE", default = false)]
    pub recursive: bool,

    /// Keep only the last of several same-name blocks instead of exporting all of them as an
    /// array. This loses data, for example all but one `VESSEL`.
    #[config(env = "KSV_LAST_WINS", default = false)]
    pub last_wins: bool,

    /// Show the full game version, including build number and platform.
    #[config(env = "KSV_FULL_VERSION", default = false)]
    pub full_version: bool,
}

impl Config {
    /// Environment variables override an explicitly given file, which overrides
    /// [`DEFAULT_CONFIG_FILE`].
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Config> {
        let mut builder = Config::builder().env();
        if let Some(path) = explicit {
            if !path.is_file() {
                bail!("configuration file `{}` does not exist", path.display());
            }
            builder = builder.file(path);
        }
        builder
            .file(DEFAULT_CONFIG_FILE)
            .load()
            .context("failed to load configuration")
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            max_depth: Some(self.max_depth),
            coercion: if self.recursive {
                Coercion::Recursive
            } else {
                Coercion::KnownKeys
            },
        }
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            recursive: self.recursive,
            duplicate_keys: if self.last_wins {
                DuplicateKeys::LastWins
            } else {
                DuplicateKeys::Array
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "max_depth = 3\npretty = true\nlast_wins = true\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.max_depth, 3);
        assert!(config.pretty);
        assert_eq!(config.parse_options().max_depth, Some(3));
        assert_eq!(config.export_options().duplicate_keys, DuplicateKeys::LastWins);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("nope.toml"))).is_err());
    }
}
