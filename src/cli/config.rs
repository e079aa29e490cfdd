//! Config subcommand implementation.
//!
//! Handles `pulsescan config show|path|init`.

use super::load_settings;
use crate::config::{AppSettings, Paths};
use crate::error::{CliError, CliResult};
use crate::output;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Inspect or create the settings file.
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Settings actions.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective settings as JSON
    Show,

    /// Print the settings file location
    Path,

    /// Write the default settings to disk
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

impl ConfigCommand {
    /// Execute the config command. `custom` is the global `--config` path.
    pub fn execute(&self, custom: Option<&Path>) -> CliResult<()> {
        match &self.action {
            ConfigAction::Show => {
                let settings = load_settings(custom)?;
                let json = serde_json::to_string_pretty(&settings)
                    .map_err(|e| CliError::Other(e.to_string()))?;
                println!("{}", json);
                Ok(())
            }
            ConfigAction::Path => {
                println!("{}", settings_path(custom)?.display());
                Ok(())
            }
            ConfigAction::Init { force } => {
                let path = init_settings(custom, *force)?;
                output::print_success(&format!("Wrote default settings to {}", path.display()));
                Ok(())
            }
        }
    }
}

fn settings_path(custom: Option<&Path>) -> CliResult<PathBuf> {
    match custom {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(Paths::discover()?.settings_file()),
    }
}

fn init_settings(custom: Option<&Path>, force: bool) -> CliResult<PathBuf> {
    let path = settings_path(custom)?;
    if path.exists() && !force {
        return Err(CliError::Other(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    let settings = AppSettings::default();
    match custom {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            settings.save_to(path)?;
            Ok(path.to_path_buf())
        }
        None => Ok(settings.save()?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_defaults_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let written = init_settings(Some(&path), false).unwrap();
        assert_eq!(written, path);
        assert_eq!(AppSettings::load_from(&path).unwrap(), AppSettings::default());

        assert!(matches!(
            init_settings(Some(&path), false),
            Err(CliError::Other(_))
        ));
        assert!(init_settings(Some(&path), true).is_ok());
    }

    #[test]
    fn test_custom_path_is_reported() {
        let path = Path::new("/tmp/pulsescan-settings.json");
        assert_eq!(settings_path(Some(path)).unwrap(), path);
    }
}
