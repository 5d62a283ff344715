//! Config file reading and write-back.
//!
//! The file is only ever written by the backoff updater. Writes go through a
//! scratch file in the same directory followed by a rename, so a concurrent
//! invocation reads either the old or the new file, never a torn one.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::{ConfigError, Result};

/// File name of the config file in the user's home directory.
const CONFIG_FILE_NAME: &str = ".pulse.toml";

/// The default config file path: `~/.pulse.toml`.
///
/// Falls back to the current directory when no home directory is known.
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_FILE_NAME)
}

/// Parse a config file into its TOML table.
///
/// A missing file is an empty configuration, not an error.
pub fn load_file(path: &Path) -> Result<toml::Table> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(toml::Table::new()),
        Err(err) => return Err(ConfigError::io(path.display().to_string(), err)),
    };

    Ok(toml::from_str(&contents)?)
}

/// Read-modify-write one section of the config file.
///
/// Entries with a value are set, entries with `None` are removed. An empty
/// section is dropped from the file. The replacement is atomic.
pub fn update_section(
    path: &Path,
    section: &str,
    entries: &[(&str, Option<String>)],
) -> Result<()> {
    let mut table = load_file(path)?;

    let section_table = table
        .entry(section.to_string())
        .or_insert_with(|| toml::Value::Table(toml::Table::new()));

    if let toml::Value::Table(section_table) = section_table {
        for (key, value) in entries {
            match value {
                Some(value) => {
                    section_table.insert(key.to_string(), toml::Value::String(value.clone()));
                }
                None => {
                    section_table.remove(*key);
                }
            }
        }
    }

    if let Some(toml::Value::Table(section_table)) = table.get(section) {
        if section_table.is_empty() {
            table.remove(section);
        }
    }

    write_atomic(path, &toml::to_string(&table)?)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let io_err = |err| ConfigError::io(path.display().to_string(), err);

    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(io_err)?;

    let mut scratch = tempfile::NamedTempFile::new_in(parent).map_err(io_err)?;
    scratch.write_all(contents.as_bytes()).map_err(io_err)?;
    scratch
        .persist(path)
        .map_err(|err| ConfigError::io(path.display().to_string(), err.error))?;

    Ok(())
}

#[cfg(test)]
#[path = "file_test.rs"]
mod tests;
