//! `config.txt` loader.
//!
//! The file holds `KEY = VALUE` lines with `#` comments. Two keys are
//! recognised, case-insensitively:
//!
//! ```text
//! DETAILED_LOGGING = true
//! CUSTOM_BROWSER_PATH = "C:\Program Files\Chromium\chrome.exe"
//! ```
//!
//! Loading never fails: a missing file yields defaults, anything unreadable or
//! malformed yields defaults plus a warning for the caller to log.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "config.txt";

/// Options read from the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Write a log file and log browser network traffic.
    pub detailed_logging: bool,
    /// Browser executable to launch instead of the detected one.
    pub custom_browser_path: Option<PathBuf>,
}

/// The config file exists but cannot be read.
#[derive(Debug, Error)]
#[error("could not read config file {}: {source}", path.display())]
pub struct ConfigReadError {
    /// File that failed.
    pub path: PathBuf,
    /// Underlying IO error.
    #[source]
    pub source: io::Error,
}

/// Result of [`load_config`].
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Path that was consulted.
    pub path: PathBuf,
    /// Effective configuration (defaults where the file had nothing usable).
    pub config: FileConfig,
    /// Whether the file existed and was read.
    pub loaded_from_file: bool,
    /// Problems found while reading; each one kept a default.
    pub warnings: Vec<String>,
}

/// Reads the file at `path`; `Ok(None)` when it does not exist.
///
/// # Errors
///
/// Returns [`ConfigReadError`] for any IO failure other than not-found.
pub fn read_config_file(path: &Path) -> Result<Option<String>, ConfigReadError> {
    match fs::read_to_string(path) {
        Ok(raw) => Ok(Some(raw)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ConfigReadError {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Loads the config at `path`, substituting defaults for anything missing or invalid.
#[must_use]
pub fn load_config(path: &Path) -> LoadedConfig {
    let (config, loaded_from_file, warnings) = match read_config_file(path) {
        Ok(Some(raw)) => {
            let (config, warnings) = parse_config_str(&raw);
            (config, true, warnings)
        }
        Ok(None) => (FileConfig::default(), false, Vec::new()),
        Err(error) => (
            FileConfig::default(),
            false,
            vec![format!("{error}; using default settings")],
        ),
    };
    LoadedConfig {
        path: path.to_path_buf(),
        config,
        loaded_from_file,
        warnings,
    }
}

/// Parses config text leniently; every rejected line produces one warning.
#[must_use]
pub fn parse_config_str(raw: &str) -> (FileConfig, Vec<String>) {
    let mut cfg = FileConfig::default();
    let mut warnings = Vec::new();

    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_number = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            warnings.push(format!(
                "config line {line_number}: expected KEY = VALUE, ignoring"
            ));
            continue;
        };
        let key = raw_key.trim().to_ascii_lowercase();
        let value = unquote(raw_value.trim());

        match key.as_str() {
            "detailed_logging" => match parse_boolean(value) {
                Some(parsed) => cfg.detailed_logging = parsed,
                None => warnings.push(format!(
                    "config line {line_number}: DETAILED_LOGGING expects true or false, got '{value}'"
                )),
            },
            "custom_browser_path" => {
                cfg.custom_browser_path = (!value.is_empty()).then(|| PathBuf::from(value));
            }
            _ => warnings.push(format!(
                "config line {line_number}: unknown key '{}', ignoring",
                raw_key.trim()
            )),
        }
    }

    (cfg, warnings)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn unquote(raw_value: &str) -> &str {
    if raw_value.len() >= 2 && raw_value.starts_with('"') && raw_value.ends_with('"') {
        &raw_value[1..raw_value.len() - 1]
    } else {
        raw_value
    }
}

fn parse_boolean(raw_value: &str) -> Option<bool> {
    match raw_value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_config_uppercase_keys() {
        let raw = "DETAILED_LOGGING=true\nCUSTOM_BROWSER_PATH=C:\\Program Files\\Zhanfu\\zhanfu.exe\n";
        let (cfg, warnings) = parse_config_str(raw);
        assert!(warnings.is_empty(), "{warnings:?}");
        assert!(cfg.detailed_logging);
        assert_eq!(
            cfg.custom_browser_path,
            Some(PathBuf::from("C:\\Program Files\\Zhanfu\\zhanfu.exe"))
        );
    }

    #[test]
    fn test_parse_config_quoted_values_and_inline_comments() {
        let raw = r#"
# browser override
custom_browser_path = "/opt/chrome # nightly/chrome"   # keep quoted hash
detailed_logging = FALSE
"#;
        let (cfg, warnings) = parse_config_str(raw);
        assert!(warnings.is_empty(), "{warnings:?}");
        assert!(!cfg.detailed_logging);
        assert_eq!(
            cfg.custom_browser_path,
            Some(PathBuf::from("/opt/chrome # nightly/chrome"))
        );
    }

    #[test]
    fn test_parse_config_malformed_entries_warn_and_keep_defaults() {
        let raw = "DETAILED_LOGGING = maybe\nnot a pair\nTHEME = dark\n";
        let (cfg, warnings) = parse_config_str(raw);
        assert_eq!(cfg, FileConfig::default());
        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].contains("line 1"));
        assert!(warnings[2].contains("THEME"));
    }

    #[test]
    fn test_parse_config_empty_browser_path_is_unset() {
        let (cfg, _) = parse_config_str("CUSTOM_BROWSER_PATH=\n");
        assert_eq!(cfg.custom_browser_path, None);
    }

    #[test]
    fn test_load_config_missing_file_is_silent_default() {
        let temp_dir = TempDir::new().unwrap();
        let loaded = load_config(&temp_dir.path().join(DEFAULT_CONFIG_FILE));
        assert!(!loaded.loaded_from_file);
        assert!(loaded.warnings.is_empty());
        assert_eq!(loaded.config, FileConfig::default());
    }

    #[test]
    fn test_load_config_reads_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, "DETAILED_LOGGING=true\r\n").unwrap();

        let loaded = load_config(&path);
        assert!(loaded.loaded_from_file);
        assert!(loaded.config.detailed_logging);
    }

    #[test]
    fn test_load_config_unreadable_source_warns() {
        let temp_dir = TempDir::new().unwrap();
        // A directory cannot be read as a file.
        let loaded = load_config(temp_dir.path());
        assert!(!loaded.loaded_from_file);
        assert_eq!(loaded.warnings.len(), 1);
        assert!(loaded.warnings[0].contains("using default settings"));
    }
}
