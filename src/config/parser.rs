use crate::config::types::ConfigSource;
use crate::error::{LintrcError, Result};
use std::path::Path;

/// Key holding the configuration inside a `package.json` manifest.
pub const MANIFEST_CONFIG_KEY: &str = "lintConfig";

/// Parse a config file from the given path.
///
/// Returns `Ok(None)` when the file holds no configuration (empty file, or a
/// manifest without a config key).
pub fn parse_config_file(path: &Path) -> Result<Option<ConfigSource>> {
	let content = std::fs::read_to_string(path).map_err(|source| LintrcError::ConfigReadError {
		path: path.to_path_buf(),
		source,
	})?;

	parse_config_str(&content, path)
}

/// Parse a config from a string (useful for testing).
///
/// The format is chosen from the file name: `*.toml` is TOML, `package.json`
/// is a manifest, anything else is JSON.
pub fn parse_config_str(content: &str, path: &Path) -> Result<Option<ConfigSource>> {
	if content.trim().is_empty() {
		return Ok(None);
	}

	let parse_error = |message: String| LintrcError::ConfigParseError {
		path: path.to_path_buf(),
		message,
	};

	let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();

	if file_name.ends_with(".toml") {
		let config: ConfigSource = toml::from_str(content).map_err(|e| parse_error(e.to_string()))?;
		return Ok(Some(config));
	}

	if file_name == "package.json" {
		let mut manifest: serde_json::Value =
			serde_json::from_str(content).map_err(|e| parse_error(e.to_string()))?;
		let Some(section) = manifest.get_mut(MANIFEST_CONFIG_KEY).map(serde_json::Value::take) else {
			return Ok(None);
		};
		let config: ConfigSource =
			serde_json::from_value(section).map_err(|e| parse_error(e.to_string()))?;
		return Ok(Some(config));
	}

	let config: ConfigSource = serde_json::from_str(content).map_err(|e| parse_error(e.to_string()))?;
	Ok(Some(config))
}

/// Loads a config source from a path.
///
/// Implementations collapse unreadable or malformed files to `None`.
/// Parse a config file strictly and tag it with its path and directory.
pub fn load_config_file(path: &Path) -> Result<Option<ConfigSource>> {
	Ok(parse_config_file(path)?.map(|mut config| {
		config.file_path = Some(path.to_path_buf());
		config.base_directory = path.parent().map(Path::to_path_buf);
		config
	}))
}

pub trait ConfigLoader {
	fn load(&self, path: &Path) -> Option<ConfigSource>;
}

/// Loads config files from disk, tagging each with its path and directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsConfigLoader;

impl ConfigLoader for FsConfigLoader {
	fn load(&self, path: &Path) -> Option<ConfigSource> {
		match load_config_file(path) {
			Ok(config) => config,
			Err(e) => {
				tracing::warn!(path = %path.display(), error = %e, "Ignoring unusable config file");
				None
			}
		}
	}
}
