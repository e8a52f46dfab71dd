use std::path::PathBuf;

/// Library-level structured errors for lintrc.
///
/// Use `thiserror` for structured errors that library consumers can match on.
/// The CLI binary wraps these with `anyhow` for rich context chains.
#[derive(Debug, thiserror::Error)]
pub enum LintrcError {
	/// No local, personal or command line configuration could be found and
	/// nothing was supplied programmatically either.
	#[error(
		"No configuration found for {directory} (examined: {})",
		display_paths(.files_examined)
	)]
	NoConfigFound {
		directory: PathBuf,
		files_examined: Vec<PathBuf>,
	},

	#[error("Config file not found: {path}")]
	ConfigNotFound { path: PathBuf },

	#[error("Failed to read config file: {path}")]
	ConfigReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse config file: {path}: {message}")]
	ConfigParseError { path: PathBuf, message: String },

	#[error("Invalid glob pattern: {pattern}")]
	InvalidGlob {
		pattern: String,
		#[source]
		source: glob::PatternError,
	},

	#[error("Override pattern must be relative and stay inside its base directory: {pattern}")]
	InvalidOverridePattern { pattern: String },

	#[error("Override blocks cannot set `{key}`")]
	InvalidOverrideKey { key: String },

	#[error("Invalid rule option (expected ID=SEVERITY): {option}")]
	InvalidRuleOption { option: String },

	#[error("Invalid parser option (expected KEY=VALUE): {option}")]
	InvalidParserOption { option: String },

	#[error("Failed to resolve home directory")]
	HomeDirectoryNotFound,
}

fn display_paths(paths: &[PathBuf]) -> String {
	if paths.is_empty() {
		return "none".to_string();
	}
	paths
		.iter()
		.map(|p| p.display().to_string())
		.collect::<Vec<_>>()
		.join(", ")
}

/// Result type alias using LintrcError.
pub type Result<T> = std::result::Result<T, LintrcError>;
