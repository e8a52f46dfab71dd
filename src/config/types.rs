use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Parser used when neither the command line nor any config names one.
pub const DEFAULT_PARSER: &str = "default";

/// Rule id -> rule configuration, in declaration order.
pub type RuleMap = IndexMap<String, RuleEntry>;

/// Free-form nested mapping (`parserOptions`, `settings`).
pub type Mapping = Map<String, Value>;

/// Configuration of a single rule.
///
/// Either a bare severity (`"error"`, `2`) or an array whose first element is
/// the severity and whose remaining elements are rule-specific options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleEntry {
	/// Severity plus options: `["error", "always"]`.
	Configured(Vec<Value>),

	/// Bare severity: `"warn"`, `1`.
	Level(Value),
}

impl RuleEntry {
	/// The severity part of the entry (first element for array form).
	pub fn severity(&self) -> Option<&Value> {
		match self {
			RuleEntry::Configured(items) => items.first(),
			RuleEntry::Level(level) => Some(level),
		}
	}

	/// Mutable access to the severity part of the entry.
	pub fn severity_mut(&mut self) -> Option<&mut Value> {
		match self {
			RuleEntry::Configured(items) => items.first_mut(),
			RuleEntry::Level(level) => Some(level),
		}
	}

	pub(crate) fn to_value(&self) -> Value {
		match self {
			RuleEntry::Configured(items) => Value::Array(items.clone()),
			RuleEntry::Level(level) => level.clone(),
		}
	}

	pub(crate) fn from_value(value: Value) -> Self {
		match value {
			Value::Array(items) => RuleEntry::Configured(items),
			other => RuleEntry::Level(other),
		}
	}
}

impl From<&str> for RuleEntry {
	fn from(severity: &str) -> Self {
		RuleEntry::Level(Value::String(severity.to_string()))
	}
}

impl From<u64> for RuleEntry {
	fn from(severity: u64) -> Self {
		RuleEntry::Level(Value::from(severity))
	}
}

/// One configuration origin: an rc file, the base config, the command line,
/// or the personal config in the home directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSource {
	/// Stop the ancestor search above this source's directory.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub root: Option<bool>,

	#[serde(default, skip_serializing_if = "IndexMap::is_empty")]
	pub rules: RuleMap,

	/// Environment name -> enabled flag.
	#[serde(default, skip_serializing_if = "IndexMap::is_empty")]
	pub env: IndexMap<String, bool>,

	/// Identifier -> writable flag.
	#[serde(default, skip_serializing_if = "IndexMap::is_empty")]
	pub globals: IndexMap<String, bool>,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub parser: Option<String>,

	#[serde(default, skip_serializing_if = "Map::is_empty")]
	pub parser_options: Mapping,

	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub plugins: Vec<String>,

	/// Shared settings handed to every rule.
	#[serde(default, skip_serializing_if = "Map::is_empty")]
	pub settings: Mapping,

	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub overrides: Vec<OverrideBlock>,

	/// Absolute path of the file this source was loaded from. The base
	/// config is tagged with an empty path.
	#[serde(skip)]
	pub file_path: Option<PathBuf>,

	/// Directory that override globs are matched relative to.
	#[serde(skip)]
	pub base_directory: Option<PathBuf>,
}

impl ConfigSource {
	/// Key identifying this source inside a config vector.
	pub fn identity(&self) -> String {
		self.file_path
			.as_ref()
			.map(|p| p.to_string_lossy().into_owned())
			.unwrap_or_default()
	}

	pub fn is_root(&self) -> bool {
		self.root.unwrap_or(false)
	}

	/// Drop the keys that only make sense on a loaded source.
	pub(crate) fn strip_bookkeeping(&mut self) {
		self.file_path = None;
		self.base_directory = None;
		self.overrides.clear();
	}
}

/// Glob-scoped partial configuration nested inside a [`ConfigSource`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideBlock {
	/// Patterns that must all match the file's relative path.
	#[serde(deserialize_with = "one_or_many")]
	pub files: Vec<String>,

	/// Patterns that exclude a file even if `files` matched.
	#[serde(
		default,
		deserialize_with = "one_or_many",
		skip_serializing_if = "Vec::is_empty"
	)]
	pub excluded_files: Vec<String>,

	#[serde(flatten)]
	pub config: ConfigSource,
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum OneOrMany {
		One(String),
		Many(Vec<String>),
	}

	Ok(match OneOrMany::deserialize(deserializer)? {
		OneOrMany::One(pattern) => vec![pattern],
		OneOrMany::Many(patterns) => patterns,
	})
}

/// Fully resolved configuration for one target file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedConfig {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub root: Option<bool>,
	pub parser: String,
	pub env: IndexMap<String, bool>,
	pub globals: IndexMap<String, bool>,
	pub parser_options: Mapping,
	pub plugins: Vec<String>,
	pub rules: RuleMap,
	pub settings: Mapping,
}

impl From<ConfigSource> for ResolvedConfig {
	fn from(source: ConfigSource) -> Self {
		ResolvedConfig {
			root: source.root,
			parser: source
				.parser
				.unwrap_or_else(|| DEFAULT_PARSER.to_string()),
			env: source.env,
			globals: source.globals,
			parser_options: source.parser_options,
			plugins: source.plugins,
			rules: source.rules,
			settings: source.settings,
		}
	}
}
