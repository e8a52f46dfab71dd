use crate::config::cascade::personal_config_dir;
use crate::config::types::{ConfigSource, Mapping, RuleEntry, RuleMap};
use crate::error::{LintrcError, Result};
use serde_json::Value;
use std::path::PathBuf;

/// Settings for one resolution run, typically taken from the command line.
#[derive(Debug, Clone)]
pub struct ResolverOptions {
	/// Working directory; relative paths are resolved against it.
	pub cwd: PathBuf,

	/// Config applied beneath everything else.
	pub base_config: Option<ConfigSource>,

	/// Explicit config file, merged above the rc file hierarchy.
	pub config_file: Option<PathBuf>,

	/// Consult rc files and manifests found on disk.
	pub use_rc_files: bool,

	pub rules: RuleMap,

	/// Environments to enable.
	pub envs: Vec<String>,

	/// Global definitions: `name`, `name:true` or `name:false`.
	pub globals: Vec<String>,

	pub parser: Option<String>,
	pub parser_options: Mapping,
	pub plugins: Vec<String>,

	/// Where the personal config lives. `None` disables the fallback.
	pub personal_config_dir: Option<PathBuf>,
}

impl ResolverOptions {
	pub fn new(cwd: impl Into<PathBuf>) -> Self {
		ResolverOptions {
			cwd: cwd.into(),
			base_config: None,
			config_file: None,
			use_rc_files: true,
			rules: RuleMap::new(),
			envs: Vec::new(),
			globals: Vec::new(),
			parser: None,
			parser_options: Mapping::new(),
			plugins: Vec::new(),
			personal_config_dir: personal_config_dir().ok(),
		}
	}

	pub fn has_rules(&self) -> bool {
		!self.rules.is_empty()
	}

	/// The command line layer. Only non-empty settings are carried so an
	/// absent flag never masks a value from a config file.
	pub fn cli_config(&self) -> ConfigSource {
		ConfigSource {
			rules: self.rules.clone(),
			env: self.envs.iter().map(|name| (name.clone(), true)).collect(),
			globals: self.globals.iter().map(|def| parse_global(def)).collect(),
			parser_options: self.parser_options.clone(),
			plugins: self.plugins.clone(),
			..Default::default()
		}
	}
}

impl Default for ResolverOptions {
	fn default() -> Self {
		let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
		Self::new(cwd)
	}
}

/// Parse a global definition. `name` alone is read-only.
pub fn parse_global(definition: &str) -> (String, bool) {
	match definition.split_once(':') {
		Some((name, flag)) => (name.trim().to_string(), flag.trim() == "true"),
		None => (definition.trim().to_string(), false),
	}
}

fn split_option(option: &str) -> Option<(&str, &str)> {
	let (key, value) = option.split_once('=')?;
	let (key, value) = (key.trim(), value.trim());
	(!key.is_empty() && !value.is_empty()).then_some((key, value))
}

/// Parse a value as JSON, falling back to a plain string.
fn parse_loose_value(value: &str) -> Value {
	serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()))
}

/// Parse `ID=SEVERITY`, where the value is a severity (`error`, `2`) or a
/// JSON array (`["error","always"]`).
pub fn parse_rule_option(option: &str) -> Result<(String, RuleEntry)> {
	let (rule_id, value) = split_option(option).ok_or_else(|| LintrcError::InvalidRuleOption {
		option: option.to_string(),
	})?;
	Ok((rule_id.to_string(), RuleEntry::from_value(parse_loose_value(value))))
}

/// Parse `KEY=VALUE`, where the value is JSON or a plain string.
pub fn parse_parser_option(option: &str) -> Result<(String, Value)> {
	let (key, value) = split_option(option).ok_or_else(|| LintrcError::InvalidParserOption {
		option: option.to_string(),
	})?;
	Ok((key.to_string(), parse_loose_value(value)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_parse_global() {
		assert_eq!(parse_global("foo"), ("foo".to_string(), false));
		assert_eq!(parse_global("foo:true"), ("foo".to_string(), true));
		assert_eq!(parse_global("foo:false"), ("foo".to_string(), false));
		assert_eq!(parse_global("foo:yes"), ("foo".to_string(), false));
	}

	#[test]
	fn test_parse_rule_option() {
		assert_eq!(
			parse_rule_option("semi=error").unwrap(),
			("semi".to_string(), RuleEntry::from("error"))
		);
		assert_eq!(
			parse_rule_option("eqeqeq = 2").unwrap(),
			("eqeqeq".to_string(), RuleEntry::from(2))
		);
		assert_eq!(
			parse_rule_option(r#"quotes=["warn","single"]"#).unwrap(),
			(
				"quotes".to_string(),
				RuleEntry::Configured(vec![json!("warn"), json!("single")])
			)
		);
	}

	#[test]
	fn test_parse_rule_option_rejects_malformed() {
		for bad in ["semi", "=error", "semi="] {
			assert!(matches!(
				parse_rule_option(bad),
				Err(LintrcError::InvalidRuleOption { .. })
			));
		}
	}

	#[test]
	fn test_parse_parser_option() {
		assert_eq!(
			parse_parser_option("ecmaVersion=2020").unwrap(),
			("ecmaVersion".to_string(), json!(2020))
		);
		assert_eq!(
			parse_parser_option("sourceType=module").unwrap(),
			("sourceType".to_string(), json!("module"))
		);
		assert!(parse_parser_option("sourceType").is_err());
	}

	#[test]
	fn test_cli_config_only_carries_supplied_keys() {
		let options = ResolverOptions::new("/proj");
		assert_eq!(options.cli_config(), ConfigSource::default());

		let options = ResolverOptions {
			envs: vec!["node".to_string()],
			globals: vec!["a:true".to_string(), "b".to_string()],
			..ResolverOptions::new("/proj")
		};
		let cli = options.cli_config();
		assert_eq!(cli.env["node"], true);
		assert_eq!(cli.globals["a"], true);
		assert_eq!(cli.globals["b"], false);
		assert!(cli.rules.is_empty());
		assert!(cli.parser.is_none());
	}
}
