//! Deep merge of configuration sources.
//!
//! `src` always wins conflicts against `target`:
//! - Mappings: every key of `target` is kept, every key of `src` overwrites
//!   or recursively merges.
//! - Sequences: merged position by position; composite elements recurse,
//!   scalar elements are replaced.
//! - `plugins`: combined, so a plugin named twice appears once, in order of
//!   first appearance.
//! - `overrides`: concatenated, target's blocks first.
//! - Rules: an array-form rule carrying options is replaced wholesale;
//!   a bare severity only replaces the severity slot.

use crate::config::types::{ConfigSource, Mapping, RuleEntry, RuleMap};
use indexmap::IndexMap;
use serde_json::Value;
use std::hash::Hash;

/// Keys that are never merged recursively, `src` replaces them outright.
const OPAQUE_KEYS: &[&str] = &["exported", "astGlobals"];

const PLUGINS_KEY: &str = "plugins";
const RULES_KEY: &str = "rules";

impl ConfigSource {
	/// Merge `src` on top of `self`, returning the combined config.
	pub fn merge(&self, src: &ConfigSource) -> ConfigSource {
		ConfigSource {
			root: src.root.or(self.root),
			rules: merge_rules(&self.rules, &src.rules),
			env: merge_flags(&self.env, &src.env),
			globals: merge_flags(&self.globals, &src.globals),
			parser: src.parser.clone().or_else(|| self.parser.clone()),
			parser_options: merge_mappings(&self.parser_options, &src.parser_options, false, false),
			plugins: merge_plugins(&self.plugins, &src.plugins),
			settings: merge_mappings(&self.settings, &src.settings, false, false),
			overrides: self
				.overrides
				.iter()
				.chain(&src.overrides)
				.cloned()
				.collect(),
			file_path: src.file_path.clone().or_else(|| self.file_path.clone()),
			base_directory: src
				.base_directory
				.clone()
				.or_else(|| self.base_directory.clone()),
		}
	}
}

impl RuleEntry {
	/// Merge a rule's configuration from a later source onto an earlier one.
	pub fn merge(target: Option<&RuleEntry>, src: &RuleEntry) -> RuleEntry {
		match (target, src) {
			(None | Some(RuleEntry::Level(_)), RuleEntry::Level(level)) => {
				RuleEntry::Level(level.clone())
			}
			_ => {
				let target = target.map(RuleEntry::to_value);
				let merged = merge_sequences(target.as_ref(), &src.to_value(), false, true);
				RuleEntry::from_value(Value::Array(merged))
			}
		}
	}
}

fn merge_rules(target: &RuleMap, src: &RuleMap) -> RuleMap {
	let mut merged = target.clone();
	for (rule_id, entry) in src {
		let combined = RuleEntry::merge(target.get(rule_id), entry);
		merged.insert(rule_id.clone(), combined);
	}
	merged
}

fn merge_flags<K, V>(target: &IndexMap<K, V>, src: &IndexMap<K, V>) -> IndexMap<K, V>
where
	K: Hash + Eq + Clone,
	V: Clone,
{
	let mut merged = target.clone();
	merged.extend(src.iter().map(|(k, v)| (k.clone(), v.clone())));
	merged
}

fn merge_plugins(target: &[String], src: &[String]) -> Vec<String> {
	let target: Vec<Value> = target.iter().cloned().map(Value::String).collect();
	let src: Vec<Value> = src.iter().cloned().map(Value::String).collect();
	merge_sequences(Some(&Value::Array(target)), &Value::Array(src), true, false)
		.into_iter()
		.filter_map(|v| match v {
			Value::String(name) => Some(name),
			_ => None,
		})
		.collect()
}

/// Deep merge of two free-form values.
pub fn merge_values(target: Option<&Value>, src: &Value, combine: bool, is_rule: bool) -> Value {
	let target_is_array = matches!(target, Some(Value::Array(_)));
	match src {
		Value::Array(_) => Value::Array(merge_sequences(target, src, combine, is_rule)),
		_ if target_is_array => Value::Array(merge_sequences(target, src, combine, is_rule)),
		Value::Object(src_map) => {
			let empty = Mapping::new();
			let target_map = match target {
				Some(Value::Object(map)) => map,
				_ => &empty,
			};
			Value::Object(merge_mappings(target_map, src_map, combine, is_rule))
		}
		scalar => scalar.clone(),
	}
}

/// Merge two mappings key by key.
pub fn merge_mappings(target: &Mapping, src: &Mapping, combine: bool, is_rule: bool) -> Mapping {
	let mut merged = target.clone();
	for (key, value) in src {
		let existing = target.get(key);
		let combined = if value.is_array() || existing.is_some_and(Value::is_array) {
			Value::Array(merge_sequences(existing, value, key == PLUGINS_KEY, is_rule))
		} else if !value.is_object() || OPAQUE_KEYS.contains(&key.as_str()) {
			value.clone()
		} else {
			merge_values(existing, value, combine, key == RULES_KEY)
		};
		merged.insert(key.clone(), combined);
	}
	merged
}

/// Merge two sequences position by position.
///
/// A non-array operand is treated as a one-element sequence. With `is_rule`,
/// a multi-element `src` replaces the target outright. With `combine`, scalar
/// elements are appended only when not already present.
pub fn merge_sequences(
	target: Option<&Value>,
	src: &Value,
	combine: bool,
	is_rule: bool,
) -> Vec<Value> {
	let target_items = as_items(target);
	let src_items = as_items(Some(src));

	let mut merged = if is_rule && src.is_array() && src_items.len() > 1 {
		src_items.clone()
	} else {
		target_items.clone()
	};

	for (i, element) in src_items.into_iter().enumerate() {
		if i >= merged.len() {
			if !(combine && merged.contains(&element)) {
				merged.push(element);
			}
		} else if element.is_object() || element.is_array() {
			merged[i] = if is_rule {
				element
			} else {
				merge_values(target_items.get(i), &element, combine, is_rule)
			};
		} else if !combine {
			merged[i] = element;
		} else if !merged.contains(&element) {
			merged.push(element);
		}
	}

	merged
}

fn as_items(value: Option<&Value>) -> Vec<Value> {
	match value {
		None | Some(Value::Null) => Vec::new(),
		Some(Value::Array(items)) => items.clone(),
		Some(other) => vec![other.clone()],
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::types::OverrideBlock;
	use serde_json::json;

	fn source(value: Value) -> ConfigSource {
		serde_json::from_value(value).unwrap()
	}

	#[test]
	fn test_merge_with_empty_is_identity() {
		let a = source(json!({
			"root": true,
			"rules": { "semi": ["error", "always"], "quotes": 1 },
			"env": { "node": true },
			"globals": { "window": false },
			"parser": "custom",
			"parserOptions": { "ecmaVersion": 2020, "ecmaFeatures": { "jsx": true } },
			"plugins": ["a", "b"],
			"overrides": [{ "files": "*.ts", "rules": { "semi": "off" } }]
		}));
		assert_eq!(a.merge(&ConfigSource::default()), a);
	}

	#[test]
	fn test_disjoint_keys_union_and_scalar_precedence() {
		let a = source(json!({ "globals": { "a": true }, "parser": "one" }));
		let b = source(json!({ "globals": { "b": false }, "parser": "two" }));
		let merged = a.merge(&b);
		assert_eq!(merged.globals["a"], true);
		assert_eq!(merged.globals["b"], false);
		assert_eq!(merged.parser.as_deref(), Some("two"));
	}

	#[test]
	fn test_overrides_are_concatenated() {
		let a = source(json!({ "overrides": [{ "files": "*.ts" }, { "files": "*.tsx" }] }));
		let b = source(json!({ "overrides": [{ "files": "*.md" }] }));
		let merged = a.merge(&b);
		let files: Vec<&Vec<String>> = merged.overrides.iter().map(|o: &OverrideBlock| &o.files).collect();
		assert_eq!(
			files,
			vec![
				&vec!["*.ts".to_string()],
				&vec!["*.tsx".to_string()],
				&vec!["*.md".to_string()]
			]
		);
	}

	#[test]
	fn test_plugins_are_deduplicated() {
		let a = source(json!({ "plugins": ["x"] }));
		let b = source(json!({ "plugins": ["x", "y"] }));
		assert_eq!(a.merge(&b).plugins, vec!["x", "y"]);

		let c = source(json!({ "plugins": ["b", "a"] }));
		assert_eq!(b.merge(&c).plugins, vec!["x", "y", "b", "a"]);
	}

	#[test]
	fn test_rule_with_options_replaces_wholesale() {
		let a = source(json!({ "rules": { "quotes": ["error", "double", { "avoidEscape": true }] } }));
		let b = source(json!({ "rules": { "quotes": ["warn", "single"] } }));
		assert_eq!(
			a.merge(&b).rules["quotes"],
			RuleEntry::Configured(vec![json!("warn"), json!("single")])
		);
	}

	#[test]
	fn test_rule_severity_keeps_existing_options() {
		let a = source(json!({ "rules": { "quotes": ["error", "double"] } }));
		let b = source(json!({ "rules": { "quotes": "warn" } }));
		assert_eq!(
			a.merge(&b).rules["quotes"],
			RuleEntry::Configured(vec![json!("warn"), json!("double")])
		);

		let c = source(json!({ "rules": { "quotes": [0] } }));
		assert_eq!(
			a.merge(&c).rules["quotes"],
			RuleEntry::Configured(vec![json!(0), json!("double")])
		);
	}

	#[test]
	fn test_scalar_rule_replaced_by_scalar() {
		let a = source(json!({ "rules": { "semi": "error", "eqeqeq": 2 } }));
		let b = source(json!({ "rules": { "semi": "off" } }));
		let merged = a.merge(&b);
		assert_eq!(merged.rules["semi"], RuleEntry::from("off"));
		assert_eq!(merged.rules["eqeqeq"], RuleEntry::from(2));
	}

	#[test]
	fn test_parser_options_merge_deeply() {
		let a = source(json!({ "parserOptions": { "ecmaVersion": 5, "ecmaFeatures": { "jsx": true } } }));
		let b = source(json!({ "parserOptions": { "ecmaFeatures": { "globalReturn": true } } }));
		let merged = a.merge(&b);
		assert_eq!(
			Value::Object(merged.parser_options),
			json!({ "ecmaVersion": 5, "ecmaFeatures": { "jsx": true, "globalReturn": true } })
		);
	}

	#[test]
	fn test_opaque_keys_are_replaced() {
		let target = json!({ "exported": { "a": true }, "nested": { "a": true } });
		let src = json!({ "exported": { "b": true }, "nested": { "b": true } });
		let merged = merge_values(Some(&target), &src, false, false);
		assert_eq!(merged["exported"], json!({ "b": true }));
		assert_eq!(merged["nested"], json!({ "a": true, "b": true }));
	}

	#[test]
	fn test_sequences_merge_positionally() {
		let target = json!([1, { "a": 1 }, 3]);
		let src = json!([9, { "b": 2 }]);
		assert_eq!(
			merge_sequences(Some(&target), &src, false, false),
			vec![json!(9), json!({ "a": 1, "b": 2 }), json!(3)]
		);
	}

	#[test]
	fn test_root_only_overridden_when_present() {
		let a = source(json!({ "root": true }));
		assert_eq!(a.merge(&ConfigSource::default()).root, Some(true));
		let b = source(json!({ "root": false }));
		assert_eq!(a.merge(&b).root, Some(false));
	}
}
