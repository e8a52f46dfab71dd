//! Rule severities: `off`/`warn`/`error` in text, `0`/`1`/`2` as numbers.

use crate::config::types::{RuleEntry, RuleMap};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
	Off = 0,
	Warn = 1,
	Error = 2,
}

impl Severity {
	/// Parse the textual form, case-insensitively.
	pub fn from_name(name: &str) -> Option<Self> {
		match name.to_ascii_lowercase().as_str() {
			"off" => Some(Severity::Off),
			"warn" => Some(Severity::Warn),
			"error" => Some(Severity::Error),
			_ => None,
		}
	}

	/// Parse the numeric form. Floats count when they are exactly `0`, `1`
	/// or `2` (TOML `2.0`).
	pub fn from_number(number: &serde_json::Number) -> Option<Self> {
		let level = match number.as_u64() {
			Some(level) => level,
			None => {
				let float = number.as_f64()?;
				if float.fract() != 0.0 || !(0.0..=2.0).contains(&float) {
					return None;
				}
				float as u64
			}
		};
		match level {
			0 => Some(Severity::Off),
			1 => Some(Severity::Warn),
			2 => Some(Severity::Error),
			_ => None,
		}
	}

	/// Parse either representation.
	pub fn from_value(value: &Value) -> Option<Self> {
		match value {
			Value::String(name) => Self::from_name(name),
			Value::Number(number) => Self::from_number(number),
			_ => None,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Severity::Off => "off",
			Severity::Warn => "warn",
			Severity::Error => "error",
		}
	}

	pub fn as_number(self) -> u64 {
		self as u64
	}
}

/// Rewrite textual severities to their numeric form in place.
///
/// Unrecognized text becomes `0`. Numbers are left as they are.
pub fn normalize(rules: &mut RuleMap) {
	for entry in rules.values_mut() {
		let Some(severity) = entry.severity_mut() else {
			continue;
		};
		let level = match &*severity {
			Value::String(name) => Severity::from_name(name).unwrap_or(Severity::Off),
			_ => continue,
		};
		*severity = Value::from(level.as_number());
	}
}

/// Rewrite numeric severities to their textual form in place.
///
/// Unrecognized numbers become `"off"`. Text is left as it is.
pub fn normalize_to_strings(rules: &mut RuleMap) {
	for entry in rules.values_mut() {
		let Some(severity) = entry.severity_mut() else {
			continue;
		};
		let level = match &*severity {
			Value::Number(number) => Severity::from_number(number).unwrap_or(Severity::Off),
			_ => continue,
		};
		*severity = Value::String(level.as_str().to_string());
	}
}

/// True when the rule is configured at error level.
pub fn is_error_severity(entry: &RuleEntry) -> bool {
	match entry.severity() {
		Some(Value::String(name)) => Severity::from_name(name) == Some(Severity::Error),
		Some(Value::Number(number)) => Severity::from_number(number) == Some(Severity::Error),
		_ => false,
	}
}

/// True when the severity is one of `0`, `1`, `2`, `"off"`, `"warn"`, `"error"`.
pub fn is_valid_severity(entry: &RuleEntry) -> bool {
	entry.severity().and_then(Severity::from_value).is_some()
}

/// True when every rule in the map carries a valid severity.
pub fn is_every_severity_valid(rules: &RuleMap) -> bool {
	rules.values().all(is_valid_severity)
}
