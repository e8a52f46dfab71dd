//! Glob matching of override blocks against target files.

use crate::config::types::{ConfigSource, OverrideBlock};
use crate::error::{LintrcError, Result};
use std::path::{Component, Path};

/// Match options for override patterns.
///
/// `require_literal_separator` is `true` so that `*` only matches within a
/// single path component; `**` is needed for recursive matching.
const OVERRIDE_MATCH_OPTIONS: glob::MatchOptions = glob::MatchOptions {
	case_sensitive: true,
	require_literal_separator: true,
	require_literal_leading_dot: false,
};

/// Decides whether a relative path matches a glob pattern.
pub trait GlobMatcher {
	fn is_match(&self, path: &str, pattern: &str) -> bool;
}

/// `glob`-backed matcher. A pattern without a `/` is also tried against the
/// file's base name.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultGlobMatcher;

impl GlobMatcher for DefaultGlobMatcher {
	fn is_match(&self, path: &str, pattern: &str) -> bool {
		let normalized = pattern.replace('\\', "/");
		let compiled = match glob::Pattern::new(&normalized) {
			Ok(compiled) => compiled,
			Err(e) => {
				tracing::warn!(pattern = %pattern, error = %e, "Ignoring invalid override pattern");
				return false;
			}
		};

		if compiled.matches_with(path, OVERRIDE_MATCH_OPTIONS) {
			return true;
		}

		!normalized.contains('/')
			&& path
				.rsplit('/')
				.next()
				.is_some_and(|base| compiled.matches_with(base, OVERRIDE_MATCH_OPTIONS))
	}
}

/// True when every `files` pattern matches `relative_path` and no
/// `excludedFiles` pattern does.
pub fn override_matches(
	block: &OverrideBlock,
	relative_path: &str,
	matcher: &dyn GlobMatcher,
) -> bool {
	!block.files.is_empty()
		&& block
			.files
			.iter()
			.all(|pattern| matcher.is_match(relative_path, pattern))
		&& !block
			.excluded_files
			.iter()
			.any(|pattern| matcher.is_match(relative_path, pattern))
}

/// Indices of the override blocks in `source` that apply to `relative_path`.
pub fn matching_overrides(
	source: &ConfigSource,
	relative_path: &str,
	matcher: &dyn GlobMatcher,
) -> Vec<usize> {
	source
		.overrides
		.iter()
		.enumerate()
		.filter(|(_, block)| override_matches(block, relative_path, matcher))
		.map(|(i, _)| i)
		.collect()
}

/// Keys a source accepts that have no meaning inside an override block.
const SOURCE_ONLY_KEYS: &[&str] = &["root", "overrides"];

/// Check that every override pattern in `source` compiles and is relative,
/// and that no block sets a source-only key.
pub fn validate_overrides(source: &ConfigSource) -> Result<()> {
	for block in &source.overrides {
		let nested = &block.config;
		for key in SOURCE_ONLY_KEYS {
			let present = match *key {
				"root" => nested.root.is_some(),
				_ => !nested.overrides.is_empty(),
			};
			if present {
				return Err(LintrcError::InvalidOverrideKey {
					key: key.to_string(),
				});
			}
		}
		for pattern in block.files.iter().chain(&block.excluded_files) {
			if Path::new(pattern).is_absolute() || pattern.contains("..") {
				return Err(LintrcError::InvalidOverridePattern {
					pattern: pattern.clone(),
				});
			}
			glob::Pattern::new(pattern).map_err(|source| LintrcError::InvalidGlob {
				pattern: pattern.clone(),
				source,
			})?;
		}
	}
	Ok(())
}

/// `path` relative to `base`, with `/` separators and `..` where `path`
/// lies outside `base`.
pub fn relative_path(path: &Path, base: &Path) -> String {
	let path_parts: Vec<Component> = path.components().collect();
	let base_parts: Vec<Component> = base.components().collect();
	let common = path_parts
		.iter()
		.zip(&base_parts)
		.take_while(|(a, b)| a == b)
		.count();

	let ups = std::iter::repeat_n("..".to_string(), base_parts.len() - common);
	let downs = path_parts[common..]
		.iter()
		.map(|c| c.as_os_str().to_string_lossy().into_owned());
	ups.chain(downs).collect::<Vec<_>>().join("/")
}

#[cfg(test)]
mod tests {
	use super::*;

	fn block(files: &[&str], excluded: &[&str]) -> OverrideBlock {
		OverrideBlock {
			files: files.iter().map(|s| s.to_string()).collect(),
			excluded_files: excluded.iter().map(|s| s.to_string()).collect(),
			config: ConfigSource::default(),
		}
	}

	#[test]
	fn test_single_pattern_matches() {
		let matcher = DefaultGlobMatcher;
		assert!(override_matches(&block(&["src/**/*.ts"], &[]), "src/a/b.ts", &matcher));
		assert!(!override_matches(&block(&["src/*.ts"], &[]), "src/a/b.ts", &matcher));
	}

	#[test]
	fn test_pattern_without_slash_matches_base_name() {
		let matcher = DefaultGlobMatcher;
		assert!(matcher.is_match("deep/nested/file.ts", "*.ts"));
		assert!(!matcher.is_match("deep/nested/file.js", "*.ts"));
		assert!(!matcher.is_match("deep/nested/file.ts", "nested/*.ts"));
	}

	#[test]
	fn test_all_patterns_must_match() {
		let matcher = DefaultGlobMatcher;
		let both = block(&["*.ts", "src/**"], &[]);
		assert!(override_matches(&both, "src/app/main.ts", &matcher));
		assert!(!override_matches(&both, "lib/main.ts", &matcher));
		assert!(!override_matches(&both, "src/app/main.js", &matcher));
	}

	#[test]
	fn test_excluded_files_veto_match() {
		let matcher = DefaultGlobMatcher;
		let with_exclusion = block(&["*.ts"], &["*.d.ts"]);
		assert!(override_matches(&with_exclusion, "src/main.ts", &matcher));
		assert!(!override_matches(&with_exclusion, "src/types.d.ts", &matcher));
	}

	#[test]
	fn test_block_without_patterns_never_matches() {
		assert!(!override_matches(&block(&[], &[]), "a.ts", &DefaultGlobMatcher));
	}

	#[test]
	fn test_matching_overrides_reports_indices() {
		let source = ConfigSource {
			overrides: vec![block(&["*.js"], &[]), block(&["*.ts"], &[]), block(&["src/**"], &[])],
			..Default::default()
		};
		assert_eq!(matching_overrides(&source, "src/a.ts", &DefaultGlobMatcher), vec![1, 2]);
	}

	#[test]
	fn test_validate_rejects_absolute_and_parent_patterns() {
		let absolute = ConfigSource {
			overrides: vec![block(&["/etc/*.ts"], &[])],
			..Default::default()
		};
		assert!(matches!(
			validate_overrides(&absolute),
			Err(LintrcError::InvalidOverridePattern { .. })
		));

		let parent = ConfigSource {
			overrides: vec![block(&["*.ts"], &["../*.ts"])],
			..Default::default()
		};
		assert!(validate_overrides(&parent).is_err());

		let broken = ConfigSource {
			overrides: vec![block(&["[*.ts"], &[])],
			..Default::default()
		};
		assert!(matches!(
			validate_overrides(&broken),
			Err(LintrcError::InvalidGlob { .. })
		));
	}

	#[test]
	fn test_relative_path() {
		assert_eq!(relative_path(Path::new("/proj/src/a.ts"), Path::new("/proj")), "src/a.ts");
		assert_eq!(relative_path(Path::new("/proj/a.ts"), Path::new("/proj/sub")), "../a.ts");
		assert_eq!(relative_path(Path::new("/proj"), Path::new("/proj")), "");
	}

	#[test]
	fn test_validate_rejects_source_only_keys_in_blocks() {
		let mut rooted = block(&["*.ts"], &[]);
		rooted.config.root = Some(true);
		let source = ConfigSource {
			overrides: vec![rooted],
			..Default::default()
		};
		match validate_overrides(&source) {
			Err(LintrcError::InvalidOverrideKey { key }) => assert_eq!(key, "root"),
			other => panic!("Expected InvalidOverrideKey, got {other:?}"),
		}

		let mut nested = block(&["*.ts"], &[]);
		nested.config.overrides.push(block(&["*.d.ts"], &[]));
		let source = ConfigSource {
			overrides: vec![nested],
			..Default::default()
		};
		assert!(matches!(
			validate_overrides(&source),
			Err(LintrcError::InvalidOverrideKey { key }) if key == "overrides"
		));

		let plain = ConfigSource {
			overrides: vec![block(&["*.ts", "src/**"], &["*.d.ts"])],
			..Default::default()
		};
		assert!(validate_overrides(&plain).is_ok());
	}
}
