//! Configuration model, loading and merge algebra for lintrc.
//!
//! This module handles:
//! - TOML / JSON config file parsing and directory discovery
//! - Deep merging of config sources
//! - Severity normalization and validation
//! - Override block matching and environment expansion
//! - The per-run resolution cache

pub mod cache;
pub mod cascade;
pub mod environments;
pub mod merge;
pub mod overrides;
pub mod parser;
pub mod plugins;
pub mod severity;
pub mod types;
pub mod vector;

pub use cache::ConfigCache;
pub use cascade::{
	CONFIG_FILENAMES, ConfigFinder, FsConfigFinder, normalize_path, personal_config_dir,
};
pub use environments::{
	Environment, EnvironmentRegistry, Environments, apply_environments, create_environment_config,
};
pub use merge::{merge_mappings, merge_sequences, merge_values};
pub use overrides::{
	DefaultGlobMatcher, GlobMatcher, matching_overrides, override_matches, relative_path,
	validate_overrides,
};
pub use parser::{
	ConfigLoader, FsConfigLoader, load_config_file, parse_config_file, parse_config_str,
};
pub use plugins::{PluginLoader, Plugins};
pub use severity::{
	Severity, is_error_severity, is_every_severity_valid, is_valid_severity, normalize,
	normalize_to_strings,
};
pub use types::{
	ConfigSource, DEFAULT_PARSER, Mapping, OverrideBlock, ResolvedConfig, RuleEntry, RuleMap,
};
pub use vector::{ConfigVector, VectorToken};
