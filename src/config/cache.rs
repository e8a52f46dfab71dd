//! Per-run cache of loaded sources, directory hierarchies and merge results.

use crate::config::types::{ConfigSource, ResolvedConfig};
use crate::config::vector::{ConfigVector, VectorToken, vector_key};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Four independent tables:
/// - shallow sources by identity key (file path, empty for the base),
/// - local config hierarchies by directory,
/// - partial (filesystem only) merges by vector prefix,
/// - final merges by full vector.
///
/// Entries live until [`ConfigCache::init`] is called. There is no eviction.
#[derive(Debug, Default)]
pub struct ConfigCache {
	configs: HashMap<String, Arc<ConfigSource>>,
	hierarchies: HashMap<PathBuf, Vec<Arc<ConfigSource>>>,
	partial_merges: HashMap<String, Arc<ConfigSource>>,
	final_merges: HashMap<String, Arc<ResolvedConfig>>,
}

impl ConfigCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// Clear all four tables.
	pub fn init(&mut self) {
		self.configs.clear();
		self.hierarchies.clear();
		self.partial_merges.clear();
		self.final_merges.clear();
	}

	pub fn get_config(&self, identity: &str) -> Option<Arc<ConfigSource>> {
		self.configs.get(identity).cloned()
	}

	pub fn set_config(&mut self, identity: impl Into<String>, config: Arc<ConfigSource>) {
		self.configs.insert(identity.into(), config);
	}

	pub fn get_hierarchy_local_configs(&self, directory: &Path) -> Option<Vec<Arc<ConfigSource>>> {
		self.hierarchies.get(directory).cloned()
	}

	/// Record the hierarchy of every walked directory at once.
	///
	/// `directories` is nearest-first and `configs` root-first; directory `i`
	/// gets `configs[..configs.len() - i]`, i.e. everything from its own
	/// contribution up to the root.
	pub fn set_hierarchy_local_configs(
		&mut self,
		directories: &[PathBuf],
		configs: &[Arc<ConfigSource>],
	) {
		for (i, directory) in directories.iter().enumerate() {
			let Some(end) = configs.len().checked_sub(i) else {
				break;
			};
			self.hierarchies
				.insert(directory.clone(), configs[..end].to_vec());
		}
	}

	pub fn get_merged_config(&self, tokens: &[VectorToken]) -> Option<Arc<ConfigSource>> {
		self.partial_merges.get(&vector_key(tokens)).cloned()
	}

	pub fn set_merged_config(&mut self, tokens: &[VectorToken], config: Arc<ConfigSource>) {
		self.partial_merges.insert(vector_key(tokens), config);
	}

	pub fn get_merged_vector_config(&self, vector: &ConfigVector) -> Option<Arc<ResolvedConfig>> {
		self.final_merges.get(&vector.key()).cloned()
	}

	pub fn set_merged_vector_config(&mut self, vector: &ConfigVector, config: Arc<ResolvedConfig>) {
		self.final_merges.insert(vector.key(), config);
	}
}
