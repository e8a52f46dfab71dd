//! Resolution of the effective configuration for a target file.
//!
//! For each file the resolver:
//! 1. Builds the config hierarchy: the base config, the rc files found
//!    walking up from the file's directory (stopping at a `root: true`
//!    source), then any config file given on the command line.
//! 2. Turns it into a [`ConfigVector`]: each source's identity followed by
//!    the indices of its override blocks that match the file.
//! 3. Folds the vector into one config, reusing the longest cached prefix.
//! 4. Layers the command line settings on top, pins the parser and expands
//!    environments.

use crate::config::cache::ConfigCache;
use crate::config::cascade::{ConfigFinder, FsConfigFinder, normalize_path};
use crate::config::environments::{EnvironmentRegistry, Environments, apply_environments};
use crate::config::overrides::{DefaultGlobMatcher, GlobMatcher, matching_overrides, relative_path};
use crate::config::parser::{ConfigLoader, FsConfigLoader};
use crate::config::plugins::{PluginLoader, Plugins};
use crate::config::types::{ConfigSource, DEFAULT_PARSER, ResolvedConfig};
use crate::config::vector::{ConfigVector, VectorToken};
use crate::error::{LintrcError, Result};
use crate::options::ResolverOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace};

/// External capabilities the resolver relies on.
pub struct Collaborators {
	pub finder: Box<dyn ConfigFinder>,
	pub loader: Box<dyn ConfigLoader>,
	pub environments: Box<dyn EnvironmentRegistry>,
	pub plugins: Box<dyn PluginLoader>,
	pub matcher: Box<dyn GlobMatcher>,
}

impl Default for Collaborators {
	fn default() -> Self {
		Collaborators {
			finder: Box::new(FsConfigFinder::default()),
			loader: Box::new(FsConfigLoader),
			environments: Box::new(Environments::default()),
			plugins: Box::new(Plugins::new()),
			matcher: Box::new(DefaultGlobMatcher),
		}
	}
}

/// Resolves configurations for the files of one run.
pub struct Resolver {
	options: ResolverOptions,
	base_config: Arc<ConfigSource>,
	cli_config: ConfigSource,
	specific_config: Option<Arc<ConfigSource>>,
	personal_config: Option<Option<Arc<ConfigSource>>>,
	cache: ConfigCache,
	collaborators: Collaborators,
}

impl Resolver {
	/// Create a resolver backed by the filesystem.
	pub fn new(options: ResolverOptions) -> Result<Self> {
		Self::with_collaborators(options, Collaborators::default())
	}

	pub fn with_collaborators(mut options: ResolverOptions, mut collaborators: Collaborators) -> Result<Self> {
		options.cwd = normalize_path(&options.cwd);
		options.personal_config_dir = options
			.personal_config_dir
			.as_deref()
			.map(|dir| normalize_path(&options.cwd.join(dir)));

		let mut base = match &options.base_config {
			Some(provided) => {
				collaborators.plugins.load_all(&provided.plugins);
				ConfigSource::default().merge(provided)
			}
			None => ConfigSource::default(),
		};
		base.file_path = Some(PathBuf::new());
		base.base_directory = Some(options.cwd.clone());
		let base_config = Arc::new(base);

		let mut cache = ConfigCache::new();
		cache.init();
		cache.set_config(base_config.identity(), Arc::clone(&base_config));

		let cli_config = options.cli_config();

		let mut resolver = Resolver {
			options,
			base_config,
			cli_config,
			specific_config: None,
			personal_config: None,
			cache,
			collaborators,
		};

		if let Some(config_file) = resolver.options.config_file.clone() {
			let path = resolver.absolute(&config_file);
			debug!(path = %path.display(), "Using command line config");
			let config = resolver
				.load_config(&path)
				.ok_or(LintrcError::ConfigNotFound { path })?;
			resolver.specific_config = Some(config);
		}

		Ok(resolver)
	}

	pub fn options(&self) -> &ResolverOptions {
		&self.options
	}

	/// Resolve the configuration for `file_path`, or for the working
	/// directory itself when no file is given.
	pub fn resolve(&mut self, file_path: Option<&Path>) -> Result<Arc<ResolvedConfig>> {
		let vector = self.get_config_vector(file_path)?;

		if let Some(cached) = self.cache.get_merged_vector_config(&vector) {
			trace!(vector = %vector, "Using cached resolved config");
			return Ok(cached);
		}

		let mut config = self.get_config_from_vector(&vector)?.merge(&self.cli_config);

		if !self.cli_config.plugins.is_empty() {
			self.collaborators.plugins.load_all(&self.cli_config.plugins);
		}

		if self.options.parser.is_some() || config.parser.is_none() {
			let parser = self
				.options
				.parser
				.clone()
				.unwrap_or_else(|| DEFAULT_PARSER.to_string());
			config = config.merge(&ConfigSource {
				parser: Some(parser),
				..Default::default()
			});
		}

		let config = apply_environments(config, self.collaborators.environments.as_ref());
		let resolved = Arc::new(ResolvedConfig::from(config));
		self.cache.set_merged_vector_config(&vector, Arc::clone(&resolved));
		Ok(resolved)
	}

	/// Sources applying to files in `directory`, lowest precedence first.
	pub fn get_config_hierarchy(&mut self, directory: &Path) -> Result<Vec<Arc<ConfigSource>>> {
		debug!(directory = %directory.display(), "Constructing config hierarchy");

		let mut configs = vec![Arc::clone(&self.base_config)];

		if self.options.use_rc_files {
			configs.extend(self.get_local_config_hierarchy(directory)?);
		} else {
			debug!("Not using rc files");
		}

		if let Some(specific) = &self.specific_config {
			configs.push(Arc::clone(specific));
		}

		Ok(configs)
	}

	/// Sources found on disk for `directory`, farthest first.
	pub fn get_local_config_hierarchy(&mut self, directory: &Path) -> Result<Vec<Arc<ConfigSource>>> {
		let directory = self.absolute(directory);
		let local_files = self
			.collaborators
			.finder
			.find_in_directory_and_parents(&directory);
		let project_config = self.collaborators.finder.find_in_directory(&self.options.cwd);

		let mut searched: Vec<PathBuf> = Vec::new();
		let mut configs: Vec<Arc<ConfigSource>> = Vec::new();
		let mut root_dir: Option<PathBuf> = None;

		for file in &local_files {
			let Some(config_dir) = file.parent() else {
				continue;
			};

			if let Some(root) = &root_dir
				&& !config_dir.starts_with(root)
			{
				trace!(path = %file.display(), "Skipping config above root");
				continue;
			}

			if let Some(cached) = self.cache.get_hierarchy_local_configs(config_dir) {
				trace!(directory = %config_dir.display(), "Using cached hierarchy");
				configs.reverse();
				let hierarchy: Vec<_> = cached.into_iter().chain(configs).collect();
				self.cache.set_hierarchy_local_configs(&searched, &hierarchy);
				return Ok(hierarchy);
			}

			if self.options.personal_config_dir.as_deref() == Some(config_dir)
				&& project_config.as_deref() != Some(file.as_path())
			{
				trace!(path = %file.display(), "Skipping personal config found while walking");
				continue;
			}

			debug!(path = %file.display(), "Loading config");
			let Some(config) = self.load_config(file) else {
				debug!(path = %file.display(), "Skipping empty config");
				continue;
			};

			debug!(path = %file.display(), "Using config");
			if config.is_root() && root_dir.is_none() {
				root_dir = Some(config_dir.to_path_buf());
			}
			configs.push(config);
			searched.push(config_dir.to_path_buf());
		}

		configs.reverse();

		if configs.is_empty() && self.specific_config.is_none() {
			if let Some(personal) = self.personal_config() {
				debug!("Using personal config");
				configs.push(personal);
			} else if !self.options.has_rules() && self.options.base_config.is_none() {
				return Err(LintrcError::NoConfigFound {
					directory,
					files_examined: local_files,
				});
			}
		}

		self.cache.set_hierarchy_local_configs(&searched, &configs);
		Ok(configs)
	}

	/// The vector identifying which sources and override blocks apply.
	pub fn get_config_vector(&mut self, file_path: Option<&Path>) -> Result<ConfigVector> {
		let target = match file_path {
			Some(path) => self.absolute(path),
			None => self.options.cwd.clone(),
		};
		let directory = match file_path {
			Some(_) => target
				.parent()
				.map(Path::to_path_buf)
				.unwrap_or_else(|| self.options.cwd.clone()),
			None => target.clone(),
		};

		let hierarchy = self.get_config_hierarchy(&directory)?;

		let mut vector = ConfigVector::new();
		for config in &hierarchy {
			vector.push_source(config.identity());
			if config.overrides.is_empty() {
				continue;
			}
			let base = config
				.base_directory
				.as_deref()
				.unwrap_or(self.options.cwd.as_path());
			let relative = relative_path(&target, base);
			for index in matching_overrides(config, &relative, self.collaborators.matcher.as_ref()) {
				vector.push_override(index);
			}
		}

		trace!(vector = %vector, "Built config vector");
		Ok(vector)
	}

	/// Fold the sources named by `vector` into one config, reusing the
	/// longest cached prefix and caching every new prefix.
	pub fn get_config_from_vector(&mut self, vector: &ConfigVector) -> Result<ConfigSource> {
		let tokens = vector.tokens();

		let mut consumed = tokens.len();
		let mut partial = None;
		while consumed > 0 {
			if let Some(hit) = self.cache.get_merged_config(&tokens[..consumed]) {
				partial = Some(hit);
				break;
			}
			consumed -= 1;
		}

		let mut current_source = None;
		if let Some(VectorToken::Override(_)) = tokens.get(consumed) {
			let owner = tokens[..consumed].iter().rev().find_map(|token| match token {
				VectorToken::Source(identity) => Some(identity.clone()),
				VectorToken::Override(_) => None,
			});
			if let Some(identity) = owner {
				current_source = Some(self.source_for(&identity)?);
			}
		}

		if consumed > 0 {
			debug!(reused = consumed, total = tokens.len(), "Using config from partial cache");
		}

		let mut config = partial.map(|c| (*c).clone()).unwrap_or_default();

		for (i, token) in tokens.iter().enumerate().skip(consumed) {
			match token {
				VectorToken::Source(identity) => {
					let source = self.source_for(identity)?;
					config = config.merge(&source);
					current_source = Some(source);
				}
				VectorToken::Override(index) => {
					if let Some(block) = current_source
						.as_ref()
						.and_then(|source| source.overrides.get(*index))
					{
						// `root` only means something on a whole source.
						config = config.merge(&ConfigSource {
							root: None,
							..block.config.clone()
						});
					}
				}
			}
			config.strip_bookkeeping();
			self.cache
				.set_merged_config(&tokens[..=i], Arc::new(config.clone()));
		}

		Ok(config)
	}

	fn source_for(&mut self, identity: &str) -> Result<Arc<ConfigSource>> {
		if let Some(config) = self.cache.get_config(identity) {
			return Ok(config);
		}
		let path = PathBuf::from(identity);
		self.load_config(&path)
			.ok_or(LintrcError::ConfigNotFound { path })
	}

	fn load_config(&mut self, path: &Path) -> Option<Arc<ConfigSource>> {
		let identity = path.to_string_lossy();
		if let Some(config) = self.cache.get_config(&identity) {
			return Some(config);
		}
		let config = Arc::new(self.collaborators.loader.load(path)?);
		self.collaborators.plugins.load_all(&config.plugins);
		self.cache.set_config(config.identity(), Arc::clone(&config));
		Some(config)
	}

	fn personal_config(&mut self) -> Option<Arc<ConfigSource>> {
		if let Some(memo) = &self.personal_config {
			return memo.clone();
		}
		let config = self
			.options
			.personal_config_dir
			.clone()
			.and_then(|dir| self.collaborators.finder.find_in_directory(&dir))
			.and_then(|file| self.load_config(&file));
		self.personal_config = Some(config.clone());
		config
	}

	/// `path` resolved against the working directory, with `.` and `..`
	/// folded so every file has a single identity.
	fn absolute(&self, path: &Path) -> PathBuf {
		normalize_path(&self.options.cwd.join(path))
	}
}
