//! Named environments contributing predefined globals and parser options.

use crate::config::types::{ConfigSource, Mapping};
use indexmap::IndexMap;
use serde_json::json;

/// Globals and parser options contributed by one environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
	pub globals: IndexMap<String, bool>,
	pub parser_options: Mapping,
}

impl Environment {
	/// Environment defining the given read-only globals.
	pub fn with_globals(names: &[&str]) -> Self {
		Environment {
			globals: names.iter().map(|name| (name.to_string(), false)).collect(),
			parser_options: Mapping::new(),
		}
	}

	pub fn with_parser_option(mut self, key: &str, value: serde_json::Value) -> Self {
		self.parser_options.insert(key.to_string(), value);
		self
	}
}

/// Lookup of environment definitions by name.
pub trait EnvironmentRegistry {
	fn get(&self, name: &str) -> Option<&Environment>;
}

/// In-memory environment table.
#[derive(Debug, Clone)]
pub struct Environments {
	environments: IndexMap<String, Environment>,
}

impl Environments {
	/// A registry with no environments. [`Default`] gives the built-ins.
	pub fn empty() -> Self {
		Environments {
			environments: IndexMap::new(),
		}
	}

	/// A registry preloaded with the built-in environments.
	pub fn with_builtins() -> Self {
		let mut envs = Self::empty();
		envs.define(
			"builtin",
			Environment::with_globals(&[
				"Array", "Boolean", "Date", "Error", "JSON", "Math", "Number", "Object",
				"RegExp", "String", "undefined", "NaN", "Infinity",
			]),
		);
		envs.define(
			"browser",
			Environment::with_globals(&[
				"window", "document", "navigator", "location", "console", "fetch",
				"localStorage", "setTimeout", "clearTimeout",
			]),
		);
		envs.define(
			"node",
			Environment::with_globals(&[
				"process", "Buffer", "__dirname", "__filename", "require", "module",
				"exports", "global", "console",
			])
			.with_parser_option("ecmaFeatures", json!({ "globalReturn": true })),
		);
		envs.define(
			"commonjs",
			Environment::with_globals(&["require", "module", "exports"])
				.with_parser_option("ecmaFeatures", json!({ "globalReturn": true })),
		);
		envs.define(
			"shared-node-browser",
			Environment::with_globals(&["console", "setTimeout", "clearTimeout"]),
		);
		envs.define(
			"es6",
			Environment::with_globals(&["Map", "Set", "Promise", "Symbol", "WeakMap", "WeakSet", "Proxy", "Reflect"])
				.with_parser_option("ecmaVersion", json!(6)),
		);
		envs.define(
			"es2017",
			Environment::with_globals(&["Map", "Set", "Promise", "Symbol", "SharedArrayBuffer", "Atomics"])
				.with_parser_option("ecmaVersion", json!(8)),
		);
		envs.define(
			"es2020",
			Environment::with_globals(&["BigInt", "globalThis", "Promise", "Map", "Set", "Symbol"])
				.with_parser_option("ecmaVersion", json!(11)),
		);
		envs.define(
			"worker",
			Environment::with_globals(&["self", "postMessage", "importScripts", "onmessage"]),
		);
		envs.define(
			"jest",
			Environment::with_globals(&["describe", "it", "test", "expect", "beforeEach", "afterEach", "jest"]),
		);
		envs.define(
			"mocha",
			Environment::with_globals(&["describe", "it", "before", "after", "beforeEach", "afterEach", "context"]),
		);
		envs
	}

	/// Register (or replace) an environment.
	pub fn define(&mut self, name: &str, environment: Environment) {
		self.environments.insert(name.to_string(), environment);
	}
}

/// The built-in environments; see [`Environments::empty`] for none.
impl Default for Environments {
	fn default() -> Self {
		Self::with_builtins()
	}
}

impl EnvironmentRegistry for Environments {
	fn get(&self, name: &str) -> Option<&Environment> {
		self.environments.get(name)
	}
}

/// Build a config holding the globals and parser options of every enabled
/// environment in `env`.
///
/// Contributions are combined by plain assignment in `env` order, so a later
/// environment overwrites an earlier one's key outright.
pub fn create_environment_config(
	env: &IndexMap<String, bool>,
	registry: &dyn EnvironmentRegistry,
) -> ConfigSource {
	let mut config = ConfigSource {
		env: env.clone(),
		..Default::default()
	};

	for (name, _) in env.iter().filter(|(_, enabled)| **enabled) {
		let Some(environment) = registry.get(name) else {
			tracing::debug!(environment = %name, "Unknown environment, skipping");
			continue;
		};
		config
			.globals
			.extend(environment.globals.iter().map(|(k, v)| (k.clone(), *v)));
		config.parser_options.extend(
			environment
				.parser_options
				.iter()
				.map(|(k, v)| (k.clone(), v.clone())),
		);
	}

	config
}

/// Layer `config` over the defaults contributed by its enabled environments.
pub fn apply_environments(config: ConfigSource, registry: &dyn EnvironmentRegistry) -> ConfigSource {
	if config.env.is_empty() {
		return config;
	}
	create_environment_config(&config.env, registry).merge(&config)
}
