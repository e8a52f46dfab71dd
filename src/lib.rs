//! Lintrc - configuration hierarchy resolution for a static-analysis tool.
//!
//! This library provides the core functionality for lintrc, including:
//! - Config file parsing and upward directory discovery
//! - Deep merging of config sources and override blocks
//! - Environment expansion and severity normalization
//! - A per-run cache of loaded, partially merged and resolved configs
//!
//! # Example
//!
//! ```no_run
//! use lintrc_cli::config::normalize;
//! use lintrc_cli::{Resolver, ResolverOptions};
//! use std::path::Path;
//!
//! let cwd = std::env::current_dir().unwrap();
//! let mut resolver = Resolver::new(ResolverOptions::new(&cwd)).unwrap();
//! let resolved = resolver.resolve(Some(Path::new("src/index.js"))).unwrap();
//!
//! let mut rules = resolved.rules.clone();
//! normalize(&mut rules);
//! println!("{} rules active, parser {}", rules.len(), resolved.parser);
//! ```

pub mod config;
pub mod error;
pub mod options;
pub mod resolver;

pub use error::{LintrcError, Result};
pub use options::ResolverOptions;
pub use resolver::{Collaborators, Resolver};

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "LINTRC_LOG";

/// Install the stderr log subscriber. The filter comes from `LINTRC_LOG`,
/// falling back to `warn`, or `debug` when `debug` is set.
pub fn init_tracing(debug: bool) {
	use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

	let default_level = if debug { "lintrc_cli=debug" } else { "warn" };
	let filter =
		EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

	let _ = tracing_subscriber::registry()
		.with(filter)
		.with(
			tracing_subscriber::fmt::layer()
				.with_writer(std::io::stderr)
				.with_target(false)
				.with_thread_ids(false),
		)
		.try_init();
}
