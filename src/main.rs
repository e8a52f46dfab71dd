use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;

use lintrc_cli::config::{
	ConfigLoader, ConfigSource, Mapping, RuleMap, is_every_severity_valid, load_config_file,
	normalize, normalize_path, normalize_to_strings, validate_overrides,
};
use lintrc_cli::options::{parse_parser_option, parse_rule_option};
use lintrc_cli::{Collaborators, LintrcError, Resolver, ResolverOptions, init_tracing};

const INIT_FILENAME: &str = ".lintrc.toml";

#[derive(Parser)]
#[command(name = "lintrc")]
#[command(
	author,
	version,
	about = "Resolve the effective lint configuration for a file"
)]
#[command(arg_required_else_help = true)]
struct Cli {
	#[command(subcommand)]
	command: Option<Commands>,

	/// Create a template .lintrc.toml in the current directory
	#[arg(long)]
	init: bool,

	/// Overwrite existing .lintrc.toml when using --init
	#[arg(long, requires = "init")]
	force: bool,

	/// Log resolution steps to stderr
	#[arg(long, global = true)]
	debug: bool,
}

#[derive(Subcommand)]
enum Commands {
	/// Print the resolved configuration for a file as JSON
	Resolve {
		/// File to resolve for (defaults to the current directory)
		file: Option<PathBuf>,

		/// Print severities as "off" / "warn" / "error"
		#[arg(long)]
		strings: bool,

		#[command(flatten)]
		resolution: ResolutionArgs,
	},
	/// Configuration management commands
	Config {
		#[command(subcommand)]
		action: ConfigAction,
	},
}

#[derive(Subcommand)]
enum ConfigAction {
	/// List the config sources applying to a file, in merge order
	Show {
		file: Option<PathBuf>,

		#[command(flatten)]
		resolution: ResolutionArgs,
	},
	/// Check every config file applying to a file for errors
	Validate {
		file: Option<PathBuf>,

		#[command(flatten)]
		resolution: ResolutionArgs,
	},
}

#[derive(Args, Debug, Default)]
struct ResolutionArgs {
	/// Use this config file in addition to the rc files
	#[arg(short, long, value_name = "PATH")]
	config: Option<PathBuf>,

	/// Ignore rc files and package.json manifests
	#[arg(long)]
	no_rc: bool,

	/// Rule setting, e.g. semi=error or 'quotes=["warn","single"]'
	#[arg(long = "rule", value_name = "ID=SEVERITY")]
	rules: Vec<String>,

	/// Environment to enable
	#[arg(long = "env", value_name = "NAME")]
	envs: Vec<String>,

	/// Global variable, e.g. jQuery or jQuery:true
	#[arg(long = "global", value_name = "NAME[:true]")]
	globals: Vec<String>,

	/// Parser to use
	#[arg(long, value_name = "NAME")]
	parser: Option<String>,

	/// Parser option, e.g. ecmaVersion=2020
	#[arg(long = "parser-option", value_name = "KEY=VALUE")]
	parser_options: Vec<String>,

	/// Plugin to load
	#[arg(long = "plugin", value_name = "NAME")]
	plugins: Vec<String>,
}

impl ResolutionArgs {
	fn to_options(&self, cwd: &Path) -> Result<ResolverOptions> {
		let mut rules = RuleMap::new();
		for option in &self.rules {
			let (rule_id, entry) = parse_rule_option(option)?;
			rules.insert(rule_id, entry);
		}

		let mut parser_options = Mapping::new();
		for option in &self.parser_options {
			let (key, value) = parse_parser_option(option)?;
			parser_options.insert(key, value);
		}

		Ok(ResolverOptions {
			config_file: self.config.clone(),
			use_rc_files: !self.no_rc,
			rules,
			envs: self.envs.clone(),
			globals: self.globals.clone(),
			parser: self.parser.clone(),
			parser_options,
			plugins: self.plugins.clone(),
			..ResolverOptions::new(cwd)
		})
	}
}

fn main() -> ExitCode {
	match run() {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

fn run() -> Result<ExitCode> {
	let cli = Cli::parse();
	init_tracing(cli.debug);

	// Handle --init
	if cli.init {
		return handle_init(cli.force);
	}

	// Handle subcommands
	if let Some(command) = cli.command {
		let cwd = std::env::current_dir().context("Failed to get current directory")?;
		return match command {
			Commands::Resolve {
				file,
				strings,
				resolution,
			} => handle_resolve(&cwd, file.as_deref(), strings, &resolution),
			Commands::Config { action } => match action {
				ConfigAction::Show { file, resolution } => {
					handle_config_show(&cwd, file.as_deref(), &resolution)
				}
				ConfigAction::Validate { file, resolution } => {
					handle_config_validate(&cwd, file.as_deref(), &resolution)
				}
			},
		};
	}

	// No command specified - this shouldn't happen due to arg_required_else_help
	Ok(ExitCode::SUCCESS)
}

fn handle_init(force: bool) -> Result<ExitCode> {
	let config_path = PathBuf::from(INIT_FILENAME);

	if config_path.exists() && !force {
		anyhow::bail!("{INIT_FILENAME} already exists. Use --force to overwrite.");
	}

	std::fs::write(&config_path, generate_init_template())
		.with_context(|| format!("Failed to write {}", config_path.display()))?;

	println!("Created {INIT_FILENAME}");
	Ok(ExitCode::SUCCESS)
}

fn generate_init_template() -> &'static str {
	r#"# lintrc configuration
# Files in subdirectories are merged on top of this one.
root = true

[env]
es6 = true

[parserOptions]
ecmaVersion = 2020
sourceType = "module"

[rules]
# Severities: "off" (0), "warn" (1), "error" (2).
# Options follow the severity: quotes = ["error", "single"]
no-undefined = "error"
semi = "warn"

# Settings for files matching every pattern in `files`.
# [[overrides]]
# files = ["*.test.js"]
# env = { jest = true }
# rules = { no-undefined = "off" }
"#
}

fn handle_resolve(
	cwd: &Path,
	file: Option<&Path>,
	strings: bool,
	resolution: &ResolutionArgs,
) -> Result<ExitCode> {
	let mut resolver = Resolver::new(resolution.to_options(cwd)?)?;
	let resolved = resolver.resolve(file).with_context(|| match file {
		Some(file) => format!("Failed to resolve configuration for {}", file.display()),
		None => "Failed to resolve configuration".to_string(),
	})?;

	let mut resolved = (*resolved).clone();
	if strings {
		normalize_to_strings(&mut resolved.rules);
	} else {
		normalize(&mut resolved.rules);
	}

	let json = serde_json::to_string_pretty(&resolved).context("Failed to serialize configuration")?;
	println!("{json}");
	Ok(ExitCode::SUCCESS)
}

fn handle_config_show(cwd: &Path, file: Option<&Path>, resolution: &ResolutionArgs) -> Result<ExitCode> {
	let mut resolver = Resolver::new(resolution.to_options(cwd)?)?;
	let directory = target_directory(cwd, file);
	let hierarchy = resolver
		.get_config_hierarchy(&directory)
		.context("Failed to build config hierarchy")?;

	println!("Configuration sources (in merge order):\n");

	for source in &hierarchy {
		match &source.file_path {
			Some(path) if !path.as_os_str().is_empty() => println!("# Source: {}", path.display()),
			_ => println!("# Source: <base>"),
		}
		println!("# root: {}", source.is_root());
		println!("# rules: {}", source.rules.len());
		println!("# overrides: {}", source.overrides.len());
		println!();
	}

	let vector = resolver
		.get_config_vector(file)
		.context("Failed to build config vector")?;
	println!("Config vector: {vector}");

	Ok(ExitCode::SUCCESS)
}

fn handle_config_validate(
	cwd: &Path,
	file: Option<&Path>,
	resolution: &ResolutionArgs,
) -> Result<ExitCode> {
	let directory = target_directory(cwd, file);
	let loader = StrictLoader::default();
	let failures = Rc::clone(&loader.failures);
	let collaborators = Collaborators {
		loader: Box::new(loader),
		..Default::default()
	};

	let hierarchy = Resolver::with_collaborators(resolution.to_options(cwd)?, collaborators)
		.and_then(|mut resolver| resolver.get_config_hierarchy(&directory));
	let sources = match hierarchy {
		Ok(sources) => sources,
		// Broken files are dropped from the walk, which can leave nothing.
		Err(_) if !failures.borrow().is_empty() => Vec::new(),
		Err(LintrcError::NoConfigFound { .. }) => Vec::new(),
		Err(e) => return Err(e).context("Failed to build config hierarchy"),
	};

	let mut invalid = 0;
	for (path, e) in failures.borrow().iter() {
		eprintln!("Configuration error: {}: {e}", path.display());
		invalid += 1;
	}

	let mut checked = 0;
	for source in &sources {
		let Some(path) = source.file_path.as_deref().filter(|p| !p.as_os_str().is_empty()) else {
			continue;
		};
		checked += 1;
		match check_source(path, source) {
			Ok(()) => println!("  {} ({} rules)", path.display(), source.rules.len()),
			Err(e) => {
				eprintln!("Configuration error: {e:#}");
				invalid += 1;
			}
		}
	}

	if invalid > 0 {
		eprintln!("{invalid} invalid configuration file(s)");
		return Ok(ExitCode::FAILURE);
	}

	if checked == 0 {
		println!("No configuration files found.");
		return Ok(ExitCode::SUCCESS);
	}

	println!("All configuration files are valid.");
	Ok(ExitCode::SUCCESS)
}

/// Loader that parses strictly and keeps every failure for reporting.
#[derive(Default)]
struct StrictLoader {
	failures: Rc<RefCell<Vec<(PathBuf, LintrcError)>>>,
}

impl ConfigLoader for StrictLoader {
	fn load(&self, path: &Path) -> Option<ConfigSource> {
		match load_config_file(path) {
			Ok(config) => config,
			Err(e) => {
				self.failures.borrow_mut().push((path.to_path_buf(), e));
				None
			}
		}
	}
}

/// Check the severities and override blocks of one loaded source.
fn check_source(path: &Path, source: &ConfigSource) -> Result<()> {
	check_severities(path, source)?;
	for block in &source.overrides {
		check_severities(path, &block.config)?;
	}
	validate_overrides(source).with_context(|| format!("In {}", path.display()))?;
	Ok(())
}

fn check_severities(path: &Path, source: &ConfigSource) -> Result<()> {
	if !is_every_severity_valid(&source.rules) {
		anyhow::bail!("Invalid rule severity in {}", path.display());
	}
	Ok(())
}

fn target_directory(cwd: &Path, file: Option<&Path>) -> PathBuf {
	match file {
		Some(file) => normalize_path(&cwd.join(file))
			.parent()
			.map(Path::to_path_buf)
			.unwrap_or_else(|| cwd.to_path_buf()),
		None => cwd.to_path_buf(),
	}
}
