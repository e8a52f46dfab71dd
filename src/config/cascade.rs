use crate::error::{LintrcError, Result};
use std::path::{Component, Path, PathBuf};

/// Config file names recognized in a directory, in precedence order.
/// Only the first one present in a directory counts.
pub const CONFIG_FILENAMES: &[&str] = &[".lintrc.toml", ".lintrc.json", ".lintrc", "package.json"];

/// Locates candidate config files on disk.
pub trait ConfigFinder {
	/// The config file that counts for `directory`, if any.
	fn find_in_directory(&self, directory: &Path) -> Option<PathBuf>;

	/// Config files found walking upward from `directory`, nearest first.
	fn find_in_directory_and_parents(&self, directory: &Path) -> Vec<PathBuf> {
		let mut found = Vec::new();
		let mut current = Some(directory);
		while let Some(dir) = current {
			if let Some(path) = self.find_in_directory(dir) {
				found.push(path);
			}
			current = dir.parent();
		}
		found
	}
}

/// Finds config files by name on the real filesystem.
#[derive(Debug, Clone, Copy)]
pub struct FsConfigFinder {
	filenames: &'static [&'static str],
}

impl FsConfigFinder {
	pub fn new(filenames: &'static [&'static str]) -> Self {
		FsConfigFinder { filenames }
	}
}

impl Default for FsConfigFinder {
	fn default() -> Self {
		Self::new(CONFIG_FILENAMES)
	}
}

impl ConfigFinder for FsConfigFinder {
	fn find_in_directory(&self, directory: &Path) -> Option<PathBuf> {
		self.filenames
			.iter()
			.map(|name| directory.join(name))
			.find(|path| path.is_file())
	}
}

/// Directory holding the personal config (the user's home directory).
pub fn personal_config_dir() -> Result<PathBuf> {
	dirs::home_dir().ok_or(LintrcError::HomeDirectoryNotFound)
}

/// Lexically fold `.` and `..` components out of `path`.
///
/// No filesystem access, so symlinks are not resolved. `..` at the root
/// stays at the root; leading `..` of a relative path are kept.
pub fn normalize_path(path: &Path) -> PathBuf {
	let mut normalized = PathBuf::new();
	for component in path.components() {
		match component {
			Component::CurDir => {}
			Component::ParentDir => match normalized.components().next_back() {
				Some(Component::Normal(_)) => {
					normalized.pop();
				}
				Some(Component::RootDir | Component::Prefix(_)) => {}
				_ => normalized.push(".."),
			},
			other => normalized.push(other),
		}
	}
	normalized
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;

	#[test]
	fn test_find_in_directory_precedence() {
		let temp_dir = tempfile::tempdir().unwrap();
		fs::write(temp_dir.path().join(".lintrc"), "{}").unwrap();
		fs::write(temp_dir.path().join(".lintrc.json"), "{}").unwrap();

		let finder = FsConfigFinder::default();
		assert_eq!(
			finder.find_in_directory(temp_dir.path()),
			Some(temp_dir.path().join(".lintrc.json"))
		);
	}

	#[test]
	fn test_directories_are_not_config_files() {
		let temp_dir = tempfile::tempdir().unwrap();
		fs::create_dir(temp_dir.path().join(".lintrc.toml")).unwrap();
		assert!(
			FsConfigFinder::default()
				.find_in_directory(temp_dir.path())
				.is_none()
		);
	}

	#[test]
	fn test_find_in_parents_nearest_first() {
		let temp_dir = tempfile::tempdir().unwrap();
		let nested = temp_dir.path().join("a").join("b");
		fs::create_dir_all(&nested).unwrap();
		fs::write(temp_dir.path().join(".lintrc.toml"), "").unwrap();
		fs::write(nested.join(".lintrc.json"), "{}").unwrap();

		let found = FsConfigFinder::default().find_in_directory_and_parents(&nested);
		let inside: Vec<_> = found
			.into_iter()
			.filter(|p| p.starts_with(temp_dir.path()))
			.collect();
		assert_eq!(
			inside,
			vec![
				nested.join(".lintrc.json"),
				temp_dir.path().join(".lintrc.toml")
			]
		);
	}

	#[test]
	fn test_custom_filenames() {
		let temp_dir = tempfile::tempdir().unwrap();
		fs::write(temp_dir.path().join("lint.json"), "{}").unwrap();
		let finder = FsConfigFinder::new(&["lint.json"]);
		assert!(finder.find_in_directory(temp_dir.path()).is_some());
	}

	#[test]
	fn test_personal_config_dir() {
		match personal_config_dir() {
			Ok(dir) => assert!(dir.is_absolute()),
			Err(e) => assert!(matches!(e, LintrcError::HomeDirectoryNotFound)),
		}
	}

	#[test]
	fn test_normalize_path() {
		assert_eq!(normalize_path(Path::new("/t/proj/../other/a.js")), PathBuf::from("/t/other/a.js"));
		assert_eq!(normalize_path(Path::new("/t/./proj/./a.js")), PathBuf::from("/t/proj/a.js"));
		assert_eq!(normalize_path(Path::new("/../a")), PathBuf::from("/a"));
		assert_eq!(normalize_path(Path::new("../x/../y")), PathBuf::from("../y"));
		assert_eq!(normalize_path(Path::new("a/b/../../..")), PathBuf::from(".."));
	}
}
