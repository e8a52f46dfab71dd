/// Registers plugins named by configs.
pub trait PluginLoader {
	fn load_all(&mut self, names: &[String]);
}

/// Plugin registry that records each plugin once, in order of first
/// registration.
#[derive(Debug, Clone, Default)]
pub struct Plugins {
	loaded: Vec<String>,
}

impl Plugins {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn loaded(&self) -> &[String] {
		&self.loaded
	}
}

impl PluginLoader for Plugins {
	fn load_all(&mut self, names: &[String]) {
		for name in names {
			if self.loaded.contains(name) {
				continue;
			}
			tracing::debug!(plugin = %name, "Registering plugin");
			self.loaded.push(name.clone());
		}
	}
}
