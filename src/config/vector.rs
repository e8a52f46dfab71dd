use std::fmt;

/// One element of a [`ConfigVector`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VectorToken {
	/// Identity key of a config source (its file path, empty for the base).
	Source(String),

	/// Index of a matching override block in the preceding source.
	Override(usize),
}

/// Ordered identification of the sources and override blocks that apply to
/// one target file. Equal vectors always resolve to equal configs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ConfigVector {
	tokens: Vec<VectorToken>,
}

impl ConfigVector {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push_source(&mut self, identity: impl Into<String>) {
		self.tokens.push(VectorToken::Source(identity.into()));
	}

	pub fn push_override(&mut self, index: usize) {
		self.tokens.push(VectorToken::Override(index));
	}

	pub fn tokens(&self) -> &[VectorToken] {
		&self.tokens
	}

	pub fn len(&self) -> usize {
		self.tokens.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tokens.is_empty()
	}

	/// Cache key for the whole vector.
	pub fn key(&self) -> String {
		vector_key(&self.tokens)
	}
}

impl FromIterator<VectorToken> for ConfigVector {
	fn from_iter<I: IntoIterator<Item = VectorToken>>(iter: I) -> Self {
		ConfigVector {
			tokens: iter.into_iter().collect(),
		}
	}
}

/// Cache key for a token sequence.
///
/// Source keys are written quoted and escaped, so no path can be confused
/// with a separator or an override index.
pub fn vector_key(tokens: &[VectorToken]) -> String {
	tokens
		.iter()
		.map(|token| match token {
			VectorToken::Source(identity) => format!("{identity:?}"),
			VectorToken::Override(index) => index.to_string(),
		})
		.collect::<Vec<_>>()
		.join(",")
}

impl fmt::Display for ConfigVector {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut first = true;
		let mut in_overrides = false;
		for token in &self.tokens {
			match token {
				VectorToken::Source(identity) => {
					if in_overrides {
						write!(f, "]")?;
						in_overrides = false;
					}
					if !first {
						write!(f, ", ")?;
					}
					if identity.is_empty() {
						write!(f, "<base>")?;
					} else {
						write!(f, "{identity}")?;
					}
				}
				VectorToken::Override(index) => {
					if in_overrides {
						write!(f, ", {index}")?;
					} else {
						write!(f, " [{index}")?;
						in_overrides = true;
					}
				}
			}
			first = false;
		}
		if in_overrides {
			write!(f, "]")?;
		}
		Ok(())
	}
}
