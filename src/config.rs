use std::path::{Path, PathBuf};

/// The translator's property bag, enumerating every recognized option across the backend
/// selection, warning, and preprocessor groups. Loaded from a project's `occa.toml`.
#[derive(Debug, Clone)]
pub struct Options {
	pub serial: bool,
	pub openmp: bool,
	pub cuda: bool,
	pub opencl: bool,
	pub warn_on_missing_barriers: bool,
	pub warn_on_barrier_in_conditional: bool,
	pub inline_includes: bool,
	pub expand_macros: bool,

	/// Whether redefining a macro with a different body is an error rather than a silent
	/// replacement. Silent replacement is the default, but exposed as a strictness flag so
	/// embedders that want stricter behavior can opt in.
	pub strict_macro_redefinition: bool,

	/// Directories searched, in order, for `#include "..."` and `#include <...>` headers.
	pub include_search_path: Vec<PathBuf>,
}

impl Default for Options {
	fn default() -> Self {
		Self {
			serial: true,
			openmp: false,
			cuda: false,
			opencl: false,
			warn_on_missing_barriers: true,
			warn_on_barrier_in_conditional: true,
			inline_includes: true,
			expand_macros: true,
			strict_macro_redefinition: false,
			include_search_path: Vec::new(),
		}
	}
}

impl Options {
	/// Loads options from a project `occa.toml` file, falling back to `Options::default()` for
	/// any key that's absent. Uses `toml_edit` rather than plain `toml` because embedders may want
	/// to programmatically rewrite the same file later without reformatting it; reading through
	/// the same crate keeps that door open even though this crate itself only reads.
	pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
		let text = std::fs::read_to_string(path).map_err(|error| anyhow::anyhow!("{error}\n\twhile reading {}", path.display()))?;
		Self::from_toml_str(&text)
	}

	pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
		let document = text.parse::<toml_edit::DocumentMut>().map_err(|error| anyhow::anyhow!("{error}\n\twhile parsing occa.toml"))?;
		let mut options = Self::default();

		if let Some(backends) = document.get("backends").and_then(toml_edit::Item::as_table) {
			macro_rules! flag {
				($field:ident, $key:literal) => {
					if let Some(value) = backends.get($key).and_then(toml_edit::Item::as_bool) {
						options.$field = value;
					}
				};
			}
			flag!(serial, "serial");
			flag!(openmp, "openmp");
			flag!(cuda, "cuda");
			flag!(opencl, "opencl");
		}

		if let Some(warnings) = document.get("warnings").and_then(toml_edit::Item::as_table) {
			if let Some(value) = warnings.get("missing_barriers").and_then(toml_edit::Item::as_bool) {
				options.warn_on_missing_barriers = value;
			}
			if let Some(value) = warnings.get("barrier_in_conditional").and_then(toml_edit::Item::as_bool) {
				options.warn_on_barrier_in_conditional = value;
			}
		}

		if let Some(preprocessor) = document.get("preprocessor").and_then(toml_edit::Item::as_table) {
			if let Some(value) = preprocessor.get("inline_includes").and_then(toml_edit::Item::as_bool) {
				options.inline_includes = value;
			}
			if let Some(value) = preprocessor.get("expand_macros").and_then(toml_edit::Item::as_bool) {
				options.expand_macros = value;
			}
			if let Some(value) = preprocessor.get("strict_macro_redefinition").and_then(toml_edit::Item::as_bool) {
				options.strict_macro_redefinition = value;
			}
			if let Some(paths) = preprocessor.get("include_search_path").and_then(toml_edit::Item::as_array) {
				options.include_search_path = paths.iter().filter_map(toml_edit::Value::as_str).map(PathBuf::from).collect();
			}
		}

		Ok(options)
	}
}
