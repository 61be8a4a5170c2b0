use std::collections::HashMap;

use crate::lexer::Token;

/// A macro definition — object-like, function-like, or one of the fixed builtins
/// (`__FILE__`, `__LINE__`, `__DATE__`, `__TIME__`, `__COUNTER__`). Builtins expand procedurally
/// (they read translator state rather than a stored body); source macros substitute a stored
/// token sequence.
#[derive(Debug, Clone)]
pub struct Macro {
	pub name: String,
	pub is_function_like: bool,
	pub parameters: Vec<String>,
	pub is_variadic: bool,
	pub body: Vec<Token>,
	pub is_builtin: bool,
}

/// Exact-name lookup over both the frozen compiler/builtin table and the mutable source-macro
/// table. A `HashMap<String, Macro>` gives the same observable exact-match behavior a
/// name-keyed trie would (no prefix queries are ever made against this table) with a simpler
/// implementation, so that's what's used here.
#[derive(Debug, Default)]
pub struct MacroTable {
	builtins: HashMap<String, Macro>,
	source: HashMap<String, Macro>,
}

impl MacroTable {
	#[must_use]
	pub fn new() -> Self {
		let mut builtins = HashMap::new();
		for name in ["__FILE__", "__LINE__", "__DATE__", "__TIME__", "__COUNTER__"] {
			builtins.insert(name.to_owned(), Macro { name: name.to_owned(), is_function_like: false, parameters: Vec::new(), is_variadic: false, body: Vec::new(), is_builtin: true });
		}
		Self { builtins, source: HashMap::new() }
	}

	#[must_use]
	pub fn lookup(&self, name: &str) -> Option<&Macro> {
		self.source.get(name).or_else(|| self.builtins.get(name))
	}

	#[must_use]
	pub fn is_defined(&self, name: &str) -> bool {
		self.lookup(name).is_some()
	}

	/// Defines (or silently redefines) a source macro. The caller is responsible for deciding
	/// whether a changed-body redefinition should warn, per the `strict_macro_redefinition`
	/// option — this method itself always just replaces.
	pub fn define(&mut self, definition: Macro) -> Option<Macro> {
		self.source.insert(definition.name.clone(), definition)
	}

	/// Returns the previous definition, if any, so the caller can compare bodies before replacing.
	#[must_use]
	pub fn peek(&self, name: &str) -> Option<&Macro> {
		self.source.get(name)
	}

	pub fn undef(&mut self, name: &str) -> Option<Macro> {
		self.source.remove(name)
	}
}
