use std::fs;
use std::path::PathBuf;

use colored::Colorize as _;

use crate::config::Options;
use crate::diagnostics::{CollectingSink, Severity};
use crate::translate::{translate, TranslateInput};

#[enum_dispatch::enum_dispatch]
pub trait OccaCommand {
	fn execute(self) -> anyhow::Result<()>;
}

#[derive(clap::Subcommand)]
#[enum_dispatch::enum_dispatch(OccaCommand)]
pub enum SubCommand {
	Translate(TranslateCommand),
}

/// Translates a single OKL source file and prints the result: one subcommand that reads a file,
/// drives the translator, and reports diagnostics through `colored` rather than a bare `eprintln!`.
#[derive(clap::Args)]
pub struct TranslateCommand {
	/// The `.okl` source file to translate.
	pub input: PathBuf,

	/// Where to write the translated output. Prints to stdout if omitted.
	#[arg(short, long)]
	pub output: Option<PathBuf>,

	/// An `occa.toml` file to load options from. Falls back to `Options::default()` if omitted.
	#[arg(short, long)]
	pub config: Option<PathBuf>,

	/// Directories to search for `#include` headers, in order.
	#[arg(short = 'I', long = "include")]
	pub include_search_path: Vec<PathBuf>,
}

impl OccaCommand for TranslateCommand {
	fn execute(self) -> anyhow::Result<()> {
		let mut options = match &self.config {
			Some(path) => Options::from_toml_file(path)?,
			None => Options::default(),
		};
		options.include_search_path.extend(self.include_search_path);

		let source = fs::read_to_string(&self.input).map_err(|error| anyhow::anyhow!("{error}\n\twhile reading {}", self.input.display()))?;
		let filename = self.input.to_string_lossy().into_owned();

		log::info!("translating {filename}");
		let mut sink = CollectingSink::new();
		let input = TranslateInput { source: &source, filename, include_search_path: options.include_search_path.clone(), options };
		let result = translate(input, &mut sink);

		for diagnostic in &sink.diagnostics {
			match diagnostic.severity {
				Severity::Error => eprintln!("{} {}", "error:".bold().red(), format!("{} ({})", diagnostic.message, diagnostic.origin).normal()),
				Severity::Warning => eprintln!("{} {}", "warning:".bold().yellow(), format!("{} ({})", diagnostic.message, diagnostic.origin).normal()),
			}
		}

		let output = result?;
		log::info!("translated {} kernel(s), {} included file(s)", output.kernels.len(), output.included_files.len());

		match &self.output {
			Some(path) => fs::write(path, &output.text).map_err(|error| anyhow::anyhow!("{error}\n\twhile writing {}", path.display()))?,
			None => print!("{}", output.text),
		}

		Ok(())
	}
}
