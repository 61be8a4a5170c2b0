//! `occa-translate`: a kernel source-to-source translator for OCCA's annotated C dialect (OKL),
//! compiling it down to backend-specific OpenMP/CUDA/OpenCL/serial C.

use clap::Parser as _;

use occa_translate::cli::commands::{OccaCommand as _, SubCommand};

/// The command-line arguments for the translator.
#[derive(clap::Parser)]
pub struct OccaTranslateArguments {
	/// The subcommand to run, such as `translate`.
	#[command(subcommand)]
	pub command: SubCommand,
}

fn main() -> anyhow::Result<()> {
	env_logger::init();
	OccaTranslateArguments::parse().command.execute()
}
