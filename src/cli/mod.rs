/// The commands module, which handles the CLI's subcommands (currently just `translate`).
pub mod commands;
