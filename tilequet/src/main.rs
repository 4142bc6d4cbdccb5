mod tools;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{ErrorLevel, Verbosity};

#[derive(Parser, Debug)]
#[command(
	author,
	version,
	about,
	long_about = None,
	propagate_version = true,
	disable_help_subcommand = true,
)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	#[command(flatten)]
	verbose: Verbosity<ErrorLevel>,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// Show information about a TileQuet table
	Inspect(tools::inspect::Subcommand),

	/// Check a TileQuet table for correctness
	Validate(tools::validate::Subcommand),

	#[clap(name = "split-zoom")]
	/// Split a TileQuet table into one table per zoom level
	SplitZoom(tools::split_zoom::Subcommand),
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	env_logger::Builder::new()
		.filter_level(cli.verbose.log_level_filter())
		.format_timestamp(None)
		.init();

	run(cli)
}

fn run(cli: Cli) -> Result<()> {
	match &cli.command {
		Commands::Inspect(arguments) => tools::inspect::run(arguments),
		Commands::Validate(arguments) => tools::validate::run(arguments),
		Commands::SplitZoom(arguments) => tools::split_zoom::run(arguments),
	}
}
