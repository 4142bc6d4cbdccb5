use anyhow::{Result, bail};
use std::path::PathBuf;
use tilequet_container::validate_path;

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// path of a TileQuet (*.parquet) table
	#[arg()]
	file: PathBuf,

	/// output the report as JSON
	#[arg(long)]
	json: bool,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	let report = validate_path(&arguments.file);

	if arguments.json {
		println!("{}", serde_json::to_string_pretty(&report)?);
	} else {
		println!("{report}");
	}

	if !report.is_valid {
		bail!("'{}' is not a valid TileQuet table", arguments.file.display());
	}
	Ok(())
}
