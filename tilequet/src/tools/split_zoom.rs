use super::format_bytes;
use anyhow::Result;
use std::{fs, path::PathBuf};
use tilequet_container::{WriterOptions, split_by_zoom};

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// path of a TileQuet (*.parquet) table
	#[arg()]
	input_file: PathBuf,

	/// directory for the per-zoom tables (zoom_N.parquet)
	#[arg()]
	output_dir: PathBuf,

	/// rows per Parquet row group
	#[arg(long, value_name = "int", default_value_t = 200)]
	row_group_size: usize,
}

#[tokio::main]
pub async fn run(arguments: &Subcommand) -> Result<()> {
	eprintln!(
		"splitting {:?} by zoom level into {:?}",
		arguments.input_file, arguments.output_dir
	);

	let options = WriterOptions::zstd(arguments.row_group_size);
	let outputs = split_by_zoom(&arguments.input_file, &arguments.output_dir, &options).await?;

	let mut total_size = 0;
	for (zoom, path) in &outputs {
		let size = fs::metadata(path)?.len();
		total_size += size;
		eprintln!("  zoom_{zoom}.parquet: {}", format_bytes(size));
	}
	eprintln!("split into {} files ({})", outputs.len(), format_bytes(total_size));

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use assert_fs::TempDir;
	use tilequet_container::{MockSource, TilequetReader, TilequetWriter};

	#[tokio::main]
	async fn make_table(path: &std::path::Path) -> Result<()> {
		TilequetWriter::write_to_path(&MockSource::new_pyramid(1..=3), path, WriterOptions::default()).await?;
		Ok(())
	}

	#[test]
	fn splits_a_generated_table() -> Result<()> {
		let temp = TempDir::new()?;
		let input = temp.path().join("tiles.parquet");
		let output_dir = temp.path().join("split");
		make_table(&input)?;

		let arguments = Subcommand {
			input_file: input,
			output_dir: output_dir.clone(),
			row_group_size: 50,
		};
		run(&arguments)?;

		for zoom in 1..=3 {
			let reader = TilequetReader::open_path(&output_dir.join(format!("zoom_{zoom}.parquet")))?;
			assert_eq!(reader.num_rows(), 1 + (1u64 << zoom) * (1u64 << zoom));
		}
		Ok(())
	}
}
