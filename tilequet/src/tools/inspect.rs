use super::format_bytes;
use anyhow::Result;
use std::{fs, path::PathBuf};
use tilequet_container::TilequetReader;

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// path of a TileQuet (*.parquet) table
	#[arg()]
	file: PathBuf,

	/// also print the full metadata document
	#[arg(long)]
	metadata: bool,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	log::debug!("inspecting {}", arguments.file.display());

	let reader = TilequetReader::open_path(&arguments.file)?;
	let document = reader.metadata_document()?;
	let file_size = fs::metadata(&arguments.file)?.len();

	println!("TileQuet file: {}", arguments.file.display());
	println!("  File size:    {}", format_bytes(file_size));
	println!("  Row groups:   {}", reader.num_row_groups());
	println!("  Total rows:   {}", reader.num_rows());
	println!();
	println!("  Format:       {} v{}", document.file_format, document.version);
	println!("  Tile type:    {}", document.tile_type);
	println!("  Tile format:  {}", document.tile_format);
	println!("  Zoom range:   {} - {}", document.min_zoom, document.max_zoom);
	println!("  Num tiles:    {}", document.num_tiles);
	println!("  Tiling:       {}", document.tiling.scheme);

	let bounds = document.bounds;
	println!(
		"  Bounds:       [{:.4}, {:.4}, {:.4}, {:.4}]",
		bounds.x_min, bounds.y_min, bounds.x_max, bounds.y_max
	);
	if let Some(center) = document.center {
		println!("  Center:       [{:.4}, {:.4}] z{}", center.0, center.1, center.2);
	}
	if let Some(name) = &document.name {
		println!("  Name:         {name}");
	}
	if let Some(description) = &document.description {
		println!("  Description:  {description}");
	}
	if let Some(attribution) = &document.attribution {
		println!("  Attribution:  {attribution}");
	}

	if let Some(layers) = &document.layers {
		println!();
		println!("  Layers ({}):", layers.len());
		for layer in layers {
			let fields = layer.fields.as_ref().map_or(0, |fields| fields.len());
			match (layer.minzoom, layer.maxzoom) {
				(Some(min), Some(max)) => println!("    - {} (z{min}-z{max}): {fields} fields", layer.id),
				_ => println!("    - {}: {fields} fields", layer.id),
			}
		}
	}

	if let Some(processing) = &document.processing {
		println!();
		println!(
			"  Source:       {}",
			processing.source_format.as_deref().unwrap_or("unknown")
		);
		println!("  Created by:   {}", processing.created_by);
		println!("  Created at:   {}", processing.created_at);
	}

	if arguments.metadata {
		println!();
		println!("Full metadata:");
		println!("{}", serde_json::to_string_pretty(&document)?);
	}

	Ok(())
}
