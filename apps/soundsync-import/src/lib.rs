//! Loads a JSON Lines track export into the `songs` table.

use std::{
	fs::File,
	io::{BufRead, BufReader},
	path::PathBuf,
};

use clap::Parser;
use color_eyre::eyre;
use tracing_subscriber::EnvFilter;

use soundsync_domain::catalog::{self, RawSong};
use soundsync_storage::{db::Db, queries};

pub const BATCH_SIZE: usize = 500;

#[derive(Debug, Parser)]
#[command(
	version = soundsync_cli::VERSION,
	rename_all = "kebab",
	styles = soundsync_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// One raw track object per line.
	#[arg(long, short = 'i', value_name = "FILE")]
	pub input: PathBuf,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = soundsync_config::load(&args.config)?;
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();

	if config.storage.vector_dim as usize != catalog::FEATURE_DIM {
		return Err(eyre::eyre!(
			"storage.vector_dim is {} but imported feature vectors have {} dimensions.",
			config.storage.vector_dim,
			catalog::FEATURE_DIM
		));
	}

	let raw = read_jsonl(BufReader::new(File::open(&args.input)?))?;
	let read = raw.len();
	let songs = catalog::prepare(raw);

	tracing::info!(read, unique = songs.len(), input = %args.input.display(), "Catalog prepared.");

	let db = Db::connect(&config.storage.postgres).await?;

	db.ensure_schema(config.storage.vector_dim).await?;

	let mut written = 0;

	for batch in songs.chunks(BATCH_SIZE) {
		written += queries::upsert_songs(&db, batch).await?;

		tracing::info!(written, total = songs.len(), "Imported batch.");
	}

	tracing::info!(written, "Catalog import finished.");

	Ok(())
}

/// Parses one [`RawSong`] per non-blank line.
pub fn read_jsonl(reader: impl BufRead) -> color_eyre::Result<Vec<RawSong>> {
	let mut out = Vec::new();

	for (idx, line) in reader.lines().enumerate() {
		let line = line?;

		if line.trim().is_empty() {
			continue;
		}

		let raw: RawSong = serde_json::from_str(&line)
			.map_err(|err| eyre::eyre!("Invalid track on line {}: {err}.", idx + 1))?;

		out.push(raw);
	}

	Ok(out)
}
