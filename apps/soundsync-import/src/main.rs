use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = soundsync_import::Args::parse();

	soundsync_import::run(args).await
}
