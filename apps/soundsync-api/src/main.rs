use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = soundsync_api::Args::parse();

	soundsync_api::run(args).await
}
