use std::sync::Arc;

use soundsync_service::SoundSyncService;
use soundsync_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<SoundSyncService>,
}
impl AppState {
	pub async fn new(config: soundsync_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema(config.storage.vector_dim).await?;

		Ok(Self::from_service(SoundSyncService::new(config, db)))
	}

	pub fn from_service(service: SoundSyncService) -> Self {
		Self { service: Arc::new(service) }
	}
}
