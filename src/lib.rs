pub mod api;
pub mod config;
pub mod logging;
pub mod session;
pub mod shop;
pub mod storage;

use std::path::Path;
use std::sync::Arc;

use api::ApiClient;
use session::Session;
use shop::ShopManager;
use storage::database::Database;

/// Open the settings database in `data_dir` and build a manager whose
/// session lives in it.
pub fn open(data_dir: &Path) -> rusqlite::Result<(Arc<Database>, ShopManager)> {
    let db = Arc::new(Database::new(data_dir)?);

    let persisted_url = db.get_setting(config::API_URL_SETTING).unwrap_or_else(|e| {
        log::warn!("Could not read {}: {}", config::API_URL_SETTING, e);
        None
    });
    let base_url = config::resolve_api_base_url(persisted_url);
    log::debug!("API base URL: {}", base_url);

    let session = Session::new(db.clone());
    let manager = ShopManager::new(ApiClient::new(&base_url, session));
    Ok((db, manager))
}
