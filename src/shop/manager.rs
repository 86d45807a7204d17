use tokio::sync::RwLock;

use crate::api::{
    check_restock, ApiClient, ApiError, SearchFilter, StockChange, Sweet, SweetForm,
    SweetUpdate, ValidationError,
};
use crate::session::Session;

use super::{Route, ShopError};

const LOAD_FAILED: &str = "Failed to load sweets";
const SEARCH_FAILED: &str = "Search failed";
const LOGIN_FAILED: &str = "Login failed. Please try again.";
const REGISTER_FAILED: &str = "Registration failed. Please try again.";
const PURCHASE_FAILED: &str = "Purchase failed";
const OPERATION_FAILED: &str = "Operation failed";
const DELETE_FAILED: &str = "Delete failed";
const RESTOCK_FAILED: &str = "Restock failed";

/// Drives the dashboard: guards on the session, holds the last catalog
/// snapshot, and re-fetches the whole list after every successful
/// mutation. Failures come back as a [`ShopError`] the front end can show
/// or act on.
pub struct ShopManager {
    api: ApiClient,
    sweets: RwLock<Vec<Sweet>>,
}

impl ShopManager {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            sweets: RwLock::new(Vec::new()),
        }
    }

    pub fn session(&self) -> &Session {
        self.api.session()
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    // ── Session ─────────────────────────────────────────────────────────

    pub fn guard(&self) -> Result<(), ShopError> {
        if self.session().is_authenticated() {
            Ok(())
        } else {
            Err(ShopError::Redirect(Route::Login))
        }
    }

    pub fn username(&self) -> Option<String> {
        self.session().current_username()
    }

    /// Whether admin controls should be offered. Advisory only.
    pub fn is_admin(&self) -> bool {
        self.session().can_administer()
    }

    /// Log in and store the returned token. Returns where to go next.
    pub async fn login(&self, username: &str, password: &str) -> Result<Route, ShopError> {
        let auth = self
            .api
            .login(username, password)
            .await
            .map_err(|e| ShopError::Notice(e.user_message(LOGIN_FAILED)))?;

        self.session()
            .store(&auth.access_token)
            .map_err(|e| ShopError::Notice(e.to_string()))?;
        log::info!("Logged in as {}", username);
        Ok(Route::Dashboard)
    }

    /// Create an account. Does not log in.
    pub async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<Route, ShopError> {
        self.api
            .register(email, username, password)
            .await
            .map_err(|e| ShopError::Notice(e.user_message(REGISTER_FAILED)))?;
        log::info!("Registered {}", username);
        Ok(Route::Login)
    }

    pub async fn logout(&self) -> Result<Route, ShopError> {
        self.session()
            .clear()
            .map_err(|e| ShopError::Notice(e.to_string()))?;
        self.sweets.write().await.clear();
        log::info!("Logged out");
        Ok(Route::Login)
    }

    // ── Catalog ─────────────────────────────────────────────────────────

    pub async fn sweets(&self) -> Vec<Sweet> {
        self.sweets.read().await.clone()
    }

    /// Guard, then load the catalog.
    pub async fn open(&self) -> Result<Vec<Sweet>, ShopError> {
        self.guard()?;
        self.refresh().await
    }

    /// Replace the snapshot with a fresh `list_all`.
    pub async fn refresh(&self) -> Result<Vec<Sweet>, ShopError> {
        let sweets = self
            .api
            .list_all()
            .await
            .map_err(|e| interrupt(e, LOAD_FAILED))?;
        *self.sweets.write().await = sweets.clone();
        Ok(sweets)
    }

    /// An empty filter lists everything; anything else goes to search.
    pub async fn browse(&self, filter: &SearchFilter) -> Result<Vec<Sweet>, ShopError> {
        let result = if filter.is_empty() {
            self.api.list_all().await
        } else {
            self.api.search(filter).await
        };
        let sweets = result.map_err(|e| interrupt(e, SEARCH_FAILED))?;
        *self.sweets.write().await = sweets.clone();
        Ok(sweets)
    }

    /// Checked against the current snapshot before anything is sent.
    pub async fn purchase(&self, id: i64, quantity: i64) -> Result<StockChange, ShopError> {
        let sweet = self.find(id).await?;
        sweet.check_purchase(quantity)?;

        let change = self
            .api
            .purchase(id, quantity)
            .await
            .map_err(|e| interrupt(e, PURCHASE_FAILED))?;
        log::info!("Purchased {} x {}", quantity, change.name);

        self.reload_after_change().await?;
        Ok(change)
    }

    /// Create when `editing` is `None`, otherwise update that sweet with
    /// every form field.
    pub async fn save(&self, form: SweetForm, editing: Option<i64>) -> Result<Sweet, ShopError> {
        self.require_admin()?;
        form.validate()?;

        let result = match editing {
            Some(id) => self.api.update(id, &SweetUpdate::from(form)).await,
            None => self.api.create(&form).await,
        };
        let saved = result.map_err(|e| interrupt(e, OPERATION_FAILED))?;
        log::info!("Saved sweet {} ({})", saved.id, saved.name);

        self.reload_after_change().await?;
        Ok(saved)
    }

    /// Partial update: only the fields set in `update` are sent.
    pub async fn edit(&self, id: i64, update: SweetUpdate) -> Result<Sweet, ShopError> {
        self.require_admin()?;
        if update.is_empty() {
            return Err(ValidationError::EmptyUpdate.into());
        }
        update.validate()?;

        let saved = self
            .api
            .update(id, &update)
            .await
            .map_err(|e| interrupt(e, OPERATION_FAILED))?;
        log::info!("Updated sweet {}", saved.id);

        self.reload_after_change().await?;
        Ok(saved)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ShopError> {
        self.require_admin()?;
        self.api
            .delete(id)
            .await
            .map_err(|e| interrupt(e, DELETE_FAILED))?;
        log::info!("Deleted sweet {}", id);

        self.reload_after_change().await?;
        Ok(())
    }

    pub async fn restock(&self, id: i64, quantity: i64) -> Result<StockChange, ShopError> {
        self.require_admin()?;
        check_restock(quantity)?;

        let change = self
            .api
            .restock(id, quantity)
            .await
            .map_err(|e| interrupt(e, RESTOCK_FAILED))?;
        log::info!("Restocked {} x {}", quantity, change.name);

        self.reload_after_change().await?;
        Ok(change)
    }

    /// Re-fetch after a mutation the server already accepted. A failed
    /// reload leaves the old snapshot in place and is only logged, so the
    /// caller still sees the mutation's result. A 401 still redirects.
    async fn reload_after_change(&self) -> Result<(), ShopError> {
        match self.refresh().await {
            Ok(_) => Ok(()),
            Err(ShopError::Redirect(route)) => Err(ShopError::Redirect(route)),
            Err(ShopError::Notice(message)) => {
                log::warn!("Catalog reload after change failed: {}", message);
                Ok(())
            }
        }
    }

    async fn find(&self, id: i64) -> Result<Sweet, ShopError> {
        self.sweets
            .read()
            .await
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| ValidationError::UnknownSweet { id }.into())
    }

    fn require_admin(&self) -> Result<(), ShopError> {
        self.guard()?;
        if !self.is_admin() {
            return Err(ShopError::Notice(
                "Admin privileges required".to_string(),
            ));
        }
        Ok(())
    }
}

/// 401 sends the user back to login; everything else becomes a notice.
fn interrupt(err: ApiError, fallback: &str) -> ShopError {
    if err.is_unauthorized() {
        log::info!("Server rejected the session token");
        ShopError::Redirect(Route::Login)
    } else {
        ShopError::Notice(err.user_message(fallback))
    }
}
