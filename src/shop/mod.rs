pub mod manager;

use thiserror::Error;

use crate::api::ValidationError;

pub use manager::ShopManager;

/// Where the front end should send the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
}

/// Why an action didn't complete. A notice is shown and dismissed; a
/// redirect replaces the current screen.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShopError {
    #[error("Session expired or missing, please log in")]
    Redirect(Route),
    #[error("{0}")]
    Notice(String),
}

impl From<ValidationError> for ShopError {
    fn from(err: ValidationError) -> Self {
        ShopError::Notice(err.to_string())
    }
}
