use std::sync::Arc;

use crate::accounts::manager::AccountManager;
use crate::accounts::session::TokenIssuer;
use crate::config::Config;
use crate::mailer::Mailer;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    /// Credential storage. Default: PasswordAccounts over the same store.
    pub accounts: Arc<dyn AccountManager>,
    pub mailer: Arc<dyn Mailer>,
    pub tokens: TokenIssuer,
    pub config: Config,
}
