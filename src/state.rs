use std::sync::Arc;

use crate::auth::PasswordHasher;
use crate::store::Store;

/// Everything a request handler needs, registered once as `web::Data<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub hasher: PasswordHasher,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, hasher: PasswordHasher) -> Self {
        Self { store, hasher }
    }
}
