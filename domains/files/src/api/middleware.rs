//! Files domain state and auth backend integration

use std::sync::Arc;

use axum::extract::FromRef;
use carepoint_accounts::UserStore;
use carepoint_auth::AuthBackend;
use carepoint_storage::ObjectStorage;

use crate::repository::FileStore;

/// Application state for the Files domain
#[derive(Clone)]
pub struct FilesState {
    pub files: Arc<dyn FileStore>,
    pub users: Arc<dyn UserStore>,
    pub storage: Arc<dyn ObjectStorage>,
    pub auth: AuthBackend,
}

impl FromRef<FilesState> for AuthBackend {
    fn from_ref(state: &FilesState) -> Self {
        state.auth.clone()
    }
}
