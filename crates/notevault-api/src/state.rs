//! Application state

use notevault_auth::{AccessPolicy, AuthLayerState, JwtCodec};
use notevault_db::Database;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub codec: Arc<JwtCodec>,
    pub policy: Arc<AccessPolicy>,
}

impl AppState {
    pub fn new(db: Database, codec: Arc<JwtCodec>, policy: Arc<AccessPolicy>) -> Self {
        Self { db, codec, policy }
    }

    /// State handed to the authentication/authorization middleware stages
    pub fn auth_layer(&self) -> AuthLayerState {
        AuthLayerState {
            codec: self.codec.clone(),
            db: self.db.clone(),
            policy: self.policy.clone(),
        }
    }
}
