//! Shared router state

use std::sync::Arc;

use config_loader::AccountResolver;
use contracts::Connector;

use crate::logging::RequestCounter;

/// State shared by every handler
pub struct AppState<C> {
    pub resolver: AccountResolver,
    pub connector: Arc<C>,
    pub requests: RequestCounter,
}

impl<C: Connector> AppState<C> {
    pub fn new(resolver: AccountResolver, connector: C) -> Self {
        Self {
            resolver,
            connector: Arc::new(connector),
            requests: RequestCounter::default(),
        }
    }
}

impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
            connector: Arc::clone(&self.connector),
            requests: self.requests.clone(),
        }
    }
}
