use std::rc::Rc;

use leptos_reactive::{create_runtime, RuntimeId};
use tracing::info;

use crate::prelude::{
    FileTokenStore, MemoryTokenStore, RestClient, StudioConfig, SyncError, TokenStore,
};

use super::{AuthStore, Notifications, PolicyStore, ProcessStore};

/// Owns the reactive runtime and every store built on top of it.
///
/// Stores are handed to views explicitly instead of through ambient context.
pub struct Session {
    runtime: RuntimeId,
    pub client: Rc<RestClient>,
    pub notifications: Rc<Notifications>,
    pub auth: AuthStore,
    pub processes: ProcessStore,
    pub policies: PolicyStore,
}

impl Session {
    pub fn start(config: &StudioConfig) -> Result<Self, SyncError> {
        let tokens: Rc<dyn TokenStore> = match &config.token_dir {
            Some(dir) => Rc::new(FileTokenStore::new(dir)),
            None => Rc::new(MemoryTokenStore::new()),
        };
        Self::with_token_store(config, tokens)
    }

    pub fn with_token_store(
        config: &StudioConfig,
        tokens: Rc<dyn TokenStore>,
    ) -> Result<Self, SyncError> {
        let runtime = create_runtime();
        let client = match RestClient::new(config, tokens) {
            Ok(client) => Rc::new(client),
            Err(error) => {
                runtime.dispose();
                return Err(error);
            }
        };
        let notifications = Rc::new(Notifications::default());
        info!(base_url = client.base_url(), "session started");
        Ok(Self {
            runtime,
            auth: AuthStore::new(client.clone(), notifications.clone()),
            processes: ProcessStore::new(
                client.clone(),
                notifications.clone(),
                config.max_history_depth,
            ),
            policies: PolicyStore::new(client.clone(), notifications.clone()),
            client,
            notifications,
        })
    }

    /// Aborts outstanding requests and tears down every signal.
    pub fn end(self) {
        self.client.cancel_in_flight();
        info!("session ended");
        self.runtime.dispose();
    }
}
