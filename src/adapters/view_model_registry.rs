use std::{collections::HashMap, sync::Arc};

use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    application::{
        services::document_service::DocumentService,
        view_model::{DocumentListHandle, DocumentListViewModel},
    },
    domain::models::session::Session,
};

/// One document list per signed-in user, created lazily on first use.
#[derive(Clone)]
pub struct ViewModelRegistry {
    service: Arc<DocumentService>,
    handles: Arc<Mutex<HashMap<Uuid, DocumentListHandle>>>,
}

impl ViewModelRegistry {
    pub fn new(service: Arc<DocumentService>) -> Self {
        Self {
            service,
            handles: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the user's document list, opening it with an initial refresh if it
    /// does not exist yet or its task has stopped.
    pub async fn get(&self, session: &Session) -> DocumentListHandle {
        let (handle, created) = {
            let mut handles = self.handles.lock().await;
            match handles.get(&session.user_id).cloned() {
                Some(handle) if !handle.is_closed() => (handle, false),
                stale => {
                    if stale.is_some() {
                        warn!(user_id = %session.user_id, "Document list task stopped, reopening");
                    }
                    let handle = DocumentListViewModel::spawn(self.service.clone());
                    handles.insert(session.user_id, handle.clone());
                    (handle, true)
                }
            }
        };

        if created {
            info!(user_id = %session.user_id, "Opened document list");
            if let Err(e) = handle.refresh(session).await {
                warn!(user_id = %session.user_id, "Initial refresh failed: {}", e);
            }
        }

        handle
    }
}
