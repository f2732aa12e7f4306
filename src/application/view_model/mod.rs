//! Document list view-model.
//!
//! One task owns the [`DocumentList`] of a user and is driven by commands sent
//! through a [`DocumentListHandle`]. Uploads, deletes and access references run
//! one at a time inside that task. Refresh fetches run as separate tasks and report
//! back, so several refreshes may overlap; whichever lands last sets the snapshot.

mod state;

pub use state::{DocumentList, DocumentStats, ViewState};

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    application::{
        error::VaultError,
        services::document_service::{AccessPurpose, AccessReference, DocumentService},
    },
    domain::models::{
        document::{Category, CategoryFilter, Document},
        file::FileData,
        session::Session,
    },
};

const COMMAND_BUFFER: usize = 64;

type Reply<T> = oneshot::Sender<Result<T, VaultError>>;

enum Command {
    Refresh {
        session: Session,
        reply: Option<Reply<()>>,
    },
    SetSearch(String),
    SetCategory(CategoryFilter),
    FilteredView {
        search: String,
        category: CategoryFilter,
        reply: oneshot::Sender<Vec<Document>>,
    },
    State {
        reply: oneshot::Sender<ViewState>,
    },
    Access {
        session: Session,
        id: Uuid,
        purpose: AccessPurpose,
        reply: Reply<AccessReference>,
    },
    Upload {
        session: Session,
        file: FileData,
        category: Category,
        reply: Reply<Document>,
    },
    Delete {
        session: Session,
        id: Uuid,
        reply: Reply<()>,
    },
    RequestDelete {
        id: Uuid,
        reply: Reply<Document>,
    },
    CancelDelete,
    ConfirmDelete {
        session: Session,
        reply: Reply<Document>,
    },
}

struct RefreshCompletion {
    seq: u64,
    result: Result<Vec<Document>, VaultError>,
    reply: Option<Reply<()>>,
}

pub struct DocumentListViewModel {
    service: Arc<DocumentService>,
    list: DocumentList,
    commands: mpsc::Receiver<Command>,
    completions_tx: mpsc::UnboundedSender<RefreshCompletion>,
    completions_rx: mpsc::UnboundedReceiver<RefreshCompletion>,
}

impl DocumentListViewModel {
    /// Starts the view-model task and returns a handle to it. The task stops once
    /// every handle is dropped.
    pub fn spawn(service: Arc<DocumentService>) -> DocumentListHandle {
        let (sender, commands) = mpsc::channel(COMMAND_BUFFER);
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();

        let view_model = Self {
            service,
            list: DocumentList::new(),
            commands,
            completions_tx,
            completions_rx,
        };
        tokio::spawn(view_model.run());

        DocumentListHandle { sender }
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                Some(completion) = self.completions_rx.recv() => {
                    self.on_refresh_completed(completion);
                }
                command = self.commands.recv() => match command {
                    Some(command) => self.handle(command).await,
                    None => break,
                },
            }
        }
        debug!("Document list view-model stopped");
    }

    async fn handle(&mut self, command: Command) {
        match command {
            Command::Refresh { session, reply } => self.start_refresh(session, reply),
            Command::SetSearch(search) => self.list.set_search(search),
            Command::SetCategory(category) => self.list.set_category(category),
            Command::FilteredView {
                search,
                category,
                reply,
            } => {
                let view = self
                    .list
                    .filtered_view(&search, category)
                    .into_iter()
                    .cloned()
                    .collect();
                let _ = reply.send(view);
            }
            Command::State { reply } => {
                let _ = reply.send(self.list.view_state());
            }
            Command::Access {
                session,
                id,
                purpose,
                reply,
            } => {
                let result = match self.list.find(id).cloned() {
                    Some(document) => {
                        self.service
                            .access_reference(&session, &document, purpose)
                            .await
                    }
                    None => Err(VaultError::NotFound(id)),
                };
                let _ = reply.send(result);
            }
            Command::Upload {
                session,
                file,
                category,
                reply,
            } => {
                let result = self.service.upload(&session, file, category).await;
                if result.is_ok() {
                    self.start_refresh(session, None);
                }
                let _ = reply.send(result);
            }
            Command::Delete { session, id, reply } => {
                let result = match self.list.find(id).cloned() {
                    Some(document) => self.delete(&session, &document).await,
                    None => Err(VaultError::NotFound(id)),
                };
                let _ = reply.send(result);
            }
            Command::RequestDelete { id, reply } => {
                let _ = reply.send(self.list.request_delete(id).cloned());
            }
            Command::CancelDelete => self.list.cancel_delete(),
            Command::ConfirmDelete { session, reply } => {
                let result = self.confirm_delete(&session).await;
                let _ = reply.send(result);
            }
        }
    }

    async fn delete(&mut self, session: &Session, document: &Document) -> Result<(), VaultError> {
        self.service.delete(session, document).await?;
        self.list.forget(document.id);
        self.start_refresh(session.clone(), None);
        Ok(())
    }

    async fn confirm_delete(&mut self, session: &Session) -> Result<Document, VaultError> {
        let document = self
            .list
            .take_pending_delete()
            .ok_or(VaultError::NoPendingDelete)?;

        match self.delete(session, &document).await {
            Ok(()) => Ok(document),
            Err(VaultError::DeleteStorageFailed(reason)) => {
                // Nothing changed remotely, so the confirmation stays open.
                self.list.restore_pending_delete(document);
                Err(VaultError::DeleteStorageFailed(reason))
            }
            Err(other) => Err(other),
        }
    }

    fn start_refresh(&mut self, session: Session, reply: Option<Reply<()>>) {
        let seq = self.list.begin_refresh();
        let service = self.service.clone();
        let completions = self.completions_tx.clone();

        debug!(refresh = seq, user_id = %session.user_id, "Refreshing documents");

        tokio::spawn(async move {
            let result = service.list(&session).await;
            let _ = completions.send(RefreshCompletion { seq, result, reply });
        });
    }

    fn on_refresh_completed(&mut self, completion: RefreshCompletion) {
        let RefreshCompletion { seq, result, reply } = completion;
        let outcome = self.list.finish_refresh(seq, result);

        match &outcome {
            Ok(()) => info!(
                refresh = seq,
                count = self.list.documents().len(),
                "Document list refreshed"
            ),
            Err(e) => warn!(refresh = seq, error = %e, "Refresh failed, keeping previous list"),
        }

        if let Some(reply) = reply {
            let _ = reply.send(outcome);
        }
    }
}

/// Cloneable entry point used by the presentation layer.
#[derive(Clone)]
pub struct DocumentListHandle {
    sender: mpsc::Sender<Command>,
}

impl DocumentListHandle {
    /// True once the view-model task has stopped, for instance after a panic.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    async fn send(&self, command: Command) -> Result<(), VaultError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| VaultError::Unavailable)
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, VaultError> {
        let (reply, response) = oneshot::channel();
        self.send(build(reply)).await?;
        response.await.map_err(|_| VaultError::Unavailable)
    }

    /// Re-fetches the user's documents and resolves once this fetch has been applied
    /// (or has failed, leaving the previous list in place).
    pub async fn refresh(&self, session: &Session) -> Result<(), VaultError> {
        let session = session.clone();
        self.request(|reply| Command::Refresh {
            session,
            reply: Some(reply),
        })
        .await?
    }

    pub async fn set_search(&self, search: impl Into<String>) -> Result<(), VaultError> {
        self.send(Command::SetSearch(search.into())).await
    }

    pub async fn set_category(&self, category: CategoryFilter) -> Result<(), VaultError> {
        self.send(Command::SetCategory(category)).await
    }

    pub async fn filtered_view(
        &self,
        search: impl Into<String>,
        category: CategoryFilter,
    ) -> Result<Vec<Document>, VaultError> {
        let search = search.into();
        self.request(|reply| Command::FilteredView {
            search,
            category,
            reply,
        })
        .await
    }

    pub async fn state(&self) -> Result<ViewState, VaultError> {
        self.request(|reply| Command::State { reply }).await
    }

    pub async fn request_view(
        &self,
        session: &Session,
        id: Uuid,
    ) -> Result<AccessReference, VaultError> {
        self.access(session, id, AccessPurpose::View).await
    }

    pub async fn request_download(
        &self,
        session: &Session,
        id: Uuid,
    ) -> Result<AccessReference, VaultError> {
        self.access(session, id, AccessPurpose::Download).await
    }

    async fn access(
        &self,
        session: &Session,
        id: Uuid,
        purpose: AccessPurpose,
    ) -> Result<AccessReference, VaultError> {
        let session = session.clone();
        self.request(|reply| Command::Access {
            session,
            id,
            purpose,
            reply,
        })
        .await?
    }

    pub async fn upload(
        &self,
        session: &Session,
        file: FileData,
        category: Category,
    ) -> Result<Document, VaultError> {
        let session = session.clone();
        self.request(|reply| Command::Upload {
            session,
            file,
            category,
            reply,
        })
        .await?
    }

    pub async fn delete(&self, session: &Session, id: Uuid) -> Result<(), VaultError> {
        let session = session.clone();
        self.request(|reply| Command::Delete { session, id, reply })
            .await?
    }

    pub async fn request_delete(&self, id: Uuid) -> Result<Document, VaultError> {
        self.request(|reply| Command::RequestDelete { id, reply })
            .await?
    }

    pub async fn cancel_delete(&self) -> Result<(), VaultError> {
        self.send(Command::CancelDelete).await
    }

    pub async fn confirm_delete(&self, session: &Session) -> Result<Document, VaultError> {
        let session = session.clone();
        self.request(|reply| Command::ConfirmDelete { session, reply })
            .await?
    }
}
