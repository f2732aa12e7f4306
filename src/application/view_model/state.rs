use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    application::error::VaultError,
    domain::models::document::{CategoryFilter, Document},
};

/// Count and byte total over the whole snapshot, ignoring filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DocumentStats {
    pub total: usize,
    pub total_size: u64,
}

impl DocumentStats {
    pub fn from_documents(documents: &[Document]) -> Self {
        Self {
            total: documents.len(),
            total_size: documents.iter().map(|d| d.size_bytes.unwrap_or(0)).sum(),
        }
    }

    /// e.g. `3 documents · 3.0 MB`
    pub fn summary(&self) -> String {
        format!(
            "{} document{} · {:.1} MB",
            self.total,
            if self.total == 1 { "" } else { "s" },
            self.total_size as f64 / 1024.0 / 1024.0
        )
    }
}

/// Read-only copy of the list state handed to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub documents: Vec<Document>,
    pub visible: Vec<Document>,
    pub search: String,
    pub category: String,
    pub loading: bool,
    pub pending_delete: Option<Document>,
    pub stats: DocumentStats,
}

/// In-memory document list of one user.
///
/// The snapshot is only ever replaced wholesale by a completed refresh, or has an
/// entry dropped after that entry's remote deletion succeeded.
#[derive(Debug, Default)]
pub struct DocumentList {
    documents: Vec<Document>,
    search: String,
    category: CategoryFilter,
    refreshes_in_flight: usize,
    pending_delete: Option<Document>,
    last_issued: u64,
    last_applied: Option<u64>,
}

impl DocumentList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn is_loading(&self) -> bool {
        self.refreshes_in_flight > 0
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    pub fn set_category(&mut self, category: CategoryFilter) {
        self.category = category;
    }

    pub fn find(&self, id: Uuid) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    /// Documents whose name contains `search` (case-insensitive) and whose
    /// category passes `category`, in snapshot order.
    pub fn filtered_view(&self, search: &str, category: CategoryFilter) -> Vec<&Document> {
        let needle = search.to_lowercase();
        self.documents
            .iter()
            .filter(|d| d.matches_search(&needle) && category.matches(d.category))
            .collect()
    }

    pub fn visible(&self) -> Vec<&Document> {
        self.filtered_view(&self.search, self.category)
    }

    pub fn stats(&self) -> DocumentStats {
        DocumentStats::from_documents(&self.documents)
    }

    /// Marks a refresh as started and returns its sequence number.
    pub fn begin_refresh(&mut self) -> u64 {
        self.last_issued += 1;
        self.refreshes_in_flight += 1;
        self.last_issued
    }

    /// Applies the outcome of refresh `seq`. A successful fetch replaces the snapshot
    /// even when a newer refresh already landed; a failed one leaves it untouched.
    pub fn finish_refresh(
        &mut self,
        seq: u64,
        result: Result<Vec<Document>, VaultError>,
    ) -> Result<(), VaultError> {
        self.refreshes_in_flight = self.refreshes_in_flight.saturating_sub(1);

        let documents = result?;

        if let Some(applied) = self.last_applied {
            if applied > seq {
                warn!(
                    refresh = seq,
                    newer_refresh = applied,
                    "Older refresh landed after a newer one, snapshot may be stale"
                );
            }
        }

        debug!(refresh = seq, count = documents.len(), "Applying refreshed snapshot");
        self.documents = documents;
        self.last_applied = Some(seq);

        let target_gone = self
            .pending_delete
            .as_ref()
            .is_some_and(|pending| self.find(pending.id).is_none());
        if target_gone {
            self.pending_delete = None;
        }
        Ok(())
    }

    /// Drops a document whose remote deletion has succeeded.
    pub fn forget(&mut self, id: Uuid) {
        self.documents.retain(|d| d.id != id);
        if self.pending_delete.as_ref().is_some_and(|d| d.id == id) {
            self.pending_delete = None;
        }
    }

    pub fn pending_delete(&self) -> Option<&Document> {
        self.pending_delete.as_ref()
    }

    pub fn request_delete(&mut self, id: Uuid) -> Result<&Document, VaultError> {
        let document = self.find(id).cloned().ok_or(VaultError::NotFound(id))?;
        Ok(self.pending_delete.insert(document))
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub fn take_pending_delete(&mut self) -> Option<Document> {
        self.pending_delete.take()
    }

    /// Puts a target back after a delete that left the row in place.
    pub fn restore_pending_delete(&mut self, document: Document) {
        self.pending_delete = Some(document);
    }

    pub fn view_state(&self) -> ViewState {
        ViewState {
            documents: self.documents.clone(),
            visible: self.visible().into_iter().cloned().collect(),
            search: self.search.clone(),
            category: self.category.to_string(),
            loading: self.is_loading(),
            pending_delete: self.pending_delete.clone(),
            stats: self.stats(),
        }
    }
}
