#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;
use vault_service::{
    application::{
        dto::document_dto::NewDocumentDTO,
        error::ApplicationError,
        repositories::document_repository::DocumentRepository,
        services::{
            document_service::DocumentService,
            storage_service::{Disposition, StorageService},
        },
    },
    domain::models::{
        document::{Category, Document},
        file::{FileData, UploadPolicy},
        session::Session,
    },
};

/// Releases one held `list_documents` call.
pub type Release = oneshot::Sender<()>;

/// Metadata store kept in memory. Rows are returned newest first.
#[derive(Default)]
pub struct InMemoryRepository {
    rows: Mutex<Vec<Document>>,
    pub fail_list: AtomicBool,
    pub fail_insert: AtomicBool,
    pub fail_delete: AtomicBool,
    gate: Mutex<Option<mpsc::UnboundedSender<Release>>>,
}

impl InMemoryRepository {
    pub fn seed(&self, document: Document) {
        self.rows.lock().unwrap().push(document);
    }

    pub fn rows(&self) -> Vec<Document> {
        self.rows.lock().unwrap().clone()
    }

    /// Makes every following `list_documents` call snapshot the rows, then wait
    /// until the test releases it through the returned channel.
    pub fn hold_lists(&self) -> mpsc::UnboundedReceiver<Release> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.gate.lock().unwrap() = Some(tx);
        rx
    }
}

#[async_trait]
impl DocumentRepository for InMemoryRepository {
    async fn list_documents(&self, session: &Session) -> Result<Vec<Document>, ApplicationError> {
        let mut snapshot: Vec<Document> = self
            .rows()
            .into_iter()
            .filter(|d| d.owner == session.user_id)
            .collect();
        snapshot.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let failing = self.fail_list.load(Ordering::SeqCst);

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            let (release, released) = oneshot::channel();
            gate.send(release).unwrap();
            let _ = released.await;
        }

        if failing {
            return Err(ApplicationError::DatabaseError(
                "connection reset".to_string(),
            ));
        }
        Ok(snapshot)
    }

    async fn insert_document(
        &self,
        session: &Session,
        document: NewDocumentDTO,
    ) -> Result<Document, ApplicationError> {
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(ApplicationError::DatabaseError(
                "new row violates row-level security policy".to_string(),
            ));
        }

        let mut rows = self.rows.lock().unwrap();
        // Keep insertion order and newest-first ordering in agreement.
        let created_at = rows
            .iter()
            .map(|d| d.created_at)
            .max()
            .map(|latest| latest + Duration::seconds(1))
            .unwrap_or_else(Utc::now);

        let created = Document {
            id: Uuid::new_v4(),
            owner: session.user_id,
            file_name: document.file_name,
            storage_path: document.file_path,
            category: document.category,
            size_bytes: document.file_size,
            content_type: document.content_type,
            created_at,
        };
        rows.push(created.clone());
        Ok(created)
    }

    async fn delete_document(&self, session: &Session, id: Uuid) -> Result<(), ApplicationError> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(ApplicationError::DatabaseError("statement timeout".to_string()));
        }
        self.rows
            .lock()
            .unwrap()
            .retain(|d| !(d.id == id && d.owner == session.user_id));
        Ok(())
    }
}

/// Object storage kept in memory.
#[derive(Default)]
pub struct InMemoryStorage {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    pub fail_upload: AtomicBool,
    pub fail_sign: AtomicBool,
    pub panic_on_sign: AtomicBool,
    pub fail_remove: AtomicBool,
}

impl InMemoryStorage {
    pub fn contains(&self, path: &str) -> bool {
        self.objects.lock().unwrap().contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn put(&self, path: &str, content: &[u8]) {
        self.objects
            .lock()
            .unwrap()
            .insert(path.to_string(), content.to_vec());
    }
}

#[async_trait]
impl StorageService for InMemoryStorage {
    async fn upload(
        &self,
        _session: &Session,
        path: &str,
        file_data: &FileData,
    ) -> Result<(), ApplicationError> {
        if self.fail_upload.load(Ordering::SeqCst) {
            return Err(ApplicationError::InternalError(
                "Storage error: bucket quota exceeded".to_string(),
            ));
        }
        self.put(path, &file_data.content);
        Ok(())
    }

    async fn create_signed_url(
        &self,
        _session: &Session,
        path: &str,
        expires_in_secs: u64,
        disposition: Disposition,
    ) -> Result<String, ApplicationError> {
        if self.panic_on_sign.load(Ordering::SeqCst) {
            panic!("signing client crashed");
        }
        if self.fail_sign.load(Ordering::SeqCst) {
            return Err(ApplicationError::InternalError(
                "Storage error: signing unavailable".to_string(),
            ));
        }
        if !self.contains(path) {
            return Err(ApplicationError::NotFound);
        }

        let mut url = format!(
            "https://storage.test/object/sign/documents/{}?token=signed&expiresIn={}",
            path, expires_in_secs
        );
        if let Disposition::Attachment(name) = disposition {
            url.push_str(&format!("&download={}", name));
        }
        Ok(url)
    }

    async fn remove(&self, _session: &Session, path: &str) -> Result<(), ApplicationError> {
        if self.fail_remove.load(Ordering::SeqCst) {
            return Err(ApplicationError::InternalError(
                "Storage error: permission denied".to_string(),
            ));
        }
        self.objects.lock().unwrap().remove(path);
        Ok(())
    }
}

pub struct Fixture {
    pub repository: Arc<InMemoryRepository>,
    pub storage: Arc<InMemoryStorage>,
    pub service: Arc<DocumentService>,
    pub session: Session,
}

pub const ACCESS_TTL_SECS: u64 = 60;

pub fn fixture() -> Fixture {
    fixture_with_ttl(ACCESS_TTL_SECS)
}

pub fn fixture_with_ttl(access_ttl_secs: u64) -> Fixture {
    let repository = Arc::new(InMemoryRepository::default());
    let storage = Arc::new(InMemoryStorage::default());
    let service = Arc::new(DocumentService::new(
        repository.clone(),
        storage.clone(),
        UploadPolicy::default(),
        access_ttl_secs,
    ));

    Fixture {
        repository,
        storage,
        service,
        session: Session::new(Uuid::new_v4(), "access-token"),
    }
}

impl Fixture {
    /// Puts a document in both stores, as if uploaded earlier.
    pub fn stored(&self, file_name: &str, category: Category, size_bytes: Option<u64>) -> Document {
        let existing = self.repository.rows().len() as i64;
        let document = Document {
            id: Uuid::new_v4(),
            owner: self.session.user_id,
            file_name: file_name.to_string(),
            storage_path: format!("{}/{}_{}", self.session.user_id, existing, file_name),
            category,
            size_bytes,
            content_type: "application/pdf".to_string(),
            created_at: Utc::now() - Duration::days(30) + Duration::minutes(existing),
        };
        self.storage.put(&document.storage_path, b"%PDF-1.7");
        self.repository.seed(document.clone());
        document
    }
}

pub fn pdf(name: &str, size: usize) -> FileData {
    FileData::new(vec![0u8; size], name.to_string(), "application/pdf".to_string())
}
