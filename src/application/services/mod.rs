pub mod document_service;
pub mod storage_service;

pub use storage_service::StorageService;
