mod pg_document_repository;

pub use pg_document_repository::PgDocumentRepository;
