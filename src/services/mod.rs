mod error;
mod jwt_session;
mod postgrest_documents;
mod supabase_storage;

pub use error::StorageError;
pub use jwt_session::{AccessClaims, JwtSessionVerifier};
pub use postgrest_documents::PostgRestDocumentRepository;
pub use supabase_storage::SupabaseStorageService;
