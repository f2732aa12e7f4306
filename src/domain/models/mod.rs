pub mod document;
pub mod file;
pub mod session;
