/// Bytes selected for upload, with the name and type reported by the client.
#[derive(Debug, Clone)]
pub struct FileData {
    pub content: Vec<u8>,
    pub filename: String,
    pub mime_type: String,
}

impl FileData {
    pub fn new(content: Vec<u8>, filename: String, mime_type: String) -> Self {
        Self {
            content,
            filename,
            mime_type,
        }
    }

    pub fn validate_size(&self, max_size: u64) -> bool {
        self.size() <= max_size
    }

    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }
}

#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub allowed_mime_types: Vec<String>,
    pub max_size: u64,
}

impl UploadPolicy {
    pub const DEFAULT_MAX_SIZE: u64 = 10 * 1024 * 1024;

    pub fn allows_mime(&self, mime_type: &str) -> bool {
        self.allowed_mime_types.iter().any(|m| m == mime_type)
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            allowed_mime_types: [
                "application/pdf",
                "image/jpeg",
                "image/png",
                "image/webp",
                "image/jpg",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            max_size: Self::DEFAULT_MAX_SIZE,
        }
    }
}
