use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

/// Row of the `files` table: one document of the assistant's knowledge base.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct KnowledgeFile {
    pub id: String,
    pub company_id: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub size_bytes: i64,
    pub remote_id: String,
    pub created_at: DateTime<Utc>,
}

impl KnowledgeFile {
    pub fn new(company_id: String, upload: &FileUpload, remote_id: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            company_id,
            file_name: upload.file_name.clone(),
            content_type: upload.content_type.clone(),
            size_bytes: upload.bytes.len() as i64,
            remote_id,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// What the file processing function reports after ingesting an upload.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ProcessedFile {
    #[serde(alias = "file_id")]
    pub remote_id: String,
    #[serde(default)]
    pub chunks: Option<i64>,
}
