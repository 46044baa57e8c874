//! Input files handed to the orchestrator by the ingestion layer.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::role::MediaRole;

/// One ingested input. The local path is a transient resource owned by the job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputFile {
    /// Multipart field name (or `url` for fetched inputs)
    pub fieldname: String,
    /// Client-side file name or the last URL path segment
    pub original_name: String,
    /// Where the bytes were written locally
    pub local_path: PathBuf,
    /// Declared or detected MIME type
    pub mime_type: String,
    /// Optional display title (used by the timestamps job)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Role declared by the client, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<MediaRole>,
}

impl InputFile {
    pub fn new(
        fieldname: impl Into<String>,
        original_name: impl Into<String>,
        local_path: impl Into<PathBuf>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            fieldname: fieldname.into(),
            original_name: original_name.into(),
            local_path: local_path.into(),
            mime_type: mime_type.into(),
            title: None,
            role: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_role(mut self, role: MediaRole) -> Self {
        self.role = Some(role);
        self
    }
}
