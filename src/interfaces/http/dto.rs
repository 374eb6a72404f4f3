use crate::domain::error::{AppError, Result};
use crate::domain::record::UploadedFile;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

/// Upload batch posted by the file picker.
#[derive(Debug, Deserialize, Validate)]
pub struct UploadRequest {
    #[validate(length(min = 1, max = 50), nested)]
    pub files: Vec<UploadFilePayload>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UploadFilePayload {
    #[validate(length(min = 1, max = 255))]
    pub file_name: String,
    #[validate(length(min = 1))]
    pub content_base64: String,
}

impl UploadRequest {
    pub fn into_uploads(self) -> Result<Vec<UploadedFile>> {
        self.validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;
        self.files.into_iter().map(UploadFilePayload::decode).collect()
    }
}

impl UploadFilePayload {
    fn decode(self) -> Result<UploadedFile> {
        // Only the base name is kept as provenance.
        let file_name = Path::new(self.file_name.trim())
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::ValidationError(format!("Invalid file name '{}'", self.file_name))
            })?;

        let bytes = STANDARD
            .decode(self.content_base64.trim())
            .map_err(|e| {
                AppError::ValidationError(format!("'{}' is not valid base64: {}", file_name, e))
            })?;

        Ok(UploadedFile { file_name, bytes })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct YearQuery {
    pub year: Option<String>,
}
