use std::path::Path;

use serde::{Deserialize, Serialize};

pub const DEFAULT_EDUCATION_LEVEL: &str = "High School";
pub const DEFAULT_SLIDE_COUNT: u32 = 10;

/// One unit of generated presentation content, passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    pub title: String,
    #[serde(default)]
    pub content: Vec<String>,
    #[serde(default)]
    pub example: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_suggestion: Option<String>,
}

/// What a generation call hands back. Which variant arrives depends on the
/// configured contract version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResult {
    Slides(Vec<Slide>),
    File(Vec<u8>),
}

/// A file picked by the user for upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing its content type from the extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let content_type = guess_content_type(&file_name).to_string();
        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }

    /// The upload name minus its final extension; used to seed the saved file name.
    pub fn stem(&self) -> &str {
        match self.file_name.rfind('.') {
            Some(idx) if idx > 0 => &self.file_name[..idx],
            _ => &self.file_name,
        }
    }
}

#[derive(Debug, Clone)]
pub enum GenerationRequest {
    Topic {
        topic: String,
        slide_count: u32,
        education_level: String,
    },
    PdfUpload {
        file: UploadFile,
        slide_count: u32,
    },
    ImageUpload {
        file: UploadFile,
        slide_count: u32,
    },
}

impl GenerationRequest {
    /// Seed for the name of a file saved from this request's result.
    pub fn filename_seed(&self) -> &str {
        match self {
            GenerationRequest::Topic { topic, .. } => topic,
            GenerationRequest::PdfUpload { file, .. } | GenerationRequest::ImageUpload { file, .. } => {
                file.stem()
            }
        }
    }
}

// ── Wire bodies ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct TopicBody<'a> {
    pub topic: &'a str,
    pub num_slides: u32,
    pub education_level: &'a str,
    pub input_type: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ExportBody<'a> {
    pub slides: &'a [Slide],
    pub topic: &'a str,
}

pub fn guess_content_type(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
