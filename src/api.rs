use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, StatusCode};
use serde_json::Value;

use crate::config::{ClientConfig, ContractVersion};
use crate::models::{
    ExportBody, GenerationRequest, GenerationResult, Slide, TopicBody, UploadFile,
};

// ── Constants ────────────────────────────────────────────────────────────────

const USER_AGENT: &str = concat!("eduslide/", env!("CARGO_PKG_VERSION"));
const PDF_TYPES: &[&str] = &["application/pdf", "application/x-pdf"];
const MESSAGE_FIELDS: &[&str] = &["message", "detail", "error"];

// ── Error type ───────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("backend returned {status}: {message}")]
    Remote { status: u16, message: String },
    #[error("no response from backend within {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected backend response: {0}")]
    InvalidResponse(String),
    #[error("could not save file: {0}")]
    Save(#[from] std::io::Error),
}

// ── Endpoints ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Call {
    Topic,
    Pdf,
    Image,
}

fn endpoint_path(contract: ContractVersion, call: Call) -> &'static str {
    match (contract, call) {
        (ContractVersion::Binary, Call::Topic) => "/generate-from-topic",
        (ContractVersion::Binary, Call::Pdf) => "/generate-from-pdf",
        (ContractVersion::Binary, Call::Image) => "/generate-from-image",
        (ContractVersion::Structured, Call::Topic) => "/api/generate/topic",
        (ContractVersion::Structured, Call::Pdf) => "/api/generate/pdf",
        (ContractVersion::Structured, Call::Image) => "/api/generate/image",
    }
}

pub const EXPORT_PATH: &str = "/api/export/pptx";

// ── Client ───────────────────────────────────────────────────────────────────

/// Talks to the remote slide generation backend. One call per operation, no
/// retries, nothing cached.
pub struct SlideClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl SlideClient {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::ClientBuilder::new()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn submit(&self, request: &GenerationRequest) -> Result<GenerationResult, ApiError> {
        match request {
            GenerationRequest::Topic {
                topic,
                slide_count,
                education_level,
            } => self.submit_topic(topic, *slide_count, education_level).await,
            GenerationRequest::PdfUpload { file, slide_count } => {
                self.submit_pdf(file, *slide_count).await
            }
            GenerationRequest::ImageUpload { file, slide_count } => {
                self.submit_image(file, *slide_count).await
            }
        }
    }

    pub async fn submit_topic(
        &self,
        topic: &str,
        slide_count: u32,
        education_level: &str,
    ) -> Result<GenerationResult, ApiError> {
        if topic.trim().is_empty() {
            return Err(ApiError::Validation("Please enter a topic".to_string()));
        }
        validate_slide_count(slide_count)?;

        let url = self.config.endpoint(endpoint_path(self.config.contract, Call::Topic));
        let builder = match self.config.contract {
            ContractVersion::Structured => self.http.post(&url).json(&TopicBody {
                topic,
                num_slides: slide_count,
                education_level,
                input_type: "topic",
            }),
            ContractVersion::Binary => self.http.post(&url).multipart(
                Form::new()
                    .text("topic", topic.to_string())
                    .text("num_slides", slide_count.to_string()),
            ),
        };

        tracing::info!(%url, slide_count, "requesting slides for topic");
        let body = self.dispatch(builder).await?;
        self.decode(body)
    }

    pub async fn submit_pdf(
        &self,
        file: &UploadFile,
        slide_count: u32,
    ) -> Result<GenerationResult, ApiError> {
        if !is_pdf(&file.content_type) {
            return Err(ApiError::Validation(format!(
                "{} is not a PDF (content type {})",
                file.file_name, file.content_type
            )));
        }
        validate_slide_count(slide_count)?;

        let form = Form::new().part("file", file_part(file)?);
        let form = match self.config.contract {
            ContractVersion::Structured => form
                .text("num_slides", slide_count.to_string())
                .text("input_type", "pdf_text"),
            ContractVersion::Binary => form.text("slides_per_chapter", slide_count.to_string()),
        };

        let url = self.config.endpoint(endpoint_path(self.config.contract, Call::Pdf));
        tracing::info!(%url, file = %file.file_name, slide_count, "uploading PDF");
        let body = self.dispatch(self.http.post(&url).multipart(form)).await?;
        self.decode(body)
    }

    pub async fn submit_image(
        &self,
        file: &UploadFile,
        slide_count: u32,
    ) -> Result<GenerationResult, ApiError> {
        if !is_image(&file.content_type) {
            return Err(ApiError::Validation(format!(
                "{} is not an image (content type {})",
                file.file_name, file.content_type
            )));
        }
        validate_slide_count(slide_count)?;

        let form = Form::new()
            .part("file", file_part(file)?)
            .text("num_slides", slide_count.to_string());
        let form = match self.config.contract {
            ContractVersion::Structured => form.text("input_type", "image_description"),
            ContractVersion::Binary => form,
        };

        let url = self.config.endpoint(endpoint_path(self.config.contract, Call::Image));
        tracing::info!(%url, file = %file.file_name, slide_count, "uploading image");
        let body = self.dispatch(self.http.post(&url).multipart(form)).await?;
        self.decode(body)
    }

    /// Ask the backend to build a presentation file from a slide list.
    pub async fn export_pptx(&self, slides: &[Slide], topic: &str) -> Result<Vec<u8>, ApiError> {
        if self.config.contract != ContractVersion::Structured {
            return Err(ApiError::Validation(
                "export is only available with the structured backend contract".to_string(),
            ));
        }
        let url = self.config.endpoint(EXPORT_PATH);
        tracing::info!(%url, slides = slides.len(), "exporting presentation");
        self.dispatch(self.http.post(&url).json(&ExportBody { slides, topic }))
            .await
    }

    // ── Transport ────────────────────────────────────────────────────────────

    /// Send the request and read the whole body, bounded by the configured
    /// timeout.
    async fn dispatch(&self, builder: RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let timeout = self.config.timeout;
        let result = match tokio::time::timeout(timeout, fetch(builder)).await {
            Ok(result) => result,
            Err(_) => Err(ApiError::Timeout(timeout)),
        };
        if let Err(e) = &result {
            tracing::warn!(error = %e, "backend call failed");
        }
        result
    }

    fn decode(&self, body: Vec<u8>) -> Result<GenerationResult, ApiError> {
        match self.config.contract {
            ContractVersion::Binary => Ok(GenerationResult::File(body)),
            ContractVersion::Structured => serde_json::from_slice::<Vec<Slide>>(&body)
                .map(GenerationResult::Slides)
                .map_err(|e| ApiError::InvalidResponse(e.to_string())),
        }
    }
}

async fn fetch(builder: RequestBuilder) -> Result<Vec<u8>, ApiError> {
    let response = builder.send().await.map_err(request_error)?;
    let status = response.status();
    let body = response.bytes().await.map_err(request_error)?;

    if !status.is_success() {
        return Err(ApiError::Remote {
            status: status.as_u16(),
            message: remote_message(status, &body),
        });
    }
    Ok(body.to_vec())
}

fn request_error(e: reqwest::Error) -> ApiError {
    if e.is_connect() {
        ApiError::Network(format!("ConnectError: {}", e))
    } else {
        ApiError::Network(format!("RequestError: {}", e))
    }
}

/// Best-effort human readable message from an error body.
fn remote_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(body) {
        for field in MESSAGE_FIELDS {
            if let Some(Value::String(message)) = map.get(*field) {
                return message.clone();
            }
        }
    }
    let text = String::from_utf8_lossy(body).trim().to_string();
    if !text.is_empty() {
        return text;
    }
    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}

// ── Input checks ─────────────────────────────────────────────────────────────

fn validate_slide_count(slide_count: u32) -> Result<(), ApiError> {
    if slide_count == 0 {
        return Err(ApiError::Validation(
            "slide count must be a positive number".to_string(),
        ));
    }
    Ok(())
}

fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

fn is_pdf(content_type: &str) -> bool {
    PDF_TYPES.contains(&media_type(content_type).as_str())
}

fn is_image(content_type: &str) -> bool {
    media_type(content_type).starts_with("image/")
}

fn file_part(file: &UploadFile) -> Result<Part, ApiError> {
    Part::bytes(file.bytes.clone())
        .file_name(file.file_name.clone())
        .mime_str(&file.content_type)
        .map_err(|e| ApiError::Validation(format!("bad content type: {}", e)))
}
