//! Client for a remote educational slide generation service.
//!
//! [`api::SlideClient`] sends topic, PDF and image generation requests and
//! returns either a slide list or a ready presentation file;
//! [`download`] saves presentation files through a revocable object URL.

pub mod api;
pub mod config;
pub mod download;
pub mod models;
pub mod render;
pub mod session;

pub use api::{ApiError, SlideClient};
pub use config::{ClientConfig, ContractVersion};
pub use models::{GenerationRequest, GenerationResult, Slide, UploadFile};
