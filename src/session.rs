use std::path::{Path, PathBuf};

use crate::api::ApiError;
use crate::models::{GenerationResult, Slide};

/// Identifies one generation request within a session. Later tickets
/// compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// A newer request was issued after this one. Its slides or file were
    /// dropped; a failure is still reported through the message.
    Stale,
}

/// State of one active view. Start a fresh one to reset.
#[derive(Debug, Default)]
pub struct SessionState {
    result: Option<GenerationResult>,
    loading: bool,
    downloading: bool,
    message: Option<String>,
    saved: Option<PathBuf>,
    latest: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_generation(&mut self) -> Ticket {
        self.latest += 1;
        self.loading = true;
        self.message = None;
        self.saved = None;
        Ticket(self.latest)
    }

    pub fn finish_generation(
        &mut self,
        ticket: Ticket,
        outcome: Result<GenerationResult, ApiError>,
    ) -> Completion {
        if ticket.0 != self.latest {
            match outcome {
                Ok(_) => {
                    tracing::debug!(ticket = ticket.0, latest = self.latest, "discarding stale generation result");
                }
                Err(e) => {
                    tracing::error!(error = %e, ticket = ticket.0, "earlier generation failed");
                    self.message = Some(format!("Failed to generate slides: {}", e));
                }
            }
            return Completion::Stale;
        }
        self.loading = false;
        match outcome {
            Ok(result) => {
                self.result = Some(result);
                self.saved = None;
            }
            Err(e) => {
                tracing::error!(error = %e, "generation failed");
                self.message = Some(format!("Failed to generate slides: {}", e));
            }
        }
        Completion::Applied
    }

    /// Returns false when there is nothing to download or a download is
    /// already running.
    pub fn begin_download(&mut self) -> bool {
        if self.downloading || self.slides().is_empty() {
            return false;
        }
        self.downloading = true;
        self.message = None;
        true
    }

    pub fn finish_download(&mut self, outcome: Result<PathBuf, ApiError>) {
        self.downloading = false;
        match outcome {
            Ok(path) => {
                self.message = Some(format!("Saved {}", path.display()));
                self.saved = Some(path);
            }
            Err(e) => {
                tracing::error!(error = %e, "download failed");
                self.saved = None;
                self.message = Some(format!("Could not download the file: {}", e));
            }
        }
    }

    pub fn slides(&self) -> &[Slide] {
        match &self.result {
            Some(GenerationResult::Slides(slides)) => slides,
            _ => &[],
        }
    }

    /// Take a ready presentation file delivered by a binary-contract backend.
    pub fn take_file(&mut self) -> Option<Vec<u8>> {
        match self.result.take() {
            Some(GenerationResult::File(bytes)) => Some(bytes),
            other => {
                self.result = other;
                None
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_downloading(&self) -> bool {
        self.downloading
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn saved_path(&self) -> Option<&Path> {
        self.saved.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slide(title: &str) -> Slide {
        Slide {
            title: title.to_string(),
            content: vec![],
            example: String::new(),
            visual_suggestion: None,
        }
    }

    #[test]
    fn slow_first_response_does_not_overwrite_newer_one() {
        let mut state = SessionState::new();
        let first = state.begin_generation();
        let second = state.begin_generation();
        assert!(first < second);

        let applied = state.finish_generation(second, Ok(GenerationResult::Slides(vec![slide("new")])));
        assert_eq!(applied, Completion::Applied);
        assert!(!state.is_loading());

        let stale = state.finish_generation(first, Ok(GenerationResult::Slides(vec![slide("old")])));
        assert_eq!(stale, Completion::Stale);
        assert_eq!(state.slides()[0].title, "new");
    }

    #[test]
    fn stale_failure_is_shown_while_newer_request_stays_pending() {
        let mut state = SessionState::new();
        let first = state.begin_generation();
        let _second = state.begin_generation();

        let completion = state.finish_generation(first, Err(ApiError::Network("reset".into())));
        assert_eq!(completion, Completion::Stale);
        assert!(state.is_loading());
        assert!(state.message().unwrap().contains("reset"));
    }

    #[test]
    fn stale_failure_after_newer_success_keeps_slides_and_reports_error() {
        let mut state = SessionState::new();
        let first = state.begin_generation();
        let second = state.begin_generation();
        state.finish_generation(second, Ok(GenerationResult::Slides(vec![slide("fresh")])));

        let completion = state.finish_generation(
            first,
            Err(ApiError::Remote {
                status: 500,
                message: "overloaded".into(),
            }),
        );
        assert_eq!(completion, Completion::Stale);
        assert_eq!(state.slides()[0].title, "fresh");
        assert!(state.message().unwrap().contains("overloaded"));
    }

    #[test]
    fn new_generation_forgets_previous_saved_file() {
        let mut state = SessionState::new();
        let t = state.begin_generation();
        state.finish_generation(t, Ok(GenerationResult::Slides(vec![slide("a")])));
        assert!(state.begin_download());
        state.finish_download(Ok(PathBuf::from("a.pptx")));
        assert_eq!(state.saved_path(), Some(Path::new("a.pptx")));

        let t = state.begin_generation();
        assert_eq!(state.saved_path(), None);
        state.finish_generation(t, Err(ApiError::Network("down".into())));
        assert_eq!(state.saved_path(), None);
        assert!(state.message().unwrap().starts_with("Failed to generate"));
    }

    #[test]
    fn failed_generation_surfaces_message_and_keeps_previous_slides() {
        let mut state = SessionState::new();
        let t = state.begin_generation();
        state.finish_generation(t, Ok(GenerationResult::Slides(vec![slide("kept")])));

        let t = state.begin_generation();
        state.finish_generation(
            t,
            Err(ApiError::Remote {
                status: 500,
                message: "overloaded".into(),
            }),
        );
        assert_eq!(state.slides().len(), 1);
        assert!(state.message().unwrap().contains("overloaded"));
    }

    #[test]
    fn failed_download_reports_no_saved_file() {
        let mut state = SessionState::new();
        let t = state.begin_generation();
        state.finish_generation(t, Ok(GenerationResult::Slides(vec![slide("a")])));

        assert!(state.begin_download());
        assert!(!state.begin_download());
        state.finish_download(Err(ApiError::Remote {
            status: 502,
            message: "bad gateway".into(),
        }));

        assert!(!state.is_downloading());
        assert_eq!(state.saved_path(), None);
        assert!(state.message().unwrap().starts_with("Could not download"));
    }

    #[test]
    fn download_needs_slides() {
        let mut state = SessionState::new();
        assert!(!state.begin_download());
    }

    #[test]
    fn file_results_are_taken_once() {
        let mut state = SessionState::new();
        let t = state.begin_generation();
        state.finish_generation(t, Ok(GenerationResult::File(vec![1, 2, 3])));

        assert!(state.slides().is_empty());
        assert_eq!(state.take_file(), Some(vec![1, 2, 3]));
        assert_eq!(state.take_file(), None);
    }
}
