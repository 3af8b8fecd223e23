//! Turning presentation bytes into a saved file.
//!
//! Saving goes through a [`SaveTarget`], which hands out revocable object
//! URLs for payloads. Every URL created by [`save_binary`] is revoked before
//! it returns, whether or not the save itself succeeded.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tempfile::NamedTempFile;

use crate::api::{ApiError, SlideClient};
use crate::models::Slide;

const EXTENSION: &str = ".pptx";
const FALLBACK_STEM: &str = "presentation";
const MAX_NAME_ATTEMPTS: u32 = 1000;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// `"My Topic"` becomes `My_Topic.pptx`.
pub fn pptx_filename(seed: &str) -> String {
    let stem = WHITESPACE_RE.replace_all(seed.trim(), "_");
    if stem.is_empty() {
        format!("{}{}", FALLBACK_STEM, EXTENSION)
    } else {
        format!("{}{}", stem, EXTENSION)
    }
}

// ── Save targets ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectUrl(String);

impl ObjectUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The environment a download is materialized in.
pub trait SaveTarget {
    fn create_object_url(&mut self, payload: &[u8]) -> Result<ObjectUrl, ApiError>;
    fn trigger_download(&mut self, url: &ObjectUrl, filename: &str) -> Result<PathBuf, ApiError>;
    fn revoke_object_url(&mut self, url: &ObjectUrl);
}

/// Revokes its URL when dropped.
struct ObjectUrlGuard<'a, T: SaveTarget + ?Sized> {
    target: &'a mut T,
    url: ObjectUrl,
}

impl<'a, T: SaveTarget + ?Sized> ObjectUrlGuard<'a, T> {
    fn acquire(target: &'a mut T, payload: &[u8]) -> Result<Self, ApiError> {
        let url = target.create_object_url(payload)?;
        Ok(Self { target, url })
    }

    fn trigger(&mut self, filename: &str) -> Result<PathBuf, ApiError> {
        self.target.trigger_download(&self.url, filename)
    }
}

impl<T: SaveTarget + ?Sized> Drop for ObjectUrlGuard<'_, T> {
    fn drop(&mut self) {
        self.target.revoke_object_url(&self.url);
    }
}

pub fn save_binary<T: SaveTarget + ?Sized>(
    target: &mut T,
    payload: &[u8],
    filename_seed: &str,
) -> Result<PathBuf, ApiError> {
    let filename = pptx_filename(filename_seed);
    let mut guard = ObjectUrlGuard::acquire(target, payload)?;
    let saved = guard.trigger(&filename);
    drop(guard);

    match &saved {
        Ok(path) => tracing::info!(path = %path.display(), bytes = payload.len(), "saved presentation"),
        Err(e) => tracing::error!(error = %e, %filename, "saving presentation failed"),
    }
    saved
}

/// Export `slides` through the backend and save the returned file.
///
/// Nothing is staged unless the backend answers with a file.
pub async fn export_slides<T: SaveTarget + ?Sized>(
    client: &SlideClient,
    target: &mut T,
    slides: &[Slide],
    filename_seed: &str,
) -> Result<PathBuf, ApiError> {
    let payload = client.export_pptx(slides, filename_seed).await?;
    save_binary(target, &payload, filename_seed)
}

// ── Directory target ─────────────────────────────────────────────────────────

/// Saves into a directory. An object URL is a staged temp file next to the
/// destination; revoking it deletes the staged copy. Existing files are never
/// overwritten: a taken name gets a ` (1)`, ` (2)`, ... suffix before the
/// extension.
pub struct DirectoryTarget {
    dir: PathBuf,
    staged: HashMap<ObjectUrl, NamedTempFile>,
    next_id: u64,
}

impl DirectoryTarget {
    pub fn new(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            staged: HashMap::new(),
            next_id: 0,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Object URLs created and not yet revoked.
    pub fn outstanding(&self) -> usize {
        self.staged.len()
    }
}

impl SaveTarget for DirectoryTarget {
    fn create_object_url(&mut self, payload: &[u8]) -> Result<ObjectUrl, ApiError> {
        let mut staged = tempfile::Builder::new()
            .prefix(".eduslide-")
            .suffix(".part")
            .tempfile_in(&self.dir)?;
        staged.write_all(payload)?;
        staged.flush()?;

        self.next_id += 1;
        let url = ObjectUrl(format!("blob:eduslide/{}", self.next_id));
        self.staged.insert(url.clone(), staged);
        Ok(url)
    }

    fn trigger_download(&mut self, url: &ObjectUrl, filename: &str) -> Result<PathBuf, ApiError> {
        let staged = self.staged.get(url).ok_or_else(|| {
            ApiError::Save(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} has been revoked", url.as_str()),
            ))
        })?;
        let filename = filename.replace(['/', '\\'], "_");
        let (stem, ext) = match filename.rfind('.') {
            Some(idx) if idx > 0 => filename.split_at(idx),
            _ => (filename.as_str(), ""),
        };

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let candidate = if attempt == 0 {
                filename.clone()
            } else {
                format!("{} ({}){}", stem, attempt, ext)
            };
            let dest = self.dir.join(candidate);
            let mut out = match OpenOptions::new().write(true).create_new(true).open(&dest) {
                Ok(out) => out,
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            };
            io::copy(&mut File::open(staged.path())?, &mut out)?;
            return Ok(dest);
        }
        Err(ApiError::Save(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free name for {} in {}", filename, self.dir.display()),
        )))
    }

    fn revoke_object_url(&mut self, url: &ObjectUrl) {
        if let Some(staged) = self.staged.remove(url) {
            if let Err(e) = staged.close() {
                tracing::warn!(url = url.as_str(), error = %e, "could not remove staged download");
            }
        }
    }
}
