//! Note storage boundary and journal-date handling
//!
//! The pipeline never touches the filesystem or the wall clock directly: a
//! [`Vault`] lists, reads and creates notes, and a [`Clock`] says what "now"
//! is. [`FsVault`] serves a directory of markdown files, [`MemoryVault`]
//! keeps notes in memory.

use crate::error::Result;
use crate::types::DATE_FORMAT;
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::debug;

/// Daily note filename: `YYYY-MM-DD.md`
static JOURNAL_FILENAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2})\.md$").expect("valid journal filename regex"));

/// Reference to a note by its vault-relative, `/`-separated path
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoteRef {
    pub path: String,
}

impl NoteRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Final path segment, e.g. `2024-01-01.md`
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Name without the `.md` extension
    pub fn stem(&self) -> &str {
        let name = self.name();
        name.strip_suffix(".md").unwrap_or(name)
    }

    /// Folder part of the path, empty at the vault root
    pub fn parent(&self) -> &str {
        match self.path.rfind('/') {
            Some(idx) => &self.path[..idx],
            None => "",
        }
    }
}

impl std::fmt::Display for NoteRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path)
    }
}

/// Note storage collaborator
#[async_trait]
pub trait Vault: Send + Sync {
    /// Every markdown note in the vault
    async fn list_markdown_files(&self) -> Result<Vec<NoteRef>>;

    /// Full text of one note
    async fn read(&self, note: &NoteRef) -> Result<String>;

    /// Create a new note; fails if `path` already exists
    async fn create_note(&self, path: &str, content: &str) -> Result<NoteRef>;
}

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Date encoded in a daily-note filename, if it is one
///
/// Requires the exact `YYYY-MM-DD.md` shape and a real calendar date.
pub fn parse_journal_date(file_name: &str) -> Option<NaiveDate> {
    let captures = JOURNAL_FILENAME.captures(file_name)?;
    NaiveDate::parse_from_str(&captures[1], DATE_FORMAT).ok()
}

/// Whether `date` (taken as midnight UTC) lies in `[now - window, now]`
pub fn is_within_window(date: NaiveDate, now: DateTime<Utc>, window: Duration) -> bool {
    let Some(midnight) = date.and_hms_opt(0, 0, 0) else {
        return false;
    };
    let timestamp = Utc.from_utc_datetime(&midnight);
    timestamp >= now - window && timestamp <= now
}

/// Filesystem vault rooted at a directory
#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
}

impl FsVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a vault-relative path, refusing anything that escapes the root
    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));

        if path.is_empty() || escapes {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("note path must stay inside the vault: {}", path),
            )
            .into());
        }

        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl Vault for FsVault {
    async fn list_markdown_files(&self) -> Result<Vec<NoteRef>> {
        let mut notes = Vec::new();
        let mut pending = vec![(self.root.clone(), String::new())];

        while let Some((dir, prefix)) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&dir).await?;

            while let Some(entry) = entries.next_entry().await? {
                let name = entry.file_name().to_string_lossy().to_string();
                // Hidden folders hold host configuration, not notes
                if name.starts_with('.') {
                    continue;
                }

                let path = if prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{}/{}", prefix, name)
                };

                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    pending.push((entry.path(), path));
                } else if file_type.is_file() && name.ends_with(".md") {
                    notes.push(NoteRef::new(path));
                }
            }
        }

        notes.sort();
        debug!("Found {} markdown notes in {}", notes.len(), self.root.display());
        Ok(notes)
    }

    async fn read(&self, note: &NoteRef) -> Result<String> {
        let path = self.resolve(&note.path)?;
        Ok(tokio::fs::read_to_string(path).await?)
    }

    async fn create_note(&self, path: &str, content: &str) -> Result<NoteRef> {
        let full_path = self.resolve(path)?;
        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&full_path)
            .await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;

        debug!("Created note {}", full_path.display());
        Ok(NoteRef::new(path))
    }
}

/// In-memory vault; notes keep their insertion order
#[derive(Debug, Default)]
pub struct MemoryVault {
    notes: RwLock<Vec<(String, String)>>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a vault from `(path, content)` pairs
    pub fn with_notes<I, P, C>(notes: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: Into<String>,
        C: Into<String>,
    {
        let notes = notes
            .into_iter()
            .map(|(path, content)| (path.into(), content.into()))
            .collect();
        Self {
            notes: RwLock::new(notes),
        }
    }

    /// Content of a note, if present
    pub async fn get(&self, path: &str) -> Option<String> {
        self.notes
            .read()
            .await
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, content)| content.clone())
    }

    pub async fn len(&self) -> usize {
        self.notes.read().await.len()
    }
}

#[async_trait]
impl Vault for MemoryVault {
    async fn list_markdown_files(&self) -> Result<Vec<NoteRef>> {
        Ok(self
            .notes
            .read()
            .await
            .iter()
            .filter(|(path, _)| path.ends_with(".md"))
            .map(|(path, _)| NoteRef::new(path.clone()))
            .collect())
    }

    async fn read(&self, note: &NoteRef) -> Result<String> {
        self.get(&note.path).await.ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("note not found: {}", note)).into()
        })
    }

    async fn create_note(&self, path: &str, content: &str) -> Result<NoteRef> {
        let mut notes = self.notes.write().await;
        if notes.iter().any(|(p, _)| p == path) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("note already exists: {}", path),
            )
            .into());
        }
        notes.push((path.to_string(), content.to_string()));
        Ok(NoteRef::new(path))
    }
}
