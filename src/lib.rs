//! Recapitan - AI reflections on a journal vault
//!
//! Gathers a week of daily notes, strips privately-marked sections, and asks
//! a pluggable AI backend for a reflective summary that is stored as a new
//! note.
//!
//! # Architecture
//!
//! - **Retry**: bounded attempts with exponential backoff, driven by the
//!   retryable flag on [`RecapitanError`]
//! - **Transport**: one JSON request/response cycle with typed failures
//! - **Services**: the [`AiService`] capability and its providers
//!   (OpenAI, Ollama)
//! - **Privacy**: marker-delimited redaction
//! - **Weekly**: the aggregation pipeline, over injected [`Vault`] and
//!   [`Clock`] collaborators
//!
//! # Example
//!
//! ```ignore
//! use recapitan_core::{build_ai_service, CommandManager, FsVault, Settings, SystemClock};
//! use std::sync::Arc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> recapitan_core::Result<()> {
//!     let settings = Settings::load(None)?;
//!     let ai = build_ai_service(&settings)?;
//!     let vault = Arc::new(FsVault::new("/path/to/vault"));
//!
//!     let commands = CommandManager::new(&settings, vault, ai, Arc::new(SystemClock))?;
//!     let note = commands.weekly_analysis().await?;
//!     println!("{}", note);
//!     Ok(())
//! }
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod journal;
pub mod privacy;
pub mod retry;
pub mod services;
pub mod transport;
pub mod types;
pub mod utils;
pub mod weekly;

// Re-export commonly used types
pub use commands::{Command, CommandManager};
pub use config::Settings;
pub use error::{ErrorKind, RecapitanError, Result};
pub use journal::{Clock, FixedClock, FsVault, MemoryVault, NoteRef, SystemClock, Vault};
pub use privacy::PrivacyManager;
pub use retry::{retry, RetryOptions, Retryable};
pub use services::{build_ai_service, AiService, OllamaService, OpenAiService};
pub use types::{AiProvider, AnalysisSchedule, CommunicationStyle, JournalEntry, SanitizedEntry};
pub use weekly::WeeklyAnalysisService;
