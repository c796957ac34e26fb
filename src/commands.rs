//! Host-invoked commands
//!
//! The host registers two commands: reflect on a single note, and run the
//! weekly analysis. Both return the note they created; errors are handed
//! back unpresented.

use crate::config::Settings;
use crate::error::{RecapitanError, Result};
use crate::journal::{Clock, NoteRef, Vault};
use crate::privacy::PrivacyManager;
use crate::services::AiService;
use crate::types::CommunicationStyle;
use crate::weekly::WeeklyAnalysisService;
use std::sync::Arc;
use tracing::info;

/// A command the host can trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Reflect on one note, by vault-relative path
    AnalyzeNote { path: String },
    /// Reflect on the past week of daily notes
    WeeklyAnalysis,
}

/// Filename of the reflection written for `note`, next to it
pub fn reflection_note_path(note: &NoteRef) -> String {
    let name = format!("{} Reflection.md", note.stem());
    match note.parent() {
        "" => name,
        parent => format!("{}/{}", parent, name),
    }
}

/// Dispatches host commands onto the analysis services
pub struct CommandManager {
    vault: Arc<dyn Vault>,
    ai: Arc<dyn AiService>,
    privacy: PrivacyManager,
    reflection_template: String,
    style: CommunicationStyle,
    weekly: WeeklyAnalysisService,
}

impl CommandManager {
    pub fn new(
        settings: &Settings,
        vault: Arc<dyn Vault>,
        ai: Arc<dyn AiService>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let weekly = WeeklyAnalysisService::from_settings(
            settings,
            Arc::clone(&vault),
            Arc::clone(&ai),
            clock,
        )?;

        Ok(Self {
            vault,
            ai,
            privacy: PrivacyManager::new(settings.private_marker.clone())?,
            reflection_template: settings.reflection_template.clone(),
            style: settings.communication_style,
            weekly,
        })
    }

    pub async fn execute(&self, command: Command) -> Result<NoteRef> {
        match command {
            Command::AnalyzeNote { path } => self.analyze_note(&path).await,
            Command::WeeklyAnalysis => self.weekly_analysis().await,
        }
    }

    /// Reflect on a single note and store the result beside it
    pub async fn analyze_note(&self, path: &str) -> Result<NoteRef> {
        let note = NoteRef::new(path);
        let content = self.vault.read(&note).await?;
        let sanitized = self.privacy.remove_private_sections(&content);

        if sanitized.trim().is_empty() {
            return Err(RecapitanError::EmptyNote {
                path: note.path.clone(),
            });
        }

        let analysis = self
            .ai
            .analyze(&sanitized, &self.reflection_template, self.style)
            .await?;

        let reflection = self
            .vault
            .create_note(&reflection_note_path(&note), &analysis)
            .await?;

        info!("Reflection for {} written to {}", note, reflection);
        Ok(reflection)
    }

    pub async fn weekly_analysis(&self) -> Result<NoteRef> {
        self.weekly.run_weekly_analysis().await
    }
}
