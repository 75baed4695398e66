//! Assistant session: ingestion and question answering.
//!
//! A [`Session`] owns the published [`ChatState`] snapshot, the busy flag,
//! and the synthesizer. Every user-triggered operation first takes the busy
//! flag; a second operation started while one is in flight is refused with
//! [`SessionError::Busy`] instead of queueing. The flag is released when the
//! operation's guard drops, on success and failure alike.
//!
//! ```text
//! ingest_files / ingest_drive_files
//!   extract → chunk → ChatState::with_batch → publish
//!
//! send_message
//!   append user msg → retrieve → (no hits: fixed reply)
//!                              → build prompt → synthesize → append reply
//! ```

use std::sync::{Arc, Mutex, RwLock};

use thiserror::Error;

use crate::chunk::chunk_text;
use crate::config::RetrievalConfig;
use crate::drive::{DriveClient, DriveFile};
use crate::extract::extract_text;
use crate::models::{Document, Message, SourceFile};
use crate::prompt::{build_context, build_prompt, NO_DOCUMENTS, NO_RELEVANT_CONTEXT};
use crate::retrieve::retrieve;
use crate::state::ChatState;
use crate::synthesizer::Synthesizer;

/// What the session is currently busy with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    ProcessingDocuments,
    DownloadingDrive,
    Thinking,
}

impl Activity {
    pub fn label(&self) -> &'static str {
        match self {
            Activity::ProcessingDocuments => "Processing documents...",
            Activity::DownloadingDrive => "Downloading from Google Drive...",
            Activity::Thinking => "Thinking...",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("busy: {}", .0.label())]
    Busy(Activity),
}

/// Per-file outcome of an ingestion batch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub added: Vec<String>,
    pub duplicates: Vec<String>,
    /// `(file name, reason)`.
    pub failed: Vec<(String, String)>,
}

#[derive(Debug, Default)]
struct BusyFlag {
    current: Mutex<Option<Activity>>,
}

impl BusyFlag {
    fn try_acquire(&self, activity: Activity) -> Result<BusyGuard<'_>, SessionError> {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(running) = *current {
            return Err(SessionError::Busy(running));
        }
        *current = Some(activity);
        Ok(BusyGuard { flag: self })
    }

    fn current(&self) -> Option<Activity> {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[derive(Debug)]
struct BusyGuard<'a> {
    flag: &'a BusyFlag,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        *self.flag.current.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

pub struct Session {
    state: RwLock<Arc<ChatState>>,
    busy: BusyFlag,
    synthesizer: Arc<dyn Synthesizer>,
    retrieval: RetrievalConfig,
}

impl Session {
    pub fn new(synthesizer: Arc<dyn Synthesizer>, retrieval: RetrievalConfig) -> Self {
        Self {
            state: RwLock::new(Arc::new(ChatState::default())),
            busy: BusyFlag::default(),
            synthesizer,
            retrieval,
        }
    }

    /// The currently published state.
    pub fn snapshot(&self) -> Arc<ChatState> {
        self.state.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.current().is_some()
    }

    pub fn activity(&self) -> Option<Activity> {
        self.busy.current()
    }

    /// Derives a new snapshot from the current one and publishes it.
    ///
    /// Only called while the busy flag is held, so updates never race.
    fn update<F>(&self, f: F)
    where
        F: FnOnce(&ChatState) -> ChatState,
    {
        let mut slot = self.state.write().unwrap_or_else(|e| e.into_inner());
        let next = f(slot.as_ref());
        *slot = Arc::new(next);
    }

    /// Ingests local or uploaded files, one document per file.
    ///
    /// A failing file sets the error banner and does not stop the batch.
    pub async fn ingest_files(&self, files: Vec<SourceFile>) -> Result<IngestReport, SessionError> {
        let _guard = self.busy.try_acquire(Activity::ProcessingDocuments)?;
        self.update(|s| s.with_error(None));

        let mut report = IngestReport::default();
        for file in files {
            self.ingest_one(file, "", &mut report).await;
        }
        Ok(report)
    }

    /// Downloads the picked Drive files and ingests them like uploads.
    pub async fn ingest_drive_files(
        &self,
        client: &DriveClient,
        files: Vec<DriveFile>,
    ) -> Result<IngestReport, SessionError> {
        let _guard = self.busy.try_acquire(Activity::DownloadingDrive)?;
        self.update(|s| s.with_error(None));

        let mut report = IngestReport::default();
        for picked in files {
            match client.download(&picked.id).await {
                Ok(file) => self.ingest_one(file, " from Google Drive", &mut report).await,
                Err(e) => self.record_failure(&picked.name, " from Google Drive", e.to_string(), &mut report),
            }
        }
        Ok(report)
    }

    async fn ingest_one(&self, file: SourceFile, origin: &str, report: &mut IngestReport) {
        let name = file.name.clone();

        let extracted = tokio::task::spawn_blocking(move || {
            extract_text(&file.bytes, &file.mime_type, &file.name).map_err(|e| e.to_string())
        })
        .await
        .unwrap_or_else(|e| Err(format!("extraction task failed: {}", e)));

        let text = match extracted {
            Ok(text) => text,
            Err(reason) => return self.record_failure(&name, origin, reason, report),
        };

        let document = Document::new(&name, chrono::Utc::now().timestamp_millis());
        let fragments = chunk_text(&document.id, &document.name, &text);
        if fragments.is_empty() {
            return self.record_failure(
                &name,
                origin,
                "no text content to index".to_string(),
                report,
            );
        }
        let fragment_count = fragments.len();

        self.update(|s| match s.with_batch(document, fragments) {
            Ok(next) => {
                tracing::info!(document = %name, fragments = fragment_count, "document indexed");
                report.added.push(name.clone());
                next.with_message(Message::model(format!(
                    "Successfully processed and chunked \"{}\". Ready for questions.",
                    name
                )))
            }
            Err(e) => {
                tracing::info!(document = %name, "duplicate document skipped");
                report.duplicates.push(name.clone());
                s.with_message(Message::model(e.to_string()))
            }
        });
    }

    fn record_failure(&self, name: &str, origin: &str, reason: String, report: &mut IngestReport) {
        tracing::warn!(document = %name, %reason, "document not ingested");
        let banner = format!("Failed to process {}{}: {}", name, origin, reason);
        self.update(|s| s.with_error(Some(banner)));
        report.failed.push((name.to_string(), reason));
    }

    /// Answers a question from the indexed documents.
    ///
    /// Returns the assistant's reply, or `None` for a blank question, which
    /// leaves the state untouched. The synthesizer is only contacted when
    /// retrieval found at least one relevant fragment.
    pub async fn send_message(&self, input: &str) -> Result<Option<Message>, SessionError> {
        if input.trim().is_empty() {
            return Ok(None);
        }
        let _guard = self.busy.try_acquire(Activity::Thinking)?;

        self.update(|s| s.with_error(None).with_message(Message::user(input)));
        let snapshot = self.snapshot();

        let reply = if snapshot.store.is_empty() {
            Message::model(NO_DOCUMENTS)
        } else {
            let hits = retrieve(input, snapshot.store.all(), &self.retrieval);
            if hits.is_empty() {
                Message::model(NO_RELEVANT_CONTEXT)
            } else {
                let prompt = build_prompt(input, &build_context(&hits));
                match self.synthesizer.synthesize(&prompt).await {
                    Ok(answer) => Message::model(answer),
                    Err(e) => {
                        tracing::warn!(synthesizer = self.synthesizer.name(), error = %e, "answer synthesis failed");
                        let text = format!("Failed to get response from AI: {}", e);
                        self.update(|s| s.with_error(Some(text.clone())));
                        Message::model(text)
                    }
                }
            }
        };

        self.update(|s| s.with_message(reply.clone()));
        Ok(Some(reply))
    }
}
