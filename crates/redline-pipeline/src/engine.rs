//! Review engine — drives one document through the full change-aware cycle.
//!
//! A cycle is a single control flow: load state, fetch the snapshot, diff
//! against the last reviewed revision, chunk the changed paragraphs, review
//! each chunk through the rate-limited client, dedupe against the seen-hash
//! set, anchor survivors, post comments, persist state. The only suspension
//! points are the client's limiter wait and backoff sleep, both of which
//! observe the caller's cancellation token.
//!
//! Failures are isolated to the smallest unit: a failed chunk is skipped and
//! the rest of the document proceeds; an unanchorable suggestion is skipped
//! alone; a failed document never blocks the others in
//! [`ReviewEngine::review_all`]. A hash is marked seen only after its
//! comment is confirmed posted, and the revision id advances only on a
//! fully clean pass so skipped work is retried next cycle.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use redline_core::{
    ConfigError, anchor_suggestion, chunk_paragraphs, detect_changes, filter_suggestions,
};
use redline_llm::{PersonaConfig, ReviewClient};
use redline_settings::RedlineSettings;

use crate::errors::EngineError;
use crate::traits::{CommentSink, DocumentSource, ReviewStateStore};

/// Engine tunables and prompt framing.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Maximum bytes of paragraph text per model request.
    pub max_chunk_bytes: usize,
    /// Prompt framing passed to the model client for every chunk.
    pub persona: PersonaConfig,
}

impl EngineConfig {
    /// Derive the engine tunables from loaded settings.
    #[must_use]
    pub fn from_settings(settings: &RedlineSettings) -> Self {
        let mut persona = PersonaConfig::default();
        if let Some(prompt) = &settings.review.system_prompt {
            persona.system_prompt.clone_from(prompt);
        }
        Self {
            max_chunk_bytes: settings.review.max_chunk_bytes,
            persona,
        }
    }

    /// Check the tunables.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_chunk_bytes == 0 {
            return Err(ConfigError::InvalidChunkSize(self.max_chunk_bytes));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_settings(&RedlineSettings::default())
    }
}

/// What one document's cycle did, for logs and callers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleReport {
    /// Document the cycle ran for.
    pub document_id: String,
    /// Revision that was reviewed.
    pub revision_id: String,
    /// Paragraphs the diff marked changed.
    pub changed_paragraphs: usize,
    /// Chunks sent to the model.
    pub chunks: usize,
    /// Chunks skipped after exhausting retries or failing permanently.
    pub failed_chunks: usize,
    /// Suggestions returned across all successful chunks.
    pub suggestions: usize,
    /// Suggestions dropped as already seen or batch duplicates.
    pub deduplicated: usize,
    /// Suggestions skipped because their quote could not be located uniquely.
    pub anchor_failures: usize,
    /// Comments confirmed posted.
    pub posted: usize,
    /// Comments the sink rejected.
    pub post_failures: usize,
    /// Whether the persisted revision id advanced to this revision.
    pub revision_advanced: bool,
}

/// Outcome of one document within a [`ReviewEngine::review_all`] run.
pub type DocumentOutcome = (String, Result<CycleReport, EngineError>);

/// Drives review cycles over injected collaborators.
pub struct ReviewEngine {
    config: EngineConfig,
    client: ReviewClient,
    source: Arc<dyn DocumentSource>,
    store: Arc<dyn ReviewStateStore>,
    sink: Arc<dyn CommentSink>,
}

impl ReviewEngine {
    /// Wire an engine from its collaborators.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] when the tunables are invalid; fatal at startup,
    /// never retried.
    pub fn new(
        config: EngineConfig,
        client: ReviewClient,
        source: Arc<dyn DocumentSource>,
        store: Arc<dyn ReviewStateStore>,
        sink: Arc<dyn CommentSink>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            client,
            source,
            store,
            sink,
        })
    }

    /// Run one full review cycle for a document.
    ///
    /// # Errors
    ///
    /// [`EngineError`] when the source or store fails, or when the caller
    /// cancels at a suspension point. Chunk, anchor, and sink failures are
    /// absorbed into the returned [`CycleReport`] instead.
    #[instrument(skip_all, fields(document_id = document_id))]
    pub async fn review_document(
        &self,
        document_id: &str,
        cancel: &CancellationToken,
    ) -> Result<CycleReport, EngineError> {
        let state = self.store.get(document_id).await?;
        let snapshot = self.source.fetch_snapshot(document_id).await?;

        let mut report = CycleReport {
            document_id: document_id.to_string(),
            revision_id: snapshot.revision_id.clone(),
            ..CycleReport::default()
        };

        if state.revision_id.as_deref() == Some(snapshot.revision_id.as_str()) {
            debug!(revision_id = %snapshot.revision_id, "revision already reviewed");
            return Ok(report);
        }

        let previous = match &state.revision_id {
            Some(revision_id) => {
                self.source
                    .fetch_revision(document_id, revision_id)
                    .await?
            }
            None => None,
        };

        let changed = detect_changes(previous.as_ref(), &snapshot);
        report.changed_paragraphs = changed.len();

        if changed.is_empty() {
            debug!(revision_id = %snapshot.revision_id, "no changed paragraphs");
            // Still advance the revision id so the next diff does not run
            // against an ever-older baseline.
            let mut next = state;
            next.revision_id = Some(snapshot.revision_id.clone());
            self.store.put(document_id, next).await?;
            report.revision_advanced = true;
            return Ok(report);
        }

        let chunks =
            chunk_paragraphs(&snapshot.paragraphs, &changed, self.config.max_chunk_bytes)?;
        report.chunks = chunks.len();
        info!(
            revision_id = %snapshot.revision_id,
            changed = changed.len(),
            chunks = chunks.len(),
            "reviewing changed paragraphs"
        );

        // Sequential, in chunk order: aggregated suggestions stay in
        // ascending paragraph order and the limiter remains the only
        // admission authority.
        let mut suggestions = Vec::new();
        for chunk in &chunks {
            match self
                .client
                .review_chunk(&snapshot, chunk, &self.config.persona, cancel)
                .await
            {
                Ok(batch) => suggestions.extend(batch),
                Err(err) if err.is_cancelled() => return Err(EngineError::Cancelled),
                Err(err) => {
                    warn!(error = %err, "chunk review failed, skipping chunk");
                    report.failed_chunks += 1;
                }
            }
        }

        report.suggestions = suggestions.len();
        let (kept, _fresh) = filter_suggestions(suggestions, &state.seen_hashes);
        report.deduplicated = report.suggestions - kept.len();

        let mut posted_hashes = BTreeSet::new();
        for suggestion in &kept {
            let anchored = match anchor_suggestion(suggestion, &snapshot.paragraphs) {
                Ok(anchored) => anchored,
                Err(err) => {
                    warn!(hash = %suggestion.hash, error = %err, "anchor failed, skipping suggestion");
                    report.anchor_failures += 1;
                    continue;
                }
            };
            match self.sink.post(document_id, &anchored).await {
                Ok(()) => {
                    let _ = posted_hashes.insert(anchored.hash);
                }
                Err(err) => {
                    warn!(hash = %anchored.hash, error = %err, "comment post failed, skipping");
                    report.post_failures += 1;
                }
            }
        }
        report.posted = posted_hashes.len();

        // A hash becomes seen only once its comment is confirmed posted.
        // The revision id advances only on a clean pass, so a skipped chunk
        // or rejected comment is diffed and reviewed again next cycle;
        // anchor failures do not hold it back (re-reviewing an unchanged
        // revision cannot relocate a vanished quote).
        let clean = report.failed_chunks == 0 && report.post_failures == 0;
        let mut next = state;
        next.record_posted(posted_hashes);
        if clean {
            next.revision_id = Some(snapshot.revision_id.clone());
            report.revision_advanced = true;
        }
        self.store.put(document_id, next).await?;

        info!(
            chunks = report.chunks,
            failed_chunks = report.failed_chunks,
            suggestions = report.suggestions,
            deduplicated = report.deduplicated,
            anchor_failures = report.anchor_failures,
            posted = report.posted,
            revision_advanced = report.revision_advanced,
            "review cycle complete"
        );
        Ok(report)
    }

    /// Review a batch of documents, isolating failures per document.
    ///
    /// Every document gets its own outcome; an error in one is logged and
    /// never blocks the rest. Cancellation stops the run after the document
    /// that observed it.
    pub async fn review_all(
        &self,
        document_ids: &[String],
        cancel: &CancellationToken,
    ) -> Vec<DocumentOutcome> {
        let mut outcomes = Vec::with_capacity(document_ids.len());
        for document_id in document_ids {
            let result = self.review_document(document_id, cancel).await;
            let cancelled = matches!(result, Err(EngineError::Cancelled));
            match &result {
                Ok(report) => {
                    debug!(document_id, posted = report.posted, "document reviewed");
                }
                Err(err) => {
                    error!(document_id, error = %err, "document review failed");
                }
            }
            outcomes.push((document_id.clone(), result));
            if cancelled {
                break;
            }
        }
        let processed = outcomes.iter().filter(|(_, r)| r.is_ok()).count();
        info!(
            processed,
            total = document_ids.len(),
            "review run complete"
        );
        outcomes
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
