//! End-to-end turn flow: prompt → generation → classification → enrichment.

use std::time::Instant;

use contentible_enrichment::Enricher;
use contentible_shared::{ChatTurn, ContentibleError, Result, TurnId};
use tracing::{info, instrument, warn};

use crate::classifier::{LinkSource, build_attachment, classify};
use crate::client::{Generation, GenerationBackend};
use crate::session::{AssistantReply, ChatState};

/// Progress callback for reporting turn status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when the turn settles, successfully or not.
    fn done(&self, turn: &ChatTurn);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _turn: &ChatTurn) {}
}

// ---------------------------------------------------------------------------
// Assistant
// ---------------------------------------------------------------------------

/// Turns prompts into fully resolved replies. Holds no chat state.
pub struct Assistant {
    backend: Box<dyn GenerationBackend>,
    enricher: Enricher,
}

impl Assistant {
    pub fn new(backend: Box<dyn GenerationBackend>, enricher: Enricher) -> Self {
        Self { backend, enricher }
    }

    /// Ask the backend and interpret its answer.
    pub async fn respond(&self, prompt: &str, progress: &dyn ProgressReporter) -> Result<AssistantReply> {
        progress.phase("Generating response...");
        let generation = self.backend.generate(prompt).await?;
        Ok(self.interpret(generation, progress).await)
    }

    /// Classify a generation, decode its view and resolve its links.
    ///
    /// Never fails: malformed payloads become invalid attachments and
    /// unreachable links become fallback previews.
    pub async fn interpret(
        &self,
        generation: Generation,
        progress: &dyn ProgressReporter,
    ) -> AssistantReply {
        let directive = classify(&generation.action, &generation.payload);
        let attachment = build_attachment(directive.view, &generation.payload);

        let links = match directive.links {
            LinkSource::Enrich(urls) => {
                progress.phase("Fetching link previews...");
                self.enricher.enrich_all(&urls).await
            }
            LinkSource::Inline(previews) => previews,
        };

        AssistantReply {
            action: directive.action.as_str().to_string(),
            content: directive.lead_in,
            attachment,
            links,
        }
    }
}

// ---------------------------------------------------------------------------
// Conversation
// ---------------------------------------------------------------------------

/// A chat state driven by an [`Assistant`].
///
/// `submit` takes `&mut self` for the whole round trip, so callers sharing a
/// conversation across tasks serialize turns through their lock. Callers that
/// drive [`ChatState`] directly get [`ContentibleError::Busy`] instead.
pub struct Conversation {
    state: ChatState,
    assistant: Assistant,
}

impl Conversation {
    pub fn new(assistant: Assistant) -> Self {
        Self {
            state: ChatState::new(),
            assistant,
        }
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn turns(&self) -> &[ChatTurn] {
        self.state.turns()
    }

    /// Drop the history and start a new session.
    pub fn reset(&mut self) {
        self.state.reset();
        info!(session = %self.state.session(), "new chat");
    }

    /// Submit a prompt and wait for the assistant turn to settle.
    ///
    /// Request failures are recorded as a failed turn carrying the apology
    /// message and are not returned as errors. Only state errors (busy, blank
    /// prompt) propagate. Dropping the returned future before it completes
    /// also records the turn as failed.
    #[instrument(skip_all, fields(session = %self.state.session()))]
    pub async fn submit(
        &mut self,
        prompt: &str,
        progress: &dyn ProgressReporter,
    ) -> Result<&ChatTurn> {
        let start = Instant::now();
        let turn: TurnId = self.state.begin_turn(prompt)?;

        {
            let mut guard = PendingTurn {
                state: &mut self.state,
                turn,
            };
            match self.assistant.respond(prompt, progress).await {
                Ok(reply) => {
                    guard.state.complete_turn(turn, reply)?;
                }
                Err(e) => {
                    warn!(turn = %turn, error = %e, "generation failed");
                    guard.state.fail_turn(turn)?;
                }
            }
        }

        let settled = self
            .state
            .turn(turn)
            .ok_or(ContentibleError::StaleTurn { turn })?;

        info!(
            turn = %turn,
            status = ?settled.status,
            links = settled.links.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "turn settled"
        );
        progress.done(settled);
        Ok(settled)
    }
}

/// Fails the pending turn if `submit` is cancelled before it settles.
struct PendingTurn<'a> {
    state: &'a mut ChatState,
    turn: TurnId,
}

impl Drop for PendingTurn<'_> {
    fn drop(&mut self) {
        if self.state.pending() == Some(self.turn) {
            warn!(turn = %self.turn, "submission cancelled before it settled");
            let _ = self.state.fail_turn(self.turn);
        }
    }
}
