//! Chat state: the ordered turn history and its transitions.
//!
//! At most one turn is pending at a time. Every pending turn carries a
//! [`TurnId`]; a result is accepted only while its id is still the pending
//! one, so replies that arrive after a reset or for an older turn are
//! discarded instead of being appended.

use contentible_links::extract_previews;
use contentible_shared::{
    Attachment, ChatTurn, ContentibleError, LinkPreview, Result, SessionId, TurnId, TurnStatus,
};
use tracing::{debug, warn};

/// Message shown in place of a reply when the request failed.
pub const FAILURE_MESSAGE: &str =
    "Sorry, there was an error processing your request. Please try again.";

/// A fully resolved assistant reply, ready to replace the pending turn.
#[derive(Debug, Clone)]
pub struct AssistantReply {
    /// Action tag the reply was classified from.
    pub action: String,
    pub content: String,
    pub attachment: Option<Attachment>,
    pub links: Vec<LinkPreview>,
}

/// Explicit owner of the conversation history.
#[derive(Debug)]
pub struct ChatState {
    session: SessionId,
    turns: Vec<ChatTurn>,
    next_id: u64,
    pending: Option<TurnId>,
}

impl ChatState {
    pub fn new() -> Self {
        Self {
            session: SessionId::new(),
            turns: Vec::new(),
            next_id: 1,
            pending: None,
        }
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// The turn currently awaiting a reply, if any.
    pub fn pending(&self) -> Option<TurnId> {
        self.pending
    }

    /// Look up a turn by id.
    pub fn turn(&self, id: TurnId) -> Option<&ChatTurn> {
        self.turns.iter().rfind(|t| t.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    fn allocate(&mut self) -> TurnId {
        let id = TurnId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Append the user prompt and a pending assistant placeholder.
    ///
    /// Returns the id of the pending turn. Fails with [`ContentibleError::Busy`]
    /// while another turn is pending, and rejects blank prompts.
    pub fn begin_turn(&mut self, prompt: &str) -> Result<TurnId> {
        if let Some(pending) = self.pending {
            return Err(ContentibleError::Busy { pending });
        }
        if prompt.trim().is_empty() {
            return Err(ContentibleError::validation("prompt is empty"));
        }

        let user_id = self.allocate();
        self.turns
            .push(ChatTurn::user(user_id, prompt, extract_previews(prompt)));

        let pending = self.allocate();
        self.turns.push(ChatTurn::pending(pending));
        self.pending = Some(pending);

        debug!(session = %self.session, turn = %pending, "turn started");
        Ok(pending)
    }

    /// Replace the pending placeholder with a resolved reply.
    pub fn complete_turn(&mut self, turn: TurnId, reply: AssistantReply) -> Result<&ChatTurn> {
        let slot = self.take_pending(turn)?;
        let entry = &mut self.turns[slot];
        entry.content = reply.content;
        entry.attachment = reply.attachment;
        entry.links = reply.links;
        entry.status = TurnStatus::Complete;
        debug!(turn = %turn, action = %reply.action, "turn completed");
        Ok(&self.turns[slot])
    }

    /// Replace the pending placeholder with the apology message.
    pub fn fail_turn(&mut self, turn: TurnId) -> Result<&ChatTurn> {
        let slot = self.take_pending(turn)?;
        let entry = &mut self.turns[slot];
        entry.content = FAILURE_MESSAGE.to_string();
        entry.attachment = None;
        entry.links = Vec::new();
        entry.status = TurnStatus::Failed;
        Ok(&self.turns[slot])
    }

    /// Start a new chat. Any in-flight result becomes stale.
    pub fn reset(&mut self) {
        if let Some(pending) = self.pending.take() {
            debug!(turn = %pending, "discarding pending turn on reset");
        }
        self.turns.clear();
        self.session = SessionId::new();
    }

    /// Clear the pending marker for `turn` and locate its placeholder.
    fn take_pending(&mut self, turn: TurnId) -> Result<usize> {
        if self.pending != Some(turn) {
            warn!(turn = %turn, pending = ?self.pending, "discarding stale turn result");
            return Err(ContentibleError::StaleTurn { turn });
        }

        let slot = self
            .turns
            .iter()
            .rposition(|t| t.id == turn && t.is_pending())
            .ok_or(ContentibleError::StaleTurn { turn })?;

        self.pending = None;
        Ok(slot)
    }
}

impl Default for ChatState {
    fn default() -> Self {
        Self::new()
    }
}
