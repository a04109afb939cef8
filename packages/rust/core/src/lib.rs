//! Conversation logic for Contentible.
//!
//! This crate ties together the generation client, response classification,
//! link enrichment and chat state into a single turn flow.

pub mod classifier;
pub mod client;
pub mod conversation;
pub mod render;
pub mod session;

pub use classifier::{Action, Directive, LinkSource, build_attachment, classify};
pub use client::{Generation, GenerationBackend, HttpGenerationClient};
pub use conversation::{Assistant, Conversation, ProgressReporter, SilentProgress};
pub use session::{AssistantReply, ChatState, FAILURE_MESSAGE};
