//! Conversation turn engine
//!
//! Drives one assistant run to completion: start the run, poll its status,
//! answer the tool calls it blocks on, and decide when a human-readable
//! reply is ready. One logical thread of control per turn; the only bounds
//! on a runaway turn are the poll attempt ceiling and the tool-call
//! iteration ceiling.

mod error;
mod orchestrator;
mod poller;

#[cfg(test)]
pub mod testing;

pub use error::EngineError;
pub use orchestrator::{ChatSession, Orchestrator, TurnReply, DEFAULT_MAX_TOOL_ITERATIONS};
pub use poller::{poll_until_settled, PollConfig};
