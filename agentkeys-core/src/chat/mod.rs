//! Chat client integration.
//!
//! Turns stored configuration into OpenAI-compatible chat client parameters.

mod params;

pub use params::{chat_params_for, ChatMessage, ChatModelParams, MAX_COMPLETION_TOKENS, MAX_TOKENS};
