//! Reaction generation backends.
//!
//! - [`generator`] - the [`ReactionGenerator`] capability trait
//! - [`openrouter`] - OpenRouter / OpenAI-compatible chat completions

pub mod generator;
pub mod openrouter;

pub use generator::{GeneratedReaction, ReactionGenerator};
pub use openrouter::OpenRouterGenerator;
